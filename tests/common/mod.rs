//! Shared fixtures: a small SQLite film catalog and catalog builders.

#![allow(dead_code)]

use film_catalog::config::{Config, LogBackend};
use film_catalog::db::ConnectionManager;
use film_catalog::query_log::InMemoryQueryLog;
use film_catalog::Catalog;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;

const SCHEMA: &[&str] = &[
    "CREATE TABLE category (category_id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
    "CREATE TABLE film (film_id INTEGER PRIMARY KEY, title TEXT NOT NULL, description TEXT, release_year INTEGER)",
    "CREATE TABLE film_text (film_id INTEGER PRIMARY KEY, title TEXT NOT NULL, description TEXT)",
    "CREATE TABLE film_category (film_id INTEGER NOT NULL, category_id INTEGER NOT NULL)",
];

pub const GENRES: &[(i64, &str)] = &[(1, "Action"), (2, "Comedy"), (3, "Drama"), (4, "Horror")];

/// (film_id, title, release_year, category_id)
pub const FILMS: &[(i64, &str, i64, i64)] = &[
    (1, "ALIEN CENTER", 2003, 2),
    (2, "BALLROOM MOCKINGBIRD", 2001, 2),
    (3, "BEAST HUNCHBACK", 1999, 3),
    (4, "CHAMBER ALIEN", 2008, 4),
    (5, "COMEDY NIGHT", 2012, 2),
    (6, "BRIDE INTRIGUE", 2005, 1),
    (7, "DANCES NONE", 1998, 2),
    (8, "Aliens Return", 2010, 4),
];

pub fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.display())
}

/// Create the catalog schema at `path`, optionally with the sample films.
pub async fn create_catalog(path: &Path, with_films: bool) {
    let options = SqliteConnectOptions::from_str(&sqlite_url(path))
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }

    if with_films {
        for (id, name) in GENRES {
            sqlx::query("INSERT INTO category (category_id, name) VALUES (?, ?)")
                .bind(*id)
                .bind(name.to_string())
                .execute(&pool)
                .await
                .unwrap();
        }
        for (id, title, year, category) in FILMS {
            let description = format!("A story about {}", title.to_lowercase());
            sqlx::query(
                "INSERT INTO film (film_id, title, description, release_year) VALUES (?, ?, ?, ?)",
            )
            .bind(*id)
            .bind(title.to_string())
            .bind(description.clone())
            .bind(*year)
            .execute(&pool)
            .await
            .unwrap();
            sqlx::query("INSERT INTO film_text (film_id, title, description) VALUES (?, ?, ?)")
                .bind(*id)
                .bind(title.to_string())
                .bind(description.clone())
                .execute(&pool)
                .await
                .unwrap();
            sqlx::query("INSERT INTO film_category (film_id, category_id) VALUES (?, ?)")
                .bind(*id)
                .bind(*category)
                .execute(&pool)
                .await
                .unwrap();
        }
    }

    pool.close().await;
}

/// Add a film whose description is stored as a BLOB value, the column type
/// MySQL reports for TEXT.
pub async fn insert_binary_description_film(path: &Path, id: i64, title: &str, description: &str) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&sqlite_url(path))
        .await
        .unwrap();

    sqlx::query(
        "INSERT INTO film (film_id, title, description, release_year) VALUES (?, ?, CAST(? AS BLOB), 2011)",
    )
    .bind(id)
    .bind(title.to_string())
    .bind(description.to_string())
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO film_text (film_id, title, description) VALUES (?, ?, CAST(? AS BLOB))")
        .bind(id)
        .bind(title.to_string())
        .bind(description.to_string())
        .execute(&pool)
        .await
        .unwrap();

    let kind: String = sqlx::query_scalar("SELECT typeof(description) FROM film_text WHERE film_id = ?")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(kind, "blob");

    pool.close().await;
}

pub fn test_config(relational_url: String, error_log: PathBuf) -> Config {
    let mut config = Config::default();
    config.relational.url = Some(relational_url);
    config.document.backend = LogBackend::Memory;
    config.logging.error_log = error_log;
    config
}

pub struct Fixture {
    pub tmp: TempDir,
    pub db_path: PathBuf,
    pub catalog: Catalog,
    pub log: Arc<InMemoryQueryLog>,
}

pub fn catalog_for(config: Config) -> (Catalog, Arc<InMemoryQueryLog>) {
    let log = Arc::new(InMemoryQueryLog::new());
    let connections = Arc::new(ConnectionManager::new(
        config.relational.clone(),
        config.document.clone(),
    ));
    let catalog = Catalog::with_log_store(config, connections, log.clone());
    (catalog, log)
}

/// A seeded catalog backed by a SQLite file in a fresh temp dir.
pub async fn seeded() -> Fixture {
    fixture(true, |_| {}).await
}

pub async fn fixture<F>(with_films: bool, tweak: F) -> Fixture
where
    F: FnOnce(&mut Config),
{
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("films.sqlite");
    create_catalog(&db_path, with_films).await;

    let mut config = test_config(sqlite_url(&db_path), tmp.path().join("logs/log.fail"));
    tweak(&mut config);
    let (catalog, log) = catalog_for(config);

    Fixture {
        tmp,
        db_path,
        catalog,
        log,
    }
}

/// A catalog whose relational store cannot be opened.
pub fn unreachable() -> (TempDir, Catalog, Arc<InMemoryQueryLog>) {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("no-such-dir").join("films.sqlite");
    let config = test_config(sqlite_url(&missing), tmp.path().join("log.fail"));
    let (catalog, log) = catalog_for(config);
    (tmp, catalog, log)
}
