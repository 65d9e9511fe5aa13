//! One-shot search commands (`films keyword`, `films criteria`, ...).
//!
//! Each command runs one catalog lookup and prints either the text rendering
//! shared with the menu or, with `--json`, the raw records.

use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use crate::display;
use crate::finder::SearchCriteria;
use crate::models::FilmRecord;
use crate::Catalog;

pub async fn run_keyword(
    catalog: &Catalog,
    keyword: &str,
    limit: i64,
    offset: i64,
    json: bool,
) -> Result<()> {
    if keyword.trim().is_empty() {
        println!("No films found.");
        return Ok(());
    }
    let films = catalog.finder.find_by_keyword(keyword, limit, offset).await;
    print_films(&films, offset, json)
}

pub async fn run_criteria(
    catalog: &Catalog,
    criteria: &SearchCriteria,
    limit: i64,
    offset: i64,
    json: bool,
) -> Result<()> {
    if criteria.plan().is_none() {
        eprintln!("Give a genre, or both --from and --to.");
    }
    let films = catalog.finder.find_by_criteria(criteria, limit, offset).await;
    print_films(&films, offset, json)
}

pub async fn run_letter(
    catalog: &Catalog,
    letter: &str,
    limit: i64,
    offset: i64,
    json: bool,
) -> Result<()> {
    let films = catalog
        .finder
        .find_by_first_letter(letter, limit, offset)
        .await;
    print_films(&films, offset, json)
}

pub async fn run_genres(catalog: &Catalog, json: bool) -> Result<()> {
    let genres = catalog.metadata.list_genres().await;
    if json {
        return print_json(&genres);
    }
    if genres.is_empty() {
        println!("No genres found.");
    }
    for genre in &genres {
        println!("{}", genre);
    }
    Ok(())
}

pub async fn run_years(catalog: &Catalog, json: bool) -> Result<()> {
    let range = catalog.metadata.year_range().await;
    if json {
        return print_json(&range);
    }
    match (range.min_year, range.max_year) {
        (Some(min), Some(max)) => println!("{}-{}", min, max),
        _ => println!("No release years found."),
    }
    Ok(())
}

fn print_films(films: &[FilmRecord], offset: i64, json: bool) -> Result<()> {
    if json {
        return print_json(&films);
    }
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    display::render_films(&mut out, films, offset)?;
    out.flush()?;
    Ok(())
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
