//! # Film Catalog CLI (`films`)
//!
//! Without a subcommand `films` runs the interactive menu. The one-shot
//! subcommands run a single lookup and exit.
//!
//! ## Usage
//!
//! ```bash
//! films --config ./config/films.toml [command]
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `films` / `films menu` | Interactive menu |
//! | `films keyword <text>` | Titles containing a keyword |
//! | `films criteria --genre G --from Y --to Y` | Genre and/or year range |
//! | `films letter <L>` | Titles starting with a letter |
//! | `films get <key>` | One film by id or exact title |
//! | `films stats` | Popular and recent queries |
//! | `films genres` | Known genres |
//! | `films years` | Release-year range |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use film_catalog::finder::{SearchCriteria, DEFAULT_LETTER_LIMIT, DEFAULT_SEARCH_LIMIT};
use film_catalog::menu::Menu;
use film_catalog::query_log::DEFAULT_STATS_LIMIT;
use film_catalog::{config, get, report, search, stats, Catalog};

/// Film Catalog: search a film database and review past searches.
///
/// Connection settings come from the TOML file given by `--config`, then
/// from environment variables (`MYSQL_*`, `MONGO_*`, `DEBUG`), with a
/// `.env` file in the working directory loaded first.
#[derive(Parser)]
#[command(name = "films", version, about = "Film catalog search with a persistent query log")]
struct Cli {
    /// Path to configuration file (TOML). Missing file means defaults.
    #[arg(long, global = true, default_value = "./config/films.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive menu (the default).
    Menu,

    /// Search titles containing a keyword (case-insensitive).
    Keyword {
        keyword: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT, allow_negative_numbers = true)]
        limit: i64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,
        /// Print records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search by genre, by release-year range, or both.
    ///
    /// Needs a genre, or both --from and --to.
    Criteria {
        #[arg(long)]
        genre: Option<String>,
        /// First release year (inclusive).
        #[arg(long)]
        from: Option<i64>,
        /// Last release year (inclusive).
        #[arg(long)]
        to: Option<i64>,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT, allow_negative_numbers = true)]
        limit: i64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,
        #[arg(long)]
        json: bool,
    },

    /// Search titles starting with a letter.
    Letter {
        #[arg(value_parser = parse_letter)]
        letter: String,
        #[arg(long, default_value_t = DEFAULT_LETTER_LIMIT, allow_negative_numbers = true)]
        limit: i64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,
        #[arg(long)]
        json: bool,
    },

    /// Show one film by id or exact title.
    Get {
        key: String,
        #[arg(long)]
        json: bool,
    },

    /// Show the most popular and most recent searches.
    Stats {
        #[arg(long, default_value_t = DEFAULT_STATS_LIMIT)]
        limit: i64,
        #[arg(long)]
        json: bool,
    },

    /// List known genres.
    Genres {
        #[arg(long)]
        json: bool,
    },

    /// Show the oldest and newest release year.
    Years {
        #[arg(long)]
        json: bool,
    },
}

/// Accept exactly one alphabetic character.
fn parse_letter(s: &str) -> Result<String, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphabetic() => Ok(s.to_string()),
        _ => Err(format!("expected a single letter, got '{}'", s)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let cfg = config::load_config(&cli.config)?;
    report::init_logging(&cfg.logging, &cfg.app)?;

    let catalog = Catalog::new(cfg);

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            let stdin = std::io::stdin();
            let mut menu = Menu::new(&catalog, stdin.lock(), std::io::stdout());
            menu.run().await?;
        }
        Commands::Keyword {
            keyword,
            limit,
            offset,
            json,
        } => {
            search::run_keyword(&catalog, &keyword, limit, offset, json).await?;
        }
        Commands::Criteria {
            genre,
            from,
            to,
            limit,
            offset,
            json,
        } => {
            let criteria = SearchCriteria::new(genre, from, to);
            search::run_criteria(&catalog, &criteria, limit, offset, json).await?;
        }
        Commands::Letter {
            letter,
            limit,
            offset,
            json,
        } => {
            search::run_letter(&catalog, &letter, limit, offset, json).await?;
        }
        Commands::Get { key, json } => {
            get::run_get(&catalog, &key, json).await?;
        }
        Commands::Stats { limit, json } => {
            stats::run_stats(&catalog, limit, json).await?;
        }
        Commands::Genres { json } => {
            search::run_genres(&catalog, json).await?;
        }
        Commands::Years { json } => {
            search::run_years(&catalog, json).await?;
        }
    }

    catalog.shutdown().await;

    let failures = catalog.errors.failures();
    if failures > 0 {
        eprintln!(
            "{} lookup(s) failed; details in {}",
            failures,
            catalog.config.logging.error_log.display()
        );
    }

    Ok(())
}
