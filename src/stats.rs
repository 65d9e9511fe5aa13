//! Query statistics: the most popular and the most recent searches.
//!
//! Shown by menu choice 3 and by `films stats`.

use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use crate::display;
use crate::models::{PopularQuery, QueryLogEntry};
use crate::Catalog;

#[derive(Debug, Serialize)]
pub struct QueryStats {
    pub popular: Vec<PopularQuery>,
    pub recent: Vec<QueryLogEntry>,
}

pub async fn collect_stats(catalog: &Catalog, limit: i64) -> QueryStats {
    QueryStats {
        popular: catalog.query_log.get_popular(limit).await,
        recent: catalog.query_log.get_recent(limit).await,
    }
}

pub fn write_stats<W: Write>(out: &mut W, stats: &QueryStats, limit: i64) -> std::io::Result<()> {
    writeln!(out, "\n{}", "=".repeat(60))?;
    writeln!(out, "SEARCH QUERY STATISTICS")?;
    writeln!(out, "{}", "=".repeat(60))?;

    writeln!(out, "\nTop {} popular queries:", limit)?;
    display::render_popular(out, &stats.popular)?;

    writeln!(out, "\nLast {} queries:", limit)?;
    display::render_recent(out, &stats.recent)?;

    writeln!(out, "{}", "=".repeat(60))?;
    Ok(())
}

/// `films stats`: print the statistics screen.
pub async fn run_stats(catalog: &Catalog, limit: i64, json: bool) -> Result<()> {
    let stats = collect_stats(catalog, limit).await;
    if json {
        return crate::search::print_json(&stats);
    }
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_stats(&mut out, &stats, limit)?;
    out.flush()?;
    Ok(())
}
