//! Text rendering for films and query statistics.
//!
//! Every renderer writes to a caller-supplied `Write` so the menu loop and
//! one-shot commands share the same output, and tests can capture it.

use std::io::{self, Write};

use crate::models::{FilmRecord, PopularQuery, QueryLogEntry, YearRange};

const WRAP_WIDTH: usize = 72;

/// Render one page of search results. `offset` numbers rows after earlier
/// pages.
pub fn render_films<W: Write>(out: &mut W, films: &[FilmRecord], offset: i64) -> io::Result<()> {
    if films.is_empty() {
        writeln!(out, "\nNo films found.")?;
        return Ok(());
    }

    writeln!(out, "\nFound {} film(s):", films.len())?;
    let first = offset.max(0) + 1;

    if films
        .iter()
        .all(|f| matches!(f, FilmRecord::Classified { .. }))
    {
        writeln!(out, "  {:>4}  {:<32} {:>6}  {}", "#", "TITLE", "YEAR", "GENRE")?;
        writeln!(out, "  {}", "-".repeat(60))?;
    }

    for (i, film) in films.iter().enumerate() {
        let n = first + i as i64;
        match film {
            FilmRecord::Described { title, description } => {
                writeln!(out, "\n{}. {}", n, title)?;
                match description {
                    Some(text) => {
                        for line in wrap(text, WRAP_WIDTH) {
                            writeln!(out, "   {}", line)?;
                        }
                    }
                    None => writeln!(out, "   (no description)")?,
                }
            }
            FilmRecord::Classified {
                title,
                release_year,
                genre,
            } => {
                writeln!(
                    out,
                    "  {:>4}  {:<32} {:>6}  {}",
                    n,
                    title,
                    release_year.map_or_else(|| "-".to_string(), |y| y.to_string()),
                    genre.as_deref().unwrap_or("-")
                )?;
            }
            FilmRecord::Detailed { .. } => render_film(out, Some(film))?,
        }
    }
    Ok(())
}

/// Render a single film as a key/value block.
pub fn render_film<W: Write>(out: &mut W, film: Option<&FilmRecord>) -> io::Result<()> {
    let Some(film) = film else {
        writeln!(out, "Film not found.")?;
        return Ok(());
    };

    writeln!(out, "--- Film ---")?;
    match film {
        FilmRecord::Detailed {
            id,
            title,
            description,
            release_year,
        } => {
            writeln!(out, "id:           {}", id)?;
            writeln!(out, "title:        {}", title)?;
            if let Some(year) = release_year {
                writeln!(out, "release_year: {}", year)?;
            }
            if let Some(text) = description {
                writeln!(out, "description:")?;
                for line in wrap(text, WRAP_WIDTH) {
                    writeln!(out, "  {}", line)?;
                }
            }
        }
        FilmRecord::Described { title, description } => {
            writeln!(out, "title:        {}", title)?;
            if let Some(text) = description {
                writeln!(out, "description:  {}", text)?;
            }
        }
        FilmRecord::Classified {
            title,
            release_year,
            genre,
        } => {
            writeln!(out, "title:        {}", title)?;
            if let Some(year) = release_year {
                writeln!(out, "release_year: {}", year)?;
            }
            if let Some(genre) = genre {
                writeln!(out, "genre:        {}", genre)?;
            }
        }
    }
    Ok(())
}

pub fn render_popular<W: Write>(out: &mut W, popular: &[PopularQuery]) -> io::Result<()> {
    if popular.is_empty() {
        writeln!(out, "   No popular queries yet.")?;
        return Ok(());
    }
    for (i, q) in popular.iter().enumerate() {
        writeln!(out, "{}. '{}' - {} time(s)", i + 1, q.query, q.count)?;
        writeln!(
            out,
            "   Type: {}, last searched: {}",
            q.search_type,
            q.last_searched.format("%Y-%m-%d %H:%M")
        )?;
    }
    Ok(())
}

pub fn render_recent<W: Write>(out: &mut W, recent: &[QueryLogEntry]) -> io::Result<()> {
    if recent.is_empty() {
        writeln!(out, "   No recent queries yet.")?;
        return Ok(());
    }
    for (i, q) in recent.iter().enumerate() {
        writeln!(
            out,
            "{}. '{}' - {}",
            i + 1,
            q.query,
            q.timestamp.format("%Y-%m-%d %H:%M")
        )?;
        writeln!(out, "   Type: {}, results: {}", q.search_type, q.results_count)?;
    }
    Ok(())
}

/// Genre list and year span shown before a genre/year search.
pub fn render_filters<W: Write>(out: &mut W, genres: &[String], years: YearRange) -> io::Result<()> {
    if !genres.is_empty() {
        writeln!(out, "Genres: {}", genres.join(", "))?;
    }
    if let (Some(min), Some(max)) = (years.min_year, years.max_year) {
        writeln!(out, "Years:  {}-{}", min, max)?;
    }
    Ok(())
}

/// Greedy word wrap.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
