//! Interactive menu loop.
//!
//! Reads choices and search parameters line by line, validates them
//! (re-prompting on bad input), runs the lookup, and renders a page of
//! results. Full pages offer to fetch the next one. End of input behaves like
//! choosing Exit. Input and output are generic so the loop can be driven from
//! tests.

use anyhow::Result;
use std::io::{BufRead, Write};

use crate::display;
use crate::finder::SearchCriteria;
use crate::models::FilmRecord;
use crate::stats;
use crate::Catalog;

const MENU: &[(&str, &str)] = &[
    ("1", "Search by keyword"),
    ("2", "Search by genre and year range"),
    ("3", "View query statistics"),
    ("4", "Search by first letter"),
    ("9", "Exit"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Keyword,
    Criteria,
    Stats,
    FirstLetter,
    Exit,
}

impl Choice {
    pub fn parse(input: &str) -> Option<Choice> {
        match input.trim() {
            "1" => Some(Choice::Keyword),
            "2" => Some(Choice::Criteria),
            "3" => Some(Choice::Stats),
            "4" => Some(Choice::FirstLetter),
            "9" => Some(Choice::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// A search that can be re-run at a later offset.
enum PagedSearch {
    Keyword(String),
    Criteria(SearchCriteria),
    FirstLetter(String),
}

pub struct Menu<'a, R, W> {
    catalog: &'a Catalog,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(catalog: &'a Catalog, input: R, output: W) -> Self {
        Self {
            catalog,
            input,
            output,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until the user exits or input ends, then release store handles.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.show_menu()?;
            let Some(choice) = self.read_choice()? else {
                break;
            };
            let flow = match choice {
                Choice::Keyword => self.keyword_search().await?,
                Choice::Criteria => self.criteria_search().await?,
                Choice::Stats => self.show_stats().await?,
                Choice::FirstLetter => self.letter_search().await?,
                Choice::Exit => Flow::Quit,
            };
            if flow == Flow::Quit {
                break;
            }
        }

        writeln!(self.output, "\nClosing database connections...")?;
        writeln!(self.output, "Goodbye!")?;
        self.output.flush()?;
        self.catalog.shutdown().await;
        Ok(())
    }

    fn show_menu(&mut self) -> Result<()> {
        writeln!(self.output, "\nChoose an action:")?;
        for (key, label) in MENU {
            writeln!(self.output, "{}. {}", key, label)?;
        }
        Ok(())
    }

    fn read_choice(&mut self) -> Result<Option<Choice>> {
        loop {
            let Some(line) = self.prompt("\nEnter action number: ")? else {
                return Ok(None);
            };
            match Choice::parse(&line) {
                Some(choice) => return Ok(Some(choice)),
                None => writeln!(self.output, "Invalid choice. Try again.")?,
            }
        }
    }

    /// Print `text` and read one trimmed line; `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Optional year: Enter skips, anything non-numeric re-prompts.
    fn prompt_year(&mut self, text: &str) -> Result<Option<Option<i64>>> {
        loop {
            let Some(line) = self.prompt(text)? else {
                return Ok(None);
            };
            if line.is_empty() {
                return Ok(Some(None));
            }
            match line.parse::<i64>() {
                Ok(year) => return Ok(Some(Some(year))),
                Err(_) => writeln!(self.output, "Invalid year '{}'. Enter digits only.", line)?,
            }
        }
    }

    async fn keyword_search(&mut self) -> Result<Flow> {
        let keyword = loop {
            let Some(line) = self.prompt("Enter a search keyword: ")? else {
                return Ok(Flow::Quit);
            };
            if line.is_empty() {
                writeln!(self.output, "Keyword cannot be empty!")?;
                continue;
            }
            break line;
        };
        let page = self.catalog.config.search.keyword_limit;
        self.paginate(PagedSearch::Keyword(keyword), page).await
    }

    async fn criteria_search(&mut self) -> Result<Flow> {
        writeln!(self.output, "\nSearch by genre and year range:")?;
        let genres = self.catalog.metadata.list_genres().await;
        let years = self.catalog.metadata.year_range().await;
        display::render_filters(&mut self.output, &genres, years)?;

        let Some(genre) = self.prompt("Enter a genre (or press Enter to skip): ")? else {
            return Ok(Flow::Quit);
        };
        let Some(year_from) = self.prompt_year("Enter the start year (or press Enter to skip): ")?
        else {
            return Ok(Flow::Quit);
        };
        let Some(year_to) = self.prompt_year("Enter the end year (or press Enter to skip): ")?
        else {
            return Ok(Flow::Quit);
        };

        let criteria = SearchCriteria::new(Some(genre), year_from, year_to);
        if criteria.plan().is_none() {
            writeln!(self.output, "Give a genre, or both a start and an end year.")?;
        }
        let page = self.catalog.config.search.criteria_limit;
        self.paginate(PagedSearch::Criteria(criteria), page).await
    }

    async fn letter_search(&mut self) -> Result<Flow> {
        let letter = loop {
            let Some(line) = self.prompt("Enter the first letter of the title: ")? else {
                return Ok(Flow::Quit);
            };
            let mut chars = line.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_alphabetic() => break line,
                _ => writeln!(self.output, "Enter a single letter.")?,
            }
        };
        let page = self.catalog.config.search.letter_limit;
        self.paginate(PagedSearch::FirstLetter(letter), page).await
    }

    async fn show_stats(&mut self) -> Result<Flow> {
        let limit = self.catalog.config.search.stats_limit;
        let collected = stats::collect_stats(self.catalog, limit).await;
        stats::write_stats(&mut self.output, &collected, limit)?;
        match self.prompt("\nPress Enter to continue...")? {
            Some(_) => Ok(Flow::Continue),
            None => Ok(Flow::Quit),
        }
    }

    async fn paginate(&mut self, search: PagedSearch, page_size: i64) -> Result<Flow> {
        let mut offset = 0;
        loop {
            let films = self.fetch_page(&search, page_size, offset).await;
            display::render_films(&mut self.output, &films, offset)?;

            if page_size <= 0 || (films.len() as i64) < page_size {
                return Ok(Flow::Continue);
            }
            match self.prompt("\nShow more results? (y/n): ")? {
                None => return Ok(Flow::Quit),
                Some(answer) if is_yes(&answer) => offset += page_size,
                Some(_) => return Ok(Flow::Continue),
            }
        }
    }

    async fn fetch_page(&self, search: &PagedSearch, limit: i64, offset: i64) -> Vec<FilmRecord> {
        let finder = &self.catalog.finder;
        match search {
            PagedSearch::Keyword(keyword) => finder.find_by_keyword(keyword, limit, offset).await,
            PagedSearch::Criteria(criteria) => {
                finder.find_by_criteria(criteria, limit, offset).await
            }
            PagedSearch::FirstLetter(letter) => {
                finder.find_by_first_letter(letter, limit, offset).await
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "y" | "yes")
}
