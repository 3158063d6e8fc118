//! Interactive exploration loop: pick a city and filters, page through raw
//! rows, print the statistics, optionally start over.

use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

use crate::analyzers::analyzer::build_report;
use crate::config::Config;
use crate::error::ExploreError;
use crate::filter::{DayFilter, Filter, MonthFilter};
use crate::loader::load_city;
use crate::model::{City, Dataset};
use crate::output::{render_report, write_rows};

/// Rows shown per page of raw data.
pub const PAGE_SIZE: usize = 5;

pub struct Session<'a, R, W> {
    config: &'a Config,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(config: &'a Config, input: R, output: W) -> Self {
        Session {
            config,
            input,
            output,
        }
    }

    /// Runs rounds until the user declines to restart or input ends.
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "Hello! Let's explore some US bikeshare data!")?;

        let mut round = 0;
        loop {
            round += 1;
            debug!(round, "Starting session round");
            if !self.round()? {
                break;
            }
            if !self.confirm("\nWould you like to restart? Enter yes or no.")? {
                break;
            }
        }

        info!(rounds = round, "Session finished");
        Ok(())
    }

    /// One pass through prompts, loading and reporting. Returns `false` once
    /// input is exhausted.
    fn round(&mut self) -> Result<bool> {
        let Some(city) = self.prompt_until(
            "Please enter the city to analyze (chicago, new york city, washington):",
            "Please enter a valid city:",
            |s| s.parse::<City>(),
        )?
        else {
            return Ok(false);
        };
        let Some(month) = self.prompt_until(
            "Please enter the month to analyze (all, january, february, ... , june):",
            "Please enter a valid month or all:",
            |s| s.parse::<MonthFilter>(),
        )?
        else {
            return Ok(false);
        };
        let Some(day) = self.prompt_until(
            "Please enter the day to analyze (all, monday, tuesday, ... sunday):",
            "Please enter a valid day or all:",
            |s| s.parse::<DayFilter>(),
        )?
        else {
            return Ok(false);
        };
        writeln!(self.output, "{}", "-".repeat(40))?;

        let filter = Filter { month, day };
        let dataset = match load_city(self.config, city) {
            Ok(dataset) => dataset,
            Err(e) => {
                warn!(error = %e, city = %city, "Failed to load dataset");
                writeln!(self.output, "Could not load data for {city}: {e}")?;
                return Ok(true);
            }
        };
        let filtered = filter.apply(&dataset);

        if !self.page_rows(&filtered)? {
            return Ok(false);
        }

        let report = build_report(&filtered, filter);
        render_report(&report, &mut self.output)?;
        Ok(true)
    }

    /// Shows raw rows five at a time for as long as the user answers "yes".
    fn page_rows(&mut self, dataset: &Dataset) -> Result<bool> {
        let mut question = "\nWould you like to display the first 5 rows of data? (yes/no)";
        for (page, rows) in dataset.trips().chunks(PAGE_SIZE).enumerate() {
            match self.answer(question)? {
                Some(true) => write_rows(rows, &mut self.output, page == 0)?,
                Some(false) => return Ok(true),
                None => return Ok(false),
            }
            question = "\nWould you like to display the next 5 rows of data? (yes/no)";
        }
        if dataset.is_empty() {
            writeln!(self.output, "\nNo rows match the selected filters.")?;
        } else {
            writeln!(self.output, "\nNo more rows to display.")?;
        }
        Ok(true)
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_until<T>(
        &mut self,
        prompt: &str,
        retry: &str,
        parse: impl Fn(&str) -> Result<T, ExploreError>,
    ) -> Result<Option<T>> {
        writeln!(self.output, "{prompt}")?;
        loop {
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match parse(&line) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => {
                    debug!(error = %e, "Rejected input");
                    writeln!(self.output, "{retry}")?;
                }
            }
        }
    }

    /// `Some(true)` for "yes", `Some(false)` for anything else, `None` at end of input.
    fn answer(&mut self, question: &str) -> Result<Option<bool>> {
        writeln!(self.output, "{question}")?;
        self.output.flush()?;
        Ok(self
            .read_line()?
            .map(|line| line.eq_ignore_ascii_case("yes")))
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(self.answer(question)?.unwrap_or(false))
    }
}
