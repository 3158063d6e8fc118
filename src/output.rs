//! Output formatting for reports and raw trip rows.
//!
//! Supports a human-readable text report, JSON serialization, and CSV rows.

use anyhow::Result;
use chrono::Month;
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;
use tracing::debug;

use crate::analyzers::types::{
    Demographics, DurationStats, Outcome, Report, StationStats, TimeStats, ValueCount,
};
use crate::filter::DAYS;
use crate::model::Trip;

const RULE: &str = "----------------------------------------";
const NO_DATA: &str = "No data for the selected filters.";

/// A trip as written back out, using the source column names plus the derived fields.
#[derive(Serialize)]
struct TripRow<'a> {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time")]
    end_time: Option<String>,
    #[serde(rename = "Trip Duration")]
    trip_duration: u64,
    #[serde(rename = "Start Station")]
    start_station: &'a str,
    #[serde(rename = "End Station")]
    end_station: &'a str,
    #[serde(rename = "User Type")]
    user_type: Option<&'a str>,
    #[serde(rename = "Gender")]
    gender: Option<&'a str>,
    #[serde(rename = "Birth Year")]
    birth_year: Option<i32>,
    month: u32,
    day_of_week: u32,
    hour: u32,
}

impl<'a> From<&'a Trip> for TripRow<'a> {
    fn from(t: &'a Trip) -> Self {
        const FORMAT: &str = "%Y-%m-%d %H:%M:%S";
        TripRow {
            start_time: t.start_time.format(FORMAT).to_string(),
            end_time: t.end_time.map(|e| e.format(FORMAT).to_string()),
            trip_duration: t.trip_duration,
            start_station: &t.start_station,
            end_station: &t.end_station,
            user_type: t.user_type.as_deref(),
            gender: t.gender.as_deref(),
            birth_year: t.birth_year,
            month: t.month(),
            day_of_week: t.weekday_index(),
            hour: t.hour(),
        }
    }
}

/// Writes trips as CSV rows, optionally preceded by a header line.
pub fn write_rows<W: Write>(trips: &[Trip], writer: W, with_header: bool) -> Result<()> {
    debug!(rows = trips.len(), with_header, "Writing CSV rows");
    let mut writer = WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(writer);

    for trip in trips {
        writer.serialize(TripRow::from(trip))?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes the report as pretty-printed JSON.
pub fn print_json<W: Write>(report: &Report, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    Ok(())
}

fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_else(|| month.to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn write_counts<W: Write>(w: &mut W, counts: &[ValueCount]) -> Result<()> {
    for c in counts {
        writeln!(w, "  {:<12} {}", c.value, c.count)?;
    }
    Ok(())
}

fn write_time<W: Write>(w: &mut W, time: &Outcome<TimeStats>) -> Result<()> {
    writeln!(w, "\nThe Most Frequent Times of Travel\n")?;
    match time {
        Outcome::Ready(t) => {
            writeln!(
                w,
                "Most common month: {} ({} trips)",
                month_name(t.month.value),
                t.month.count
            )?;
            let day = DAYS[t.weekday.value.num_days_from_monday() as usize];
            writeln!(
                w,
                "Most common day of week: {} ({} trips)",
                capitalize(day),
                t.weekday.count
            )?;
            writeln!(w, "Most common start hour: {} ({} trips)", t.hour.value, t.hour.count)?;
        }
        Outcome::NoData => writeln!(w, "{NO_DATA}")?,
    }
    Ok(())
}

fn write_stations<W: Write>(w: &mut W, stations: &Outcome<StationStats>) -> Result<()> {
    writeln!(w, "\nThe Most Popular Stations and Trip\n")?;
    match stations {
        Outcome::Ready(s) => {
            writeln!(
                w,
                "Most commonly used start station: {} ({} trips)",
                s.start_station.value, s.start_station.count
            )?;
            writeln!(
                w,
                "Most commonly used end station: {} ({} trips)",
                s.end_station.value, s.end_station.count
            )?;
            writeln!(
                w,
                "Most frequent combination of start and end station: {} -> {} ({} trips)",
                s.trip.value.start, s.trip.value.end, s.trip.count
            )?;
        }
        Outcome::NoData => writeln!(w, "{NO_DATA}")?,
    }
    Ok(())
}

fn write_durations<W: Write>(w: &mut W, durations: &Outcome<DurationStats>) -> Result<()> {
    writeln!(w, "\nTrip Duration\n")?;
    match durations {
        Outcome::Ready(d) => {
            writeln!(
                w,
                "The total travel time is: {} hours, {} minutes, {} seconds.",
                d.total.hours, d.total.minutes, d.total.seconds
            )?;
            writeln!(
                w,
                "The mean travel time is: {} hours, {} minutes, {} seconds.",
                d.mean.hours, d.mean.minutes, d.mean.seconds
            )?;
        }
        Outcome::NoData => writeln!(w, "{NO_DATA}")?,
    }
    Ok(())
}

fn write_users<W: Write>(w: &mut W, report: &Report) -> Result<()> {
    writeln!(w, "\nUser Stats\n")?;
    match &report.user_types {
        Outcome::Ready(counts) => {
            writeln!(w, "Counts of user types:")?;
            write_counts(w, counts)?;
        }
        Outcome::NoData => writeln!(w, "No user type data for the selected filters.")?,
    }

    match &report.demographics {
        Demographics::Unsupported { city } => {
            writeln!(w, "Gender and birth year data are not available for {city}.")?;
        }
        Demographics::Supported(Outcome::NoData) => writeln!(w, "{NO_DATA}")?,
        Demographics::Supported(Outcome::Ready(d)) => {
            writeln!(w, "Counts of gender:")?;
            if d.genders.is_empty() {
                writeln!(w, "  (no gender recorded)")?;
            }
            write_counts(w, &d.genders)?;
            match &d.birth_years {
                Outcome::Ready(y) => {
                    writeln!(w, "The earliest year of birth is: {}", y.earliest)?;
                    writeln!(w, "The most recent year of birth is: {}", y.most_recent)?;
                    writeln!(w, "The most common year of birth is: {}", y.most_common.value)?;
                }
                Outcome::NoData => writeln!(w, "No birth year recorded for the selected filters.")?,
            }
        }
    }
    Ok(())
}

/// Renders all five statistic categories as text.
pub fn render_report<W: Write>(report: &Report, mut writer: W) -> Result<()> {
    let w = &mut writer;
    writeln!(
        w,
        "{RULE}\n{} trips in {} (month: {}, day: {})",
        report.trip_count, report.city, report.filter.month, report.filter.day
    )?;
    write_time(w, &report.time)?;
    writeln!(w, "{RULE}")?;
    write_stations(w, &report.stations)?;
    writeln!(w, "{RULE}")?;
    write_durations(w, &report.durations)?;
    writeln!(w, "{RULE}")?;
    write_users(w, report)?;
    writeln!(w, "{RULE}")?;
    Ok(())
}
