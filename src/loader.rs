//! CSV loader for city trip data.
//!
//! Reads a city's file into a [`Dataset`], parsing every start time up front
//! and deriving the calendar fields the filter and aggregators rely on.

use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ExploreError, Result};
use crate::model::{Capabilities, City, Dataset, Trip};

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Longest trip duration accepted, in seconds.
pub const MAX_TRIP_SECONDS: u64 = u32::MAX as u64;

/// A row as it appears in the source CSV. Unknown columns are ignored.
#[derive(Debug, Deserialize)]
struct RawTrip {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time", default)]
    end_time: Option<String>,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "Trip Duration")]
    trip_duration: String,
    #[serde(rename = "User Type", default)]
    user_type: Option<String>,
    #[serde(rename = "Gender", default)]
    gender: Option<String>,
    #[serde(rename = "Birth Year", default)]
    birth_year: Option<String>,
}

/// Loads the dataset for a user-supplied city key.
pub fn load(config: &Config, city: &str) -> Result<Dataset> {
    let city: City = city.parse()?;
    load_city(config, city)
}

/// Loads the dataset for `city` from the file the config maps it to.
#[tracing::instrument(skip(config), fields(city = %city))]
pub fn load_city(config: &Config, city: City) -> Result<Dataset> {
    let path = config.path_for(city);
    debug!(path = %path.display(), "Opening trip data");
    let file = File::open(&path).map_err(|source| ExploreError::Io {
        path: path.clone(),
        source,
    })?;

    let dataset = read_trips(city, file)?;
    info!(trips = dataset.len(), "Dataset loaded");
    Ok(dataset)
}

/// Parses trips for `city` from any CSV source.
///
/// # Errors
///
/// Fails on the first row whose start time, trip duration or birth year does
/// not parse; no partial dataset is returned.
pub fn read_trips<R: Read>(city: City, reader: R) -> Result<Dataset> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let has_column = |name: &str| headers.iter().any(|h| h == name);
    let capabilities = Capabilities {
        demographics: city.publishes_demographics()
            && has_column("Gender")
            && has_column("Birth Year"),
    };
    debug!(demographics = capabilities.demographics, "Detected capabilities");

    let mut trips = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let raw: RawTrip = record.deserialize(Some(&headers))?;
        trips.push(enrich(raw, line, capabilities)?);
    }

    Ok(Dataset::new(city, capabilities, trips))
}

fn enrich(raw: RawTrip, line: u64, capabilities: Capabilities) -> Result<Trip> {
    let start_time =
        parse_timestamp(&raw.start_time).ok_or_else(|| ExploreError::MalformedRecord {
            line,
            field: "Start Time",
            value: raw.start_time.clone(),
        })?;

    let trip_duration =
        parse_whole_number(&raw.trip_duration).ok_or_else(|| ExploreError::MalformedRecord {
            line,
            field: "Trip Duration",
            value: raw.trip_duration.clone(),
        })?;

    let mut trip = Trip::new(
        start_time,
        raw.start_station,
        raw.end_station,
        trip_duration,
        String::new(),
    )
    .with_user_type(raw.user_type);

    // End times are informational only; a bad one does not invalidate the row.
    if let Some(end_time) = raw.end_time.as_deref().and_then(parse_timestamp) {
        trip = trip.with_end_time(end_time);
    }

    if capabilities.demographics {
        let birth_year = match raw.birth_year {
            Some(value) => Some(parse_year(&value).ok_or(ExploreError::MalformedRecord {
                line,
                field: "Birth Year",
                value,
            })?),
            None => None,
        };
        trip = trip.with_demographics(raw.gender, birth_year);
    }

    Ok(trip)
}

/// Parses a naive `YYYY-MM-DD HH:MM:SS` timestamp, with optional fractional
/// seconds and an optional `T` separator.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Durations are sometimes exported as floats ("1226.0"); the fraction is dropped.
/// Values above [`MAX_TRIP_SECONDS`] are rejected rather than clamped.
fn parse_whole_number(value: &str) -> Option<u64> {
    let n: f64 = value.trim().parse().ok()?;
    let n = n.floor();
    (n.is_finite() && n >= 0.0 && n <= MAX_TRIP_SECONDS as f64).then(|| n as u64)
}

fn parse_year(value: &str) -> Option<i32> {
    let n: f64 = value.trim().parse().ok()?;
    (n.is_finite() && n.fract() == 0.0 && n.abs() < i32::MAX as f64).then_some(n as i32)
}
