//! Result records produced by the aggregators.

use chrono::{DateTime, Utc, Weekday};
use serde::Serialize;

use crate::error::ExploreError;
use crate::filter::Filter;
use crate::model::City;

/// A statistic that may have nothing to summarise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ready(T),
    /// The input had no rows (or no non-missing values) to work with.
    NoData,
}

impl<T> Outcome<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Outcome::Ready(v) => Some(v),
            Outcome::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Outcome::NoData)
    }
}

/// Most frequent value and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popular<T> {
    pub value: T,
    pub count: usize,
}

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeStats {
    /// Calendar month, 1..=12.
    pub month: Popular<u32>,
    pub weekday: Popular<Weekday>,
    /// Start hour, 0..=23.
    pub hour: Popular<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StationPair {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationStats {
    pub start_station: Popular<String>,
    pub end_station: Popular<String>,
    pub trip: Popular<StationPair>,
}

/// Whole-second duration split into hours, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub hours: u128,
    pub minutes: u64,
    pub seconds: u64,
}

impl Breakdown {
    pub fn from_seconds(total: u128) -> Self {
        Breakdown {
            hours: total / 3600,
            minutes: ((total % 3600) / 60) as u64,
            seconds: (total % 60) as u64,
        }
    }

    /// Recombines the parts, or `None` if that overflows.
    pub fn total_seconds(&self) -> Option<u128> {
        self.hours
            .checked_mul(3600)?
            .checked_add(u128::from(self.minutes).checked_mul(60)?)?
            .checked_add(u128::from(self.seconds))
    }
}

/// Breakdown of a fractional duration: hours and minutes are floored, the
/// seconds keep whatever fraction remains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FractionalBreakdown {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: f64,
}

impl FractionalBreakdown {
    pub fn from_seconds(total: f64) -> Self {
        let within_hour = total % 3600.0;
        FractionalBreakdown {
            hours: (total / 3600.0).floor() as u64,
            minutes: (within_hour / 60.0).floor() as u64,
            seconds: within_hour % 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub trip_count: usize,
    /// Summed in `u128` so no realistic dataset can overflow it.
    pub total_seconds: u128,
    pub total: Breakdown,
    pub mean_seconds: f64,
    pub mean: FractionalBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthYearStats {
    pub earliest: i32,
    pub most_recent: i32,
    pub most_common: Popular<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemographicStats {
    pub genders: Vec<ValueCount>,
    pub birth_years: Outcome<BirthYearStats>,
}

/// Demographic results, or the reason they cannot exist for this dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "support", rename_all = "snake_case")]
pub enum Demographics {
    Unsupported { city: City },
    Supported(Outcome<DemographicStats>),
}

impl Demographics {
    /// Converts an unsupported outcome into [`ExploreError::UnsupportedForDataset`].
    pub fn require(self) -> Result<Outcome<DemographicStats>, ExploreError> {
        match self {
            Demographics::Unsupported { city } => Err(ExploreError::UnsupportedForDataset { city }),
            Demographics::Supported(outcome) => Ok(outcome),
        }
    }
}

/// All five statistic categories for one filtered dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub city: City,
    pub filter: Filter,
    pub trip_count: usize,
    pub generated_at: DateTime<Utc>,
    pub time: Outcome<TimeStats>,
    pub stations: Outcome<StationStats>,
    pub durations: Outcome<DurationStats>,
    pub user_types: Outcome<Vec<ValueCount>>,
    pub demographics: Demographics,
}
