//! Core data types: cities, trip records and datasets.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ExploreError;

/// One of the three cities with published trip data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum City {
    #[serde(rename = "chicago")]
    Chicago,
    #[serde(rename = "new york city")]
    NewYorkCity,
    #[serde(rename = "washington")]
    Washington,
}

impl City {
    pub const ALL: [City; 3] = [City::Chicago, City::NewYorkCity, City::Washington];

    /// The key users type to select this city.
    pub fn key(self) -> &'static str {
        match self {
            City::Chicago => "chicago",
            City::NewYorkCity => "new york city",
            City::Washington => "washington",
        }
    }

    /// Default CSV file name for this city's trips.
    pub fn default_file(self) -> &'static str {
        match self {
            City::Chicago => "chicago.csv",
            City::NewYorkCity => "new_york_city.csv",
            City::Washington => "washington.csv",
        }
    }

    /// Whether this city's published data carries gender and birth year columns.
    pub fn publishes_demographics(self) -> bool {
        !matches!(self, City::Washington)
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for City {
    type Err = ExploreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        City::ALL
            .into_iter()
            .find(|c| c.key() == key)
            .ok_or_else(|| ExploreError::InvalidCity(s.to_string()))
    }
}

/// Optional fields a dataset actually provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub demographics: bool,
}

/// A single ride, with calendar fields derived from its start time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub start_station: String,
    pub end_station: String,
    /// Whole seconds.
    pub trip_duration: u64,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,

    // derived from start_time, read through the getters
    month: u32,
    weekday: Weekday,
    hour: u32,
}

impl Trip {
    /// Builds a trip and derives month, weekday and hour from `start_time`.
    pub fn new(
        start_time: NaiveDateTime,
        start_station: impl Into<String>,
        end_station: impl Into<String>,
        trip_duration: u64,
        user_type: impl Into<String>,
    ) -> Self {
        Trip {
            start_time,
            end_time: None,
            start_station: start_station.into(),
            end_station: end_station.into(),
            trip_duration,
            user_type: Some(user_type.into()),
            gender: None,
            birth_year: None,
            month: start_time.month(),
            weekday: start_time.weekday(),
            hour: start_time.hour(),
        }
    }

    pub fn with_end_time(mut self, end_time: NaiveDateTime) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn with_user_type(mut self, user_type: Option<String>) -> Self {
        self.user_type = user_type;
        self
    }

    pub fn with_demographics(mut self, gender: Option<String>, birth_year: Option<i32>) -> Self {
        self.gender = gender;
        self.birth_year = birth_year;
        self
    }

    /// Calendar month, 1..=12.
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// Start hour, 0..=23.
    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Day of week as 0..=6 with Monday = 0.
    pub fn weekday_index(&self) -> u32 {
        self.weekday.num_days_from_monday()
    }
}

/// Ordered trips for one city plus the optional fields that city provides.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    city: City,
    capabilities: Capabilities,
    trips: Vec<Trip>,
}

impl Dataset {
    pub fn new(city: City, capabilities: Capabilities, trips: Vec<Trip>) -> Self {
        Dataset {
            city,
            capabilities,
            trips,
        }
    }

    pub fn city(&self) -> City {
        self.city
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// New dataset for the same city keeping only trips matching `keep`.
    pub(crate) fn retain_matching<F>(&self, keep: F) -> Dataset
    where
        F: Fn(&Trip) -> bool,
    {
        Dataset {
            city: self.city,
            capabilities: self.capabilities,
            trips: self.trips.iter().filter(|t| keep(t)).cloned().collect(),
        }
    }
}
