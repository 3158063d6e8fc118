//! Month and weekday filtering.

use chrono::Weekday;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{ExploreError, Result};
use crate::model::Dataset;

/// Months with published data, in calendar order.
pub const MONTHS: [&str; 6] = ["january", "february", "march", "april", "may", "june"];

/// Weekdays in Monday-first order.
pub const DAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

const ALL: &str = "all";

/// A month with published data. Only January (1) through June (6) can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SelectableMonth(u32);

impl SelectableMonth {
    pub fn new(number: u32) -> Result<Self> {
        if (1..=MONTHS.len() as u32).contains(&number) {
            Ok(SelectableMonth(number))
        } else {
            Err(ExploreError::InvalidFilter {
                axis: "month",
                value: number.to_string(),
            })
        }
    }

    /// Calendar month number, 1..=6.
    pub fn number(self) -> u32 {
        self.0
    }

    pub fn name(self) -> &'static str {
        MONTHS[self.0 as usize - 1]
    }
}

/// Month selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthFilter {
    #[default]
    All,
    Month(SelectableMonth),
}

impl FromStr for MonthFilter {
    type Err = ExploreError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_lowercase();
        if value == ALL {
            return Ok(MonthFilter::All);
        }
        MONTHS
            .iter()
            .position(|m| *m == value)
            .map(|i| MonthFilter::Month(SelectableMonth(i as u32 + 1)))
            .ok_or_else(|| ExploreError::InvalidFilter {
                axis: "month",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str(ALL),
            MonthFilter::Month(m) => f.write_str(m.name()),
        }
    }
}

/// Day-of-week selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayFilter {
    #[default]
    All,
    Day(Weekday),
}

impl FromStr for DayFilter {
    type Err = ExploreError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_lowercase();
        if value == ALL {
            return Ok(DayFilter::All);
        }
        // chrono's own parser also accepts abbreviations, which are not allowed here
        DAYS.iter()
            .position(|d| *d == value)
            .and_then(|i| Weekday::try_from(i as u8).ok())
            .map(DayFilter::Day)
            .ok_or_else(|| ExploreError::InvalidFilter {
                axis: "day",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => f.write_str(ALL),
            DayFilter::Day(d) => f.write_str(DAYS[d.num_days_from_monday() as usize]),
        }
    }
}

/// A validated (month, day) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Filter {
    pub month: MonthFilter,
    pub day: DayFilter,
}

impl Filter {
    pub fn parse(month: &str, day: &str) -> Result<Self> {
        Ok(Filter {
            month: month.parse()?,
            day: day.parse()?,
        })
    }

    pub fn is_identity(&self) -> bool {
        self.month == MonthFilter::All && self.day == DayFilter::All
    }

    /// Returns a new dataset holding only the matching trips, in source order.
    #[tracing::instrument(
        skip(self, dataset),
        fields(city = %dataset.city(), month = %self.month, day = %self.day)
    )]
    pub fn apply(&self, dataset: &Dataset) -> Dataset {
        if self.is_identity() {
            debug!(rows = dataset.len(), "Filter is all/all, keeping every row");
            return dataset.clone();
        }
        let filtered = dataset.retain_matching(|trip| {
            let month_ok = match self.month {
                MonthFilter::All => true,
                MonthFilter::Month(m) => trip.month() == m.number(),
            };
            let day_ok = match self.day {
                DayFilter::All => true,
                DayFilter::Day(d) => trip.weekday() == d,
            };
            month_ok && day_ok
        });
        debug!(
            before = dataset.len(),
            after = filtered.len(),
            "Filter applied"
        );
        filtered
    }
}

/// Validates both selectors and filters `dataset`.
pub fn apply(dataset: &Dataset, month: &str, day: &str) -> Result<Dataset> {
    Ok(Filter::parse(month, day)?.apply(dataset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Capabilities, City, Trip};
    use chrono::NaiveDate;

    fn trip(month: u32, day: u32, station: &str) -> Trip {
        let start = NaiveDate::from_ymd_opt(2017, month, day)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        Trip::new(start, station, "X", 100, "Subscriber")
    }

    fn sample() -> Dataset {
        // 2017-01-02 Mon, 2017-01-03 Tue, 2017-02-06 Mon, 2017-03-07 Tue
        Dataset::new(
            City::Chicago,
            Capabilities { demographics: true },
            vec![
                trip(1, 2, "a"),
                trip(1, 3, "b"),
                trip(2, 6, "c"),
                trip(3, 7, "d"),
            ],
        )
    }

    fn stations(ds: &Dataset) -> Vec<&str> {
        ds.trips().iter().map(|t| t.start_station.as_str()).collect()
    }

    #[test]
    fn test_all_all_is_identity() {
        let ds = sample();
        let filtered = apply(&ds, "all", "all").unwrap();
        assert_eq!(filtered, ds);
    }

    #[test]
    fn test_month_only() {
        let filtered = apply(&sample(), "january", "all").unwrap();
        assert_eq!(stations(&filtered), vec!["a", "b"]);
    }

    #[test]
    fn test_day_only() {
        let filtered = apply(&sample(), "all", "monday").unwrap();
        assert_eq!(stations(&filtered), vec!["a", "c"]);
    }

    #[test]
    fn test_month_and_day() {
        let filtered = apply(&sample(), "January", " Tuesday ").unwrap();
        assert_eq!(stations(&filtered), vec!["b"]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let filtered = apply(&sample(), "june", "sunday").unwrap();
        assert!(filtered.is_empty());
        assert_eq!(filtered.city(), City::Chicago);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let ds = sample();
        let once = apply(&ds, "all", "tuesday").unwrap();
        let twice = apply(&once, "all", "tuesday").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_source_is_untouched() {
        let ds = sample();
        let _ = apply(&ds, "march", "all").unwrap();
        assert_eq!(ds.len(), 4);
    }

    #[test]
    fn test_july_is_rejected() {
        let err = apply(&sample(), "july", "all").unwrap_err();
        assert!(matches!(
            err,
            ExploreError::InvalidFilter { axis: "month", ref value } if value == "july"
        ));
    }

    #[test]
    fn test_abbreviated_day_is_rejected() {
        let err = "mon".parse::<DayFilter>().unwrap_err();
        assert!(matches!(err, ExploreError::InvalidFilter { axis: "day", .. }));
    }

    #[test]
    fn test_display_round_trips_vocabulary() {
        for name in MONTHS {
            assert_eq!(name.parse::<MonthFilter>().unwrap().to_string(), name);
        }
        for name in DAYS {
            assert_eq!(name.parse::<DayFilter>().unwrap().to_string(), name);
        }
        assert!(Filter::default().is_identity());
    }

    #[test]
    fn test_month_outside_january_to_june_cannot_be_built() {
        for number in [0, 7, 12, u32::MAX] {
            let err = SelectableMonth::new(number).unwrap_err();
            assert!(matches!(err, ExploreError::InvalidFilter { axis: "month", .. }));
        }
    }

    #[test]
    fn test_selectable_month_display_and_filtering() {
        for (i, name) in MONTHS.iter().enumerate() {
            let month = SelectableMonth::new(i as u32 + 1).unwrap();
            assert_eq!(month.name(), *name);
            assert_eq!(MonthFilter::Month(month).to_string(), *name);
        }

        let filter = Filter {
            month: MonthFilter::Month(SelectableMonth::new(2).unwrap()),
            day: DayFilter::All,
        };
        assert!(!filter.is_identity());
        assert_eq!(stations(&filter.apply(&sample())), vec!["c"]);
    }

    #[test]
    fn test_month_serializes_as_number() {
        let filter = Filter::parse("march", "all").unwrap();
        let json = serde_json::to_value(filter).unwrap();
        assert_eq!(json["month"]["month"], 3);
        assert_eq!(json["day"], "all");
    }
}
