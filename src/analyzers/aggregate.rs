use tracing::debug;

use crate::analyzers::types::{
    BirthYearStats, Breakdown, DemographicStats, Demographics, DurationStats,
    FractionalBreakdown, Outcome, StationPair, StationStats, TimeStats, ValueCount,
};
use crate::analyzers::utility::{mean, mode, value_counts};
use crate::model::Dataset;

/// Most common month, weekday and start hour.
#[tracing::instrument(skip_all, fields(trips = dataset.len()))]
pub fn time_stats(dataset: &Dataset) -> Outcome<TimeStats> {
    let trips = dataset.trips();
    let (Some(month), Some(weekday), Some(hour)) = (
        mode(trips.iter().map(|t| t.month())),
        mode(trips.iter().map(|t| t.weekday())),
        mode(trips.iter().map(|t| t.hour())),
    ) else {
        return Outcome::NoData;
    };
    Outcome::Ready(TimeStats {
        month,
        weekday,
        hour,
    })
}

/// Most common start station, end station and start/end combination.
#[tracing::instrument(skip_all, fields(trips = dataset.len()))]
pub fn station_stats(dataset: &Dataset) -> Outcome<StationStats> {
    let trips = dataset.trips();
    let (Some(start_station), Some(end_station), Some(trip)) = (
        mode(trips.iter().map(|t| t.start_station.clone())),
        mode(trips.iter().map(|t| t.end_station.clone())),
        mode(trips.iter().map(|t| StationPair {
            start: t.start_station.clone(),
            end: t.end_station.clone(),
        })),
    ) else {
        return Outcome::NoData;
    };
    Outcome::Ready(StationStats {
        start_station,
        end_station,
        trip,
    })
}

/// Total and mean trip duration.
#[tracing::instrument(skip_all, fields(trips = dataset.len()))]
pub fn trip_duration_stats(dataset: &Dataset) -> Outcome<DurationStats> {
    let durations: Vec<u64> = dataset.trips().iter().map(|t| t.trip_duration).collect();
    let Some(mean_seconds) = mean(&durations) else {
        return Outcome::NoData;
    };

    let total_seconds: u128 = durations.iter().map(|&d| u128::from(d)).sum();
    debug!(total_seconds, mean_seconds, "Durations summed");

    Outcome::Ready(DurationStats {
        trip_count: durations.len(),
        total_seconds,
        total: Breakdown::from_seconds(total_seconds),
        mean_seconds,
        mean: FractionalBreakdown::from_seconds(mean_seconds),
    })
}

/// Rider counts per user type. Trips without a user type are not counted.
#[tracing::instrument(skip_all, fields(trips = dataset.len()))]
pub fn user_type_counts(dataset: &Dataset) -> Outcome<Vec<ValueCount>> {
    let counts = value_counts(dataset.trips().iter().filter_map(|t| t.user_type.as_deref()));
    if counts.is_empty() {
        Outcome::NoData
    } else {
        Outcome::Ready(counts)
    }
}

/// Gender counts and birth year extremes, for datasets that publish them.
#[tracing::instrument(skip_all, fields(city = %dataset.city(), trips = dataset.len()))]
pub fn demographic_stats(dataset: &Dataset) -> Demographics {
    if !dataset.capabilities().demographics {
        debug!("Dataset has no demographic columns");
        return Demographics::Unsupported {
            city: dataset.city(),
        };
    }
    if dataset.is_empty() {
        return Demographics::Supported(Outcome::NoData);
    }

    let trips = dataset.trips();
    let genders = value_counts(trips.iter().filter_map(|t| t.gender.as_deref()));

    let years: Vec<i32> = trips.iter().filter_map(|t| t.birth_year).collect();
    let birth_years = match (years.iter().min(), years.iter().max(), mode(years.iter().copied())) {
        (Some(&earliest), Some(&most_recent), Some(most_common)) => Outcome::Ready(BirthYearStats {
            earliest,
            most_recent,
            most_common,
        }),
        _ => Outcome::NoData,
    };

    Demographics::Supported(Outcome::Ready(DemographicStats {
        genders,
        birth_years,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::Popular;
    use crate::error::ExploreError;
    use crate::model::{Capabilities, City, Trip};
    use chrono::{NaiveDate, Weekday};

    fn trip_at_hour(hour: u32) -> Trip {
        let start = NaiveDate::from_ymd_opt(2017, 3, 6)
            .unwrap()
            .and_hms_opt(hour, 15, 0)
            .unwrap();
        Trip::new(start, "A", "B", 60, "Subscriber")
    }

    fn trip_between(start: &str, end: &str) -> Trip {
        let at = NaiveDate::from_ymd_opt(2017, 3, 6)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        Trip::new(at, start, end, 60, "Subscriber")
    }

    fn with_duration(seconds: u64) -> Trip {
        let start = NaiveDate::from_ymd_opt(2017, 3, 6)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();
        Trip::new(start, "A", "B", seconds, "Subscriber")
    }

    fn chicago(trips: Vec<Trip>) -> Dataset {
        Dataset::new(City::Chicago, Capabilities { demographics: true }, trips)
    }

    fn empty() -> Dataset {
        chicago(vec![])
    }

    #[test]
    fn test_time_stats_most_common_hour() {
        let ds = chicago([5, 5, 7, 5, 9].into_iter().map(trip_at_hour).collect());

        let stats = time_stats(&ds);
        let stats = stats.ready().unwrap();

        assert_eq!(stats.hour, Popular { value: 5, count: 3 });
        assert_eq!(stats.month.value, 3);
        assert_eq!(stats.weekday.value, Weekday::Mon);
    }

    #[test]
    fn test_time_stats_empty() {
        assert!(time_stats(&empty()).is_no_data());
    }

    #[test]
    fn test_station_stats_pair() {
        let ds = chicago(vec![
            trip_between("A", "B"),
            trip_between("A", "B"),
            trip_between("C", "D"),
        ]);

        let stats = station_stats(&ds);
        let stats = stats.ready().unwrap();

        assert_eq!(stats.start_station.value, "A");
        assert_eq!(stats.end_station.value, "B");
        assert_eq!(stats.trip.value.start, "A");
        assert_eq!(stats.trip.value.end, "B");
        assert_eq!(stats.trip.count, 2);
    }

    #[test]
    fn test_station_stats_pair_tie_goes_to_first() {
        let ds = chicago(vec![
            trip_between("C", "D"),
            trip_between("A", "B"),
            trip_between("A", "B"),
            trip_between("C", "D"),
        ]);

        let stats = station_stats(&ds);
        let pair = &stats.ready().unwrap().trip.value;
        assert_eq!((pair.start.as_str(), pair.end.as_str()), ("C", "D"));
    }

    #[test]
    fn test_station_stats_empty() {
        assert!(station_stats(&empty()).is_no_data());
    }

    #[test]
    fn test_duration_total_breakdown() {
        let ds = chicago(vec![with_duration(3661), with_duration(59)]);

        let stats = trip_duration_stats(&ds);
        let stats = stats.ready().unwrap();

        assert_eq!(stats.total_seconds, 3720);
        assert_eq!(
            stats.total,
            Breakdown {
                hours: 1,
                minutes: 2,
                seconds: 0
            }
        );
        assert_eq!(stats.total.total_seconds(), Some(stats.total_seconds));
        assert_eq!(stats.mean_seconds, 1860.0);
        assert_eq!(stats.mean.hours, 0);
        assert_eq!(stats.mean.minutes, 31);
        assert_eq!(stats.mean.seconds, 0.0);
    }

    #[test]
    fn test_duration_mean_keeps_fractional_seconds() {
        let ds = chicago(vec![with_duration(100), with_duration(101)]);

        let stats = trip_duration_stats(&ds);
        let mean = stats.ready().unwrap().mean;

        assert_eq!(mean.minutes, 1);
        assert_eq!(mean.seconds, 40.5);
    }

    #[test]
    fn test_duration_total_does_not_overflow_u64() {
        let longest = u64::MAX / 2 + 1;
        let ds = chicago(vec![with_duration(longest), with_duration(longest)]);

        let stats = trip_duration_stats(&ds);
        let stats = stats.ready().unwrap();

        assert_eq!(stats.total_seconds, u128::from(u64::MAX) + 1);
        assert_eq!(stats.total.total_seconds(), Some(stats.total_seconds));
    }

    #[test]
    fn test_breakdown_total_seconds_is_checked() {
        let huge = Breakdown {
            hours: u128::MAX,
            minutes: 0,
            seconds: 0,
        };
        assert_eq!(huge.total_seconds(), None);
    }

    #[test]
    fn test_duration_empty() {
        assert!(trip_duration_stats(&empty()).is_no_data());
    }

    #[test]
    fn test_user_type_counts() {
        let ds = chicago(vec![
            trip_at_hour(1),
            trip_at_hour(2).with_user_type(Some("Customer".into())),
            trip_at_hour(3),
            trip_at_hour(4).with_user_type(None),
        ]);

        let counts = user_type_counts(&ds);
        let counts = counts.ready().unwrap();

        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].value, "Subscriber");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].value, "Customer");
        assert_eq!(counts[1].count, 1);
    }

    #[test]
    fn test_user_type_counts_empty() {
        assert!(user_type_counts(&empty()).is_no_data());
    }

    #[test]
    fn test_demographics_unsupported_for_washington() {
        let ds = Dataset::new(
            City::Washington,
            Capabilities::default(),
            vec![trip_at_hour(1)],
        );

        let result = demographic_stats(&ds);

        assert_eq!(
            result,
            Demographics::Unsupported {
                city: City::Washington
            }
        );
        assert!(matches!(
            result.require(),
            Err(ExploreError::UnsupportedForDataset {
                city: City::Washington
            })
        ));
    }

    #[test]
    fn test_demographics_computed() {
        let ds = chicago(vec![
            trip_at_hour(1).with_demographics(Some("Male".into()), Some(1980)),
            trip_at_hour(2).with_demographics(Some("Female".into()), Some(1992)),
            trip_at_hour(3).with_demographics(Some("Male".into()), Some(1992)),
            trip_at_hour(4).with_demographics(None, None),
        ]);

        let outcome = demographic_stats(&ds).require().unwrap();
        let stats = outcome.ready().unwrap();

        assert_eq!(stats.genders[0].value, "Male");
        assert_eq!(stats.genders[0].count, 2);
        assert_eq!(stats.genders[1].value, "Female");

        let years = stats.birth_years.ready().unwrap();
        assert_eq!(years.earliest, 1980);
        assert_eq!(years.most_recent, 1992);
        assert_eq!(years.most_common, Popular { value: 1992, count: 2 });
    }

    #[test]
    fn test_demographics_without_any_birth_year() {
        let ds = chicago(vec![trip_at_hour(1).with_demographics(Some("Male".into()), None)]);

        let outcome = demographic_stats(&ds).require().unwrap();

        assert!(outcome.ready().unwrap().birth_years.is_no_data());
    }

    #[test]
    fn test_demographics_empty_supported_dataset() {
        assert_eq!(
            demographic_stats(&empty()),
            Demographics::Supported(Outcome::NoData)
        );
    }
}
