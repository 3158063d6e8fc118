use chrono::Utc;
use tracing::info;

use crate::analyzers::aggregate::{
    demographic_stats, station_stats, time_stats, trip_duration_stats, user_type_counts,
};
use crate::analyzers::types::Report;
use crate::config::Config;
use crate::error::Result;
use crate::filter::Filter;
use crate::loader::load_city;
use crate::model::{City, Dataset};

/// Runs all five aggregators over an already filtered dataset.
#[tracing::instrument(skip(dataset), fields(city = %dataset.city(), trips = dataset.len()))]
pub fn build_report(dataset: &Dataset, filter: Filter) -> Report {
    let report = Report {
        city: dataset.city(),
        filter,
        trip_count: dataset.len(),
        generated_at: Utc::now(),
        time: time_stats(dataset),
        stations: station_stats(dataset),
        durations: trip_duration_stats(dataset),
        user_types: user_type_counts(dataset),
        demographics: demographic_stats(dataset),
    };
    info!(trip_count = report.trip_count, "Report built");
    report
}

/// Loads `city`, applies `filter` and summarises the result.
pub fn analyze(config: &Config, city: City, filter: Filter) -> Result<Report> {
    let dataset = load_city(config, city)?;
    let filtered = filter.apply(&dataset);
    Ok(build_report(&filtered, filter))
}
