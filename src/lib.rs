//! Explore US bikeshare trip data: load a city's trips, filter them by month
//! and weekday, and summarise travel times, stations, durations and riders.

pub mod analyzers;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod output;
pub mod session;

pub use error::{ExploreError, Result};
