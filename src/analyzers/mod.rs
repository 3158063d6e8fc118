//! Trip statistics.
//!
//! Five independent aggregators (travel times, stations, trip durations, user
//! types, demographics) plus [`analyzer::build_report`], which bundles their
//! results into a single serializable [`types::Report`].

pub mod aggregate;
pub mod analyzer;
pub mod types;
pub mod utility;
