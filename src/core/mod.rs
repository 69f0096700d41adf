//! Core module: data models, the normalization pipeline, the constraint
//! model builder, and the solver seam

pub mod calendar;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod loader;
pub mod model;
pub mod models;
pub mod normalize;
pub mod outputs;
pub mod pipeline;
pub mod rooms;
pub mod solve;
pub mod workload;

pub use error::Error;

/// Returns the current version of the `timetabler` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
