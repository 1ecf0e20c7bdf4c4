//! Derived-metrics and alerting engine for aquaculture production records.
//!
//! Everything here works on explicit snapshots: callers pass in the batch state and the
//! previous observation, and get back the values to persist.

pub mod alerts;
pub mod analysis;
pub mod calibration;
pub mod dosing;
pub mod error;
pub mod geometry;
pub mod logger;
pub mod production;
pub mod series;

pub use error::AquaforgeError;
