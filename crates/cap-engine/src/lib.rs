//! Salary-cap compliance and discount allocation engine.

pub mod cap;
pub mod config;
pub mod error;
pub mod telemetry;
