//! Building zone HVAC control-loop and thermal simulator.
//!
//! A fixed-interval loop samples sensors, runs one controller per channel
//! (temperature and humidity), and advances a two-node RC thermal model under
//! weather and occupancy disturbances.

/// REST API over a completed run.
#[cfg(feature = "api")]
pub mod api;
pub mod cli;
/// TOML scenario configuration and presets.
pub mod config;
pub mod error;
pub mod io;
pub mod reporting;
pub mod runner;
pub mod sensors;
/// Control loop, controllers, thermal model and environment.
pub mod sim;
pub mod telemetry;
