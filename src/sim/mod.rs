/// Tick clock with optional wall-clock pacing.
pub mod clock;
pub mod controller;
pub mod energy;
pub mod engine;
pub mod kpi;
/// Two-node building thermal model.
pub mod thermal;
pub mod types;
/// Outdoor weather and occupancy profiles.
pub mod weather;
