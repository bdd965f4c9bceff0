//! File export of run telemetry.

pub mod export;
