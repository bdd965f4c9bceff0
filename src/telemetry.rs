//! Diagnostic logging setup.
//!
//! Per-tick records go to stdout and CSV; tracing events go to stderr so the
//! two never interleave.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "HVAC_SIM_LOG";

/// Filter applied when `HVAC_SIM_LOG` is unset or invalid.
fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("hvac_sim=debug")
    } else {
        EnvFilter::new("hvac_sim=info")
    }
}

/// Installs a stderr `fmt` subscriber filtered by `HVAC_SIM_LOG`.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default_filter(verbose));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
