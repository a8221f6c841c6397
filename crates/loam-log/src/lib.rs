//! Structured logging setup for the voxel core.
//!
//! Thin wrapper over the `tracing` ecosystem: console output with uptime
//! timestamps and module targets, filterable via `RUST_LOG` or the config
//! file's `debug.log_level`.

use loam_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when neither `RUST_LOG` nor config overrides it.
const DEFAULT_FILTER: &str = "info";

/// Initializes the global tracing subscriber.
///
/// Filter precedence: `RUST_LOG` env var, then `config.debug.log_level`,
/// then `info`. Calling twice is an error from the subscriber registry, so
/// binaries and test harnesses should call this exactly once.
pub fn init_logging(config: Option<&Config>) {
    let filter_str = config
        .map(|c| c.debug.log_level.as_str())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_succeeds_once() {
        // A second init would panic in the registry; one call must be fine.
        init_logging(None);
        tracing::debug!("logger initialized");
    }
}
