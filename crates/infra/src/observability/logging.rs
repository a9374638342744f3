//! Tracing subscriber initialisation.

use slotline_domain::{LoggingConfig, Result, SchedulingError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the level filter: `RUST_LOG` wins over the configured level.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| {
        SchedulingError::Config(format!("invalid log level {:?}: {e}", config.level))
    })
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed, which keeps
/// repeated calls from tests and embedders harmless.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let filter = env_filter(config)?;
    let fmt_layer = fmt::layer().with_target(true);

    let installed = if config.json {
        tracing_subscriber::registry().with(filter).with(fmt_layer.json()).try_init().is_ok()
    } else {
        tracing_subscriber::registry().with(filter).with(fmt_layer).try_init().is_ok()
    };

    if installed {
        tracing::debug!(level = %config.level, json = config.json, "tracing initialised");
    }
    Ok(installed)
}
