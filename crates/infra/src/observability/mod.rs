//! Tracing subscriber setup
//!
//! Development builds log compact human-readable lines at `debug`;
//! production builds log JSON at `info`. `RUST_LOG` always wins when set.

use chatwire_domain::{ChatwireError, EnvironmentConfig};
use tracing_subscriber::EnvFilter;

/// Default filter directive for the given environment.
pub fn default_directive(config: &EnvironmentConfig) -> &'static str {
    if config.production {
        "info"
    } else {
        "debug"
    }
}

/// Build the filter from `RUST_LOG`, falling back to the environment default.
///
/// # Errors
/// Returns `ChatwireError::Config` if `RUST_LOG` is not a valid directive.
pub fn env_filter(config: &EnvironmentConfig) -> Result<EnvFilter, ChatwireError> {
    match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .map_err(|e| ChatwireError::Config(format!("invalid RUST_LOG: {e}"))),
        _ => Ok(EnvFilter::new(default_directive(config))),
    }
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed (for example
/// by a test harness); the existing one is left in place.
///
/// # Errors
/// Returns `ChatwireError::Config` if `RUST_LOG` cannot be parsed.
pub fn init_tracing(config: &EnvironmentConfig) -> Result<bool, ChatwireError> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = if config.production {
        builder.json().try_init().is_ok()
    } else {
        builder.compact().try_init().is_ok()
    };

    if installed {
        tracing::debug!(environment = config.environment_name(), "tracing initialised");
    }
    Ok(installed)
}
