//! Tracing setup for hosts embedding the engine.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "STOREFRONT_LOG";

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

/// Initialize tracing with the `STOREFRONT_LOG` environment variable.
///
/// Defaults to "info" level if `STOREFRONT_LOG` is not set. Does nothing if a
/// global subscriber is already installed.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();
}

/// Same as [`init_tracing`] with JSON-formatted output.
pub fn init_json_tracing() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().json())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tolerates_installed_subscriber() {
        init_json_tracing();
        init_tracing();
        init_json_tracing();

        tracing::info!(target: "storefront_orders", "tracing installed");
        assert!(tracing::dispatcher::has_been_set());
    }
}
