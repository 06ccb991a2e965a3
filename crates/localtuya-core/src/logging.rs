//! Logging setup for hosts embedding the integration.

use tracing_subscriber::EnvFilter;

/// Environment variable switching output to JSON lines.
pub const LOG_JSON_ENV: &str = "LOCALTUYA_LOG_JSON";

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "localtuya_core=info,localtuya_lock=info";

/// Install the global tracing subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_logging() -> bool {
    let json_logging = std::env::var(LOG_JSON_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER).add_directive(tracing::Level::WARN.into()));

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok()
    }
}
