use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Environment, LogLevel};

/// Initialize structured logging for the application.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies.
/// Dev gets compact human-readable lines, other environments get JSON.
///
/// This must be called once at startup (in main.rs).
pub fn init_logging(level: LogLevel, environment: Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    let builder = fmt().with_env_filter(filter).with_target(false);

    match environment {
        Environment::Dev => builder.compact().init(),
        Environment::Staging | Environment::Prod => builder.json().init(),
    }

    info!(?environment, "Logging initialized");
}
