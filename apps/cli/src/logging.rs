//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr so stdout carries only the JSON verdict. The filter
//! comes from `VIGIL_LOG`, then `RUST_LOG`, then the configured level.

use std::io;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::LogFormatArg;
use crate::config::LogSettings;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "VIGIL_LOG";

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error when the filter directive is invalid or a subscriber is
/// already installed.
pub fn init(settings: &LogSettings) -> anyhow::Result<()> {
    let filter = build_env_filter(&settings.level)?;
    let registry = tracing_subscriber::registry().with(filter);

    match settings.format {
        LogFormatArg::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init()?,
        LogFormatArg::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .without_time()
                    .with_target(false)
                    .with_writer(io::stderr),
            )
            .try_init()?,
        LogFormatArg::Pretty => registry
            .with(fmt::layer().pretty().with_writer(io::stderr))
            .try_init()?,
    }
    Ok(())
}

fn build_env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    Ok(EnvFilter::try_new(level)?)
}
