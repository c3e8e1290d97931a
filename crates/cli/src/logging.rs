use anyhow::{anyhow, Result};
use replique_core::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Logs go to stderr; stdout carries command output only.
/// `RUST_LOG`, when set, wins over the configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|error| anyhow!("failed to install tracing subscriber: {error}"))
}

/// Quiet default for when the configuration itself failed to load.
pub fn fallback() -> LoggingConfig {
    LoggingConfig { level: "warn".to_string(), format: LogFormat::Compact }
}
