/*!
 * Logging setup.
 *
 * Two tracing layers share one filter: a colored stdout layer for the
 * terminal and a plain appending layer writing to the configured log file,
 * so request traces survive restarts.
 */

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use tracing_subscriber::fmt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub fn init_logging(
    log_level: &str,
    log_file: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file.as_ref())?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(true)
        .with_writer(io::stdout);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_writer(log_file);

    Registry::default()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}
