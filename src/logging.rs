// logging.rs
use anyhow::{Context, Result};
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` overrides `default_level`.
/// With a `log_file` every event goes there instead of stderr, which keeps the TUI clean.
pub fn init_logger(default_level: &str, log_file: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create log file {}", path))?;
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(false).with_ansi(false).with_writer(Mutex::new(file)))
                .with(filter)
                .try_init()?;
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .with(filter)
                .try_init()?;
        }
    }
    Ok(())
}
