//! Log subscriber construction
//!
//! The subscriber is built explicitly from the requested level and handed
//! to whoever installs it: `main` makes it the global default, tests wrap
//! a capturing writer around it.

use crate::cli::LogLevel;
use anyhow::{Context, Result};
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Filter for `level`. Non-empty `directives` (RUST_LOG syntax) win.
pub fn env_filter(level: LogLevel, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from(level).into())
        .parse_lossy(directives.unwrap_or_default())
}

/// A text subscriber writing to `writer`
pub fn subscriber<W>(filter: EnvFilter, ansi: bool, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer)
        .finish()
}

/// Install the stdout subscriber as the process default
pub fn init(level: LogLevel) -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = env_filter(level, directives.as_deref());
    let ansi = std::io::stdout().is_terminal();

    tracing::subscriber::set_global_default(subscriber(filter, ansi, std::io::stdout))
        .context("Failed to install log subscriber")
}
