//! Native logging bootstrap.
//!
//! Installs a `tracing-subscriber` fmt subscriber once per process. Later
//! calls are no-ops, and a subscriber installed by the host is left alone.

use crate::error::{Result, SwimlaneError};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "swimlane=info";

static INSTALLED_FILTER: OnceLock<String> = OnceLock::new();

/// Initializes logging with an `EnvFilter` directive string.
///
/// `None` reads `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
///
/// # Errors
/// - Returns `ConfigError` when the directive string does not parse.
pub fn init_logging(filter: Option<&str>) -> Result<()> {
    let directives = match filter {
        Some(filter) => filter.to_string(),
        None => std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| DEFAULT_FILTER.to_string()),
    };
    let env_filter = EnvFilter::try_new(&directives).map_err(|err| {
        SwimlaneError::ConfigError(format!("invalid log filter `{}`: {}", directives, err))
    })?;

    if INSTALLED_FILTER.get().is_some() {
        return Ok(());
    }

    // Another global subscriber may already be in place; keep it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init();
    let _ = INSTALLED_FILTER.set(directives);
    Ok(())
}

/// Filter directives installed by [`init_logging`], if it has run
pub fn installed_filter() -> Option<&'static str> {
    INSTALLED_FILTER.get().map(String::as_str)
}
