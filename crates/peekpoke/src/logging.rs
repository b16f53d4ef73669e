//! Tracing setup for programs using the client.
//!
//! The library only emits events; a program that wants to see them calls
//! [`init`] or [`try_init`] once at startup. `RUST_LOG` overrides the default
//! filter.

use tracing_subscriber::filter::{EnvFilter, ParseError};
use tracing_subscriber::fmt;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::prelude::*;

/// Errors installing the subscriber.
#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
    /// The default filter directive didn't parse.
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    /// A global subscriber is already installed.
    #[error("failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Build the filter: `RUST_LOG` if set, otherwise `default_directives`
/// (e.g. `"peekpoke=debug"`).
pub fn env_filter(default_directives: &str) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(default_directives)?),
    }
}

/// Install a stdout subscriber, failing if one is already installed.
pub fn try_init(default_directives: &str) -> Result<(), LoggingError> {
    tracing_subscriber::registry()
        .with(env_filter(default_directives)?)
        .with(fmt::layer().with_target(true))
        .try_init()?;
    Ok(())
}

/// Install a stdout subscriber, ignoring failure (e.g. in tests that
/// initialize more than once).
pub fn init(default_directives: &str) {
    if let Err(e) = try_init(default_directives) {
        tracing::debug!("logging not initialized: {}", e);
    }
}
