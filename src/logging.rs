//! Tracing subscriber installation for binaries built on this crate.
//!
//! Library code only emits `tracing` events; nothing is printed unless a
//! binary calls [`init_logging`].

use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;

pub const DEFAULT_FILTER: &str = "info";
pub const DEBUG_FILTER: &str = "debug";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{directive}': {source}")]
    Filter {
        directive: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("failed to open log file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Filter directive for the given configuration.
///
/// An explicit `CHAT_NOTEBOOK_LOG` wins; otherwise debug output is enabled by
/// `CHAT_NOTEBOOK_DEBUG=1` or the `verbose` switch.
#[must_use]
pub fn log_filter(config: &EnvConfig, verbose: bool) -> String {
    if let Some(directive) = &config.log_filter {
        return directive.clone();
    }

    if config.debug || verbose {
        DEBUG_FILTER.to_string()
    } else {
        DEFAULT_FILTER.to_string()
    }
}

/// Installs the global `fmt` subscriber, writing to stderr or to `CHAT_NOTEBOOK_LOG_FILE`.
pub fn init_logging(config: &EnvConfig, verbose: bool) -> Result<(), LoggingError> {
    let directive = log_filter(config, verbose);
    let filter = EnvFilter::try_new(&directive).map_err(|source| LoggingError::Filter {
        directive: directive.clone(),
        source,
    })?;

    let installed = match &config.log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init(),
    };

    installed.map_err(|_| LoggingError::AlreadyInstalled)
}

fn open_log_file(path: &str) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::Io {
            path: PathBuf::from(path),
            source,
        })
}
