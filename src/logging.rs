//! Logging
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` wins over the
//! configured level; output goes to stderr or, when configured, a file so
//! the interactive dashboard's screen stays clean.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to open log file {path:?}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

/// Filter directive used when `RUST_LOG` is unset
pub fn default_directive(config: &LoggingConfig) -> String {
    format!("timebot_admin={}", config.level)
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive(config).into())
}

fn writer(config: &LoggingConfig) -> Result<BoxMakeWriter, LoggingError> {
    match &config.file {
        Some(file) => {
            let path = PathBuf::from(file);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| LoggingError::File {
                    path: path.clone(),
                    source,
                })?;
            }
            let handle = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|source| LoggingError::File { path, source })?;
            Ok(BoxMakeWriter::new(Mutex::new(handle)))
        }
        None => Ok(BoxMakeWriter::new(std::io::stderr)),
    }
}

/// Install the global subscriber described by `config`
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let is_json = config.format.eq_ignore_ascii_case("json");
    let to_file = config.file.is_some();

    let json_layer = if is_json {
        Some(
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_writer(writer(config)?),
        )
    } else {
        None
    };
    let text_layer = if is_json {
        None
    } else {
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(!to_file)
                .with_writer(writer(config)?),
        )
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))
}
