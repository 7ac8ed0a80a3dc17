#![forbid(unsafe_code)]

//! Optional file logging.
//!
//! The terminal owns stdout, so logs only go to a file, and only when
//! `FOLIO_LOG` holds a filter directive.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Default log file when `FOLIO_LOG_FILE` is unset.
pub const DEFAULT_LOG_FILE: &str = "folio.log";

/// Log settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub filter: String,
    pub path: PathBuf,
    pub json: bool,
}

impl LogConfig {
    /// `None` when logging is disabled.
    pub fn from_env(env: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let filter = env("FOLIO_LOG").filter(|f| !f.trim().is_empty())?;
        Some(Self {
            filter,
            path: env("FOLIO_LOG_FILE")
                .filter(|p| !p.is_empty())
                .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from),
            json: env("FOLIO_LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }
}

/// Install the global subscriber. Returns whether logging is on.
///
/// # Errors
///
/// The log file cannot be opened or the filter does not parse.
pub fn init(config: Option<&LogConfig>) -> io::Result<bool> {
    let Some(config) = config else {
        return Ok(false);
    };
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.path)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(io::Error::other)?;
    tracing::info!(path = %config.path.display(), "logging started");
    Ok(true)
}
