#![forbid(unsafe_code)]

//! File-backed tracing subscriber.
//!
//! The view owns the terminal, so logs never go to stdout or stderr. Without
//! `TCHECK_LOG_FILE` nothing is installed.

use std::env;
use std::fs::File;
use std::io;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_FILE_ENV: &str = "TCHECK_LOG_FILE";
pub const LOG_FILTER_ENV: &str = "TCHECK_LOG";

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber when a log file is configured.
///
/// Returns `Ok(false)` when logging stays off.
pub fn init() -> io::Result<bool> {
    let Some(path) = env::var_os(LOG_FILE_ENV) else {
        return Ok(false);
    };
    let file = File::create(path)?;
    let filter = env::var(LOG_FILTER_ENV)
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .try_init()
        .is_ok();
    Ok(installed)
}
