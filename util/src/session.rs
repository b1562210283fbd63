//! Session management
//!
//! A session is a timestamped directory which collects everything produced by
//! one execution: the log file and any data products (JSON dumps, CSV traces)
//! saved while the execution runs.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// A chrono format string which displays a timestamp. See
/// https://docs.rs/chrono/0.4.11/chrono/format/strftime/index.html for more
/// information.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A struct storing information about the current session
#[derive(Clone)]
pub struct Session {
    /// The root directory for this session
    pub session_root: PathBuf,

    /// The path to the session's log file
    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors associated with the session module.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error(
        "Cannot initialise the session epoch, have you already initialised the\
         session? (conquer_once error: {0})"
    )]
    CannotInitEpoch(conquer_once::TryInitError),

    #[error("Cannot get the epoch time, did you forget to initialise the session?")]
    CannotGetEpoch,

    #[error("Cannot serialise the data to be saved: {0}")]
    SerialiseError(serde_json::Error),

    #[error("Cannot write the data file: {0}")]
    WriteError(std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start a new session within the given directory.
    ///
    /// This will create a new session directory named `{exec_name}_{timestamp}`
    pub fn new<S: AsRef<Path>>(exec_name: &str, sessions_dir: S) -> Result<Self, SessionError> {
        // Set the session epoch
        match SESSION_EPOCH.try_init_once(Utc::now) {
            Ok(_) => (),
            Err(e) => return Err(SessionError::CannotInitEpoch(e)),
        };

        // Format the session epoch as a timestamp
        let timestamp = match SESSION_EPOCH.get() {
            Some(e) => e.format(TIMESTAMP_FORMAT),
            None => return Err(SessionError::CannotGetEpoch),
        };

        // Create the session path
        let mut session_root: PathBuf = sessions_dir.as_ref().to_path_buf();
        session_root.push(format!("{}_{}", exec_name, timestamp));

        if let Err(e) = fs::create_dir_all(&session_root) {
            return Err(SessionError::CannotCreateDir(e));
        }

        // Log file lives at the root of the session
        let mut log_file_path = session_root.clone();
        log_file_path.push(format!("{}.log", exec_name));

        Ok(Self {
            session_root,
            log_file_path,
        })
    }

    /// Get the path of a data product file within the session directory.
    ///
    /// Any parent directories of the file are created if needed.
    pub fn data_file_path(&self, name: &str) -> Result<PathBuf, SessionError> {
        let path = self.session_root.join(name);

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                return Err(SessionError::CannotCreateDir(e));
            }
        }

        Ok(path)
    }

    /// Save a serialisable object as a JSON data product in the session
    /// directory.
    pub fn save_json<T: Serialize>(&self, name: &str, data: &T) -> Result<(), SessionError> {
        let path = self.data_file_path(name)?;

        let json = match serde_json::to_string_pretty(data) {
            Ok(j) => j,
            Err(e) => return Err(SessionError::SerialiseError(e)),
        };

        match fs::write(path, json) {
            Ok(_) => Ok(()),
            Err(e) => Err(SessionError::WriteError(e)),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the session epoch.
///
/// Returns `None` if no session has been started.
pub fn get_epoch() -> Option<DateTime<Utc>> {
    SESSION_EPOCH.get().copied()
}

/// Get the number of seconds elapsed since the session epoch.
///
/// Returns `0.0` if no session has been started, so that log lines produced
/// before session init still format.
pub fn get_elapsed_seconds() -> f64 {
    match SESSION_EPOCH.get() {
        Some(epoch) => {
            let duration = Utc::now() - *epoch;
            duration.num_microseconds().unwrap_or(0) as f64 / 1e6
        }
        None => 0f64,
    }
}
