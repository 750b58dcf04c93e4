use std::env;
use std::path::{Path, PathBuf};

/// The directory holding session logs and their external files.
pub const ENV_VAR_SESSION_DIR: &str = "EVLOG_SESSION_DIR";

pub const LOG_FILE_EXTENSION: &str = "evlog";

pub fn default_session_dir() -> PathBuf {
    env::var(ENV_VAR_SESSION_DIR).map_or_else(|_| env::temp_dir().join("evlog"), PathBuf::from)
}

/// A relative log path is taken to be within the default session dir.
pub fn resolve_log_path<P: AsRef<Path>>(log_path: P) -> PathBuf {
    let log_path = log_path.as_ref();
    if log_path.is_absolute() || log_path.starts_with(".") {
        log_path.into()
    } else {
        default_session_dir().join(log_path)
    }
}
