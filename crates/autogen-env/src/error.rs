use std::path::PathBuf;

use autogen_core::process::ExitOutcome;
use thiserror::Error;

/// Fatal bootstrap failures. None of them are retried.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Requirements manifest not found: {}", .0.display())]
    ManifestMissing(PathBuf),

    #[error("python3 or python not found in PATH (set AUTOGEN_PYTHON or --python)")]
    InterpreterNotFound,

    #[error("Cannot resolve environment path {}: {source}", .path.display())]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment bin directory cannot be placed on PATH: {0}")]
    SearchPath(#[from] std::env::JoinPathsError),

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("venv creation failed ({outcome}): {command}")]
    VenvFailed { command: String, outcome: ExitOutcome },

    #[error("Dependency install failed ({outcome}): {command}")]
    InstallFailed { command: String, outcome: ExitOutcome },
}
