use std::path::PathBuf;

use thiserror::Error;

use crate::dispatch::BatchReport;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Cannot read configuration directory {}: {source}", .dir.display())]
    ReadDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Only raised in strict mode. `report` holds the results up to and
    /// including the failing build.
    #[error("Build failed for {}: {detail}", .file.display())]
    BuildFailed {
        file: PathBuf,
        detail: String,
        report: Box<BatchReport>,
    },
}
