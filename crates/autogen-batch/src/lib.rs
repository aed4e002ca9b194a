//! Batch dispatch: find the `*.yaml` configuration files in a directory and
//! run the build tool once per file, sequentially.

pub mod discovery;
pub mod dispatch;
pub mod error;

pub use discovery::{discover_configs, is_config_name, CONFIG_SUFFIX};
pub use dispatch::{BatchReport, BuildResult, Dispatcher, FailureMode};
pub use error::DispatchError;
