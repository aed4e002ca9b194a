//! Python virtual environment bootstrap.
//!
//! `builder` creates the environment once and installs the requirements
//! manifest into it; `activation` describes the environment to child
//! processes without mutating the current process.

pub mod activation;
pub mod builder;
pub mod error;

pub use activation::Activation;
pub use builder::{ensure_environment, needs_provisioning, BootstrapRequest, Bootstrapped};
pub use error::BootstrapError;
