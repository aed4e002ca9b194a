//! Autogen configuration layer.
//!
//! Every environment variable the tool reads is declared here; callers go
//! through the structured configs instead of calling `std::env::var`.
//!
//! - `loader`: `.env` loading and the primary/alias/default lookup chain
//! - `schema`: `BatchConfig`, `ObservabilityConfig`
//! - `env_keys`: key constants

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::load_dotenv;
pub use schema::{BatchConfig, ConfigOverrides, ObservabilityConfig};
