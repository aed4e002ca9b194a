//! Command handlers. Each takes the resolved `BatchConfig`; those that spawn
//! children also take the `ProcessRunner` (real or dry-run).

pub mod bootstrap;
pub mod list;
pub mod run;
