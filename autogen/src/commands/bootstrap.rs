//! `autogen bootstrap`: create the environment if missing, nothing else.

use anyhow::{Context, Result};
use autogen_core::config::BatchConfig;
use autogen_core::process::ProcessRunner;
use autogen_env::{ensure_environment, BootstrapRequest, Bootstrapped};

/// Shared by `bootstrap` and `run`.
pub fn bootstrap(cfg: &BatchConfig, runner: &dyn ProcessRunner) -> Result<Bootstrapped> {
    ensure_environment(runner, &BootstrapRequest::from_config(cfg))
        .context("Environment bootstrap failed")
}

pub fn cmd_bootstrap(cfg: &BatchConfig, runner: &dyn ProcessRunner) -> Result<()> {
    let boot = bootstrap(cfg, runner)?;
    let env_dir = boot.activation.env_dir().display();
    if boot.created && boot.dry_run {
        eprintln!("Would create environment {} (dry run)", env_dir);
    } else if boot.created {
        eprintln!("✓ Created environment {}", env_dir);
    } else {
        eprintln!("✓ Environment {} already exists, nothing to do", env_dir);
    }
    Ok(())
}
