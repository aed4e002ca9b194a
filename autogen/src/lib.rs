//! Autogen CLI library — argument parsing and command dispatch.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, GlobalArgs};

use autogen_core::config::{BatchConfig, ConfigOverrides};
use autogen_core::observability;
use autogen_core::process::{DryRunner, ProcessRunner, SystemRunner};

/// Run the CLI — parses args and dispatches to command handlers.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing();

    let cfg = resolve_config(&cli.global);
    tracing::debug!("config: {:?}", cfg);

    let dry_runner = DryRunner::new();
    let runner: &dyn ProcessRunner = if cli.global.dry_run {
        &dry_runner
    } else {
        &SystemRunner
    };

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::cmd_run(&cfg, runner, cli.global.json)?,
        Commands::Bootstrap => commands::bootstrap::cmd_bootstrap(&cfg, runner)?,
        Commands::List => commands::list::cmd_list(&cfg, cli.global.json)?,
    }

    Ok(())
}

/// CLI flags > AUTOGEN_* environment variables > defaults.
fn resolve_config(args: &GlobalArgs) -> BatchConfig {
    BatchConfig::from_env().with_cli_overrides(ConfigOverrides {
        work_dir: args.dir.clone(),
        env_dir: args.env_dir.clone(),
        requirements: args.requirements.clone(),
        build_tool: args.tool.clone(),
        python: args.python.clone(),
        strict: args.strict,
    })
}
