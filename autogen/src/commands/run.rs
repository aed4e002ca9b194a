//! `autogen run` (the default): bootstrap, then build every `*.yaml`.

use anyhow::{Context, Result};
use autogen_batch::{BatchReport, DispatchError, Dispatcher, FailureMode};
use autogen_core::config::BatchConfig;
use autogen_core::process::ProcessRunner;

use super::bootstrap::bootstrap;

/// Bootstrap then dispatch. Fails on bootstrap errors always, on build
/// failures only in strict mode.
pub fn run_batch(cfg: &BatchConfig, runner: &dyn ProcessRunner) -> Result<BatchReport> {
    let boot = bootstrap(cfg, runner)?;
    let dispatcher = Dispatcher::new(
        runner,
        &boot.activation,
        &cfg.work_dir,
        &cfg.build_tool,
        FailureMode::from_strict(cfg.strict),
    );
    dispatcher.run().context("Batch build aborted")
}

/// The report carried by a strict-mode build failure, if that is what `err` is.
fn partial_report(err: &anyhow::Error) -> Option<&BatchReport> {
    match err.downcast_ref::<DispatchError>() {
        Some(DispatchError::BuildFailed { report, .. }) => Some(report.as_ref()),
        _ => None,
    }
}

pub fn cmd_run(cfg: &BatchConfig, runner: &dyn ProcessRunner, json: bool) -> Result<()> {
    let report = match run_batch(cfg, runner) {
        Ok(report) => report,
        Err(e) => {
            if json {
                if let Some(report) = partial_report(&e) {
                    println!("{}", serde_json::to_string_pretty(report)?);
                }
            }
            return Err(e);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let failed = report.failed();
    if report.dry_run {
        eprintln!(
            "Would build {} file(s) with {} (dry run)",
            report.skipped(),
            report.tool
        );
        for r in &report.results {
            eprintln!("  - {}", r.file.display());
        }
    } else if failed == 0 {
        eprintln!("✓ Built {} file(s) with {}", report.succeeded(), report.tool);
    } else {
        eprintln!("⚠ {} of {} build(s) failed:", failed, report.results.len());
        for r in report.failures() {
            eprintln!("  ✗ {} ({})", r.file.display(), r.detail());
        }
    }
    Ok(())
}
