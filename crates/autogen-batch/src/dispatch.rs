//! Run the build tool once per configuration file.
//!
//! Strictly sequential: each child runs to completion before the next starts.

use std::path::{Path, PathBuf};
use std::time::Instant;

use autogen_core::observability;
use autogen_core::process::{Invocation, ProcessRunner};
use autogen_env::Activation;
use serde::{Serialize, Serializer};

use crate::discovery::discover_configs;
use crate::error::DispatchError;

/// What a failing build does to the rest of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Record the failure and continue; the batch itself never fails.
    #[default]
    Lenient,
    /// Stop at the first failure and report it as an error.
    Strict,
}

impl FailureMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Lenient
        }
    }
}

/// Outcome of one build tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    #[serde(serialize_with = "lossy_path")]
    pub file: PathBuf,
    /// `None` when the tool was killed by a signal or never started.
    pub exit_code: Option<i32>,
    /// Set when the tool could not be started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Recorded by `--dry-run` but never spawned.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    pub duration_ms: u64,
}

impl BuildResult {
    pub fn success(&self) -> bool {
        !self.skipped && self.error.is_none() && self.exit_code == Some(0)
    }

    /// Ran (or failed to start) and did not succeed.
    pub fn failed(&self) -> bool {
        !self.skipped && !self.success()
    }

    /// Human-readable outcome, for failures and dry-run entries.
    pub fn detail(&self) -> String {
        match (&self.error, self.exit_code) {
            _ if self.skipped => "not run (dry run)".to_string(),
            (Some(e), _) => e.clone(),
            (None, Some(code)) => format!("exit code {}", code),
            (None, None) => "terminated by signal".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub tool: String,
    pub mode: FailureMode,
    /// Nothing was spawned; every result is `skipped`.
    pub dry_run: bool,
    pub results: Vec<BuildResult>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.results.iter().filter(|r| r.skipped).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &BuildResult> {
        self.results.iter().filter(|r| r.failed())
    }
}

/// Paths serialize as UTF-8 only; file names that are not valid UTF-8 still
/// belong in the report.
fn lossy_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

pub struct Dispatcher<'a> {
    runner: &'a dyn ProcessRunner,
    activation: &'a Activation,
    work_dir: PathBuf,
    tool: String,
    mode: FailureMode,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        runner: &'a dyn ProcessRunner,
        activation: &'a Activation,
        work_dir: impl Into<PathBuf>,
        tool: impl Into<String>,
        mode: FailureMode,
    ) -> Self {
        Self {
            runner,
            activation,
            work_dir: work_dir.into(),
            tool: tool.into(),
            mode,
        }
    }

    /// Discover `*.yaml` in the working directory and build each one.
    pub fn run(&self) -> Result<BatchReport, DispatchError> {
        let files = discover_configs(&self.work_dir)?;
        self.dispatch(&files)
    }

    /// Build each of `files` (paths relative to the working directory) in order.
    pub fn dispatch(&self, files: &[PathBuf]) -> Result<BatchReport, DispatchError> {
        let mut report = BatchReport {
            tool: self.tool.clone(),
            mode: self.mode,
            dry_run: self.runner.is_dry_run(),
            results: Vec::with_capacity(files.len()),
        };
        if files.is_empty() {
            tracing::info!("No *.yaml files in {}", self.work_dir.display());
            return Ok(report);
        }

        let program = self.resolve_tool();
        for file in files {
            let result = self.build_one(&program, file);
            let failure = result.failed().then(|| result.detail());
            report.results.push(result);
            if let Some(detail) = failure {
                tracing::warn!("Build failed for {} ({})", file.display(), detail);
                if self.mode == FailureMode::Strict {
                    return Err(DispatchError::BuildFailed {
                        file: file.clone(),
                        detail,
                        report: Box::new(report),
                    });
                }
            }
        }

        if report.dry_run {
            tracing::info!("Planned {} build(s) (dry run)", report.skipped());
        } else {
            tracing::info!(
                "Built {}/{} configuration file(s)",
                report.succeeded(),
                report.results.len()
            );
        }
        Ok(report)
    }

    /// Tool path on the activated search path; the bare name if it cannot be found.
    pub fn resolve_tool(&self) -> PathBuf {
        match self.activation.resolve(&self.tool, &self.work_dir) {
            Some(p) => p,
            None => {
                tracing::warn!(
                    "{} not found in {} or PATH",
                    self.tool,
                    self.activation.bin_dir().display()
                );
                PathBuf::from(&self.tool)
            }
        }
    }

    fn build_one(&self, program: &Path, file: &Path) -> BuildResult {
        tracing::info!("Building {}", file.display());
        let invocation = self.activation.apply(
            Invocation::new(program)
                .arg(file)
                .current_dir(&self.work_dir),
        );
        let started = Instant::now();
        let (exit_code, error, skipped) = match self.runner.run(&invocation) {
            Ok(outcome) => (outcome.code, None, outcome.skipped),
            Err(e) => (
                None,
                Some(format!("failed to start {}: {}", program.display(), e)),
                false,
            ),
        };
        let result = BuildResult {
            file: file.to_path_buf(),
            exit_code,
            error,
            skipped,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        if result.skipped {
            return result;
        }
        observability::audit_build_finished(
            &self.work_dir.join(file),
            result.exit_code,
            result.success(),
            result.duration_ms,
        );
        result
    }
}
