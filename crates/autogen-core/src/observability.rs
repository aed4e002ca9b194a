//! Observability: tracing init and the JSONL audit log.
//!
//! Uses `config::ObservabilityConfig` for AUTOGEN_QUIET, LOG_LEVEL, LOG_JSON, AUDIT_LOG.
//! Logs go to stderr; stdout belongs to the children and `--json` reports.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

static AUDIT_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Initialize tracing. Call once at process startup.
/// When AUTOGEN_QUIET=1 only WARN and above are logged. RUST_LOG overrides everything.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "autogen=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

fn audit_path() -> Option<&'static Path> {
    AUDIT_PATH
        .get_or_init(|| {
            let path = PathBuf::from(ObservabilityConfig::from_env().audit_log.as_ref()?);
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            Some(path)
        })
        .as_deref()
}

fn append_jsonl(path: &Path, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Audit: a fresh environment was created and the manifest installed into it.
pub fn audit_env_created(env_dir: &Path, manifest: &Path) {
    if let Some(path) = audit_path() {
        append_jsonl(path, &env_created_record(env_dir, manifest));
    }
}

/// Audit: an existing environment directory was reused as-is.
pub fn audit_env_reused(env_dir: &Path) {
    if let Some(path) = audit_path() {
        let record = json!({
            "ts": now(),
            "event": "env_reused",
            "env_dir": env_dir.display().to_string(),
        });
        append_jsonl(path, &record);
    }
}

/// Audit: one build tool invocation finished (or failed to start).
pub fn audit_build_finished(file: &Path, exit_code: Option<i32>, success: bool, duration_ms: u64) {
    if let Some(path) = audit_path() {
        append_jsonl(path, &build_finished_record(file, exit_code, success, duration_ms));
    }
}

fn env_created_record(env_dir: &Path, manifest: &Path) -> serde_json::Value {
    json!({
        "ts": now(),
        "event": "env_created",
        "env_dir": env_dir.display().to_string(),
        "manifest": manifest.display().to_string(),
    })
}

fn build_finished_record(
    file: &Path,
    exit_code: Option<i32>,
    success: bool,
    duration_ms: u64,
) -> serde_json::Value {
    json!({
        "ts": now(),
        "event": "build_finished",
        "file": file.display().to_string(),
        "exit_code": exit_code,
        "success": success,
        "duration_ms": duration_ms,
    })
}
