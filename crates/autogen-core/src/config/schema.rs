//! Configuration structs grouped by concern.
//!
//! Loaded from environment variables with a single fallback policy;
//! CLI flags are applied on top via `with_cli_overrides`.

use super::env_keys::{batch as batch_keys, observability as obv_keys};
use super::loader::{lookup_bool, lookup_optional, lookup_or};
use std::path::{Path, PathBuf};

pub const DEFAULT_ENV_DIR: &str = "venv";
pub const DEFAULT_REQUIREMENTS: &str = "requirements.txt";
pub const DEFAULT_BUILD_TOOL: &str = "build_lib.py";
pub const DEFAULT_LOG_LEVEL: &str = "autogen=info";

/// Bootstrap + dispatch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Directory scanned for `*.yaml`; also the children's working directory.
    pub work_dir: PathBuf,
    /// Virtual environment directory, relative to `work_dir` unless absolute.
    pub env_dir: PathBuf,
    /// Requirements manifest, relative to `work_dir` unless absolute.
    pub requirements: PathBuf,
    /// Build tool invoked once per configuration file.
    pub build_tool: String,
    /// Interpreter used to create the environment. `None` resolves `python3`/`python` on PATH.
    pub python: Option<PathBuf>,
    /// Halt on the first failing build instead of continuing.
    pub strict: bool,
}

/// Values supplied on the command line. `None` / `false` keep the env/default value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub work_dir: Option<PathBuf>,
    pub env_dir: Option<PathBuf>,
    pub requirements: Option<PathBuf>,
    pub build_tool: Option<String>,
    pub python: Option<PathBuf>,
    pub strict: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            env_dir: PathBuf::from(DEFAULT_ENV_DIR),
            requirements: PathBuf::from(DEFAULT_REQUIREMENTS),
            build_tool: DEFAULT_BUILD_TOOL.to_string(),
            python: None,
            strict: false,
        }
    }
}

impl BatchConfig {
    /// Load from the process environment (and `.env`).
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self::from_lookup(&|k| std::env::var(k).ok())
    }

    pub(crate) fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        Self {
            work_dir: PathBuf::from("."),
            env_dir: PathBuf::from(lookup_or(lookup, batch_keys::AUTOGEN_ENV_DIR, &[], || {
                DEFAULT_ENV_DIR.to_string()
            })),
            requirements: PathBuf::from(lookup_or(
                lookup,
                batch_keys::AUTOGEN_REQUIREMENTS,
                &[],
                || DEFAULT_REQUIREMENTS.to_string(),
            )),
            build_tool: lookup_or(lookup, batch_keys::AUTOGEN_BUILD_TOOL, &[], || {
                DEFAULT_BUILD_TOOL.to_string()
            }),
            python: lookup_optional(lookup, batch_keys::AUTOGEN_PYTHON, &[]).map(PathBuf::from),
            strict: lookup_bool(lookup, batch_keys::AUTOGEN_STRICT, &[], false),
        }
    }

    /// Priority: CLI > environment variable > default.
    pub fn with_cli_overrides(mut self, cli: ConfigOverrides) -> Self {
        if let Some(d) = cli.work_dir {
            self.work_dir = d;
        }
        if let Some(d) = cli.env_dir {
            self.env_dir = d;
        }
        if let Some(r) = cli.requirements {
            self.requirements = r;
        }
        if let Some(t) = cli.build_tool {
            self.build_tool = t;
        }
        if cli.python.is_some() {
            self.python = cli.python;
        }
        self.strict |= cli.strict;
        self
    }

    /// Absolute-or-`work_dir`-relative path of the environment directory.
    pub fn env_path(&self) -> PathBuf {
        resolve_against(&self.work_dir, &self.env_dir)
    }

    /// Absolute-or-`work_dir`-relative path of the requirements manifest.
    pub fn requirements_path(&self) -> PathBuf {
        resolve_against(&self.work_dir, &self.requirements)
    }
}

fn resolve_against(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

/// Observability: quiet, log_level, log_json, audit_log.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self::from_lookup(&|k| std::env::var(k).ok())
        })
    }

    pub(crate) fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        Self {
            quiet: lookup_bool(lookup, obv_keys::AUTOGEN_QUIET, &[], false),
            log_level: lookup_or(lookup, obv_keys::AUTOGEN_LOG_LEVEL, &[], || {
                DEFAULT_LOG_LEVEL.to_string()
            }),
            log_json: lookup_bool(lookup, obv_keys::AUTOGEN_LOG_JSON, &[], false),
            audit_log: lookup_optional(lookup, obv_keys::AUTOGEN_AUDIT_LOG, &[]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_batch_config_defaults() {
        let cfg = BatchConfig::from_lookup(&lookup_from(&[]));
        assert_eq!(cfg, BatchConfig::default());
        assert_eq!(cfg.env_path(), PathBuf::from("./venv"));
        assert_eq!(cfg.requirements_path(), PathBuf::from("./requirements.txt"));
    }

    #[test]
    fn test_batch_config_env_values() {
        let cfg = BatchConfig::from_lookup(&lookup_from(&[
            ("AUTOGEN_ENV_DIR", ".venv"),
            ("AUTOGEN_BUILD_TOOL", "build_lib_ic.py"),
            ("AUTOGEN_PYTHON", "/usr/bin/python3.12"),
            ("AUTOGEN_STRICT", "1"),
        ]));
        assert_eq!(cfg.env_dir, PathBuf::from(".venv"));
        assert_eq!(cfg.build_tool, "build_lib_ic.py");
        assert_eq!(cfg.python, Some(PathBuf::from("/usr/bin/python3.12")));
        assert!(cfg.strict);
        assert_eq!(cfg.requirements, PathBuf::from(DEFAULT_REQUIREMENTS));
    }

    #[test]
    fn test_cli_overrides_win_over_env() {
        let cfg = BatchConfig::from_lookup(&lookup_from(&[
            ("AUTOGEN_ENV_DIR", ".venv"),
            ("AUTOGEN_REQUIREMENTS", "reqs.txt"),
        ]))
        .with_cli_overrides(ConfigOverrides {
            work_dir: Some(PathBuf::from("/lib/symbols")),
            env_dir: Some(PathBuf::from("/opt/venv")),
            strict: true,
            ..Default::default()
        });
        assert_eq!(cfg.env_path(), PathBuf::from("/opt/venv"));
        assert_eq!(cfg.requirements_path(), PathBuf::from("/lib/symbols/reqs.txt"));
        assert!(cfg.strict);
    }

    #[test]
    fn test_strict_flag_false_keeps_env_value() {
        let cfg = BatchConfig::from_lookup(&lookup_from(&[("AUTOGEN_STRICT", "yes")]))
            .with_cli_overrides(ConfigOverrides::default());
        assert!(cfg.strict);
    }

    #[test]
    fn test_observability_config() {
        let cfg = ObservabilityConfig::from_lookup(&lookup_from(&[
            ("AUTOGEN_QUIET", "true"),
            ("AUTOGEN_AUDIT_LOG", "/tmp/autogen-audit.jsonl"),
        ]));
        assert!(cfg.quiet);
        assert!(!cfg.log_json);
        assert_eq!(cfg.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(cfg.audit_log.as_deref(), Some("/tmp/autogen-audit.jsonl"));
    }
}
