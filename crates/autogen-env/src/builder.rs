//! Build the isolated Python environment and return its [`Activation`].
//!
//! The environment directory is the marker: if it is a directory it is reused
//! as-is, with no staleness or validity check. Anything else at that path
//! (a regular file, a dangling link) is not an environment.

use std::path::{Path, PathBuf};

use autogen_core::config::BatchConfig;
use autogen_core::observability;
use autogen_core::process::{ExitOutcome, Invocation, ProcessRunner};

use crate::activation::Activation;
use crate::error::BootstrapError;

/// True when `env_dir` is not an existing directory and must be created.
pub fn needs_provisioning(env_dir: &Path) -> bool {
    !env_dir.is_dir()
}

/// Inputs for [`ensure_environment`].
#[derive(Debug, Clone)]
pub struct BootstrapRequest {
    pub env_dir: PathBuf,
    pub manifest: PathBuf,
    /// Interpreter that creates the environment; resolved on PATH when `None`.
    pub python: Option<PathBuf>,
    /// Working directory of the venv / pip children.
    pub work_dir: PathBuf,
}

impl BootstrapRequest {
    pub fn from_config(cfg: &BatchConfig) -> Self {
        Self {
            env_dir: cfg.env_path(),
            manifest: cfg.requirements_path(),
            python: cfg.python.clone(),
            work_dir: cfg.work_dir.clone(),
        }
    }
}

/// Result of a successful bootstrap.
#[derive(Debug, Clone)]
pub struct Bootstrapped {
    pub activation: Activation,
    /// `false` when an existing environment was reused.
    pub created: bool,
    /// Creation was only planned (`--dry-run`); nothing exists on disk.
    pub dry_run: bool,
}

/// Ensure the environment exists, then activate it.
///
/// First run: `<python> -m venv <env_dir>` followed by `pip install -r <manifest>`.
/// Later runs: no child processes at all.
pub fn ensure_environment(
    runner: &dyn ProcessRunner,
    req: &BootstrapRequest,
) -> Result<Bootstrapped, BootstrapError> {
    let env_dir = absolute(&req.env_dir)?;

    if !needs_provisioning(&env_dir) {
        tracing::info!("Reusing environment {}", env_dir.display());
        if !runner.is_dry_run() {
            observability::audit_env_reused(&env_dir);
        }
        return Ok(Bootstrapped {
            activation: Activation::new(&env_dir)?,
            created: false,
            dry_run: runner.is_dry_run(),
        });
    }

    // Must fail before the marker directory exists.
    if !req.manifest.is_file() {
        return Err(BootstrapError::ManifestMissing(req.manifest.clone()));
    }
    let manifest = absolute(&req.manifest)?;

    let python = resolve_interpreter(req.python.as_deref())?;
    tracing::info!(
        "Creating environment {} with {}",
        env_dir.display(),
        python.display()
    );
    let venv = Invocation::new(python)
        .args(["-m", "venv"])
        .arg(&env_dir)
        .current_dir(&req.work_dir);
    let outcome = run_step(runner, &venv)?;
    if !outcome.success() && !outcome.skipped {
        return Err(BootstrapError::VenvFailed {
            command: venv.command_line(),
            outcome,
        });
    }

    let activation = Activation::new(&env_dir)?;
    tracing::info!("Installing dependencies from {}", manifest.display());
    let install = activation.apply(
        pip_invocation(&activation)
            .args(["install", "-r"])
            .arg(&manifest)
            .current_dir(&req.work_dir),
    );
    let outcome = run_step(runner, &install)?;
    if !outcome.success() && !outcome.skipped {
        return Err(BootstrapError::InstallFailed {
            command: install.command_line(),
            outcome,
        });
    }

    let dry_run = runner.is_dry_run();
    if !dry_run {
        observability::audit_env_created(&env_dir, &manifest);
    }
    Ok(Bootstrapped {
        activation,
        created: true,
        dry_run,
    })
}

fn run_step(
    runner: &dyn ProcessRunner,
    invocation: &Invocation,
) -> Result<ExitOutcome, BootstrapError> {
    runner.run(invocation).map_err(|source| BootstrapError::Spawn {
        command: invocation.command_line(),
        source,
    })
}

fn absolute(path: &Path) -> Result<PathBuf, BootstrapError> {
    std::path::absolute(path).map_err(|source| BootstrapError::InvalidPath {
        path: path.to_path_buf(),
        source,
    })
}

/// `bin/pip`, else `Scripts/pip.exe`, else `<env python> -m pip`.
fn pip_invocation(activation: &Activation) -> Invocation {
    let env_dir = activation.env_dir();
    let pip_bin = env_dir.join("bin").join("pip");
    let pip_scripts = env_dir.join("Scripts").join("pip.exe");
    if pip_bin.exists() {
        Invocation::new(pip_bin)
    } else if pip_scripts.exists() {
        Invocation::new(pip_scripts)
    } else {
        Invocation::new(activation.python()).args(["-m", "pip"])
    }
}

fn resolve_interpreter(configured: Option<&Path>) -> Result<PathBuf, BootstrapError> {
    if let Some(p) = configured {
        return Ok(p.to_path_buf());
    }
    ["python3", "python"]
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or(BootstrapError::InterpreterNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autogen_core::process::DryRunner;
    use std::cell::RefCell;
    use std::ffi::OsString;
    use std::io;

    /// Records calls; `-m venv <dir>` creates `<dir>` (plus `bin/pip`) like the real module.
    #[derive(Default)]
    struct FakeRunner {
        calls: RefCell<Vec<Invocation>>,
        fail_when_arg: Option<&'static str>,
    }

    impl FakeRunner {
        fn failing_on(arg: &'static str) -> Self {
            Self {
                fail_when_arg: Some(arg),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Invocation> {
            self.calls.borrow().clone()
        }
    }

    impl ProcessRunner for FakeRunner {
        fn run(&self, inv: &Invocation) -> io::Result<ExitOutcome> {
            self.calls.borrow_mut().push(inv.clone());
            if let Some(arg) = self.fail_when_arg {
                if inv.args.iter().any(|a| a == arg) {
                    return Ok(ExitOutcome::from_code(1));
                }
            }
            if inv.args.first().map(|a| a == "-m").unwrap_or(false)
                && inv.args.get(1).map(|a| a == "venv").unwrap_or(false)
            {
                let dir = PathBuf::from(inv.args.last().unwrap());
                std::fs::create_dir_all(dir.join("bin"))?;
                std::fs::write(dir.join("bin").join("pip"), "")?;
            }
            Ok(ExitOutcome::SUCCESS)
        }
    }

    fn request(root: &Path) -> BootstrapRequest {
        BootstrapRequest {
            env_dir: root.join("venv"),
            manifest: root.join("requirements.txt"),
            python: Some(PathBuf::from("python3")),
            work_dir: root.to_path_buf(),
        }
    }

    #[test]
    fn test_needs_provisioning() {
        let tmp = tempfile::tempdir().unwrap();
        let env_dir = tmp.path().join("venv");
        assert!(needs_provisioning(&env_dir));
        std::fs::create_dir(&env_dir).unwrap();
        assert!(!needs_provisioning(&env_dir));
    }

    #[test]
    fn test_file_named_like_env_is_not_reused() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("requirements.txt"), "PyYAML\n").unwrap();
        std::fs::write(tmp.path().join("venv"), "not an environment").unwrap();
        assert!(needs_provisioning(&tmp.path().join("venv")));

        // A real `python -m venv` refuses to overwrite a regular file.
        let runner = FakeRunner::failing_on("venv");
        let err = ensure_environment(&runner, &request(tmp.path())).unwrap_err();

        assert!(matches!(err, BootstrapError::VenvFailed { .. }));
        assert_eq!(runner.calls().len(), 1);
        assert!(tmp.path().join("venv").is_file());
    }

    #[test]
    fn test_dry_run_plans_creation_without_claiming_it() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("requirements.txt"), "PyYAML\n").unwrap();
        let runner = DryRunner::new();

        let boot = ensure_environment(&runner, &request(tmp.path())).unwrap();

        assert!(boot.created);
        assert!(boot.dry_run);
        assert!(!tmp.path().join("venv").exists());
        let recorded = runner.recorded();
        assert_eq!(recorded.len(), 2);
        assert!(recorded[1].args.iter().any(|a| a == "install"));
    }

    #[test]
    fn test_first_run_creates_env_and_installs_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("requirements.txt"), "PyYAML>=1.0\n").unwrap();
        let runner = FakeRunner::default();

        let boot = ensure_environment(&runner, &request(tmp.path())).unwrap();

        assert!(boot.created);
        assert!(!boot.dry_run);
        assert!(tmp.path().join("venv").is_dir());
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].program, PathBuf::from("python3"));
        assert_eq!(calls[0].args[..2], [OsString::from("-m"), OsString::from("venv")]);
        assert_eq!(calls[1].program, tmp.path().join("venv").join("bin").join("pip"));
        assert_eq!(
            calls[1].args,
            vec![
                OsString::from("install"),
                OsString::from("-r"),
                tmp.path().join("requirements.txt").into_os_string(),
            ]
        );
        assert!(calls[1].env_override("VIRTUAL_ENV").is_some());
    }

    #[test]
    fn test_existing_env_is_reused_without_install() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("venv")).unwrap();
        let runner = FakeRunner::default();

        let boot = ensure_environment(&runner, &request(tmp.path())).unwrap();

        assert!(!boot.created);
        assert!(runner.calls().is_empty());
        assert_eq!(boot.activation.env_dir(), tmp.path().join("venv"));
    }

    #[test]
    fn test_second_run_invokes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("requirements.txt"), "PyYAML\n").unwrap();
        let first = FakeRunner::default();
        ensure_environment(&first, &request(tmp.path())).unwrap();

        let second = FakeRunner::default();
        let boot = ensure_environment(&second, &request(tmp.path())).unwrap();
        assert!(!boot.created);
        assert_eq!(second.calls().len(), 0);
    }

    #[test]
    fn test_missing_manifest_fails_before_creating_env() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = FakeRunner::default();

        let err = ensure_environment(&runner, &request(tmp.path())).unwrap_err();

        assert!(matches!(err, BootstrapError::ManifestMissing(_)));
        assert!(runner.calls().is_empty());
        assert!(!tmp.path().join("venv").exists());
    }

    #[test]
    fn test_install_failure_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("requirements.txt"), "no-such-pkg\n").unwrap();
        let runner = FakeRunner::failing_on("install");

        let err = ensure_environment(&runner, &request(tmp.path())).unwrap_err();

        match err {
            BootstrapError::InstallFailed { outcome, .. } => assert_eq!(outcome.code, Some(1)),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn test_venv_failure_skips_install() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("requirements.txt"), "PyYAML\n").unwrap();
        let runner = FakeRunner::failing_on("venv");

        let err = ensure_environment(&runner, &request(tmp.path())).unwrap_err();

        assert!(matches!(err, BootstrapError::VenvFailed { .. }));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_pip_falls_back_to_python_module() {
        let tmp = tempfile::tempdir().unwrap();
        let act = Activation::with_base_path(tmp.path(), None).unwrap();
        let inv = pip_invocation(&act);
        assert_eq!(inv.program, act.python());
        assert_eq!(inv.args, vec![OsString::from("-m"), OsString::from("pip")]);
    }

    #[test]
    fn test_configured_interpreter_is_used_verbatim() {
        let p = resolve_interpreter(Some(Path::new("/opt/python3.12/bin/python3"))).unwrap();
        assert_eq!(p, PathBuf::from("/opt/python3.12/bin/python3"));
    }
}
