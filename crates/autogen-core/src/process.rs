//! Child-process invocation.
//!
//! Bootstrap and dispatch describe every child as an [`Invocation`] and hand
//! it to a [`ProcessRunner`]. Environment overrides travel with the
//! invocation; the current process's own environment is never touched.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

/// One child process: program, arguments, working directory and env overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    /// `Some(v)` sets the variable, `None` removes it. Everything else is inherited.
    pub envs: BTreeMap<OsString, Option<OsString>>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.insert(key.into(), Some(value.into()));
        self
    }

    pub fn env_remove(mut self, key: impl Into<OsString>) -> Self {
        self.envs.insert(key.into(), None);
        self
    }

    /// Override for `key`: `None` if inherited, `Some(None)` if removed.
    pub fn env_override(&self, key: impl AsRef<OsStr>) -> Option<Option<&OsStr>> {
        self.envs.get(key.as_ref()).map(|v| v.as_deref())
    }

    /// Shell-like rendering for logs.
    pub fn command_line(&self) -> String {
        let mut s = self.program.display().to_string();
        for a in &self.args {
            s.push(' ');
            s.push_str(&a.to_string_lossy());
        }
        s
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.envs {
            match value {
                Some(v) => {
                    cmd.env(key, v);
                }
                None => {
                    cmd.env_remove(key);
                }
            }
        }
        cmd
    }
}

/// How a child finished. `code` is `None` when it was terminated by a signal
/// or never started because of `--dry-run` (`skipped`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub code: Option<i32>,
    pub skipped: bool,
}

impl ExitOutcome {
    pub const SUCCESS: ExitOutcome = ExitOutcome {
        code: Some(0),
        skipped: false,
    };

    /// Outcome of an invocation that was recorded but not spawned.
    pub const SKIPPED: ExitOutcome = ExitOutcome {
        code: None,
        skipped: true,
    };

    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            skipped: false,
        }
    }

    pub fn success(&self) -> bool {
        !self.skipped && self.code == Some(0)
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            _ if self.skipped => write!(f, "not run (dry run)"),
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "terminated by signal"),
        }
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
            skipped: false,
        }
    }
}

/// Runs an invocation to completion, blocking the caller.
/// Child stdio is inherited so tool output reaches the user verbatim.
pub trait ProcessRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ExitOutcome>;

    /// True when nothing is actually spawned; callers must not record
    /// side effects (audit events) for invocations that never ran.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Spawns real processes via `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ExitOutcome> {
        tracing::debug!("exec: {}", invocation.command_line());
        invocation.to_command().status().map(ExitOutcome::from)
    }
}

/// Records invocations without spawning anything (`--dry-run`).
/// Every invocation reports [`ExitOutcome::SKIPPED`], never success.
#[derive(Debug, Default)]
pub struct DryRunner {
    recorded: RefCell<Vec<Invocation>>,
}

impl DryRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<Invocation> {
        self.recorded.borrow().clone()
    }
}

impl ProcessRunner for DryRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ExitOutcome> {
        tracing::info!("[dry-run] {}", invocation.command_line());
        self.recorded.borrow_mut().push(invocation.clone());
        Ok(ExitOutcome::SKIPPED)
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
