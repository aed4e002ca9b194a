//! Explicit environment activation.
//!
//! Does what `source venv/bin/activate` would, but as per-child overrides:
//! PATH gets the environment's bin directory prepended, VIRTUAL_ENV is set and
//! PYTHONHOME is removed.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use autogen_core::config::env_keys::activation as keys;
use autogen_core::process::Invocation;

use crate::error::BootstrapError;

/// Directory holding the environment's executables (`bin/`, `Scripts/` on Windows).
pub fn bin_dir(env_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        env_dir.join("Scripts")
    } else {
        env_dir.join("bin")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    env_dir: PathBuf,
    bin_dir: PathBuf,
    search_path: OsString,
}

impl Activation {
    /// Activate `env_dir` on top of the PATH this process inherited.
    pub fn new(env_dir: &Path) -> Result<Self, BootstrapError> {
        Self::with_base_path(env_dir, std::env::var_os(keys::PATH))
    }

    /// Activate `env_dir` on top of an explicit base search path.
    pub fn with_base_path(env_dir: &Path, base: Option<OsString>) -> Result<Self, BootstrapError> {
        let env_dir = std::path::absolute(env_dir).map_err(|source| BootstrapError::InvalidPath {
            path: env_dir.to_path_buf(),
            source,
        })?;
        let bin_dir = bin_dir(&env_dir);
        let mut entries = vec![bin_dir.clone()];
        if let Some(ref base) = base {
            entries.extend(std::env::split_paths(base));
        }
        let search_path = std::env::join_paths(entries)?;
        Ok(Self {
            env_dir,
            bin_dir,
            search_path,
        })
    }

    pub fn env_dir(&self) -> &Path {
        &self.env_dir
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    pub fn search_path(&self) -> &OsString {
        &self.search_path
    }

    /// The environment's own interpreter.
    pub fn python(&self) -> PathBuf {
        if cfg!(windows) {
            self.bin_dir.join("python.exe")
        } else {
            self.bin_dir.join("python")
        }
    }

    /// Attach the activation overrides to a child invocation.
    pub fn apply(&self, invocation: Invocation) -> Invocation {
        invocation
            .env(keys::PATH, &self.search_path)
            .env(keys::VIRTUAL_ENV, &self.env_dir)
            .env_remove(keys::PYTHONHOME)
    }

    /// Resolve `program` the way the activated shell would: environment bin
    /// first, then the inherited PATH. Names with a separator resolve against `cwd`.
    pub fn resolve(&self, program: &str, cwd: &Path) -> Option<PathBuf> {
        which::which_in(program, Some(&self.search_path), cwd).ok()
    }
}
