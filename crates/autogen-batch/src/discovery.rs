//! Configuration file discovery with shell-glob `*.yaml` semantics.
//!
//! Non-recursive; hidden entries are skipped; the suffix match is
//! case-sensitive; only entries that are files after following symlinks count.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DispatchError;

pub const CONFIG_SUFFIX: &str = ".yaml";

/// True if `name` would be matched by the glob `*.yaml`. Compared bytewise,
/// so names that are not valid UTF-8 match too.
pub fn is_config_name(name: &OsStr) -> bool {
    let bytes = name.as_encoded_bytes();
    !bytes.starts_with(b".")
        && bytes.len() > CONFIG_SUFFIX.len()
        && bytes.ends_with(CONFIG_SUFFIX.as_bytes())
}

/// Configuration files directly inside `dir`, as bare file names, sorted.
pub fn discover_configs(dir: &Path) -> Result<Vec<PathBuf>, DispatchError> {
    let entries = fs::read_dir(dir).map_err(|source| DispatchError::ReadDir {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut found: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| is_config_name(&entry.file_name()))
        .filter(|entry| fs::metadata(entry.path()).map(|m| m.is_file()).unwrap_or(false))
        .map(|entry| PathBuf::from(entry.file_name()))
        .collect();
    found.sort();
    tracing::debug!("Found {} configuration file(s) in {}", found.len(), dir.display());
    Ok(found)
}
