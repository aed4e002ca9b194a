//! Environment variable loading.
//!
//! The fallback chain lives here so business code never repeats `or_else`.
//! Readers take a lookup function so the schema can be tested without
//! touching the process environment.

use std::path::Path;

/// Load `.env` from the current directory once; parent directories are not
/// searched. Variables already present in the environment win.
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        load_dotenv_from(Path::new(".env"));
    });
}

/// Load one `.env` file. Returns whether it was found and applied.
pub(crate) fn load_dotenv_from(path: &Path) -> bool {
    match dotenvy::from_path(path) {
        Ok(()) => {
            tracing::debug!("Loaded {}", path.display());
            true
        }
        Err(e) if e.not_found() => false,
        Err(e) => {
            tracing::warn!("Ignoring malformed {}: {}", path.display(), e);
            false
        }
    }
}

fn lookup_raw(
    lookup: &dyn Fn(&str) -> Option<String>,
    primary: &str,
    aliases: &[&str],
) -> Option<String> {
    lookup(primary).or_else(|| aliases.iter().find_map(|a| lookup(*a)))
}

pub(crate) fn lookup_or<F>(
    lookup: &dyn Fn(&str) -> Option<String>,
    primary: &str,
    aliases: &[&str],
    default: F,
) -> String
where
    F: FnOnce() -> String,
{
    lookup_raw(lookup, primary, aliases)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

pub(crate) fn lookup_optional(
    lookup: &dyn Fn(&str) -> Option<String>,
    primary: &str,
    aliases: &[&str],
) -> Option<String> {
    lookup_raw(lookup, primary, aliases).and_then(|s| {
        let s = s.trim().to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    })
}

pub(crate) fn lookup_bool(
    lookup: &dyn Fn(&str) -> Option<String>,
    primary: &str,
    aliases: &[&str],
    default: bool,
) -> bool {
    match lookup_raw(lookup, primary, aliases).as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}
