//! Environment variable keys.

/// Environment bootstrap and batch dispatch.
pub mod batch {
    pub const AUTOGEN_ENV_DIR: &str = "AUTOGEN_ENV_DIR";
    pub const AUTOGEN_REQUIREMENTS: &str = "AUTOGEN_REQUIREMENTS";
    pub const AUTOGEN_BUILD_TOOL: &str = "AUTOGEN_BUILD_TOOL";
    pub const AUTOGEN_PYTHON: &str = "AUTOGEN_PYTHON";
    pub const AUTOGEN_STRICT: &str = "AUTOGEN_STRICT";
}

/// Logging and audit.
pub mod observability {
    pub const AUTOGEN_QUIET: &str = "AUTOGEN_QUIET";
    pub const AUTOGEN_LOG_LEVEL: &str = "AUTOGEN_LOG_LEVEL";
    pub const AUTOGEN_LOG_JSON: &str = "AUTOGEN_LOG_JSON";
    pub const AUTOGEN_AUDIT_LOG: &str = "AUTOGEN_AUDIT_LOG";
}

/// Variables written into child processes by environment activation.
pub mod activation {
    pub const PATH: &str = "PATH";
    pub const VIRTUAL_ENV: &str = "VIRTUAL_ENV";
    pub const PYTHONHOME: &str = "PYTHONHOME";
}
