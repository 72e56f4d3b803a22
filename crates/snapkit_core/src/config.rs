//! Runtime configuration resolved from the environment.
//!
//! Values are read once at the process edge and passed explicitly into
//! services; core code never consults the environment on its own.

use std::path::PathBuf;

/// Environment variable naming the interactive editor program.
pub const EDITOR_ENV_VAR: &str = "EDITOR";
/// Editor used when `EDITOR` is unset or blank.
pub const DEFAULT_EDITOR: &str = "vi";
/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV_VAR: &str = "SNAPKIT_LOG_LEVEL";

/// Resolves the editor program from a raw `EDITOR` value.
pub fn editor_command(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_EDITOR)
        .to_string()
}

/// Settings for interactive assertion edit sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Editor program, invoked with the scratch file path as sole argument.
    pub editor: String,
    /// Directory receiving per-session scratch files.
    pub scratch_dir: PathBuf,
}

impl SessionConfig {
    pub fn new(editor: impl Into<String>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            editor: editor.into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Builds the session config from `EDITOR` and the system temp directory.
    pub fn from_env() -> Self {
        let editor = std::env::var(EDITOR_ENV_VAR).ok();
        Self::new(editor_command(editor.as_deref()), std::env::temp_dir())
    }
}
