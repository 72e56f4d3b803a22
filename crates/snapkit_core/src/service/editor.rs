//! External editor invocation.

use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::process::Command;

/// Hands a file to the user for editing and blocks until they are done.
pub trait Editor {
    fn edit(&mut self, path: &Path) -> Result<(), EditorError>;

    /// Human-readable name of the editor, for diagnostics.
    fn name(&self) -> &str;
}

/// Editor program spawned as `<program> <path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEditor {
    program: String,
}

impl ExternalEditor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Editor for ExternalEditor {
    fn edit(&mut self, path: &Path) -> Result<(), EditorError> {
        let status = Command::new(&self.program)
            .arg(path)
            .status()
            .map_err(|source| EditorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        debug!(
            "event=editor_exit module=service status={} program={}",
            if status.success() { "ok" } else { "error" },
            self.program
        );
        if !status.success() {
            return Err(EditorError::Failed {
                program: self.program.clone(),
                code: status.code(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Editor failure; never retried.
#[derive(Debug)]
pub enum EditorError {
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// Editor exited unsuccessfully; `code` is `None` when killed by a signal.
    Failed { program: String, code: Option<i32> },
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn { program, source } => {
                write!(f, "failed to launch editor `{program}`: {source}")
            }
            Self::Failed {
                program,
                code: Some(code),
            } => write!(f, "editor `{program}` exited with status {code}"),
            Self::Failed {
                program,
                code: None,
            } => write!(f, "editor `{program}` was terminated by a signal"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Failed { .. } => None,
        }
    }
}
