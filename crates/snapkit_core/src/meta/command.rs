//! Per-command priming and wrapper generation.
//!
//! A command moves through
//! `Declared -> Relative | WrapperPending -> WrapperWritten | Rejected`.

use crate::meta::application::ApplicationError;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Characters snapd accepts in a command line.
static COMMAND_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9/. _#:$-]*$").expect("valid command regex"));
/// Install-root token that may prefix a command.
static SNAP_ROOT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\{?SNAP\}?/").expect("valid snap prefix regex"));

const WRAPPER_MODE: u32 = 0o755;

/// Which command of an app is being primed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommandKind {
    Command,
    StopCommand,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::StopCommand => "stop-command",
        }
    }
}

/// Priming state of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandState {
    Declared,
    /// Usable as a relative command inside the snap.
    Relative,
    /// Will be reached through a wrapper script running `wrapped`.
    WrapperPending { wrapped: String },
    WrapperWritten { wrapped: String },
    /// Unusable and not wrappable; priming failed.
    Rejected,
}

/// Why a path cannot be used directly as an executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableProblem {
    /// Contains characters snapd does not accept, such as shell syntax.
    InvalidFormat,
    Absolute,
    NotFound,
    NotExecutable,
}

impl Display for ExecutableProblem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::InvalidFormat => "contains characters that require a shell",
            Self::Absolute => "is an absolute path",
            Self::NotFound => "was not found in the prime directory",
            Self::NotExecutable => "is not executable",
        };
        f.write_str(text)
    }
}

/// One `command` or `stop-command` of an app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    app_name: String,
    kind: CommandKind,
    command: String,
    state: CommandState,
}

impl Command {
    pub fn new(app_name: impl Into<String>, kind: CommandKind, command: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            kind,
            command: command.into(),
            state: CommandState::Declared,
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Current command value; the wrapper name once a wrapper is pending.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn state(&self) -> &CommandState {
        &self.state
    }

    /// File name of the generated wrapper, e.g. `stop-command-foo.wrapper`.
    pub fn wrapper_name(&self) -> String {
        format!("{}-{}.wrapper", self.kind.as_str(), self.app_name)
    }

    /// Resolves the command against `prime_dir`.
    ///
    /// With `can_use_wrapper`, commands that are not plain relative
    /// executables are switched to a wrapper; `massage` first strips a
    /// leading `$SNAP/`. Without it, such commands are rejected.
    ///
    /// # Errors
    /// - `CommandNotExecutable` when the command is unusable and cannot be
    ///   wrapped.
    pub fn prime(
        &mut self,
        can_use_wrapper: bool,
        massage: bool,
        prime_dir: &Path,
    ) -> Result<(), ApplicationError> {
        if can_use_wrapper && massage {
            let massaged = SNAP_ROOT_PREFIX.replace(&self.command, "").into_owned();
            if massaged != self.command {
                warn!(
                    "The {} {:?} for app {:?} was changed to {:?}.",
                    self.kind.as_str(),
                    self.command,
                    self.app_name,
                    massaged
                );
                self.command = massaged;
            }
        }

        match verbatim_problem(&self.command, prime_dir) {
            None => {
                self.state = CommandState::Relative;
                Ok(())
            }
            Some(problem) if can_use_wrapper => {
                debug!(
                    "event=command_wrap module=meta app={} command={} reason={problem}",
                    self.app_name,
                    self.kind.as_str()
                );
                let wrapper = self.wrapper_name();
                let wrapped = std::mem::replace(&mut self.command, wrapper);
                self.state = CommandState::WrapperPending { wrapped };
                Ok(())
            }
            Some(reason) => {
                self.state = CommandState::Rejected;
                Err(ApplicationError::CommandNotExecutable {
                    app_name: self.app_name.clone(),
                    command_name: self.kind.as_str(),
                    command: self.command.clone(),
                    reason,
                })
            }
        }
    }

    /// Writes the wrapper script when one is pending or already written.
    ///
    /// Returns the wrapper path, or `None` for commands without a wrapper.
    /// Rewriting produces byte-identical content.
    pub fn write_wrapper(&mut self, prime_dir: &Path) -> std::io::Result<Option<PathBuf>> {
        let wrapped = match &self.state {
            CommandState::WrapperPending { wrapped } | CommandState::WrapperWritten { wrapped } => {
                wrapped.clone()
            }
            _ => return Ok(None),
        };

        let path = prime_dir.join(self.wrapper_name());
        fs::write(&path, wrapper_script(&wrapped))?;
        set_executable(&path)?;
        debug!(
            "event=wrapper_write module=meta status=ok path={}",
            path.display()
        );

        self.state = CommandState::WrapperWritten { wrapped };
        Ok(Some(path))
    }
}

/// Checks whether `path` is an executable regular file.
pub fn executable_problem(path: &Path) -> Option<ExecutableProblem> {
    match fs::metadata(path) {
        Err(_) => Some(ExecutableProblem::NotFound),
        Ok(metadata) if metadata.is_file() && is_executable(&metadata) => None,
        Ok(_) => Some(ExecutableProblem::NotExecutable),
    }
}

fn verbatim_problem(command: &str, prime_dir: &Path) -> Option<ExecutableProblem> {
    if !COMMAND_PATTERN.is_match(command) {
        return Some(ExecutableProblem::InvalidFormat);
    }
    let Some(program) = command.split_whitespace().next() else {
        return Some(ExecutableProblem::InvalidFormat);
    };
    if program.starts_with('/') {
        return Some(ExecutableProblem::Absolute);
    }
    executable_problem(&prime_dir.join(program))
}

fn wrapper_script(wrapped: &str) -> String {
    let target = if wrapped.starts_with('/') {
        wrapped.to_string()
    } else {
        format!("$SNAP/{wrapped}")
    };
    format!("#!/bin/sh\nexec {target} \"$@\"\n")
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    true
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(WRAPPER_MODE))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> std::io::Result<()> {
    let _ = WRAPPER_MODE;
    Ok(())
}
