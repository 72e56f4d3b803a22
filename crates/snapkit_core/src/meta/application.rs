//! Snap application (`apps.<name>`) model.
//!
//! # Responsibility
//! - Deserialize and serialize one app entry of snap metadata.
//! - Decide whether wrappers may be generated and prime the app commands.
//! - Validate the command chain against the primed file layout.
//!
//! # Invariants
//! - Wrappers are only generated on legacy bases, without a declared
//!   command chain, and with the full adapter.
//! - `desktop` and `prepend_command_chain` never appear in serialized form.

use crate::meta::command::{
    executable_problem, Command, CommandKind, CommandState, ExecutableProblem,
};
use crate::meta::desktop::DesktopFile;
use crate::meta::octal::OctalMode;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Bases that still permit generated command wrappers.
pub const LEGACY_WRAPPER_BASES: &[&str] = &["core", "core18"];

/// `socket-mode` entries as rendered under `sockets.<name>`.
static SOCKET_MODE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(    socket-mode: )(\d+)$").expect("valid socket mode regex")
});

/// How much priming adapts an app's commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Adapter {
    /// Commands may be rewritten and the tooling chain injected.
    #[default]
    Full,
    /// Commands are used exactly as declared.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Daemon {
    Simple,
    Forking,
    Oneshot,
    Notify,
    Dbus,
}

/// Socket address: a TCP port or a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListenStream {
    Port(u16),
    Path(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Socket {
    pub listen_stream: ListenStream,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_mode: Option<OctalMode>,
}

/// One app entry of snap metadata.
///
/// Keys this model does not interpret (plugs, environment, ...) are kept in
/// `extra` and written back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Application {
    #[serde(skip)]
    pub app_name: String,
    /// Absent for entries that only declare a command chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daemon: Option<Daemon>,
    #[serde(default, skip_serializing)]
    pub adapter: Adapter,
    #[serde(
        default,
        deserialize_with = "string_or_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub command_chain: Vec<String>,
    /// Chain injected by tooling ahead of `command_chain` during priming.
    #[serde(skip)]
    pub prepend_command_chain: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sockets: BTreeMap<String, Socket>,
    /// Source desktop entry; consumed by `DesktopFile`, never serialized.
    #[serde(default, skip_serializing)]
    pub desktop: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
    #[serde(skip)]
    commands: Vec<Command>,
}

impl Application {
    /// Parses one app entry from YAML.
    pub fn from_yaml(app_name: impl Into<String>, source: &str) -> Result<Self, ApplicationError> {
        let mut app: Self = serde_yaml::from_str(source).map_err(ApplicationError::Parse)?;
        app.app_name = app_name.into();
        Ok(app)
    }

    /// Renders the app entry as YAML, with socket modes as octal literals.
    pub fn to_yaml(&self) -> Result<String, ApplicationError> {
        let rendered = serde_yaml::to_string(self).map_err(ApplicationError::Parse)?;
        Ok(SOCKET_MODE_LINE
            .replace_all(&rendered, |caps: &Captures<'_>| match caps[2].parse::<u32>() {
                Ok(mode) => format!("{}{}", &caps[1], OctalMode::new(mode)),
                Err(_) => caps[0].to_string(),
            })
            .into_owned())
    }

    /// Whether wrapper scripts may be generated on `base`.
    pub fn can_use_wrapper(&self, base: &str) -> bool {
        LEGACY_WRAPPER_BASES.contains(&base)
            && self.command_chain.is_empty()
            && self.adapter != Adapter::None
    }

    /// Finalizes `command`/`stop-command` against `prime_dir`.
    ///
    /// Rewrites commands in place, prepends `prepend_command_chain` to the
    /// command chain (full adapter only) and validates the resulting chain.
    /// Nothing is written to disk; see `write_command_wrappers`.
    ///
    /// # Errors
    /// - `CommandNotExecutable` when a command is unusable and wrappers are
    ///   not allowed on `base`.
    /// - `InvalidCommandChain` when a chain entry is missing or not executable.
    pub fn prime_commands(
        &mut self,
        base: &str,
        prime_dir: &Path,
    ) -> Result<(), ApplicationError> {
        let can_use_wrapper = self.can_use_wrapper(base);
        let massage = self.adapter != Adapter::None;

        let mut commands = Vec::new();
        for kind in [CommandKind::Command, CommandKind::StopCommand] {
            let declared = match kind {
                CommandKind::Command => &mut self.command,
                CommandKind::StopCommand => &mut self.stop_command,
            };
            let Some(value) = declared.as_deref() else {
                continue;
            };

            let mut command = Command::new(&self.app_name, kind, value);
            command.prime(can_use_wrapper, massage, prime_dir)?;
            *declared = Some(command.command().to_string());
            commands.push(command);
        }
        self.commands = commands;

        if self.adapter != Adapter::None && !self.prepend_command_chain.is_empty() {
            let mut chain = self.prepend_command_chain.clone();
            chain.append(&mut self.command_chain);
            self.command_chain = chain;
        }

        self.validate_command_chain_executables(prime_dir)
    }

    /// Checks that every command-chain entry is executable inside `prime_dir`.
    pub fn validate_command_chain_executables(
        &self,
        prime_dir: &Path,
    ) -> Result<(), ApplicationError> {
        for entry in &self.command_chain {
            if let Some(reason) = executable_problem(&prime_dir.join(entry)) {
                return Err(ApplicationError::InvalidCommandChain {
                    app_name: self.app_name.clone(),
                    entry: entry.clone(),
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Writes wrapper scripts for commands marked during priming.
    ///
    /// Returns the written paths; empty when no command needs a wrapper.
    pub fn write_command_wrappers(
        &mut self,
        prime_dir: &Path,
    ) -> Result<Vec<PathBuf>, ApplicationError> {
        let mut written = Vec::new();
        for command in &mut self.commands {
            if let Some(path) = command.write_wrapper(prime_dir)? {
                written.push(path);
            }
        }
        Ok(written)
    }

    /// Priming state of `kind`, once `prime_commands` has run.
    pub fn command_state(&self, kind: CommandKind) -> Option<&CommandState> {
        self.commands
            .iter()
            .find(|command| command.kind() == kind)
            .map(Command::state)
    }

    /// Desktop entry generator for this app, when it declares one.
    pub fn desktop_file(&self, snap_name: &str, prime_dir: &Path) -> Option<DesktopFile> {
        self.desktop.as_ref().map(|filename| {
            DesktopFile::new(snap_name, self.app_name.as_str(), filename.as_str(), prime_dir)
        })
    }
}

fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(entry) => vec![entry],
        OneOrMany::Many(entries) => entries,
    })
}

/// Error for app parsing and priming.
#[derive(Debug)]
pub enum ApplicationError {
    Parse(serde_yaml::Error),
    /// A command needs rewriting but wrappers are not allowed.
    CommandNotExecutable {
        app_name: String,
        command_name: &'static str,
        command: String,
        reason: ExecutableProblem,
    },
    InvalidCommandChain {
        app_name: String,
        entry: String,
        reason: ExecutableProblem,
    },
    Io(std::io::Error),
}

impl Display for ApplicationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid app metadata: {err}"),
            Self::CommandNotExecutable {
                app_name,
                command_name,
                command,
                reason,
            } => write!(
                f,
                "the {command_name} {command:?} for app {app_name:?} {reason}; \
                 point it at an executable inside the snap or use a command-chain"
            ),
            Self::InvalidCommandChain {
                app_name,
                entry,
                reason,
            } => write!(
                f,
                "the command-chain entry {entry:?} for app {app_name:?} {reason}"
            ),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ApplicationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::CommandNotExecutable { .. } | Self::InvalidCommandChain { .. } => None,
        }
    }
}

impl From<std::io::Error> for ApplicationError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
