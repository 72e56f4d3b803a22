//! Desktop entry generation for apps.
//!
//! Reads an app's source `.desktop` file, points every `Exec=` line at the
//! snap's app launcher, and writes the result into the GUI directory.

use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

const DESKTOP_ENTRY_SECTION: &str = "Desktop Entry";

/// Desktop entry generator for one app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopFile {
    snap_name: String,
    app_name: String,
    filename: PathBuf,
    prime_dir: PathBuf,
}

impl DesktopFile {
    /// `filename` is resolved against `prime_dir` when relative.
    pub fn new(
        snap_name: impl Into<String>,
        app_name: impl Into<String>,
        filename: impl Into<PathBuf>,
        prime_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            snap_name: snap_name.into(),
            app_name: app_name.into(),
            filename: filename.into(),
            prime_dir: prime_dir.into(),
        }
    }

    /// Launcher name used in `Exec=`: `<snap>` or `<snap>.<app>`.
    pub fn launcher(&self) -> String {
        if self.app_name == self.snap_name {
            self.snap_name.clone()
        } else {
            format!("{}.{}", self.snap_name, self.app_name)
        }
    }

    /// Writes `<gui_dir>/<app>.desktop` and returns its path.
    ///
    /// A relative `gui_dir` is resolved against the prime directory. When
    /// `icon_path` is given, `Icon=` is forced to `${SNAP}/<icon_path>`.
    ///
    /// # Errors
    /// - `Missing` when the source file does not exist.
    /// - `MissingEntrySection` / `MissingExec` for malformed sources.
    pub fn write(
        &self,
        gui_dir: &Path,
        icon_path: Option<&str>,
    ) -> Result<PathBuf, DesktopFileError> {
        let source_path = self.prime_dir.join(&self.filename);
        if !source_path.is_file() {
            return Err(DesktopFileError::Missing(source_path));
        }
        let source = fs::read_to_string(&source_path)?;
        let rendered = self.rewrite(&source, icon_path)?;

        let gui_dir = self.prime_dir.join(gui_dir);
        fs::create_dir_all(&gui_dir)?;
        let target = gui_dir.join(format!("{}.desktop", self.app_name));
        fs::write(&target, rendered)?;

        debug!(
            "event=desktop_write module=meta status=ok app={} path={}",
            self.app_name,
            target.display()
        );
        Ok(target)
    }

    fn rewrite(&self, source: &str, icon_path: Option<&str>) -> Result<String, DesktopFileError> {
        let launcher = self.launcher();
        let mut section: Option<&str> = None;
        let mut saw_entry_section = false;
        let mut entry_has_exec = false;
        let mut lines = Vec::new();

        for line in source.lines() {
            let trimmed = line.trim();
            if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                section = Some(name);
                saw_entry_section |= name == DESKTOP_ENTRY_SECTION;
                lines.push(line.to_string());
                continue;
            }

            match trimmed.split_once('=') {
                Some((key, value)) if key.trim() == "Exec" => {
                    if section == Some(DESKTOP_ENTRY_SECTION) {
                        entry_has_exec = true;
                    }
                    lines.push(format!("Exec={}", rewrite_exec(&launcher, value.trim())));
                }
                Some((key, value)) if key.trim() == "Icon" => {
                    lines.push(format!("Icon={}", self.rewrite_icon(value.trim(), icon_path)));
                }
                _ => lines.push(line.to_string()),
            }
        }

        if !saw_entry_section {
            return Err(DesktopFileError::MissingEntrySection(self.filename.clone()));
        }
        if !entry_has_exec {
            return Err(DesktopFileError::MissingExec(self.filename.clone()));
        }

        let mut rendered = lines.join("\n");
        rendered.push('\n');
        Ok(rendered)
    }

    fn rewrite_icon(&self, icon: &str, icon_path: Option<&str>) -> String {
        if let Some(icon_path) = icon_path {
            return format!("${{SNAP}}/{}", icon_path.trim_start_matches('/'));
        }
        match icon.strip_prefix('/') {
            Some(relative) if self.prime_dir.join(relative).exists() => {
                format!("${{SNAP}}{icon}")
            }
            _ => icon.to_string(),
        }
    }
}

/// Replaces the program of an `Exec=` value, which may be double-quoted.
fn rewrite_exec(launcher: &str, value: &str) -> String {
    let args = match value.strip_prefix('"') {
        Some(quoted) => quoted.split_once('"').map(|(_, rest)| rest),
        None => value.split_once(' ').map(|(_, rest)| rest),
    };
    match args.map(str::trim_start).filter(|args| !args.is_empty()) {
        Some(args) => format!("{launcher} {args}"),
        None => launcher.to_string(),
    }
}

/// Error for desktop entry generation.
#[derive(Debug)]
pub enum DesktopFileError {
    Missing(PathBuf),
    MissingEntrySection(PathBuf),
    MissingExec(PathBuf),
    Io(std::io::Error),
}

impl Display for DesktopFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "desktop file `{}` does not exist", path.display()),
            Self::MissingEntrySection(path) => write!(
                f,
                "desktop file `{}` has no [{DESKTOP_ENTRY_SECTION}] section",
                path.display()
            ),
            Self::MissingExec(path) => write!(
                f,
                "desktop file `{}` has no Exec key in [{DESKTOP_ENTRY_SECTION}]",
                path.display()
            ),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DesktopFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DesktopFileError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
