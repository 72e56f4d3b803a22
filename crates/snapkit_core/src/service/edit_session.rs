//! Interactive edit loop for one assertion document.
//!
//! # Responsibility
//! - Materialize YAML into an exclusively owned scratch file.
//! - Drive `Editing -> Validating -> {Accepted | RetryConfirm | Aborted}`
//!   until the user produces valid content or gives up.
//! - Detect no-op edits by value comparison against the original.
//!
//! # Invariants
//! - The scratch file is removed on every exit path, including user abort
//!   and editor failure.
//! - Editor failures are never retried.

use crate::model::assertion::{assertion_label, AssertionValidationError, EditableAssertion};
use crate::service::assertion_service::AssertionError;
use crate::service::console::Console;
use crate::service::editor::Editor;
use log::{debug, trace, warn};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Result of a completed edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome<T> {
    /// Edited content equals the original; nothing to publish.
    Unchanged,
    /// Valid content that differs from the original.
    Edited(T),
}

enum EditState<T> {
    Editing,
    Validating,
    RetryConfirm(AssertionValidationError),
    Accepted(T),
    Aborted(AssertionValidationError),
}

/// Scratch file removed when released or dropped.
#[derive(Debug)]
pub struct ScratchFile {
    path: Option<PathBuf>,
}

impl ScratchFile {
    /// Writes `contents` to a new, uniquely named file inside `dir`.
    pub fn create(dir: &Path, contents: &str) -> std::io::Result<Self> {
        let path = dir.join(format!("snapkit-{}.yaml", Uuid::new_v4()));
        trace!("Writing yaml data to temporary file '{}'.", path.display());

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        file.write_all(contents.as_bytes())?;
        Ok(Self { path: Some(path) })
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Removes the file, reporting removal failures.
    pub fn release(mut self) -> std::io::Result<()> {
        match self.path.take() {
            Some(path) => {
                trace!("Removing temporary file '{}'.", path.display());
                fs::remove_file(path)
            }
            None => Ok(()),
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            trace!("Removing temporary file '{}'.", path.display());
            if let Err(err) = fs::remove_file(&path) {
                warn!(
                    "event=scratch_cleanup module=service status=error path={} error={err}",
                    path.display()
                );
            }
        }
    }
}

/// One interactive editing pass over a YAML document.
pub struct EditSession<'a, C, E> {
    assertion_name: &'a str,
    console: &'a mut C,
    editor: &'a mut E,
    scratch_dir: &'a Path,
}

impl<'a, C: Console, E: Editor> EditSession<'a, C, E> {
    pub fn new(
        assertion_name: &'a str,
        console: &'a mut C,
        editor: &'a mut E,
        scratch_dir: &'a Path,
    ) -> Self {
        Self {
            assertion_name,
            console,
            editor,
            scratch_dir,
        }
    }

    /// Lets the user edit `yaml_data` until it validates as `T`.
    ///
    /// # Errors
    /// - `Validation` when `yaml_data` itself is not a valid `T`.
    /// - `Aborted` when the user declines to amend invalid content.
    /// - `Editor` and `Io` failures are returned unchanged.
    pub fn run<T: EditableAssertion>(
        &mut self,
        yaml_data: &str,
    ) -> Result<EditOutcome<T>, AssertionError> {
        let label = assertion_label(self.assertion_name);
        let original = T::from_yaml_str(yaml_data, &label)?;
        let scratch = ScratchFile::create(self.scratch_dir, yaml_data)?;

        let edited: T = self.edit_until_valid(scratch.path(), &label)?;
        scratch.release()?;

        if edited == original {
            self.console.message("No changes made.");
            return Ok(EditOutcome::Unchanged);
        }
        Ok(EditOutcome::Edited(edited))
    }

    fn edit_until_valid<T: EditableAssertion>(
        &mut self,
        path: &Path,
        label: &str,
    ) -> Result<T, AssertionError> {
        let mut state = EditState::Editing;
        loop {
            state = match state {
                EditState::Editing => {
                    debug!("Using {} to edit file.", self.editor.name());
                    let editor = &mut *self.editor;
                    self.console.pause(|| editor.edit(path))?;
                    EditState::Validating
                }
                EditState::Validating => {
                    let text = fs::read_to_string(path)?;
                    match T::from_yaml_str(&text, label) {
                        Ok(edited) => EditState::Accepted(edited),
                        Err(err) => EditState::RetryConfirm(err),
                    }
                }
                EditState::RetryConfirm(err) => {
                    self.console.message(&err.to_string());
                    let question = format!("Do you wish to amend the {}?", self.assertion_name);
                    if self.console.confirm(&question) {
                        EditState::Editing
                    } else {
                        EditState::Aborted(err)
                    }
                }
                EditState::Accepted(edited) => return Ok(edited),
                EditState::Aborted(err) => {
                    warn!("event=edit_aborted module=service status=aborted kind={label}");
                    return Err(AssertionError::Aborted(err));
                }
            };
        }
    }
}
