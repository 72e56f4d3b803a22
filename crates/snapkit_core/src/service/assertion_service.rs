//! Assertion listing and editing service.
//!
//! # Responsibility
//! - Render stored assertions of one kind as JSON or a plain table.
//! - Fetch or template an assertion and run an interactive edit session.
//!
//! # Invariants
//! - Nothing is written to a store; publishing needs signing, which is
//!   reported as not implemented.
//! - Only the first store match for a name is edited.

use crate::config::SessionConfig;
use crate::model::assertion::{AssertionValidationError, EditableAssertion};
use crate::service::console::Console;
use crate::service::edit_session::{EditOutcome, EditSession};
use crate::service::editor::{Editor, EditorError, ExternalEditor};
use crate::service::table::render_plain_table;
use crate::store::StoreError;
use log::info;
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Capabilities one assertion kind provides to the generic service.
pub trait AssertionKind {
    /// Store-side assertion record.
    type Assertion;
    /// User-editable projection.
    type Editable: EditableAssertion;

    /// Lowercase human name of the kind, e.g. `confdb schema`.
    fn assertion_name(&self) -> &'static str;

    /// Fetches assertions named `name`, or all of this kind.
    fn get_assertions(&self, name: Option<&str>) -> Result<Vec<Self::Assertion>, AssertionError>;

    /// Converts assertions into column headers and one row per assertion.
    fn normalize_assertions(&self, assertions: &[Self::Assertion]) -> NormalizedAssertions;

    /// YAML holding only the user-editable fields of `assertion`.
    fn generate_yaml_from_model(&self, assertion: &Self::Assertion)
        -> Result<String, AssertionError>;

    /// YAML of a default assertion seeded with `name` and `account_id`.
    fn generate_yaml_from_template(&self, name: &str, account_id: &str) -> String;
}

/// Tabular projection of a list of assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAssertions {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Supported listing formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
}

impl OutputFormat {
    /// Parses a `--format` value.
    ///
    /// # Errors
    /// - `NotImplemented` naming the requested format when unsupported.
    pub fn parse(value: &str) -> Result<Self, AssertionError> {
        match value {
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            other => Err(AssertionError::NotImplemented(format!(
                "'--format {other}'"
            ))),
        }
    }
}

/// Service error for assertion use-cases.
#[derive(Debug)]
pub enum AssertionError {
    /// The user declined to amend invalid content.
    Aborted(AssertionValidationError),
    /// Content failed to parse or validate outside the retry loop.
    Validation(AssertionValidationError),
    /// Deliberately unbuilt feature boundary.
    NotImplemented(String),
    Editor(EditorError),
    Store(StoreError),
    Io(std::io::Error),
    /// Output or template rendering failure.
    Render(String),
}

impl Display for AssertionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aborted(_) => write!(f, "operation aborted"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotImplemented(feature) => {
                write!(f, "command or feature not implemented: {feature}")
            }
            Self::Editor(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Render(message) => write!(f, "failed to render output: {message}"),
        }
    }
}

impl Error for AssertionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Aborted(err) | Self::Validation(err) => Some(err),
            Self::Editor(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::NotImplemented(_) | Self::Render(_) => None,
        }
    }
}

impl From<AssertionValidationError> for AssertionError {
    fn from(value: AssertionValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<EditorError> for AssertionError {
    fn from(value: EditorError) -> Self {
        Self::Editor(value)
    }
}

impl From<StoreError> for AssertionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<std::io::Error> for AssertionError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Generic list/edit service over one assertion kind.
pub struct AssertionService<K, C, E> {
    kind: K,
    console: C,
    editor: E,
    scratch_dir: PathBuf,
}

impl<K: AssertionKind, C: Console> AssertionService<K, C, ExternalEditor> {
    /// Creates a service editing through the configured external editor.
    pub fn from_config(kind: K, console: C, config: &SessionConfig) -> Self {
        Self::new(
            kind,
            console,
            ExternalEditor::new(config.editor.clone()),
            config.scratch_dir.clone(),
        )
    }
}

impl<K: AssertionKind, C: Console, E: Editor> AssertionService<K, C, E> {
    pub fn new(kind: K, console: C, editor: E, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            console,
            editor,
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    /// Lists assertions from the store in `output_format`.
    ///
    /// An empty result prints a "none found" message whatever the format.
    ///
    /// # Errors
    /// - `NotImplemented` when the format is unsupported.
    pub fn list_assertions(
        &mut self,
        output_format: &str,
        name: Option<&str>,
    ) -> Result<(), AssertionError> {
        let assertions = self.kind.get_assertions(name)?;
        let assertion_name = self.kind.assertion_name();

        if assertions.is_empty() {
            self.console
                .message(&format!("No {assertion_name}s found."));
            return Ok(());
        }

        let normalized = self.kind.normalize_assertions(&assertions);
        let rendered = match OutputFormat::parse(output_format)? {
            OutputFormat::Json => render_json(assertion_name, &normalized)?,
            OutputFormat::Table => render_plain_table(&normalized.headers, &normalized.rows),
        };
        self.console.message(&rendered);
        Ok(())
    }

    /// Edits, and eventually signs and uploads, an assertion.
    ///
    /// A missing assertion is created from the kind's template.
    ///
    /// # Errors
    /// - `NotImplemented` after a successful, changed edit: publishing is
    ///   not available yet.
    /// - `Aborted` when the user gives up on invalid content.
    pub fn edit_assertion(&mut self, name: &str, account_id: &str) -> Result<(), AssertionError> {
        let yaml_data = self.get_yaml_data(name, account_id)?;
        let assertion_name = self.kind.assertion_name();

        let mut session = EditSession::new(
            assertion_name,
            &mut self.console,
            &mut self.editor,
            &self.scratch_dir,
        );
        match session.run::<K::Editable>(&yaml_data)? {
            EditOutcome::Unchanged => Ok(()),
            EditOutcome::Edited(_) => {
                info!("event=assertion_edit module=service status=ok kind={assertion_name}");
                self.console
                    .message(&format!("Successfully edited {assertion_name} '{name}'."));
                Err(AssertionError::NotImplemented(format!(
                    "building, signing and uploading {assertion_name}"
                )))
            }
        }
    }

    fn get_yaml_data(&mut self, name: &str, account_id: &str) -> Result<String, AssertionError> {
        let assertion_name = self.kind.assertion_name();
        self.console.progress(
            &format!("Requesting {assertion_name} '{name}' from the store."),
            false,
        );

        let assertions = self.kind.get_assertions(Some(name))?;
        match assertions.first() {
            Some(assertion) => self.kind.generate_yaml_from_model(assertion),
            None => {
                self.console.progress(
                    &format!(
                        "Creating a new {assertion_name} because no existing \
                         {assertion_name} named '{name}' was found for the \
                         authenticated account."
                    ),
                    true,
                );
                Ok(self.kind.generate_yaml_from_template(name, account_id))
            }
        }
    }
}

fn render_json(
    assertion_name: &str,
    normalized: &NormalizedAssertions,
) -> Result<String, AssertionError> {
    let items: Vec<Value> = normalized
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = normalized
                .headers
                .iter()
                .zip(row)
                .map(|(header, value)| (header.to_lowercase(), value.clone()))
                .collect();
            Value::Object(object)
        })
        .collect();

    let mut document = Map::new();
    document.insert(format!("{assertion_name}s"), Value::Array(items));

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    Value::Object(document)
        .serialize(&mut serializer)
        .map_err(|err| AssertionError::Render(err.to_string()))?;
    String::from_utf8(buffer).map_err(|err| AssertionError::Render(err.to_string()))
}
