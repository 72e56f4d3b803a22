//! Core domain logic for snapkit.
//!
//! Assertion editing and listing, the local assertion store and snap app
//! priming live here; the CLI only wires them to the terminal.

pub mod config;
pub mod db;
pub mod logging;
pub mod meta;
pub mod model;
pub mod service;
pub mod store;

pub use config::{editor_command, SessionConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use meta::application::{Adapter, Application, ApplicationError};
pub use meta::command::{CommandKind, CommandState, ExecutableProblem};
pub use meta::desktop::{DesktopFile, DesktopFileError};
pub use model::assertion::{AssertionValidationError, EditableAssertion};
pub use model::confdb_schema::{ConfdbSchema, EditableConfdbSchema};
pub use service::assertion_service::{AssertionError, AssertionKind, AssertionService};
pub use service::confdb_schema_service::ConfdbSchemas;
pub use service::console::Console;
pub use service::editor::{Editor, EditorError, ExternalEditor};
pub use store::confdb_schema_store::{ConfdbSchemaStore, SqliteConfdbSchemaStore};
pub use store::{StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
