//! Assertion use-case services.
//!
//! # Responsibility
//! - Orchestrate store queries, editor sessions and console output into
//!   list/edit use-cases.
//! - Keep CLI code decoupled from store and editor details.

pub mod assertion_service;
pub mod confdb_schema_service;
pub mod console;
pub mod edit_session;
pub mod editor;
pub mod table;
