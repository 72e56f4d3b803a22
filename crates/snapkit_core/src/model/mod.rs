//! Assertion domain models.
//!
//! # Responsibility
//! - Define store-side assertion records and their user-editable projections.
//! - Keep validation of edited content next to the data it guards.
//!
//! # Invariants
//! - Editable projections never carry signature or authority data.
//! - Editable projections compare by value, never by identity.

pub mod assertion;
pub mod confdb_schema;
