//! Snap application metadata and priming.
//!
//! # Responsibility
//! - Model the `apps` entries of snap metadata.
//! - Finalize command references against the primed file layout, writing
//!   wrapper scripts and desktop entries where needed.
//!
//! # Invariants
//! - After priming, `command`/`stop-command` hold either a relative command
//!   or the generated wrapper file name.
//! - Every command-chain entry is an executable file inside the prime dir.

pub mod application;
pub mod command;
pub mod desktop;
pub mod octal;
