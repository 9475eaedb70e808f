//! Key-value slot repositories.
//!
//! # Responsibility
//! - Define the device-local string slot contract (`get/set/remove`).
//! - Isolate SQLite query details from the note persistence service.
//!
//! # Invariants
//! - One key maps to at most one value; `set_item` replaces wholesale.
//! - Reading a missing key is `Ok(None)`, never an error.

pub mod kv_repo;
pub mod memory_repo;
