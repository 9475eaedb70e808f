//! Note domain model.
//!
//! # Responsibility
//! - Define the single record type persisted in the collection blob.
//! - Own identifier generation and timestamp encoding.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - `id` and `created_at` never change after creation.

pub mod note;
