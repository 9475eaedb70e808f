//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate slot repository calls into note collection operations.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod note_storage;
