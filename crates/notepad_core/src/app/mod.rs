//! Application state and use-case controller.
//!
//! # Responsibility
//! - Hold everything the screens render in one explicit `AppState`.
//! - Express every state change as a discrete `Action`.
//! - Keep persistence side effects in `NotepadController` only.
//!
//! # Invariants
//! - `AppState::apply` is pure: no I/O, no clock reads.
//! - A failed persistence call never changes `AppState::notes`.

pub mod controller;
pub mod state;
