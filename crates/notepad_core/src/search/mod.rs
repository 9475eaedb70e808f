//! Note list search and list-row projections.
//!
//! # Responsibility
//! - Filter the in-memory collection by a free-text query.
//! - Shape list rows and empty-state copy inside core.

pub mod filter;
pub mod summary;
