//! Flutter-facing bindings for Notepad core.

pub mod api;
