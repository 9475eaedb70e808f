//! Core domain logic for Notepad.
//! This crate is the single source of truth for note persistence and the
//! state the screens render.

pub mod app;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use app::controller::{DeleteOutcome, NotepadController, SubmitOutcome, SubmitRejection};
pub use app::state::{Action, Alert, AppState, DeleteConfirmation, Screen};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{
    is_blank, new_note_id, trim_form_text, Note, NoteId, NoteValidationError,
};
pub use repo::kv_repo::{KvError, KvRepository, KvResult, SqliteKvRepository};
pub use repo::memory_repo::MemoryKvRepository;
pub use search::filter::filter_notes;
pub use search::summary::{preview_text, EmptyListMessage, NoteSummary};
pub use service::note_storage::{NoteStorage, StorageError, StorageOp, StorageResult, NOTES_KEY};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
