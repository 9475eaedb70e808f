//! Note persistence service.
//!
//! # Responsibility
//! - Load and save the whole note collection under one slot key.
//! - Express add/update/delete as load + in-memory change + save.
//!
//! # Invariants
//! - The collection is always written wholesale; there is no partial write.
//! - New notes are prepended (newest first).
//! - Update/delete on an unknown id write the collection back unchanged.
//! - Every failure surfaces as a `StorageError` with a generic message; the
//!   cause is logged here and kept only as `Error::source()`.

use crate::model::note::Note;
use crate::repo::kv_repo::{KvError, KvRepository};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Slot key under which the collection blob is stored.
pub const NOTES_KEY: &str = "@notepad_notes";

pub type StorageResult<T> = Result<T, StorageError>;

/// Collection operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    Load,
    Save,
    Add,
    Update,
    Delete,
}

impl StorageOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Save => "save",
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    fn user_message(self) -> &'static str {
        match self {
            Self::Load => "Failed to load notes",
            Self::Save => "Failed to save notes",
            Self::Add => "Failed to add note",
            Self::Update => "Failed to update note",
            Self::Delete => "Failed to delete note",
        }
    }
}

#[derive(Debug)]
enum StorageCause {
    Kv(KvError),
    Json(serde_json::Error),
}

/// Flat storage failure covering read, write and parse errors.
#[derive(Debug)]
pub struct StorageError {
    op: StorageOp,
    cause: StorageCause,
}

impl StorageError {
    /// Operation the caller invoked when the failure happened.
    pub fn op(&self) -> StorageOp {
        self.op
    }

    /// Re-labels a failure from an inner `load`/`save` with the outer
    /// compound operation.
    fn within(self, op: StorageOp) -> Self {
        Self { op, ..self }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.op.user_message())
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            StorageCause::Kv(err) => Some(err),
            StorageCause::Json(err) => Some(err),
        }
    }
}

/// Persistence service for the note collection.
pub struct NoteStorage<R: KvRepository> {
    repo: R,
    key: String,
}

impl<R: KvRepository> NoteStorage<R> {
    /// Creates a service that stores the collection under [`NOTES_KEY`].
    pub fn new(repo: R) -> Self {
        Self::with_key(repo, NOTES_KEY)
    }

    /// Creates a service that stores the collection under a custom key.
    pub fn with_key(repo: R, key: impl Into<String>) -> Self {
        Self {
            repo,
            key: key.into(),
        }
    }

    /// Slot key used by this service.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying slot repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Reads the whole collection.
    ///
    /// Returns an empty collection when nothing has been saved yet.
    pub fn load(&self) -> StorageResult<Vec<Note>> {
        let started_at = Instant::now();
        let raw = self
            .repo
            .get_item(&self.key)
            .map_err(|err| self.fail(StorageOp::Load, StorageCause::Kv(err)))?;

        let Some(raw) = raw else {
            debug!("event=notes_load module=storage status=ok count=0 slot=empty");
            return Ok(Vec::new());
        };

        let notes: Vec<Note> = serde_json::from_str(&raw)
            .map_err(|err| self.fail(StorageOp::Load, StorageCause::Json(err)))?;
        debug!(
            "event=notes_load module=storage status=ok count={} bytes={} duration_ms={}",
            notes.len(),
            raw.len(),
            started_at.elapsed().as_millis()
        );
        Ok(notes)
    }

    /// Replaces the stored collection with `notes`.
    pub fn save(&self, notes: &[Note]) -> StorageResult<()> {
        let started_at = Instant::now();
        let raw = serde_json::to_string(notes)
            .map_err(|err| self.fail(StorageOp::Save, StorageCause::Json(err)))?;
        self.repo
            .set_item(&self.key, &raw)
            .map_err(|err| self.fail(StorageOp::Save, StorageCause::Kv(err)))?;
        debug!(
            "event=notes_save module=storage status=ok count={} bytes={} duration_ms={}",
            notes.len(),
            raw.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Prepends `note` and returns the collection that was written.
    pub fn add(&self, note: Note) -> StorageResult<Vec<Note>> {
        let note_id = note.id.clone();
        let notes = self.mutate(StorageOp::Add, |notes| notes.insert(0, note))?;
        info!(
            "event=note_add module=storage status=ok note_id={} count={}",
            note_id,
            notes.len()
        );
        Ok(notes)
    }

    /// Replaces the note with the same id and returns the collection that
    /// was written. An unknown id leaves the collection unchanged.
    pub fn update(&self, note: &Note) -> StorageResult<Vec<Note>> {
        let mut matched = false;
        let notes = self.mutate(StorageOp::Update, |notes| {
            for existing in notes.iter_mut().filter(|existing| existing.id == note.id) {
                *existing = note.clone();
                matched = true;
            }
        })?;
        info!(
            "event=note_update module=storage status=ok note_id={} matched={}",
            note.id, matched
        );
        Ok(notes)
    }

    /// Removes the note with `id` and returns the collection that was
    /// written. An unknown id leaves the collection unchanged.
    pub fn delete(&self, id: &str) -> StorageResult<Vec<Note>> {
        let mut removed = 0;
        let notes = self.mutate(StorageOp::Delete, |notes| {
            let before = notes.len();
            notes.retain(|note| note.id != id);
            removed = before - notes.len();
        })?;
        info!(
            "event=note_delete module=storage status=ok note_id={} removed={}",
            id, removed
        );
        Ok(notes)
    }

    fn mutate(
        &self,
        op: StorageOp,
        change: impl FnOnce(&mut Vec<Note>),
    ) -> StorageResult<Vec<Note>> {
        let mut notes = self.load().map_err(|err| err.within(op))?;
        change(&mut notes);
        self.save(&notes).map_err(|err| err.within(op))?;
        Ok(notes)
    }

    fn fail(&self, op: StorageOp, cause: StorageCause) -> StorageError {
        let err = StorageError { op, cause };
        let detail = err
            .source()
            .map(ToString::to_string)
            .unwrap_or_default();
        error!(
            "event=notes_{} module=storage status=error key={} error={}",
            op.as_str(),
            self.key,
            detail
        );
        err
    }
}
