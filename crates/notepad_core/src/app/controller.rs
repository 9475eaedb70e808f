//! Use-case controller driving `AppState` from user intents.
//!
//! # Responsibility
//! - Run form validation before any persistence call.
//! - Call the persistence service, then dispatch the matching action.
//! - Turn storage failures into blocking alerts.
//!
//! # Invariants
//! - Blank content never reaches the persistence service.
//! - Forms only submit from their own screen.
//! - State is only updated with the collection storage actually wrote.
//! - A failed startup load degrades to an empty list without an alert.

use crate::app::state::{Action, Alert, AppState, Screen};
use crate::model::note::{is_blank, Note};
use crate::repo::kv_repo::KvRepository;
use crate::service::note_storage::{NoteStorage, StorageError};
use log::{debug, warn};

/// Why a form submit was refused before touching storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    EmptyContent,
    NoNoteSelected,
    /// The add form is not the current screen.
    NotOnAddScreen,
}

impl SubmitRejection {
    /// Short user-facing reason.
    pub fn message(self) -> &'static str {
        match self {
            Self::EmptyContent => "Note content cannot be empty.",
            Self::NoNoteSelected => "No note is open for editing.",
            Self::NotOnAddScreen => "The new-note form is not open.",
        }
    }
}

/// Result of submitting the add or edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Note persisted; the controller is back on the notes screen.
    Saved(Note),
    Rejected(SubmitRejection),
    /// Storage failed; an alert was raised and the form stays open.
    Failed(Alert),
}

/// Result of confirming a pending delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NothingPending,
    Failed(Alert),
}

/// Owns the application state and the persistence dependency.
pub struct NotepadController<R: KvRepository> {
    storage: NoteStorage<R>,
    state: AppState,
}

impl<R: KvRepository> NotepadController<R> {
    pub fn new(storage: NoteStorage<R>) -> Self {
        Self {
            storage,
            state: AppState::default(),
        }
    }

    /// Resumes from a previously taken state snapshot.
    pub fn with_state(storage: NoteStorage<R>, state: AppState) -> Self {
        Self { storage, state }
    }

    /// Gives the state back so it can outlive the borrowed storage.
    pub fn into_state(self) -> AppState {
        self.state
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn storage(&self) -> &NoteStorage<R> {
        &self.storage
    }

    /// Applies one action to the owned state.
    pub fn dispatch(&mut self, action: Action) {
        debug!("event=app_dispatch module=app action={}", action_name(&action));
        self.state.apply(action);
    }

    /// Loads the collection for first render.
    pub fn start(&mut self) {
        self.dispatch(Action::LoadStarted);
        let notes = match self.storage.load() {
            Ok(notes) => notes,
            Err(err) => {
                warn!(
                    "event=app_start_load module=app status=degraded error={}",
                    err
                );
                Vec::new()
            }
        };
        self.dispatch(Action::NotesLoaded(notes));
    }

    pub fn go_home(&mut self) {
        self.dispatch(Action::NavigateHome);
    }

    pub fn open_notes(&mut self) {
        self.dispatch(Action::NavigateNotes);
    }

    pub fn open_add_note(&mut self) {
        self.dispatch(Action::OpenAddNote);
    }

    pub fn cancel_add(&mut self) {
        self.dispatch(Action::NavigateNotes);
    }

    /// Opens the edit form for `id`. Returns `false` for an unknown id.
    pub fn open_edit_note(&mut self, id: &str) -> bool {
        let Some(note) = self.state.find_note(id).cloned() else {
            return false;
        };
        self.dispatch(Action::OpenEditNote(note));
        true
    }

    pub fn cancel_edit(&mut self) {
        self.dispatch(Action::NavigateNotes);
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.dispatch(Action::SearchChanged(query.into()));
    }

    /// Validates and persists a new note, then returns to the list.
    pub fn submit_new_note(&mut self, title: &str, content: &str) -> SubmitOutcome {
        if self.state.current_screen() != Screen::AddNote {
            return SubmitOutcome::Rejected(SubmitRejection::NotOnAddScreen);
        }
        if is_blank(content) {
            return SubmitOutcome::Rejected(SubmitRejection::EmptyContent);
        }
        let note = match Note::new(title, content) {
            Ok(note) => note,
            Err(_) => return SubmitOutcome::Rejected(SubmitRejection::EmptyContent),
        };

        match self.storage.add(note.clone()) {
            Ok(notes) => {
                self.dispatch(Action::NotesReplaced(notes));
                self.dispatch(Action::NavigateNotes);
                SubmitOutcome::Saved(note)
            }
            Err(err) => SubmitOutcome::Failed(self.raise(&err)),
        }
    }

    /// Validates and persists edits to the selected note, then returns to
    /// the list.
    pub fn submit_edit(&mut self, title: &str, content: &str) -> SubmitOutcome {
        let Some(selected) = self.editing_note() else {
            return SubmitOutcome::Rejected(SubmitRejection::NoNoteSelected);
        };
        if is_blank(content) {
            return SubmitOutcome::Rejected(SubmitRejection::EmptyContent);
        }
        let edited = match selected.edited(title, content) {
            Ok(note) => note,
            Err(_) => return SubmitOutcome::Rejected(SubmitRejection::EmptyContent),
        };

        match self.storage.update(&edited) {
            Ok(notes) => {
                self.dispatch(Action::NotesReplaced(notes));
                self.dispatch(Action::NavigateNotes);
                SubmitOutcome::Saved(edited)
            }
            Err(err) => SubmitOutcome::Failed(self.raise(&err)),
        }
    }

    /// Asks for confirmation before deleting `id`. Returns `false` for an
    /// unknown id.
    pub fn request_delete(&mut self, id: &str) -> bool {
        self.dispatch(Action::DeleteRequested(id.to_string()));
        self.state.pending_delete.is_some()
    }

    pub fn cancel_delete(&mut self) {
        self.dispatch(Action::DeleteCancelled);
    }

    /// Deletes the note awaiting confirmation.
    pub fn confirm_delete(&mut self) -> DeleteOutcome {
        let Some(pending) = self.state.pending_delete.clone() else {
            return DeleteOutcome::NothingPending;
        };

        match self.storage.delete(&pending.note_id) {
            Ok(notes) => {
                self.dispatch(Action::NotesReplaced(notes));
                DeleteOutcome::Deleted
            }
            Err(err) => {
                self.dispatch(Action::DeleteCancelled);
                DeleteOutcome::Failed(self.raise(&err))
            }
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.dispatch(Action::AlertDismissed);
    }

    fn editing_note(&self) -> Option<Note> {
        if self.state.current_screen() != Screen::EditNote {
            return None;
        }
        self.state.selected_note.clone()
    }

    fn raise(&mut self, err: &StorageError) -> Alert {
        let alert = Alert::error(err.to_string());
        self.dispatch(Action::AlertRaised(alert.clone()));
        alert
    }
}

fn action_name(action: &Action) -> &'static str {
    match action {
        Action::LoadStarted => "load_started",
        Action::NotesLoaded(_) => "notes_loaded",
        Action::NavigateHome => "navigate_home",
        Action::NavigateNotes => "navigate_notes",
        Action::OpenAddNote => "open_add_note",
        Action::OpenEditNote(_) => "open_edit_note",
        Action::SearchChanged(_) => "search_changed",
        Action::NotesReplaced(_) => "notes_replaced",
        Action::DeleteRequested(_) => "delete_requested",
        Action::DeleteCancelled => "delete_cancelled",
        Action::AlertRaised(_) => "alert_raised",
        Action::AlertDismissed => "alert_dismissed",
    }
}
