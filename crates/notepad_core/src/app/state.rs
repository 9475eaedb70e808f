//! Screen selector, transient UI state and the action reducer.
//!
//! # Invariants
//! - Screen flow is `home -> notes -> add/edit -> notes`.
//! - `EditNote` without a selected note renders as `Home`.
//! - Search query and delete confirmation belong to the notes screen and
//!   are dropped when leaving it.

use crate::model::note::{Note, NoteId};
use crate::search::filter::filter_notes;
use crate::search::summary::{EmptyListMessage, NoteSummary};

/// Top-level screen selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Home,
    Notes,
    AddNote,
    EditNote,
}

impl Screen {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Notes => "notes",
            Self::AddNote => "add_note",
            Self::EditNote => "edit_note",
        }
    }
}

/// Blocking alert shown after a failed user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            message: message.into(),
        }
    }
}

/// Delete awaiting explicit user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub note_id: NoteId,
    pub prompt: String,
}

impl DeleteConfirmation {
    fn for_note(note: &Note) -> Self {
        let label = note.title.trim();
        let label = if label.is_empty() { "this note" } else { label };
        Self {
            note_id: note.id.clone(),
            prompt: format!("Are you sure you want to delete \"{label}\"?"),
        }
    }
}

/// Discrete state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoadStarted,
    /// Initial collection read finished (empty on failure).
    NotesLoaded(Vec<Note>),
    NavigateHome,
    NavigateNotes,
    OpenAddNote,
    OpenEditNote(Note),
    SearchChanged(String),
    /// Collection written by a successful add/update/delete.
    NotesReplaced(Vec<Note>),
    DeleteRequested(NoteId),
    DeleteCancelled,
    AlertRaised(Alert),
    AlertDismissed,
}

/// Everything the screens render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub screen: Screen,
    /// Full collection, newest first, mirroring what storage holds.
    pub notes: Vec<Note>,
    pub selected_note: Option<Note>,
    pub search_query: String,
    pub pending_delete: Option<DeleteConfirmation>,
    pub is_loading: bool,
    pub alert: Option<Alert>,
}

impl AppState {
    /// Reduces one action into the state.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::LoadStarted => self.is_loading = true,
            Action::NotesLoaded(notes) => {
                self.notes = notes;
                self.is_loading = false;
            }
            Action::NavigateHome => self.go_to(Screen::Home),
            Action::NavigateNotes => self.go_to(Screen::Notes),
            Action::OpenAddNote => self.go_to(Screen::AddNote),
            Action::OpenEditNote(note) => {
                self.go_to(Screen::EditNote);
                self.selected_note = Some(note);
            }
            Action::SearchChanged(query) => self.search_query = query,
            Action::NotesReplaced(notes) => {
                self.notes = notes;
                let still_present = self
                    .pending_delete
                    .as_ref()
                    .is_some_and(|pending| self.find_note(&pending.note_id).is_some());
                if !still_present {
                    self.pending_delete = None;
                }
            }
            Action::DeleteRequested(id) => {
                self.pending_delete = self.find_note(&id).map(DeleteConfirmation::for_note);
            }
            Action::DeleteCancelled => self.pending_delete = None,
            Action::AlertRaised(alert) => self.alert = Some(alert),
            Action::AlertDismissed => self.alert = None,
        }
    }

    /// Screen to render; falls back to `Home` for an edit with no selection.
    pub fn current_screen(&self) -> Screen {
        match (self.screen, &self.selected_note) {
            (Screen::EditNote, None) => Screen::Home,
            (screen, _) => screen,
        }
    }

    /// Notes matching the current search query, collection order.
    pub fn visible_notes(&self) -> Vec<&Note> {
        filter_notes(&self.notes, &self.search_query)
    }

    /// List rows for the visible notes.
    pub fn visible_summaries(&self) -> Vec<NoteSummary> {
        self.visible_notes()
            .into_iter()
            .map(NoteSummary::from_note)
            .collect()
    }

    /// Empty-state copy, `None` when at least one row is visible.
    pub fn empty_message(&self) -> Option<EmptyListMessage> {
        EmptyListMessage::for_view(self.visible_notes().len(), &self.search_query)
    }

    pub fn find_note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    fn go_to(&mut self, next: Screen) {
        if self.screen == Screen::Notes && next != Screen::Notes {
            self.search_query.clear();
            self.pending_delete = None;
        }
        if next != Screen::EditNote {
            self.selected_note = None;
        }
        self.screen = next;
    }
}
