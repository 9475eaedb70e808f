//! List-row projections for the notes screen.
//!
//! # Responsibility
//! - Derive compact preview text and date labels for list rows.
//! - Pick the empty-state copy for an empty list.

use crate::model::note::{Note, NoteId};
use once_cell::sync::Lazy;
use regex::Regex;

const PREVIEW_MAX_CHARS: usize = 100;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// One row in the notes list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSummary {
    pub id: NoteId,
    /// Note title, `None` when blank (row shows content only).
    pub title: Option<String>,
    /// Content with whitespace collapsed, capped at 100 chars.
    pub preview: String,
    /// `YYYY-MM-DD at HH:MM` of the last edit, UTC.
    pub updated_label: String,
}

impl NoteSummary {
    pub fn from_note(note: &Note) -> Self {
        let title = note.title.trim();
        Self {
            id: note.id.clone(),
            title: (!title.is_empty()).then(|| title.to_string()),
            preview: preview_text(&note.content),
            updated_label: note.updated_at.format("%Y-%m-%d at %H:%M").to_string(),
        }
    }
}

/// Empty-state copy for the notes list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyListMessage {
    /// Collection is empty.
    NoNotes,
    /// Collection is non-empty but the active query matched nothing.
    NoResults,
}

impl EmptyListMessage {
    /// Chooses the copy for an empty view; `None` when rows are visible.
    pub fn for_view(visible_rows: usize, query: &str) -> Option<Self> {
        if visible_rows > 0 {
            return None;
        }
        if query.is_empty() {
            Some(Self::NoNotes)
        } else {
            Some(Self::NoResults)
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Self::NoNotes => "No notes yet",
            Self::NoResults => "No notes found",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Self::NoNotes => "Tap the + button to create your first note",
            Self::NoResults => "Try a different search term",
        }
    }
}

/// Collapses whitespace runs and keeps the first 100 chars.
pub fn preview_text(content: &str) -> String {
    let normalized = WHITESPACE_RE.replace_all(content, " ");
    let trimmed = normalized.trim();
    let mut preview: String = trimmed.chars().take(PREVIEW_MAX_CHARS).collect();
    if trimmed.chars().count() > PREVIEW_MAX_CHARS {
        preview.push_str("...");
    }
    preview
}
