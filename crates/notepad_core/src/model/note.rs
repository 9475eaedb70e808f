//! Note record, validation and wire encoding.
//!
//! # Responsibility
//! - Build notes from form input (trimmed title/content, fresh id, timestamps).
//! - Produce edited copies that refresh `updated_at` only.
//! - Encode timestamps as RFC 3339 strings with millisecond precision.
//!
//! # Invariants
//! - `content` is non-empty after trimming.
//! - `updated_at >= created_at`.
//! - Timestamps carry millisecond precision, so a serialize/deserialize
//!   round trip is lossless.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable note identifier.
///
/// Kept as an opaque string: records written by older builds used
/// millisecond timestamps as ids and must still load.
pub type NoteId = String;

/// Validation failures for note construction and edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyId,
    EmptyContent,
    UpdatedBeforeCreated {
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "note id must not be empty"),
            Self::EmptyContent => write!(f, "note content must not be empty"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must not be earlier than created_at ({created_at})"
            ),
        }
    }
}

impl Error for NoteValidationError {}

/// A user-authored text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    /// Optional heading; empty when the user left it blank.
    #[serde(default)]
    pub title: String,
    pub content: String,
    #[serde(with = "iso8601_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso8601_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates a note from form input with a fresh id and `now` timestamps.
    ///
    /// Title and content are trimmed.
    ///
    /// # Errors
    /// - `EmptyContent` when `content` is blank.
    pub fn new(title: &str, content: &str) -> Result<Self, NoteValidationError> {
        Self::new_at(title, content, now_millis())
    }

    /// Same as [`Note::new`] with a caller-provided creation instant.
    pub fn new_at(
        title: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Self, NoteValidationError> {
        Self::with_id(new_note_id(), title, content, at)
    }

    /// Creates a note with a caller-provided id.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(
        id: impl Into<NoteId>,
        title: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Self, NoteValidationError> {
        let at = at.trunc_subsecs(3);
        let note = Self {
            id: id.into(),
            title: trim_form_text(title).to_string(),
            content: trim_form_text(content).to_string(),
            created_at: at,
            updated_at: at,
        };
        note.validate()?;
        Ok(note)
    }

    /// Returns an edited copy with new title/content and a refreshed
    /// `updated_at`. `id` and `created_at` are carried over.
    pub fn edited(&self, title: &str, content: &str) -> Result<Self, NoteValidationError> {
        self.edited_at(title, content, now_millis())
    }

    /// Same as [`Note::edited`] with a caller-provided edit instant.
    ///
    /// A clock that reads earlier than `created_at` is clamped to it.
    pub fn edited_at(
        &self,
        title: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Self, NoteValidationError> {
        let edited = Self {
            id: self.id.clone(),
            title: trim_form_text(title).to_string(),
            content: trim_form_text(content).to_string(),
            created_at: self.created_at,
            updated_at: at.trunc_subsecs(3).max(self.created_at),
        };
        edited.validate()?;
        Ok(edited)
    }

    /// Checks record invariants.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.id.trim().is_empty() {
            return Err(NoteValidationError::EmptyId);
        }
        if is_blank(&self.content) {
            return Err(NoteValidationError::EmptyContent);
        }
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

/// Generates a collision-resistant note id (UUID v4).
pub fn new_note_id() -> NoteId {
    Uuid::new_v4().to_string()
}

/// Strips surrounding whitespace from form text, including U+FEFF.
pub fn trim_form_text(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

/// Returns whether form text is empty after trimming.
pub fn is_blank(value: &str) -> bool {
    trim_form_text(value).is_empty()
}

/// Current UTC time truncated to the wire precision.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

mod iso8601_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|value| value.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{is_blank, trim_form_text, Note, NoteValidationError};
    use chrono::{TimeZone, Utc};

    #[test]
    fn new_trims_input_and_sets_equal_timestamps() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let note = Note::new_at("  Groceries ", "\n milk  ", at).unwrap();

        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "milk");
        assert_eq!(note.created_at, at);
        assert_eq!(note.updated_at, at);
        assert!(!note.id.is_empty());
    }

    #[test]
    fn new_rejects_whitespace_content() {
        let err = Note::new("title", "   ").unwrap_err();
        assert_eq!(err, NoteValidationError::EmptyContent);
    }

    #[test]
    fn fresh_ids_do_not_collide_within_same_instant() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let first = Note::new_at("", "a", at).unwrap();
        let second = Note::new_at("", "b", at).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn edited_clamps_clock_skew_to_created_at() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let note = Note::new_at("", "body", created).unwrap();

        let edited = note.edited_at("", "new body", earlier).unwrap();
        assert_eq!(edited.updated_at, created);
    }

    #[test]
    fn blank_detection_trims_unicode_whitespace() {
        assert!(is_blank(" \t\n\u{3000}"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn byte_order_mark_counts_as_blank_and_is_trimmed() {
        assert!(is_blank("\u{FEFF}"));
        assert!(is_blank(" \u{FEFF}\n"));
        assert_eq!(trim_form_text("\u{FEFF} body \u{FEFF}"), "body");

        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(
            Note::new_at("t", "\u{FEFF}", at),
            Err(NoteValidationError::EmptyContent)
        );
        let note = Note::new_at("\u{FEFF}Title", "text\u{FEFF}", at).unwrap();
        assert_eq!(note.title, "Title");
        assert_eq!(note.content, "text");
    }
}
