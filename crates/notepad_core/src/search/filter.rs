//! Case-insensitive substring filter over the note collection.
//!
//! # Invariants
//! - A blank query returns every note.
//! - Matches keep the collection order; nothing is re-ranked.

use crate::model::note::{is_blank, Note};

/// Returns the notes whose title or content contains `query`, ignoring case.
///
/// The query is only trimmed to decide whether it is blank; a non-blank
/// query is matched as typed (lower-cased), inner and edge spaces included.
pub fn filter_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    if is_blank(query) {
        return notes.iter().collect();
    }

    let needle = query.to_lowercase();
    notes
        .iter()
        .filter(|note| matches_query(note, &needle))
        .collect()
}

fn matches_query(note: &Note, lowered_query: &str) -> bool {
    note.title.to_lowercase().contains(lowered_query)
        || note.content.to_lowercase().contains(lowered_query)
}

#[cfg(test)]
mod tests {
    use super::filter_notes;
    use crate::model::note::Note;
    use chrono::{TimeZone, Utc};

    fn note(title: &str, content: &str) -> Note {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Note::new_at(title, content, at).unwrap()
    }

    #[test]
    fn query_with_surrounding_space_is_matched_as_typed() {
        let notes = vec![note("", "buy milk"), note("", "milkshake")];

        let hits = filter_notes(&notes, " milk");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "buy milk");
    }

    #[test]
    fn whitespace_only_query_returns_everything() {
        let notes = vec![note("a", "1"), note("b", "2")];
        assert_eq!(filter_notes(&notes, "   ").len(), 2);
    }
}
