use chrono::{TimeZone, Utc};
use notepad_core::{filter_notes, Note};

fn shopping_and_work() -> Vec<Note> {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    vec![
        Note::with_id("1", "Shopping", "milk", at).unwrap(),
        Note::with_id("2", "Work", "report", at).unwrap(),
    ]
}

#[test]
fn substring_query_matches_content() {
    let notes = shopping_and_work();

    let hits = filter_notes(&notes, "mil");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Shopping");
}

#[test]
fn empty_query_returns_all_in_original_order() {
    let notes = shopping_and_work();

    let hits = filter_notes(&notes, "");
    let ids: Vec<&str> = hits.iter().map(|note| note.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[test]
fn matching_ignores_case_on_title_and_content() {
    let notes = shopping_and_work();

    assert_eq!(filter_notes(&notes, "WORK")[0].id, "2");
    assert_eq!(filter_notes(&notes, "RePoRt")[0].id, "2");
    assert_eq!(filter_notes(&notes, "shop")[0].id, "1");
}

#[test]
fn unmatched_query_returns_nothing() {
    let notes = shopping_and_work();
    assert!(filter_notes(&notes, "holiday").is_empty());
}

#[test]
fn multiple_hits_keep_collection_order() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    let notes = vec![
        Note::with_id("n3", "", "plan trip", at).unwrap(),
        Note::with_id("n2", "unrelated", "x", at).unwrap(),
        Note::with_id("n1", "Trip budget", "y", at).unwrap(),
    ];

    let ids: Vec<&str> = filter_notes(&notes, "trip")
        .iter()
        .map(|note| note.id.as_str())
        .collect();
    assert_eq!(ids, vec!["n3", "n1"]);
}
