//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Drive the process-wide notepad session from UI intents and hand back a
//!   render-ready snapshot of the screen state.
//! - Expose read-only collection queries for callers outside the session.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One session per process, bound to the configured database path.
//! - Calls touching storage are not marked `sync`; FRB runs them off the UI
//!   isolate and Dart awaits a `Future`.

use log::{info, warn};
use notepad_core::db::open_db;
use notepad_core::{
    core_version as core_version_inner, filter_notes, init_logging as init_logging_inner,
    ping as ping_inner, AppState, DeleteOutcome, Note, NoteStorage, NoteSummary,
    NotepadController, SqliteKvRepository, SubmitOutcome,
};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

const DEFAULT_DB_FILE_NAME: &str = "notepad.sqlite3";
const STORAGE_OPEN_FAILED: &str = "Failed to open note storage";
const NO_MATCHING_NOTE: &str = "No matching note.";
const NOTHING_TO_DELETE: &str = "No delete is awaiting confirmation.";

static STORAGE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static APP_SESSION: Mutex<Option<AppSession>> = Mutex::new(None);

type AppController<'conn> = NotepadController<SqliteKvRepository<'conn>>;

/// Connection plus the screen state between calls.
struct AppSession {
    conn: Connection,
    state: AppState,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Points note storage at the app's documents directory.
///
/// Must run before the first storage call; otherwise storage falls back
/// to `<temp_dir>/notepad.sqlite3` for the rest of the process.
///
/// # FFI contract
/// - Sync call, no I/O.
/// - Same path again is idempotent; a different path is rejected.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_storage(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = Path::new(trimmed);
    if !requested.is_absolute() {
        return format!("db_path must be an absolute path, got `{trimmed}`");
    }

    let active = STORAGE_DB_PATH.get_or_init(|| requested.to_path_buf());
    if active.as_path() == requested {
        String::new()
    } else {
        format!(
            "storage already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Note as seen by Dart. Timestamps are epoch milliseconds (UTC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl From<&Note> for NoteItem {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
            created_at_ms: note.created_at.timestamp_millis(),
            updated_at_ms: note.updated_at.timestamp_millis(),
        }
    }
}

/// One row of the notes list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    pub id: String,
    /// `None` when the note has no title.
    pub title: Option<String>,
    pub preview: String,
    pub updated_label: String,
}

impl From<NoteSummary> for NoteRow {
    fn from(summary: NoteSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            preview: summary.preview,
            updated_label: summary.updated_label,
        }
    }
}

/// Blocking alert to show on top of the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertItem {
    pub title: String,
    pub message: String,
}

/// Render-ready snapshot of the session after one intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppView {
    /// `false` when the intent was refused or storage failed.
    pub ok: bool,
    /// Reason for a refused intent; empty on success.
    pub message: String,
    /// `home|notes|add_note|edit_note`.
    pub screen: String,
    pub is_loading: bool,
    pub search_query: String,
    /// Visible rows, newest first, after the search filter.
    pub rows: Vec<NoteRow>,
    pub empty_headline: Option<String>,
    pub empty_hint: Option<String>,
    /// Note loaded into the edit form.
    pub selected_note: Option<NoteItem>,
    /// Confirmation prompt while a delete is pending.
    pub delete_prompt: Option<String>,
    pub alert: Option<AlertItem>,
}

impl AppView {
    fn render(state: &AppState, outcome: Result<(), String>) -> Self {
        let empty = state.empty_message();
        let (ok, message) = match outcome {
            Ok(()) => (true, String::new()),
            Err(message) => (false, message),
        };
        Self {
            ok,
            message,
            screen: state.current_screen().as_str().to_string(),
            is_loading: state.is_loading,
            search_query: state.search_query.clone(),
            rows: state
                .visible_summaries()
                .into_iter()
                .map(NoteRow::from)
                .collect(),
            empty_headline: empty.map(|copy| copy.headline().to_string()),
            empty_hint: empty.map(|copy| copy.hint().to_string()),
            selected_note: state.selected_note.as_ref().map(NoteItem::from),
            delete_prompt: state
                .pending_delete
                .as_ref()
                .map(|pending| pending.prompt.clone()),
            alert: state.alert.as_ref().map(|alert| AlertItem {
                title: alert.title.clone(),
                message: alert.message.clone(),
            }),
        }
    }

    fn unavailable(message: String) -> Self {
        Self::render(&AppState::default(), Err(message))
    }
}

/// Starts a fresh session on the home screen and loads the collection.
///
/// A collection that fails to load shows as empty.
pub fn app_start() -> AppView {
    drive(true, |controller| {
        controller.start();
        Ok(())
    })
}

/// Returns the current snapshot without changing anything.
pub fn app_view() -> AppView {
    drive(false, |_| Ok(()))
}

pub fn app_open_notes() -> AppView {
    drive(false, |controller| {
        controller.open_notes();
        Ok(())
    })
}

pub fn app_go_home() -> AppView {
    drive(false, |controller| {
        controller.go_home();
        Ok(())
    })
}

pub fn app_open_add_note() -> AppView {
    drive(false, |controller| {
        controller.open_add_note();
        Ok(())
    })
}

pub fn app_cancel_add() -> AppView {
    drive(false, |controller| {
        controller.cancel_add();
        Ok(())
    })
}

/// Opens the edit form for `id`; an unknown id leaves the screen as is.
pub fn app_open_edit_note(id: String) -> AppView {
    drive(false, |controller| {
        if controller.open_edit_note(&id) {
            Ok(())
        } else {
            Err(NO_MATCHING_NOTE.to_string())
        }
    })
}

pub fn app_cancel_edit() -> AppView {
    drive(false, |controller| {
        controller.cancel_edit();
        Ok(())
    })
}

/// Filters the notes list by `query` (case-insensitive substring).
pub fn app_set_search_query(query: String) -> AppView {
    drive(false, |controller| {
        controller.set_search_query(query);
        Ok(())
    })
}

/// Saves the add form. Blank content or another screen is refused before
/// storage is touched.
pub fn app_submit_new_note(title: String, content: String) -> AppView {
    drive(false, |controller| {
        submit_result(controller.submit_new_note(&title, &content))
    })
}

/// Saves the edit form for the selected note.
pub fn app_submit_edit(title: String, content: String) -> AppView {
    drive(false, |controller| {
        submit_result(controller.submit_edit(&title, &content))
    })
}

/// Asks for confirmation before deleting `id`.
pub fn app_request_delete(id: String) -> AppView {
    drive(false, |controller| {
        if controller.request_delete(&id) {
            Ok(())
        } else {
            Err(NO_MATCHING_NOTE.to_string())
        }
    })
}

pub fn app_confirm_delete() -> AppView {
    drive(false, |controller| match controller.confirm_delete() {
        DeleteOutcome::Deleted => Ok(()),
        DeleteOutcome::NothingPending => Err(NOTHING_TO_DELETE.to_string()),
        DeleteOutcome::Failed(alert) => Err(alert.message),
    })
}

pub fn app_cancel_delete() -> AppView {
    drive(false, |controller| {
        controller.cancel_delete();
        Ok(())
    })
}

pub fn app_dismiss_alert() -> AppView {
    drive(false, |controller| {
        controller.dismiss_alert();
        Ok(())
    })
}

/// Collection response envelope for read-only queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesResponse {
    pub ok: bool,
    /// Notes newest first; empty on failure.
    pub items: Vec<NoteItem>,
    /// Human-readable message for diagnostics/UI alerts.
    pub message: String,
}

/// Loads the whole collection, newest first.
pub fn notes_load() -> NotesResponse {
    notes_response(with_note_storage(|storage| {
        storage.load().map_err(|err| err.to_string())
    }))
}

/// Loads the collection and keeps notes whose title or content contains
/// `query` (case-insensitive). A blank query returns everything.
pub fn notes_search(query: String) -> NotesResponse {
    notes_response(with_note_storage(|storage| {
        let notes = storage.load().map_err(|err| err.to_string())?;
        Ok(filter_notes(&notes, &query).into_iter().cloned().collect())
    }))
}

fn submit_result(outcome: SubmitOutcome) -> Result<(), String> {
    match outcome {
        SubmitOutcome::Saved(_) => Ok(()),
        SubmitOutcome::Rejected(reason) => Err(reason.message().to_string()),
        SubmitOutcome::Failed(alert) => Err(alert.message),
    }
}

fn drive(
    fresh: bool,
    intent: impl FnOnce(&mut AppController<'_>) -> Result<(), String>,
) -> AppView {
    let view = with_app_session(fresh, |controller| {
        let outcome = intent(controller);
        AppView::render(controller.state(), outcome)
    });
    view.unwrap_or_else(AppView::unavailable)
}

fn with_app_session<T>(
    fresh: bool,
    f: impl FnOnce(&mut AppController<'_>) -> T,
) -> Result<T, String> {
    let mut guard = APP_SESSION
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if guard.is_none() {
        let conn = open_storage()?;
        info!("event=ffi_session_open module=ffi status=ok");
        *guard = Some(AppSession {
            conn,
            state: AppState::default(),
        });
    }
    let Some(AppSession { conn, state }) = guard.as_mut() else {
        return Err(STORAGE_OPEN_FAILED.to_string());
    };
    if fresh {
        *state = AppState::default();
    }

    let repo = SqliteKvRepository::try_new(conn).map_err(|err| {
        warn!("event=ffi_session_repo module=ffi status=error error={err}");
        STORAGE_OPEN_FAILED.to_string()
    })?;
    let mut controller =
        NotepadController::with_state(NoteStorage::new(repo), std::mem::take(state));
    let value = f(&mut controller);
    *state = controller.into_state();
    Ok(value)
}

fn notes_response(result: Result<Vec<Note>, String>) -> NotesResponse {
    match result {
        Ok(notes) => {
            let items = notes.iter().map(NoteItem::from).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No notes.".to_string()
            } else {
                format!("Found {} note(s).", items.len())
            };
            NotesResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(message) => NotesResponse {
            ok: false,
            items: Vec::new(),
            message,
        },
    }
}

fn resolve_db_path() -> PathBuf {
    STORAGE_DB_PATH
        .get_or_init(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME))
        .clone()
}

fn open_storage() -> Result<Connection, String> {
    open_db(resolve_db_path()).map_err(|err| {
        warn!("event=ffi_storage_open module=ffi status=error error={err}");
        STORAGE_OPEN_FAILED.to_string()
    })
}

fn with_note_storage<T>(
    f: impl FnOnce(&NoteStorage<SqliteKvRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let conn = open_storage()?;
    let repo = SqliteKvRepository::try_new(&conn).map_err(|err| {
        warn!("event=ffi_storage_open module=ffi status=error error={err}");
        STORAGE_OPEN_FAILED.to_string()
    })?;
    let storage = NoteStorage::new(repo);
    f(&storage)
}
