//! Notes and their patch log.
//!
//! A note never stores its content directly. It stores the list of unified
//! diffs that produced it, and the content is the fold of those diffs over
//! the empty string. Every content mutation:
//!
//! 1. reconstructs the current content,
//! 2. applies the caller's patch (a patch that does not apply is rejected),
//! 3. checks the net size change against the capacity,
//! 4. appends the patch and writes a history snapshot of the result,
//! 5. adjusts the running total.
//!
//! All inside the caller's write transaction.

use super::{history, newest_first, stored_content};
use crate::config::JotzConfig;
use crate::error::{JotzError, Result};
use crate::id::Id;
use crate::logging::TARGET;
use crate::model::{derive_title, History, Note, NoteType};
use crate::patch;
use crate::store::meta::{adjust_total_size, check_delta, next_id, size_delta};
use crate::store::{Records, WriteTxn};
use crate::tags::require_tags;
use chrono::Utc;
use tracing::debug;

/// Caller input for [`create`].
#[derive(Debug, Clone)]
pub struct NewNote {
    pub note_type: NoteType,
    /// Patch producing the initial content from the empty string.
    pub patch: String,
    pub title: Option<String>,
    pub tags: Vec<String>,
}

pub fn create(tx: &WriteTxn, config: &JotzConfig, input: NewNote) -> Result<Note> {
    if input.patch.is_empty() {
        return Err(JotzError::validation("a new note needs a non-empty patch"));
    }
    let tags = require_tags(&input.tags)?;
    let content = patch::apply("", &input.patch).map_err(JotzError::bad_patch)?;
    let size = content.len() as u64;

    let id = next_id(tx)?;
    let delta = size_delta(0, size)?;
    check_delta(tx, delta)?;

    let now = Utc::now();
    let note = Note {
        id: id.clone(),
        note_type: input.note_type,
        title: derive_title(input.title.as_deref(), &content, config.note_title_limit),
        patches: vec![input.patch],
        tags,
        deleted: false,
        size,
        created_at: now,
        updated_at: now,
    };
    tx.put_note(&note)?;
    tx.put_history(&History::new(next_id(tx)?, id, content))?;
    let total = adjust_total_size(tx, delta)?;

    debug!(target: TARGET, note_id = %note.id, size, total_size = total, "note created");
    Ok(note)
}

/// Appends `patch` to the note's log and returns how many history entries
/// the note has afterwards.
///
/// The size delta is taken against the cached size, which is what the
/// running total accounts for.
pub fn append_patch(
    tx: &WriteTxn,
    config: &JotzConfig,
    id: &Id,
    patch: &str,
    title: Option<&str>,
) -> Result<usize> {
    let mut note = tx.require_note(id)?;
    let current = stored_content(&note)?;
    let content = patch::apply(&current, patch).map_err(JotzError::bad_patch)?;
    let size = content.len() as u64;

    let delta = size_delta(note.size, size)?;
    check_delta(tx, delta)?;

    note.patches.push(patch.to_string());
    note.title = derive_title(title, &content, config.note_title_limit);
    note.size = size;
    note.updated_at = Utc::now();
    tx.put_note(&note)?;

    tx.put_history(&History::new(next_id(tx)?, id.clone(), content))?;
    let total = adjust_total_size(tx, delta)?;

    let count = history::count_for_note(tx, id)?;
    debug!(
        target: TARGET,
        note_id = %id,
        delta,
        total_size = total,
        patches = note.patches.len(),
        "patch appended"
    );
    Ok(count)
}

pub fn get<R: Records>(tx: &R, id: &Id) -> Result<Note> {
    tx.require_note(id)
}

/// Current content of a note: its patches folded in order.
pub fn reconstruct<R: Records>(tx: &R, id: &Id) -> Result<String> {
    stored_content(&tx.require_note(id)?)
}

pub fn change_type(tx: &WriteTxn, id: &Id, note_type: NoteType) -> Result<Note> {
    let mut note = tx.require_note(id)?;
    note.note_type = note_type;
    note.updated_at = Utc::now();
    tx.put_note(&note)?;
    Ok(note)
}

/// Replaces the tag set. Raw input is normalized and must yield at least
/// one tag.
pub fn update_tags<S: AsRef<str>>(tx: &WriteTxn, id: &Id, tags: &[S]) -> Result<Note> {
    let tags = require_tags(tags)?;
    let mut note = tx.require_note(id)?;
    note.tags = tags;
    note.updated_at = Utc::now();
    tx.put_note(&note)?;
    Ok(note)
}

/// Which notes a listing includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoteStatus {
    #[default]
    Active,
    Deleted,
    All,
}

impl NoteStatus {
    fn includes(self, note: &Note) -> bool {
        match self {
            NoteStatus::Active => !note.deleted,
            NoteStatus::Deleted => note.deleted,
            NoteStatus::All => true,
        }
    }
}

/// Notes in the given state, most recently modified first.
pub fn list<R: Records>(tx: &R, status: NoteStatus) -> Result<Vec<Note>> {
    let mut notes: Vec<Note> = tx
        .notes()?
        .into_iter()
        .filter(|n| status.includes(n))
        .collect();
    newest_first(&mut notes);
    Ok(notes)
}
