//! Note lifecycle: `active -> deleted -> purged`.
//!
//! Soft deletion only flips a flag. The note keeps its patches, its history
//! and its share of the capacity; it just drops out of listings and search.
//! Purging removes the note and every history entry it owns, then releases
//! the note's cached size from the running total.

use super::history;
use crate::error::Result;
use crate::id::Id;
use crate::logging::TARGET;
use crate::model::Note;
use crate::store::meta::{adjust_total_size, size_delta};
use crate::store::{Records, WriteTxn};
use serde::Serialize;
use tracing::debug;

/// Marks a note deleted (`true`) or restores it (`false`).
pub fn set_deleted(tx: &WriteTxn, id: &Id, deleted: bool) -> Result<Note> {
    let mut note = tx.require_note(id)?;
    note.deleted = deleted;
    tx.put_note(&note)?;
    Ok(note)
}

/// Outcome of [`delete_forever`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub note_id: Id,
    pub histories_removed: usize,
    pub freed: u64,
    pub total_size: u64,
}

/// Permanently removes a note, active or soft-deleted.
pub fn delete_forever(tx: &WriteTxn, id: &Id) -> Result<PurgeReport> {
    let note = tx.require_note(id)?;
    let histories_removed = history::purge_for_note(tx, id)?;
    tx.remove_note(id)?;
    let total_size = adjust_total_size(tx, size_delta(note.size, 0)?)?;

    debug!(target: TARGET, note_id = %id, freed = note.size, histories_removed, "note purged");
    Ok(PurgeReport {
        note_id: id.clone(),
        histories_removed,
        freed: note.size,
        total_size,
    })
}
