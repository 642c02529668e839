//! Reloads an export document.
//!
//! Each note is re-inserted as if it were created fresh:
//!
//! - it gets a new ID from the allocator,
//! - its patch log is re-validated by reconstruction,
//! - its size is recomputed and checked against the capacity,
//! - one history entry with the reconstructed content is written.
//!
//! Type, title, tags, the deleted flag and timestamps are kept. The whole
//! document goes through the caller's single write transaction, so one bad
//! note aborts the import.

use crate::error::{JotzError, Result};
use crate::logging::TARGET;
use crate::model::{History, Note};
use crate::patch;
use crate::store::meta::{adjust_total_size, check_delta, next_id, size_delta};
use crate::store::WriteTxn;
use crate::tags::normalize_tags;
use tracing::debug;

/// Parses an export document.
pub fn parse(json: &str) -> Result<Vec<Note>> {
    serde_json::from_str(json)
        .map_err(|e| JotzError::validation(format!("not an export document: {}", e)))
}

/// Inserts `notes` and returns them as stored, with their new IDs.
pub fn import(tx: &WriteTxn, notes: Vec<Note>) -> Result<Vec<Note>> {
    let mut imported = Vec::with_capacity(notes.len());
    for incoming in notes {
        let content = patch::reconstruct(&incoming.patches).map_err(|e| {
            JotzError::validation(format!(
                "note {} does not reconstruct: {}",
                incoming.id, e
            ))
        })?;
        let tags = normalize_tags(&incoming.tags.iter().collect::<Vec<_>>())?;
        let size = content.len() as u64;
        let delta = size_delta(0, size)?;
        check_delta(tx, delta)?;

        let note = Note {
            id: next_id(tx)?,
            tags,
            size,
            ..incoming
        };
        tx.put_note(&note)?;
        tx.put_history(&History::new(next_id(tx)?, note.id.clone(), content))?;
        adjust_total_size(tx, delta)?;
        imported.push(note);
    }
    debug!(target: TARGET, count = imported.len(), "notes imported");
    Ok(imported)
}
