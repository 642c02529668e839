//! Store statistics and the `doctor` consistency check.

use super::stored_content;
use crate::error::Result;
use crate::id::Id;
use crate::logging::TARGET;
use crate::store::meta::{load_meta, set_total_size};
use crate::store::{Records, WriteTxn};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub total_size: u64,
    pub capacity: u64,
    pub note_count: usize,
    pub deleted_count: usize,
    pub history_count: usize,
    pub tag_group_count: usize,
}

pub fn status<R: Records>(tx: &R) -> Result<StoreStatus> {
    let meta = load_meta(tx)?;
    let notes = tx.notes()?;
    let deleted_count = notes.iter().filter(|n| n.deleted).count();
    Ok(StoreStatus {
        total_size: meta.total_size,
        capacity: meta.capacity,
        note_count: notes.len() - deleted_count,
        deleted_count,
        history_count: tx.histories()?.len(),
        tag_group_count: tx.tag_groups()?.len(),
    })
}

/// What [`doctor`] found and fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DoctorReport {
    pub notes_checked: usize,
    /// Notes whose cached size did not match their content.
    pub fixed_sizes: Vec<Id>,
    /// Notes whose patch log no longer reconstructs. Left untouched.
    pub broken_notes: Vec<Id>,
    pub previous_total: u64,
    pub total_size: u64,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        self.fixed_sizes.is_empty()
            && self.broken_notes.is_empty()
            && self.previous_total == self.total_size
    }
}

/// Recomputes every note's size by reconstruction and rebuilds the running
/// total from the cached sizes.
pub fn doctor(tx: &WriteTxn) -> Result<DoctorReport> {
    let meta = load_meta(tx)?;
    let mut report = DoctorReport {
        previous_total: meta.total_size,
        ..DoctorReport::default()
    };

    let mut total: u64 = 0;
    for mut note in tx.notes()? {
        report.notes_checked += 1;
        match stored_content(&note) {
            Ok(content) => {
                let size = content.len() as u64;
                if size != note.size {
                    warn!(target: TARGET, note_id = %note.id, cached = note.size, size, "repairing cached size");
                    note.size = size;
                    tx.put_note(&note)?;
                    report.fixed_sizes.push(note.id.clone());
                }
            }
            Err(err) => {
                error!(target: TARGET, note_id = %note.id, error = %err, "note does not reconstruct");
                report.broken_notes.push(note.id.clone());
            }
        }
        total = total.saturating_add(note.size);
    }

    if total != meta.total_size {
        warn!(target: TARGET, previous = meta.total_size, total_size = total, "repairing total size");
        set_total_size(tx, total)?;
    }
    report.total_size = total;
    Ok(report)
}
