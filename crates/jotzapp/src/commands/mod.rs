//! # Command Layer
//!
//! The engine's business logic. Each submodule is a set of plain functions
//! over a store transaction:
//!
//! - reads take any `&impl Records`, so they run against a snapshot
//!   ([`ReadTxn`](crate::store::ReadTxn)) or inside a write;
//! - writes take `&WriteTxn` and never commit. The caller (the engine's
//!   [`Writer`](crate::engine::Writer)) commits once the whole operation has
//!   succeeded, or drops the transaction on error.
//!
//! ## What Commands Do NOT Do
//!
//! - **Locking**: the Write Serializer lives in the engine.
//! - **Committing**: see above.
//! - **Output**: they return domain values; rendering is the caller's job.
//!
//! ## Testing Strategy
//!
//! **Most of the engine's tests live here**, against the in-memory redb
//! backend. A test opens one write transaction and calls commands on it
//! directly, which also exercises reading through uncommitted state.
//!
//! ## Command Modules
//!
//! - [`notes`]: create, append patches, reconstruct, retype, retag, list
//! - [`history`]: per-note snapshots and their protection
//! - [`lifecycle`]: soft delete, restore, permanent delete
//! - [`tags`]: the derived tag index and note search
//! - [`tag_groups`]: saved tag filters
//! - [`export`] / [`import`]: JSON dump and reload of the note set
//! - [`status`]: store statistics and the `doctor` repair

use crate::error::{JotzError, Result};
use crate::model::Note;

pub mod export;
pub mod history;
pub mod import;
pub mod lifecycle;
pub mod notes;
pub mod status;
pub mod tag_groups;
pub mod tags;

/// Reconstructs a stored note. The patches were validated when they were
/// appended, so a failure here means the record was damaged.
pub(crate) fn stored_content(note: &Note) -> Result<String> {
    note.reconstruct().map_err(|e| {
        JotzError::corruption(format!("note {} does not reconstruct: {}", note.id, e))
    })
}

/// Most recently modified first; ties broken by newest ID.
pub(crate) fn newest_first(notes: &mut [Note]) {
    notes.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::config::JotzConfig;
    use crate::model::{Note, NoteType};
    use crate::patch::make_patch;
    use crate::store::meta::init_meta;
    use crate::store::{Store, WriteTxn};

    use super::notes::{self, NewNote};

    pub fn store_with_capacity(capacity: u64) -> (Store, WriteTxn) {
        let store = Store::in_memory().unwrap();
        let tx = store.write().unwrap();
        init_meta(&tx, capacity).unwrap();
        (store, tx)
    }

    pub fn store() -> (Store, WriteTxn) {
        store_with_capacity(JotzConfig::default().capacity)
    }

    pub fn new_note(content: &str, tags: &[&str]) -> NewNote {
        NewNote {
            note_type: NoteType::Plaintext,
            patch: make_patch("", content),
            title: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn create(tx: &WriteTxn, content: &str, tags: &[&str]) -> Note {
        notes::create(tx, &JotzConfig::default(), new_note(content, tags)).unwrap()
    }
}
