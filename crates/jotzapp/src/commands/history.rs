//! History snapshots.
//!
//! Every content mutation of a note writes one [`History`] entry holding the
//! full resulting content. Entries are immutable apart from their protected
//! flag. A protected entry cannot be deleted on its own and survives
//! [`delete_for_note`]; only permanently deleting the note removes it.

use crate::error::{JotzError, Result};
use crate::id::Id;
use crate::model::History;
use crate::store::{Records, WriteTxn};

/// A note's entries, oldest first.
pub fn for_note<R: Records>(tx: &R, note_id: &Id) -> Result<Vec<History>> {
    tx.require_note(note_id)?;
    tx.histories_of(note_id)
}

pub fn get<R: Records>(tx: &R, id: &Id) -> Result<History> {
    tx.require_history(id)
}

pub fn set_protected(tx: &WriteTxn, id: &Id, protected: bool) -> Result<History> {
    let mut entry = tx.require_history(id)?;
    entry.protected = protected;
    tx.put_history(&entry)?;
    Ok(entry)
}

/// Removes a single unprotected entry.
pub fn delete(tx: &WriteTxn, id: &Id) -> Result<History> {
    let entry = tx.require_history(id)?;
    if entry.protected {
        return Err(JotzError::validation(format!(
            "history {} is protected",
            id
        )));
    }
    tx.remove_history(&entry)?;
    Ok(entry)
}

/// Removes every unprotected entry of a note and returns how many went.
pub fn delete_for_note(tx: &WriteTxn, note_id: &Id) -> Result<usize> {
    tx.require_note(note_id)?;
    let mut removed = 0;
    for entry in tx.histories_of(note_id)? {
        if !entry.protected && tx.remove_history(&entry)? {
            removed += 1;
        }
    }
    Ok(removed)
}

/// Removes all of a note's entries, protected ones included. Used when the
/// note itself is purged.
pub(crate) fn purge_for_note(tx: &WriteTxn, note_id: &Id) -> Result<usize> {
    let mut removed = 0;
    for entry in tx.histories_of(note_id)? {
        if tx.remove_history(&entry)? {
            removed += 1;
        }
    }
    Ok(removed)
}

/// Counts from the index alone; no snapshot is decoded.
pub(crate) fn count_for_note<R: Records>(tx: &R, note_id: &Id) -> Result<usize> {
    Ok(tx.history_ids(note_id)?.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{self, create};
    use crate::commands::notes;
    use crate::config::JotzConfig;
    use crate::error::ErrorKind;
    use crate::patch::make_patch;
    use crate::store::HISTORIES;

    fn edit(tx: &WriteTxn, id: &Id, old: &str, new: &str) {
        notes::append_patch(tx, &JotzConfig::default(), id, &make_patch(old, new), None).unwrap();
    }

    #[test]
    fn entries_are_oldest_first_and_scoped_to_note() {
        let (_store, tx) = fixtures::store();
        let a = create(&tx, "a1", &["t"]);
        let b = create(&tx, "b1", &["t"]);
        edit(&tx, &a.id, "a1", "a2");
        edit(&tx, &b.id, "b1", "b2");
        edit(&tx, &a.id, "a2", "a3");

        let contents: Vec<_> = for_note(&tx, &a.id)
            .unwrap()
            .into_iter()
            .map(|h| h.contents)
            .collect();
        assert_eq!(contents, vec!["a1", "a2", "a3"]);
        assert_eq!(for_note(&tx, &b.id).unwrap().len(), 2);
    }

    #[test]
    fn for_missing_note_is_not_found() {
        let (_store, tx) = fixtures::store();
        let err = for_note(&tx, &Id::from("00000042")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn bulk_delete_keeps_protected_entry() {
        let (_store, tx) = fixtures::store();
        let note = create(&tx, "v1", &["t"]);
        edit(&tx, &note.id, "v1", "v2");
        let entries = for_note(&tx, &note.id).unwrap();
        set_protected(&tx, &entries[0].id, true).unwrap();

        assert_eq!(delete_for_note(&tx, &note.id).unwrap(), 1);
        let left = for_note(&tx, &note.id).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, entries[0].id);
        assert!(left[0].protected);
        // the note itself is untouched
        assert_eq!(notes::reconstruct(&tx, &note.id).unwrap(), "v2");
    }

    #[test]
    fn single_delete_refuses_protected() {
        let (_store, tx) = fixtures::store();
        let note = create(&tx, "v1", &["t"]);
        let entry = for_note(&tx, &note.id).unwrap().remove(0);

        set_protected(&tx, &entry.id, true).unwrap();
        let err = delete(&tx, &entry.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        set_protected(&tx, &entry.id, false).unwrap();
        delete(&tx, &entry.id).unwrap();
        assert_eq!(get(&tx, &entry.id).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn lookups_never_decode_other_notes_entries() {
        let (_store, tx) = fixtures::store();
        let note = create(&tx, "v1", &["t"]);
        let other = create(&tx, "w1", &["t"]);
        let stray = for_note(&tx, &other.id).unwrap().remove(0);
        tx.put_raw(HISTORIES, stray.id.as_str(), b"{damaged").unwrap();

        edit(&tx, &note.id, "v1", "v2");
        assert_eq!(count_for_note(&tx, &note.id).unwrap(), 2);
        assert_eq!(for_note(&tx, &note.id).unwrap().len(), 2);
        assert_eq!(delete_for_note(&tx, &note.id).unwrap(), 2);
        assert_eq!(count_for_note(&tx, &note.id).unwrap(), 0);
        // the damaged entry is only reached through its own note
        assert_eq!(
            for_note(&tx, &other.id).unwrap_err().kind(),
            ErrorKind::StoreCorruption
        );
    }

    #[test]
    fn counts_stay_right_after_purging_a_neighbour() {
        let (_store, tx) = fixtures::store();
        let kept = create(&tx, "k1", &["t"]);
        let gone = create(&tx, "g1", &["t"]);
        edit(&tx, &gone.id, "g1", "g2");
        edit(&tx, &kept.id, "k1", "k2");

        assert_eq!(purge_for_note(&tx, &gone.id).unwrap(), 2);
        assert_eq!(count_for_note(&tx, &gone.id).unwrap(), 0);
        assert_eq!(count_for_note(&tx, &kept.id).unwrap(), 2);
        assert_eq!(tx.histories().unwrap().len(), 2);
    }

    #[test]
    fn purge_removes_protected_too() {
        let (_store, tx) = fixtures::store();
        let note = create(&tx, "v1", &["t"]);
        let entry = for_note(&tx, &note.id).unwrap().remove(0);
        set_protected(&tx, &entry.id, true).unwrap();
        assert_eq!(purge_for_note(&tx, &note.id).unwrap(), 1);
        assert!(tx.histories().unwrap().is_empty());
    }
}
