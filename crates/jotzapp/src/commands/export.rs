//! JSON export of the note set.
//!
//! The document is a flat array of [`Note`] records, soft-deleted ones
//! included, in ID order. Notes carry their full patch log, so history
//! entries are not exported; [`import`](super::import) regenerates one per
//! note.

use crate::error::Result;
use crate::model::Note;
use crate::store::Records;

pub fn export<R: Records>(tx: &R) -> Result<Vec<Note>> {
    tx.notes()
}

pub fn to_json(notes: &[Note]) -> Result<String> {
    Ok(serde_json::to_string_pretty(notes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{self, create};
    use crate::commands::lifecycle;

    #[test]
    fn exports_every_note_in_id_order() {
        let (_store, tx) = fixtures::store();
        let a = create(&tx, "first", &["t"]);
        let b = create(&tx, "second", &["t"]);
        lifecycle::set_deleted(&tx, &a.id, true).unwrap();

        let notes = export(&tx).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, a.id);
        assert!(notes[0].deleted);
        assert_eq!(notes[1].id, b.id);
    }

    #[test]
    fn json_is_a_flat_array() {
        let (_store, tx) = fixtures::store();
        create(&tx, "body", &["x"]);
        let json = to_json(&export(&tx).unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["tags"][0], "x");
        assert!(items[0]["patches"].is_array());
    }
}
