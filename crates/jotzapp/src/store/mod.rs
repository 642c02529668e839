//! # Storage Layer
//!
//! All state lives in one [redb] database with four tables:
//!
//! ```text
//! notes       {id} -> Note      (JSON)
//! histories   {id} -> History   (JSON)
//! tag_groups  {id} -> TagGroup  (JSON)
//! metadata    "store-meta" -> StoreMeta (JSON)
//!
//! note_history  {note id} ->> {history id}   (multimap index)
//! ```
//!
//! Keys are [`Id`] strings, so redb's key order is also creation order.
//! `note_history` is maintained by [`WriteTxn::put_history`] and
//! [`WriteTxn::remove_history`], so a note's entries are found without
//! decoding anyone else's snapshots.
//!
//! ## Transactions
//!
//! - [`ReadTxn`] wraps a redb read transaction: a consistent snapshot of the
//!   last commit. Reads never block writers or each other.
//! - [`WriteTxn`] wraps a redb write transaction. Every logical operation
//!   does all of its writes through a single `WriteTxn` and commits once.
//!   Dropping it uncommitted throws every write away.
//!
//! Both implement [`Records`], so the same lookup code runs against a
//! snapshot or against the in-flight state of a write.
//!
//! ## Backends
//!
//! - [`Store::open`]: a database file on disk.
//! - [`Store::in_memory`]: redb's in-memory backend, for tests and throwaway
//!   engines.

pub mod meta;

use crate::error::{JotzError, Result};
use crate::id::Id;
use crate::logging::TARGET;
use crate::model::{History, Note, StoreMeta, TagGroup};
use redb::backends::InMemoryBackend;
use redb::{
    Database, MultimapTableDefinition, ReadableMultimapTable, ReadableTable, TableDefinition,
    TableHandle,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::trace;

type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;

pub(crate) const NOTES: JsonTable = TableDefinition::new("notes");
pub(crate) const HISTORIES: JsonTable = TableDefinition::new("histories");
pub(crate) const TAG_GROUPS: JsonTable = TableDefinition::new("tag_groups");
pub(crate) const METADATA: JsonTable = TableDefinition::new("metadata");
const NOTE_HISTORY: MultimapTableDefinition<'static, &'static str, &'static str> =
    MultimapTableDefinition::new("note_history");

pub(crate) const META_KEY: &str = "store-meta";

const ALL_TABLES: [JsonTable; 4] = [NOTES, HISTORIES, TAG_GROUPS, METADATA];

pub struct Store {
    db: Database,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::init(Database::create(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::init(db)
    }

    // Opening a table for reading fails if it was never created, so every
    // table is created up front.
    fn init(db: Database) -> Result<Self> {
        let tx = db.begin_write()?;
        for table in ALL_TABLES {
            tx.open_table(table)?;
        }
        tx.open_multimap_table(NOTE_HISTORY)?;
        tx.commit()?;
        Ok(Self { db })
    }

    pub fn read(&self) -> Result<ReadTxn> {
        Ok(ReadTxn {
            tx: self.db.begin_read()?,
        })
    }

    pub fn write(&self) -> Result<WriteTxn> {
        Ok(WriteTxn {
            tx: self.db.begin_write()?,
        })
    }
}

/// Typed record access shared by read and write transactions.
pub trait Records {
    fn lookup<T: DeserializeOwned>(&self, table: JsonTable, key: &str) -> Result<Option<T>>;

    /// Every record of a table, in key (= ID) order.
    fn scan<T: DeserializeOwned>(&self, table: JsonTable) -> Result<Vec<T>>;

    fn note(&self, id: &Id) -> Result<Option<Note>> {
        self.lookup(NOTES, id.as_str())
    }

    fn notes(&self) -> Result<Vec<Note>> {
        self.scan(NOTES)
    }

    fn history(&self, id: &Id) -> Result<Option<History>> {
        self.lookup(HISTORIES, id.as_str())
    }

    fn histories(&self) -> Result<Vec<History>> {
        self.scan(HISTORIES)
    }

    /// IDs of a note's history entries, oldest first, read from the index.
    fn history_ids(&self, note_id: &Id) -> Result<Vec<Id>>;

    /// A note's history entries, oldest first.
    fn histories_of(&self, note_id: &Id) -> Result<Vec<History>> {
        self.history_ids(note_id)?
            .into_iter()
            .map(|id| {
                self.history(&id)?.ok_or_else(|| {
                    JotzError::corruption(format!(
                        "history index of note {} names missing entry {}",
                        note_id, id
                    ))
                })
            })
            .collect()
    }

    fn tag_group(&self, id: &Id) -> Result<Option<TagGroup>> {
        self.lookup(TAG_GROUPS, id.as_str())
    }

    fn tag_groups(&self) -> Result<Vec<TagGroup>> {
        self.scan(TAG_GROUPS)
    }

    fn meta(&self) -> Result<Option<StoreMeta>> {
        self.lookup(METADATA, META_KEY)
    }

    /// Resolves a note ID or fails with `NotFound`.
    fn require_note(&self, id: &Id) -> Result<Note> {
        self.note(id)?
            .ok_or_else(|| JotzError::note_not_found(id.as_str()))
    }

    fn require_history(&self, id: &Id) -> Result<History> {
        self.history(id)?
            .ok_or_else(|| JotzError::history_not_found(id.as_str()))
    }

    fn require_tag_group(&self, id: &Id) -> Result<TagGroup> {
        self.tag_group(id)?
            .ok_or_else(|| JotzError::tag_group_not_found(id.as_str()))
    }
}

pub struct ReadTxn {
    tx: redb::ReadTransaction,
}

impl Records for ReadTxn {
    fn lookup<T: DeserializeOwned>(&self, table: JsonTable, key: &str) -> Result<Option<T>> {
        let handle = self.tx.open_table(table)?;
        get_record(&handle, table, key)
    }

    fn scan<T: DeserializeOwned>(&self, table: JsonTable) -> Result<Vec<T>> {
        let handle = self.tx.open_table(table)?;
        all_records(&handle, table)
    }

    fn history_ids(&self, note_id: &Id) -> Result<Vec<Id>> {
        let index = self.tx.open_multimap_table(NOTE_HISTORY)?;
        indexed_ids(&index, note_id)
    }
}

pub struct WriteTxn {
    tx: redb::WriteTransaction,
}

impl Records for WriteTxn {
    fn lookup<T: DeserializeOwned>(&self, table: JsonTable, key: &str) -> Result<Option<T>> {
        let handle = self.tx.open_table(table)?;
        get_record(&handle, table, key)
    }

    fn scan<T: DeserializeOwned>(&self, table: JsonTable) -> Result<Vec<T>> {
        let handle = self.tx.open_table(table)?;
        all_records(&handle, table)
    }

    fn history_ids(&self, note_id: &Id) -> Result<Vec<Id>> {
        let index = self.tx.open_multimap_table(NOTE_HISTORY)?;
        indexed_ids(&index, note_id)
    }
}

impl WriteTxn {
    fn put<T: Serialize>(&self, table: JsonTable, key: &str, record: &T) -> Result<()> {
        let bytes = serde_json::to_vec(record)?;
        let mut handle = self.tx.open_table(table)?;
        handle.insert(key, bytes.as_slice())?;
        Ok(())
    }

    fn delete(&self, table: JsonTable, key: &str) -> Result<bool> {
        let mut handle = self.tx.open_table(table)?;
        let removed = handle.remove(key)?.is_some();
        Ok(removed)
    }

    pub fn put_note(&self, note: &Note) -> Result<()> {
        self.put(NOTES, note.id.as_str(), note)
    }

    pub fn remove_note(&self, id: &Id) -> Result<bool> {
        self.delete(NOTES, id.as_str())
    }

    /// Writes the entry and files it under its note in the index.
    pub fn put_history(&self, history: &History) -> Result<()> {
        self.put(HISTORIES, history.id.as_str(), history)?;
        let mut index = self.tx.open_multimap_table(NOTE_HISTORY)?;
        index.insert(history.note_id.as_str(), history.id.as_str())?;
        Ok(())
    }

    pub fn remove_history(&self, history: &History) -> Result<bool> {
        let mut index = self.tx.open_multimap_table(NOTE_HISTORY)?;
        index.remove(history.note_id.as_str(), history.id.as_str())?;
        drop(index);
        self.delete(HISTORIES, history.id.as_str())
    }

    pub fn put_tag_group(&self, group: &TagGroup) -> Result<()> {
        self.put(TAG_GROUPS, group.id.as_str(), group)
    }

    pub fn remove_tag_group(&self, id: &Id) -> Result<bool> {
        self.delete(TAG_GROUPS, id.as_str())
    }

    pub fn put_meta(&self, meta: &StoreMeta) -> Result<()> {
        self.put(METADATA, META_KEY, meta)
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    /// Discards every write made through this transaction.
    pub fn abort(self) -> Result<()> {
        self.tx.abort()?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn put_raw(&self, table: JsonTable, key: &str, bytes: &[u8]) -> Result<()> {
        let mut handle = self.tx.open_table(table)?;
        handle.insert(key, bytes)?;
        Ok(())
    }
}

fn get_record<T, R>(handle: &R, table: JsonTable, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<&'static str, &'static [u8]>,
{
    match handle.get(key)? {
        Some(value) => decode(table, key, value.value()).map(Some),
        None => Ok(None),
    }
}

fn all_records<T, R>(handle: &R, table: JsonTable) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<&'static str, &'static [u8]>,
{
    let mut records = Vec::new();
    for entry in handle.iter()? {
        let (key, value) = entry?;
        trace!(target: TARGET, table = table.name(), key = key.value(), "scanning record");
        records.push(decode(table, key.value(), value.value())?);
    }
    Ok(records)
}

fn indexed_ids<R>(index: &R, note_id: &Id) -> Result<Vec<Id>>
where
    R: ReadableMultimapTable<&'static str, &'static str>,
{
    let mut ids = Vec::new();
    for value in index.get(note_id.as_str())? {
        ids.push(Id::from(value?.value()));
    }
    Ok(ids)
}

fn decode<T: DeserializeOwned>(table: JsonTable, key: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        JotzError::corruption(format!(
            "undecodable record {:?} in table {}: {}",
            key,
            table.name(),
            e
        ))
    })
}
