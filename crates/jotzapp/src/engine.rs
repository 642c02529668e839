//! # Engine Facade
//!
//! [`Engine`] is the single entry point for callers (the CLI, an HTTP layer,
//! tests). It owns the redb [`Store`], the loaded [`JotzConfig`] and the
//! Write Serializer.
//!
//! ## Reads and Writes
//!
//! - Read methods live directly on `&Engine`. Each runs in its own read
//!   transaction and never waits for the write lock.
//! - Mutations are only reachable through [`Engine::write`], which takes the
//!   process-wide write lock and returns a [`Writer`]. The lock is released
//!   when the `Writer` is dropped, on every exit path.
//!
//! ```text
//! let writer = engine.write();          // blocks until no other writer
//! writer.create_note(input)?;           // one redb write transaction
//! writer.append_patch(&id, &patch, None)?;
//! drop(writer);                         // next writer may proceed
//! ```
//!
//! ## One Operation, One Transaction
//!
//! Every `Writer` method runs its command inside a fresh
//! [`WriteTxn`](crate::store::WriteTxn). The transaction commits only if the
//! command returns `Ok`; otherwise it is aborted and no record (note,
//! history, tag group or metadata) changes.
//!
//! Like the command layer, the engine does no I/O of its own beyond the
//! database and returns plain Rust values.

use crate::commands::notes::{NewNote, NoteStatus};
use crate::commands::status::{DoctorReport, StoreStatus};
use crate::commands::tags::RetagReport;
use crate::commands::{export, history, import, lifecycle, notes, status, tag_groups, tags};
use crate::config::JotzConfig;
use crate::error::{ErrorKind, Result};
use crate::id::Id;
use crate::logging::{op_span, TARGET};
use crate::model::{History, Note, NoteType, TagGroup};
use crate::store::meta::init_meta;
use crate::store::{ReadTxn, Store, WriteTxn};
use parking_lot::{Mutex, MutexGuard};
use std::path::Path;
use tracing::{error, info, warn};

pub use crate::commands::lifecycle::PurgeReport;

/// Database file name inside a data directory.
pub const DB_FILE: &str = "jotz.redb";

pub struct Engine {
    store: Store,
    config: JotzConfig,
    write_gate: Mutex<()>,
}

impl Engine {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: &Path, config: JotzConfig) -> Result<Self> {
        Self::init(Store::open(path)?, config)
    }

    /// Opens the store kept in a data directory, with the configuration
    /// found there.
    pub fn open_dir(dir: &Path) -> Result<Self> {
        let config = JotzConfig::load(dir)?;
        Self::open(&dir.join(DB_FILE), config)
    }

    /// An engine backed by memory only.
    pub fn in_memory(config: JotzConfig) -> Result<Self> {
        Self::init(Store::in_memory()?, config)
    }

    fn init(store: Store, config: JotzConfig) -> Result<Self> {
        let tx = store.write()?;
        let meta = init_meta(&tx, config.capacity)?;
        tx.commit()?;
        info!(
            target: TARGET,
            capacity = meta.capacity,
            total_size = meta.total_size,
            current_id = %meta.current_id,
            "engine opened"
        );
        Ok(Self {
            store,
            config,
            write_gate: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &JotzConfig {
        &self.config
    }

    /// Takes the write lock. Blocks while another `Writer` is alive.
    pub fn write(&self) -> Writer<'_> {
        Writer {
            engine: self,
            _guard: self.write_gate.lock(),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&ReadTxn) -> Result<T>) -> Result<T> {
        let tx = self.store.read()?;
        f(&tx)
    }

    pub fn note(&self, id: &Id) -> Result<Note> {
        self.read(|tx| notes::get(tx, id))
    }

    pub fn reconstruct(&self, id: &Id) -> Result<String> {
        self.read(|tx| notes::reconstruct(tx, id))
    }

    pub fn notes(&self, status: NoteStatus) -> Result<Vec<Note>> {
        self.read(|tx| notes::list(tx, status))
    }

    pub fn note_histories(&self, note_id: &Id) -> Result<Vec<History>> {
        self.read(|tx| history::for_note(tx, note_id))
    }

    pub fn history(&self, id: &Id) -> Result<History> {
        self.read(|tx| history::get(tx, id))
    }

    pub fn by_tag(&self, tag: &str) -> Result<Vec<Note>> {
        self.read(|tx| tags::by_tag(tx, tag))
    }

    /// Active notes with any tag starting with `prefix`.
    pub fn by_tag_prefix(&self, prefix: &str) -> Result<Vec<Note>> {
        self.read(|tx| tags::by_tag_prefix(tx, prefix))
    }

    pub fn tags_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.read(|tx| tags::tags_with_prefix(tx, prefix))
    }

    pub fn all_tags(&self) -> Result<Vec<String>> {
        self.read(tags::all_tags)
    }

    pub fn all_tags_by_date(&self) -> Result<Vec<String>> {
        self.read(tags::all_tags_by_date)
    }

    pub fn search_tag_group<S: AsRef<str>>(&self, wanted: &[S]) -> Result<Vec<Note>> {
        self.read(|tx| tags::search_tag_group(tx, wanted))
    }

    pub fn search_title(&self, pattern: &str) -> Result<Vec<Note>> {
        self.read(|tx| tags::search_title(tx, pattern, self.config.title_match))
    }

    pub fn tag_groups(&self) -> Result<Vec<TagGroup>> {
        self.read(tag_groups::list_all)
    }

    pub fn export(&self) -> Result<Vec<Note>> {
        self.read(export::export)
    }

    pub fn status(&self) -> Result<StoreStatus> {
        self.read(status::status)
    }
}

/// Exclusive handle for mutations; holds the engine's write lock.
pub struct Writer<'a> {
    engine: &'a Engine,
    _guard: MutexGuard<'a, ()>,
}

impl Writer<'_> {
    fn transact<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&WriteTxn, &JotzConfig) -> Result<T>,
    ) -> Result<T> {
        let span = op_span(op);
        let _entered = span.enter();

        let tx = self.engine.store.write()?;
        match f(&tx, &self.engine.config) {
            Ok(value) => {
                tx.commit()?;
                info!(target: TARGET, "committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(abort_err) = tx.abort() {
                    error!(target: TARGET, error = %abort_err, "abort failed");
                }
                match err.kind() {
                    ErrorKind::StoreCorruption | ErrorKind::Storage => {
                        error!(target: TARGET, error = %err, "write aborted")
                    }
                    _ => warn!(target: TARGET, error = %err, "write rejected"),
                }
                Err(err)
            }
        }
    }

    pub fn create_note(&self, input: NewNote) -> Result<Note> {
        self.transact("create_note", |tx, config| notes::create(tx, config, input))
    }

    /// Returns the note's history count after the append.
    pub fn append_patch(&self, id: &Id, patch: &str, title: Option<&str>) -> Result<usize> {
        self.transact("append_patch", |tx, config| {
            notes::append_patch(tx, config, id, patch, title)
        })
    }

    pub fn change_type(&self, id: &Id, note_type: NoteType) -> Result<Note> {
        self.transact("change_type", |tx, _| notes::change_type(tx, id, note_type))
    }

    pub fn update_tags<S: AsRef<str>>(&self, id: &Id, new_tags: &[S]) -> Result<Note> {
        self.transact("update_tags", |tx, _| notes::update_tags(tx, id, new_tags))
    }

    pub fn set_deleted(&self, id: &Id, deleted: bool) -> Result<Note> {
        self.transact("set_deleted", |tx, _| lifecycle::set_deleted(tx, id, deleted))
    }

    pub fn delete_forever(&self, id: &Id) -> Result<PurgeReport> {
        self.transact("delete_forever", |tx, _| lifecycle::delete_forever(tx, id))
    }

    pub fn delete_note_history(&self, note_id: &Id) -> Result<usize> {
        self.transact("delete_note_history", |tx, _| {
            history::delete_for_note(tx, note_id)
        })
    }

    pub fn delete_history(&self, id: &Id) -> Result<History> {
        self.transact("delete_history", |tx, _| history::delete(tx, id))
    }

    pub fn set_history_protected(&self, id: &Id, protected: bool) -> Result<History> {
        self.transact("set_history_protected", |tx, _| {
            history::set_protected(tx, id, protected)
        })
    }

    pub fn rename_tag(&self, old: &str, new: &str) -> Result<RetagReport> {
        self.transact("rename_tag", |tx, _| tags::rename_tag(tx, old, new))
    }

    pub fn delete_tag(&self, name: &str) -> Result<RetagReport> {
        self.transact("delete_tag", |tx, _| tags::delete_tag(tx, name))
    }

    pub fn save_tag_group<S: AsRef<str>>(&self, group: &[S]) -> Result<TagGroup> {
        self.transact("save_tag_group", |tx, config| {
            tag_groups::save(tx, config, group)
        })
    }

    pub fn delete_tag_group(&self, id: &Id) -> Result<TagGroup> {
        self.transact("delete_tag_group", |tx, _| tag_groups::delete(tx, id))
    }

    pub fn set_tag_group_protected(&self, id: &Id, protected: bool) -> Result<TagGroup> {
        self.transact("set_tag_group_protected", |tx, _| {
            tag_groups::set_protected(tx, id, protected)
        })
    }

    pub fn import(&self, document: Vec<Note>) -> Result<Vec<Note>> {
        self.transact("import", |tx, _| import::import(tx, document))
    }

    pub fn doctor(&self) -> Result<DoctorReport> {
        self.transact("doctor", |tx, _| status::doctor(tx))
    }
}
