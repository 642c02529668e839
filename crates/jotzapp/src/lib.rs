//! # Jotz Architecture
//!
//! Jotz is a **versioned, capacity-bounded note storage engine**. It is a
//! library first; the `jotz` binary and any HTTP front end are callers that
//! invoke engine operations and serialize the results.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Callers (jotz CLI, HTTP handlers, tests)                   │
//! │  - Parse input, render output as JSON                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (engine.rs)                                         │
//! │  - Reads on &Engine, writes through Engine::write → Writer  │
//! │  - One redb write transaction per operation                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business logic over a transaction                        │
//! │  - Patches, history, tags, lifecycle, import/export         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - redb tables of JSON records, ID allocator, size ledger   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Notes Are Patch Logs
//!
//! A note's content is never stored as such. The note keeps the ordered list
//! of unified diffs that produced it ([`patch`]), and its content is their
//! fold over the empty string. Each mutation also writes a full snapshot to
//! the note's history, which can be protected against deletion.
//!
//! ## Capacity
//!
//! The metadata record tracks the summed size of every stored note against a
//! configured ceiling. Growth is checked before anything is written; the
//! running total moves in the same transaction as the content it accounts
//! for, so the two cannot drift apart.
//!
//! ## Testing Strategy
//!
//! - **Commands**: most tests, against the in-memory redb backend.
//! - **Engine**: transaction and locking behavior.
//! - **Integration** (`tests/`): end-to-end properties, concurrency and
//!   file-backed reopening.

pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod id;
pub mod logging;
pub mod model;
pub mod patch;
pub mod store;
pub mod tags;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use commands::notes::{NewNote, NoteStatus};
pub use config::{JotzConfig, TitleMatch};
pub use engine::{Engine, Writer};
pub use error::{ErrorKind, JotzError, Result};
pub use id::Id;
pub use model::{History, Note, NoteType, TagGroup};
pub use patch::make_patch;
