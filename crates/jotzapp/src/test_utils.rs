use crate::commands::notes::NewNote;
use crate::config::JotzConfig;
use crate::engine::{Engine, DB_FILE};
use crate::model::{Note, NoteType};
use crate::patch::make_patch;
use std::path::PathBuf;
use tempfile::TempDir;

/// A file-backed engine in a throwaway data directory.
pub struct TestEnv {
    // Keeps the directory alive for the duration of the test
    pub _temp_dir: TempDir,
    pub engine: Engine,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_config(JotzConfig::default())
    }

    pub fn with_config(config: JotzConfig) -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let engine = Engine::open(&root.join(DB_FILE), config).expect("failed to open engine");
        Self {
            _temp_dir: temp_dir,
            engine,
            root,
        }
    }

    /// Drops the engine and opens the same database file again.
    pub fn reopen(self, config: JotzConfig) -> Self {
        let Self {
            _temp_dir,
            engine,
            root,
        } = self;
        // redb holds a lock on the file until the old handle is gone
        drop(engine);
        let engine = Engine::open(&root.join(DB_FILE), config).expect("failed to reopen engine");
        Self {
            _temp_dir,
            engine,
            root,
        }
    }
}

/// In-memory engine with the given capacity.
pub fn memory_engine(capacity: u64) -> Engine {
    Engine::in_memory(JotzConfig::default().with_capacity(capacity))
        .expect("failed to open in-memory engine")
}

/// Plaintext note input whose patch creates `content`.
pub fn note_input(content: &str, tags: &[&str]) -> NewNote {
    NewNote {
        note_type: NoteType::Plaintext,
        patch: make_patch("", content),
        title: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// Replaces a note's content, computing the patch against what is stored.
pub fn rewrite(engine: &Engine, note: &Note, content: &str) -> crate::error::Result<usize> {
    let current = engine.reconstruct(&note.id)?;
    engine
        .write()
        .append_patch(&note.id, &make_patch(&current, content), None)
}
