#![allow(dead_code)]

use jotzapp::{make_patch, Engine, JotzConfig, NewNote, Note, NoteType};

pub fn engine(capacity: u64) -> Engine {
    Engine::in_memory(JotzConfig::default().with_capacity(capacity)).unwrap()
}

pub fn input(content: &str, tags: &[&str]) -> NewNote {
    NewNote {
        note_type: NoteType::Plaintext,
        patch: make_patch("", content),
        title: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn create(engine: &Engine, content: &str, tags: &[&str]) -> Note {
    engine.write().create_note(input(content, tags)).unwrap()
}

/// Sum of cached sizes over every stored note.
pub fn sum_of_sizes(engine: &Engine) -> u64 {
    engine
        .export()
        .unwrap()
        .iter()
        .map(|n| n.size)
        .sum()
}
