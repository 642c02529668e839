//! # Configuration
//!
//! Engine configuration is derived with [`confique`], which layers sources in
//! priority order:
//!
//! 1. **Environment variables**: `JOTZ_CAPACITY`, `JOTZ_TITLE_MATCH`, etc.
//! 2. **Config file**: `jotz.toml` in the data directory.
//! 3. **Compiled defaults**: `#[config(default = ...)]` below.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `capacity` | `104857600` | Ceiling on the total bytes of note content |
//! | `note_title_limit` | `200` | Max bytes of a note title (and of history summaries) |
//! | `tag_group_limit` | `20` | Unprotected tag groups kept before the oldest are dropped |
//! | `title_match` | `substring` | `substring` or `case_insensitive` title search |
//!
//! The capacity is written into the store metadata each time an engine is
//! opened and stays fixed for the engine's lifetime.

use crate::error::Result;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "jotz.toml";

/// How `search_title` compares a pattern with note titles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleMatch {
    #[default]
    Substring,
    CaseInsensitive,
}

impl TitleMatch {
    pub fn matches(self, title: &str, pattern: &str) -> bool {
        match self {
            TitleMatch::Substring => title.contains(pattern),
            TitleMatch::CaseInsensitive => title.to_lowercase().contains(&pattern.to_lowercase()),
        }
    }
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JotzConfig {
    /// Ceiling, in bytes, on the summed content size of all stored notes.
    #[config(default = 104857600, env = "JOTZ_CAPACITY")]
    pub capacity: u64,

    /// Titles (and shortened history contents) are cut to this many bytes.
    #[config(default = 200, env = "JOTZ_NOTE_TITLE_LIMIT")]
    pub note_title_limit: usize,

    /// Unprotected tag groups beyond this count are dropped, oldest first.
    #[config(default = 20, env = "JOTZ_TAG_GROUP_LIMIT")]
    pub tag_group_limit: usize,

    #[config(default = "substring", env = "JOTZ_TITLE_MATCH")]
    pub title_match: TitleMatch,
}

impl Default for JotzConfig {
    fn default() -> Self {
        Self {
            capacity: 100 * 1024 * 1024,
            note_title_limit: 200,
            tag_group_limit: 20,
            title_match: TitleMatch::Substring,
        }
    }
}

impl JotzConfig {
    /// Loads the layered configuration for the data directory `dir`. A
    /// missing `jotz.toml` just means defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let config = JotzConfig::builder()
            .env()
            .file(dir.join(CONFIG_FILE))
            .load()?;
        Ok(config)
    }

    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }
}
