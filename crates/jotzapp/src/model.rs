use crate::id::Id;
use crate::patch::{self, PatchError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteType {
    Plaintext,
    Markdown,
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteType::Plaintext => write!(f, "Plaintext"),
            NoteType::Markdown => write!(f, "Markdown"),
        }
    }
}

impl FromStr for NoteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plaintext" | "text" | "txt" => Ok(NoteType::Plaintext),
            "markdown" | "md" => Ok(NoteType::Markdown),
            other => Err(format!("unknown note type: {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Id,
    pub note_type: NoteType,
    pub title: String,
    /// Unified diffs, oldest first. Folding them over "" yields the content.
    pub patches: Vec<String>,
    pub tags: BTreeSet<String>,
    pub deleted: bool,
    /// Byte length of the reconstructed content when it was last computed.
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn reconstruct(&self) -> Result<String, PatchError> {
        patch::reconstruct(&self.patches)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn has_all_tags<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().all(|t| self.tags.contains(t.as_ref()))
    }
}

/// Snapshot of a note's content after one mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub id: Id,
    pub note_id: Id,
    pub contents: String,
    pub protected: bool,
    pub created_at: DateTime<Utc>,
}

impl History {
    pub fn new(id: Id, note_id: Id, contents: String) -> Self {
        Self {
            id,
            note_id,
            contents,
            protected: false,
            created_at: Utc::now(),
        }
    }

    /// Copy of this entry with its contents cut down for listings.
    pub fn shortened(&self, limit: usize) -> Self {
        Self {
            contents: head_limit(self.contents.trim(), limit),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagGroup {
    pub id: Id,
    pub tags: BTreeSet<String>,
    pub protected: bool,
    pub created_at: DateTime<Utc>,
    /// Bumped whenever the same tag set is saved again.
    pub updated_at: DateTime<Utc>,
}

impl TagGroup {
    pub fn new(id: Id, tags: BTreeSet<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            tags,
            protected: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The singleton bookkeeping record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMeta {
    pub current_id: Id,
    pub total_size: u64,
    pub capacity: u64,
}

/// Returns at most `limit` bytes from the start of `s`, cut on a character
/// boundary.
///
/// Backs off one byte at a time from the limit until the prefix is valid
/// UTF-8. When not even the first character fits, the raw bytes up to the
/// limit are returned, lossily decoded.
pub fn head_limit(s: &str, limit: usize) -> String {
    if s.len() <= limit {
        return s.to_string();
    }
    let mut end = limit;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    if end == 0 {
        return String::from_utf8_lossy(&s.as_bytes()[..limit]).into_owned();
    }
    s[..end].to_string()
}

/// Title for a note: the caller's title when it has one, otherwise the head
/// of the content. Either way capped at `limit` bytes.
pub fn derive_title(title: Option<&str>, content: &str, limit: usize) -> String {
    let source = match title.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => content.trim(),
    };
    head_limit(source, limit)
}
