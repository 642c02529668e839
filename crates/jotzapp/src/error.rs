use crate::patch::PatchError;
use std::fmt;
use thiserror::Error;

/// The record collections an ID can fail to resolve in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Note,
    History,
    TagGroup,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Note => write!(f, "Note"),
            RecordKind::History => write!(f, "History"),
            RecordKind::TagGroup => write!(f, "Tag group"),
        }
    }
}

/// Discriminant of [`JotzError`], for callers that map errors onto
/// transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    CapacityExceeded,
    Validation,
    StoreCorruption,
    Storage,
}

#[derive(Error, Debug)]
pub enum JotzError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },

    #[error("Capacity exceeded: {total} + {additional} bytes > {capacity} bytes")]
    CapacityExceeded {
        total: u64,
        additional: u64,
        capacity: u64,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store corruption: {0}")]
    StoreCorruption(String),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),
}

pub type Result<T> = std::result::Result<T, JotzError>;

impl JotzError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JotzError::NotFound { .. } => ErrorKind::NotFound,
            JotzError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            JotzError::Validation(_) => ErrorKind::Validation,
            JotzError::StoreCorruption(_) => ErrorKind::StoreCorruption,
            JotzError::Storage(_)
            | JotzError::Serialization(_)
            | JotzError::Io(_)
            | JotzError::Config(_) => ErrorKind::Storage,
        }
    }

    pub fn note_not_found(id: impl Into<String>) -> Self {
        JotzError::NotFound {
            kind: RecordKind::Note,
            id: id.into(),
        }
    }

    pub fn history_not_found(id: impl Into<String>) -> Self {
        JotzError::NotFound {
            kind: RecordKind::History,
            id: id.into(),
        }
    }

    pub fn tag_group_not_found(id: impl Into<String>) -> Self {
        JotzError::NotFound {
            kind: RecordKind::TagGroup,
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        JotzError::Validation(message.into())
    }

    pub fn corruption(message: impl Into<String>) -> Self {
        JotzError::StoreCorruption(message.into())
    }

    /// A caller-supplied patch that does not apply is a validation failure.
    pub fn bad_patch(err: PatchError) -> Self {
        JotzError::Validation(format!("patch does not apply: {}", err))
    }
}

// redb reports each stage of a transaction with its own error type.
macro_rules! from_redb {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for JotzError {
                fn from(err: $ty) -> Self {
                    JotzError::Storage(err.into())
                }
            }
        )*
    };
}

from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            JotzError::note_not_found("00000001").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            JotzError::validation("tags are required").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            JotzError::corruption("bad counter").kind(),
            ErrorKind::StoreCorruption
        );
        let capacity = JotzError::CapacityExceeded {
            total: 5,
            additional: 6,
            capacity: 10,
        };
        assert_eq!(capacity.kind(), ErrorKind::CapacityExceeded);
    }

    #[test]
    fn not_found_message_names_the_record() {
        let err = JotzError::tag_group_not_found("0000000A");
        assert_eq!(err.to_string(), "Tag group not found: 0000000A");
    }
}
