//! Tag support.
//!
//! A note carries a set of plain tag strings. There is no tag registry: the
//! tag index is whatever a scan over the notes says it is (see
//! [`crate::commands::tags`]).
//!
//! ## Input Normalization
//!
//! Callers hand tags over the way users type them: `#work, rust;ideas`.
//! [`normalize_tags`] splits such input on whitespace and the separators in
//! [`SEPARATORS`], drops empties and duplicates, and validates what remains.

pub mod validation;

use crate::error::{JotzError, Result};
use std::collections::BTreeSet;

pub use validation::{validate_tag_name, TagValidationError};

/// Characters that separate tags in user input, in addition to whitespace.
pub const SEPARATORS: &[char] = &['#', ';', ',', '，'];

/// Splits, de-duplicates and validates a list of raw tag inputs.
///
/// Each input may itself hold several tags. The result may be empty; callers
/// that require tags check that themselves.
pub fn normalize_tags<S: AsRef<str>>(raw: &[S]) -> Result<BTreeSet<String>> {
    let mut tags = BTreeSet::new();
    for input in raw {
        for piece in input
            .as_ref()
            .split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
            .filter(|p| !p.is_empty())
        {
            validate_tag_name(piece).map_err(|e| JotzError::validation(e.to_string()))?;
            tags.insert(piece.to_string());
        }
    }
    Ok(tags)
}

/// Like [`normalize_tags`] but insists on at least one tag.
pub fn require_tags<S: AsRef<str>>(raw: &[S]) -> Result<BTreeSet<String>> {
    let tags = normalize_tags(raw)?;
    if tags.is_empty() {
        return Err(JotzError::validation("at least one tag is required"));
    }
    Ok(tags)
}

/// Normalizes a single tag name, e.g. the target of a rename.
pub fn single_tag(raw: &str) -> Result<String> {
    let tags = require_tags(&[raw])?;
    if tags.len() > 1 {
        return Err(JotzError::validation(format!(
            "expected a single tag, got {:?}",
            raw
        )));
    }
    // exactly one element
    Ok(tags.into_iter().next().unwrap_or_default())
}
