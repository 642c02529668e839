//! Tag name validation.
//!
//! Tags are free-form words, so any script is allowed. A valid tag:
//! - is not empty
//! - contains no whitespace
//! - contains none of the list separators (`#`, `;`, `,`, `，`)

use super::SEPARATORS;
use thiserror::Error;

/// Validates a single, already-trimmed tag name.
///
/// # Examples
/// ```
/// use jotzapp::tags::validation::validate_tag_name;
///
/// assert!(validate_tag_name("rust").is_ok());
/// assert!(validate_tag_name("读书").is_ok());
/// assert!(validate_tag_name("c++").is_ok());
///
/// assert!(validate_tag_name("").is_err());
/// assert!(validate_tag_name("two words").is_err());
/// assert!(validate_tag_name("#hash").is_err());
/// ```
pub fn validate_tag_name(name: &str) -> Result<(), TagValidationError> {
    if name.is_empty() {
        return Err(TagValidationError::Empty);
    }

    for ch in name.chars() {
        if ch.is_whitespace() {
            return Err(TagValidationError::Whitespace);
        }
        if SEPARATORS.contains(&ch) {
            return Err(TagValidationError::Separator(ch));
        }
    }

    Ok(())
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagValidationError {
    #[error("tag name cannot be empty")]
    Empty,
    #[error("tag name cannot contain whitespace")]
    Whitespace,
    #[error("tag name cannot contain the separator '{0}'")]
    Separator(char),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tags() {
        assert!(validate_tag_name("foo").is_ok());
        assert!(validate_tag_name("foo-bar").is_ok());
        assert!(validate_tag_name("7foo").is_ok());
        assert!(validate_tag_name("日记").is_ok());
    }

    #[test]
    fn test_empty() {
        assert_eq!(validate_tag_name(""), Err(TagValidationError::Empty));
    }

    #[test]
    fn test_whitespace() {
        assert_eq!(validate_tag_name("a b"), Err(TagValidationError::Whitespace));
        assert_eq!(validate_tag_name("a\tb"), Err(TagValidationError::Whitespace));
    }

    #[test]
    fn test_separators() {
        assert_eq!(
            validate_tag_name("a,b"),
            Err(TagValidationError::Separator(','))
        );
        assert_eq!(
            validate_tag_name("a，b"),
            Err(TagValidationError::Separator('，'))
        );
        assert_eq!(
            validate_tag_name("#a"),
            Err(TagValidationError::Separator('#'))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TagValidationError::Separator(';').to_string(),
            "tag name cannot contain the separator ';'"
        );
    }
}
