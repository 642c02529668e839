//! Record identifiers.
//!
//! Every record (note, history entry, tag group) is keyed by an [`Id`]: a
//! counter rendered as a fixed-width, upper-case base-36 string. Because all
//! IDs have the same width and the digit alphabet is in ASCII order, sorting
//! IDs as strings sorts them by the counter they encode.
//!
//! The counter itself lives in the store metadata record; see
//! [`crate::store::meta::next_id`] for the allocator.

use crate::error::{JotzError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of base-36 digits in an encoded ID.
pub const ID_WIDTH: usize = 8;

const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const RADIX: u64 = 36;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// The value the counter is seeded with. It is never handed out itself.
    pub fn first() -> Self {
        Id("0".repeat(ID_WIDTH))
    }

    pub fn from_count(count: u64) -> Result<Self> {
        if count > max_count() {
            return Err(JotzError::corruption(format!(
                "id counter {} exceeds the {}-digit id space",
                count, ID_WIDTH
            )));
        }
        let mut buf = [b'0'; ID_WIDTH];
        let mut rest = count;
        for slot in buf.iter_mut().rev() {
            *slot = DIGITS[(rest % RADIX) as usize];
            rest /= RADIX;
        }
        // buf only holds bytes from DIGITS
        Ok(Id(buf.iter().map(|&b| b as char).collect()))
    }

    /// Decodes the counter. Anything but exactly [`ID_WIDTH`] base-36 digits
    /// means the persisted value was damaged.
    pub fn count(&self) -> Result<u64> {
        if self.0.len() != ID_WIDTH {
            return Err(JotzError::corruption(format!(
                "id {:?} is not {} digits wide",
                self.0, ID_WIDTH
            )));
        }
        self.0.bytes().try_fold(0u64, |acc, b| {
            let digit = match b {
                b'0'..=b'9' => b - b'0',
                b'A'..=b'Z' => b - b'A' + 10,
                _ => {
                    return Err(JotzError::corruption(format!(
                        "id {:?} contains invalid digit {:?}",
                        self.0, b as char
                    )))
                }
            };
            Ok(acc * RADIX + u64::from(digit))
        })
    }

    pub fn next(&self) -> Result<Self> {
        Id::from_count(self.count()? + 1)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn max_count() -> u64 {
    RADIX.pow(ID_WIDTH as u32) - 1
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn first_is_all_zeros() {
        assert_eq!(Id::first().as_str(), "00000000");
        assert_eq!(Id::first().count().unwrap(), 0);
    }

    #[test]
    fn encodes_fixed_width_base36() {
        assert_eq!(Id::from_count(1).unwrap().as_str(), "00000001");
        assert_eq!(Id::from_count(35).unwrap().as_str(), "0000000Z");
        assert_eq!(Id::from_count(36).unwrap().as_str(), "00000010");
    }

    #[test]
    fn successive_ids_sort_as_strings() {
        let mut id = Id::first();
        let mut seen = Vec::new();
        for _ in 0..2000 {
            let next = id.next().unwrap();
            assert!(next.as_str() > id.as_str());
            assert!(next > id);
            seen.push(next.clone());
            id = next;
        }
        let mut sorted = seen.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, seen);
    }

    #[test]
    fn decode_roundtrips_counter() {
        for n in [0, 1, 35, 36, 1295, 46_655, 1_000_000] {
            assert_eq!(Id::from_count(n).unwrap().count().unwrap(), n);
        }
    }

    #[test]
    fn malformed_ids_are_corruption() {
        for bad in ["", "123", "0000000a", "0000-001", "000000001"] {
            let err = Id::from(bad).count().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::StoreCorruption, "{:?}", bad);
        }
    }

    #[test]
    fn exhausted_space_is_corruption() {
        let last = Id::from("ZZZZZZZZ");
        assert_eq!(last.count().unwrap(), max_count());
        assert_eq!(last.next().unwrap_err().kind(), ErrorKind::StoreCorruption);
    }
}
