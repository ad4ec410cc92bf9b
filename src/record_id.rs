//! Identifiers of stored records
//!
//! Rooms and questions come from a JSON store that hands out either numeric
//! or textual identifiers depending on how the record was created. This
//! module provides a single identifier type accepting both forms, so that
//! the rest of the crate can compare and display them uniformly.

use std::{convert::Infallible, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// Identifier of a room or question record
///
/// Numeric identifiers are kept as numbers so they serialize back in the
/// same shape the store produced them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Identifier assigned as a JSON number
    Number(u64),
    /// Identifier assigned as a JSON string
    Text(String),
}

impl RecordId {
    /// Creates a fresh random textual identifier
    pub fn random() -> Self {
        Self::Text(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for RecordId {
    type Err = Infallible;

    /// Parses an identifier, preferring the numeric form when possible
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<u64>()
            .map_or_else(|_| Self::Text(s.to_owned()), Self::Number))
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}
