use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a persisted order.
///
/// Identifiers are assigned by the store when an order is created and never
/// change afterwards. Callers only obtain them from the store or by parsing
/// a value the store handed out earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Wraps a raw identifier as read from storage.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier for binding into queries.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not a valid order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid order id {input:?}: must be a positive integer")]
pub struct ParseOrderIdError {
    pub input: String,
}

impl FromStr for OrderId {
    type Err = ParseOrderIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<i64>() {
            Ok(value) if value > 0 => Ok(Self(value)),
            _ => Err(ParseOrderIdError {
                input: s.to_string(),
            }),
        }
    }
}
