//! Common types used throughout Riptide

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for one in-flight capability call.
///
/// Allocated by the bridge instance that sent the request, strictly
/// increasing for the lifetime of that instance and never reused. A
/// sequence id is only meaningful for correlation between the send and the
/// first matching response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceId(pub u64);

impl SequenceId {
    /// The raw sequence number.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SequenceId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
