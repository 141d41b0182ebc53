//! Wire envelopes crossing the host/content boundary.
//!
//! A request travels host-ward as `{"fn": "...", "args": ..., "sequence": N}`;
//! the matching response comes back as `{"sequence": N, "ok": ...}` or
//! `{"sequence": N, "err": ...}`. The serialization beyond that shape is up
//! to the transport.

use riptide_core::SequenceId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capability::Capability;

/// A capability invocation sent to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// The capability being invoked.
    #[serde(rename = "fn")]
    pub function: Capability,

    /// Caller-supplied arguments. Carried opaquely; the host is the
    /// authority on their shape.
    pub args: Value,

    /// Correlates the eventual response with the pending call.
    pub sequence: SequenceId,
}

impl RequestEnvelope {
    /// Parse a request from its raw JSON form (e.g. a `postMessage` body).
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

/// A response received from the host, correlated by sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub sequence: SequenceId,

    #[serde(flatten)]
    pub outcome: ResponseOutcome,
}

/// The payload of a response. A response carries exactly one of the two
/// variants, never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResponseOutcome {
    #[serde(rename = "ok")]
    Success(Value),

    #[serde(rename = "err")]
    Failure(Value),
}

impl ResponseEnvelope {
    /// A response resolving `sequence` with a success payload.
    pub fn success(sequence: SequenceId, payload: Value) -> Self {
        Self {
            sequence,
            outcome: ResponseOutcome::Success(payload),
        }
    }

    /// A response rejecting `sequence` with a host-defined failure payload.
    pub fn failure(sequence: SequenceId, payload: Value) -> Self {
        Self {
            sequence,
            outcome: ResponseOutcome::Failure(payload),
        }
    }

    /// Parse a response from its raw JSON form.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}
