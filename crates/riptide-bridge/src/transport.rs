//! The boundary-crossing primitive between content and host.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::trace;

use crate::envelope::RequestEnvelope;

/// Why the transport refused an envelope.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The host context is gone (window closed, channel receiver dropped).
    #[error("host context is gone")]
    HostGone,

    /// The transport could not accept the envelope.
    #[error("transport rejected request: {0}")]
    Rejected(String),
}

/// One-way, fire-and-forget delivery of request envelopes to the host.
///
/// There is no return path here: responses arrive out of band, with
/// whoever owns the inbound side calling
/// [`ExtensionBridge::handle_response`](crate::bridge::ExtensionBridge::handle_response)
/// for each delivery.
pub trait BoundaryTransport: Send + Sync {
    /// Hand one envelope to the host. Must not block waiting for the host
    /// to answer.
    fn post_request(&self, envelope: &RequestEnvelope) -> Result<(), TransportError>;
}

impl<T: BoundaryTransport + ?Sized> BoundaryTransport for Arc<T> {
    fn post_request(&self, envelope: &RequestEnvelope) -> Result<(), TransportError> {
        (**self).post_request(envelope)
    }
}

/// Transport backed by an in-process channel, for hosts living on the same
/// runtime (shell-internal pages, tests).
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<RequestEnvelope>,
}

impl ChannelTransport {
    /// Create the transport and the receiving end a host loop consumes.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RequestEnvelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl BoundaryTransport for ChannelTransport {
    fn post_request(&self, envelope: &RequestEnvelope) -> Result<(), TransportError> {
        trace!(sequence = %envelope.sequence, function = %envelope.function, "posting request envelope");
        self.tx
            .send(envelope.clone())
            .map_err(|_| TransportError::HostGone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use riptide_core::SequenceId;
    use serde_json::json;

    fn request(sequence: u64) -> RequestEnvelope {
        RequestEnvelope {
            function: Capability::TabsCreate,
            args: json!(null),
            sequence: SequenceId(sequence),
        }
    }

    #[tokio::test]
    async fn test_channel_transport_delivers() {
        let (transport, mut rx) = ChannelTransport::new();
        transport.post_request(&request(1)).unwrap();

        let delivered = rx.recv().await.unwrap();
        assert_eq!(delivered.sequence, SequenceId(1));
    }

    #[tokio::test]
    async fn test_channel_transport_reports_lost_host() {
        let (transport, rx) = ChannelTransport::new();
        drop(rx);

        let err = transport.post_request(&request(1)).unwrap_err();
        assert!(matches!(err, TransportError::HostGone));
    }
}
