//! Call dispatcher and response router.
//!
//! [`ExtensionBridge`] is the content side of the bridge: `invoke` builds a
//! request envelope, registers the pending completion, and hands the
//! envelope to the transport; `handle_response` routes each inbound
//! envelope to its completion. One instance per content context; the
//! correlation table is owned here, not shared process-wide.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use riptide_core::{BridgeConfig, SequenceId};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::capability::Capability;
use crate::envelope::{RequestEnvelope, ResponseEnvelope, ResponseOutcome};
use crate::pending::{CorrelationTable, StatsSnapshot};
use crate::transport::{BoundaryTransport, TransportError};

/// Why a completion settled without a success payload.
#[derive(Debug, Error)]
pub enum CallError {
    /// The host answered with a failure payload, preserved verbatim.
    #[error("host rejected call: {0}")]
    Host(Value),

    /// The transport would not accept the request.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// No response arrived within the configured bound.
    #[error("no response within the configured timeout")]
    TimedOut,

    /// The bridge went away before the call settled.
    #[error("call cancelled before settlement")]
    Cancelled,
}

/// What a completion settles with.
pub type CallOutcome = Result<Value, CallError>;

/// The caller's half of one in-flight call.
///
/// Settles exactly once: with the host's success payload, the host's
/// failure payload, a transport error, or a timeout. Dropping a completion
/// abandons the call without cancelling it host-side.
#[derive(Debug)]
pub struct Completion {
    sequence: SequenceId,
    rx: oneshot::Receiver<CallOutcome>,
}

impl Completion {
    /// Sequence number of the call this completion belongs to.
    pub fn sequence(&self) -> SequenceId {
        self.sequence
    }
}

impl Future for Completion {
    type Output = CallOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.rx).poll(cx).map(|settled| match settled {
            Ok(outcome) => outcome,
            // Sender dropped without settling: the bridge itself is gone.
            Err(_) => Err(CallError::Cancelled),
        })
    }
}

/// The host/content web-extension bridge.
pub struct ExtensionBridge {
    table: CorrelationTable,
    transport: Box<dyn BoundaryTransport>,
    config: BridgeConfig,
}

impl ExtensionBridge {
    /// Create a bridge over `transport` with an empty correlation table.
    pub fn new(transport: impl BoundaryTransport + 'static, config: BridgeConfig) -> Self {
        Self {
            table: CorrelationTable::new(),
            transport: Box::new(transport),
            config,
        }
    }

    /// Dispatch one capability call.
    ///
    /// Allocates the next sequence id, registers the completion, and posts
    /// the envelope. Returns immediately; the completion settles when (and
    /// if) the correlated response is routed. A transport refusal settles
    /// the completion right away, so the caller always gets a completion
    /// and never a synchronous error.
    pub fn invoke(&self, capability: Capability, args: Value) -> Completion {
        let sequence = self.table.allocate();
        let rx = self.table.register(sequence, capability);

        let envelope = RequestEnvelope {
            function: capability,
            args,
            sequence,
        };
        if let Err(err) = self.transport.post_request(&envelope) {
            warn!(sequence = %sequence, error = %err, "transport refused request");
            self.table.settle(sequence, Err(CallError::Transport(err)));
        }

        Completion { sequence, rx }
    }

    /// Route one inbound response to its pending completion.
    ///
    /// May be called from any thread, in any order relative to send order.
    /// Unknown and already-settled sequence numbers are dropped silently
    /// and counted as strays.
    pub fn handle_response(&self, envelope: ResponseEnvelope) {
        let outcome = match envelope.outcome {
            ResponseOutcome::Success(payload) => Ok(payload),
            ResponseOutcome::Failure(payload) => Err(CallError::Host(payload)),
        };
        self.table.settle(envelope.sequence, outcome);
    }

    /// Reject every pending call older than the configured timeout.
    ///
    /// A no-op unless `response_timeout_ms` is set; with the default
    /// configuration an unanswered call stays pending forever.
    pub fn sweep_expired(&self) -> usize {
        match self.config.response_timeout() {
            Some(timeout) => self.table.sweep_expired(timeout),
            None => 0,
        }
    }

    /// Sweep expired calls on the configured interval.
    ///
    /// Returns immediately when no timeout is configured; otherwise runs
    /// until the owning task is dropped or aborted.
    pub async fn run_sweeper(self: Arc<Self>) {
        if self.config.response_timeout().is_none() {
            return;
        }

        let mut ticks = tokio::time::interval(self.config.sweep_interval());
        ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticks.tick().await;
            let expired = self.sweep_expired();
            if expired > 0 {
                debug!(expired, "swept expired pending calls");
            }
        }
    }

    /// Number of calls currently awaiting a response.
    pub fn pending_calls(&self) -> usize {
        self.table.len()
    }

    /// Counter snapshot for diagnostics.
    pub fn stats(&self) -> StatsSnapshot {
        self.table.snapshot()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ChannelTransport;
    use serde_json::json;
    use std::time::Duration;

    fn bridge_with_channel() -> (
        ExtensionBridge,
        tokio::sync::mpsc::UnboundedReceiver<RequestEnvelope>,
    ) {
        let (transport, rx) = ChannelTransport::new();
        (ExtensionBridge::new(transport, BridgeConfig::default()), rx)
    }

    #[tokio::test]
    async fn test_invoke_posts_envelope_and_registers_call() {
        let (bridge, mut requests) = bridge_with_channel();

        let completion = bridge.invoke(Capability::TabsCreate, json!({ "url": "https://example.com" }));
        assert_eq!(completion.sequence(), SequenceId(1));
        assert_eq!(bridge.pending_calls(), 1);

        let posted = requests.recv().await.unwrap();
        assert_eq!(posted.function, Capability::TabsCreate);
        assert_eq!(posted.sequence, SequenceId(1));
        assert_eq!(posted.args, json!({ "url": "https://example.com" }));
    }

    #[tokio::test]
    async fn test_response_resolves_the_matching_completion() {
        let (bridge, _requests) = bridge_with_channel();

        let completion = bridge.invoke(Capability::TabsCreate, json!({ "url": "https://example.com" }));
        bridge.handle_response(ResponseEnvelope::success(
            completion.sequence(),
            json!({ "tabId": 7 }),
        ));

        assert_eq!(completion.await.unwrap(), json!({ "tabId": 7 }));
        assert_eq!(bridge.pending_calls(), 0);
    }

    #[tokio::test]
    async fn test_host_failure_payload_reaches_the_caller_verbatim() {
        let (bridge, _requests) = bridge_with_channel();

        let completion = bridge.invoke(Capability::NotificationsCreate, json!({ "title": "Hi" }));
        bridge.handle_response(ResponseEnvelope::failure(
            completion.sequence(),
            json!("permission_denied"),
        ));

        match completion.await {
            Err(CallError::Host(payload)) => assert_eq!(payload, json!("permission_denied")),
            other => panic!("expected host rejection, got {other:?}"),
        }
        assert_eq!(bridge.pending_calls(), 0);
    }

    #[tokio::test]
    async fn test_responses_route_independently_of_delivery_order() {
        let (bridge, _requests) = bridge_with_channel();

        let first = bridge.invoke(Capability::TabsCreate, json!({ "url": "a" }));
        let second = bridge.invoke(Capability::TabsCreate, json!({ "url": "b" }));

        // Later call answered first.
        bridge.handle_response(ResponseEnvelope::success(second.sequence(), json!("b")));
        bridge.handle_response(ResponseEnvelope::success(first.sequence(), json!("a")));

        assert_eq!(first.await.unwrap(), json!("a"));
        assert_eq!(second.await.unwrap(), json!("b"));
        assert_eq!(bridge.pending_calls(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_response_settles_once() {
        let (bridge, _requests) = bridge_with_channel();

        let completion = bridge.invoke(Capability::TabsExecuteScript, json!({ "code": "1" }));
        let sequence = completion.sequence();

        bridge.handle_response(ResponseEnvelope::success(sequence, json!(1)));
        bridge.handle_response(ResponseEnvelope::failure(sequence, json!("late")));

        assert_eq!(completion.await.unwrap(), json!(1));
        let stats = bridge.stats();
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.stray_responses, 1);
    }

    #[tokio::test]
    async fn test_unknown_sequence_has_no_observable_effect() {
        let (bridge, _requests) = bridge_with_channel();
        let completion = bridge.invoke(Capability::TabsCreate, json!(null));

        bridge.handle_response(ResponseEnvelope::success(SequenceId(99), json!(null)));

        assert_eq!(bridge.pending_calls(), 1);
        assert_eq!(bridge.stats().stray_responses, 1);
        drop(completion);
    }

    #[tokio::test]
    async fn test_transport_refusal_rejects_immediately() {
        let (transport, rx) = ChannelTransport::new();
        drop(rx);
        let bridge = ExtensionBridge::new(transport, BridgeConfig::default());

        let completion = bridge.invoke(Capability::TabsCreate, json!(null));
        assert_eq!(bridge.pending_calls(), 0);

        match completion.await {
            Err(CallError::Transport(TransportError::HostGone)) => {}
            other => panic!("expected transport rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sweep_is_a_noop_without_a_timeout() {
        let (bridge, _requests) = bridge_with_channel();
        let _completion = bridge.invoke(Capability::TabsCreate, json!(null));

        assert_eq!(bridge.sweep_expired(), 0);
        assert_eq!(bridge.pending_calls(), 1);
    }

    #[tokio::test]
    async fn test_configured_timeout_rejects_and_removes() {
        let (transport, _requests) = ChannelTransport::new();
        let config = BridgeConfig::default().with_response_timeout(Duration::from_millis(10));
        let bridge = ExtensionBridge::new(transport, config);

        let completion = bridge.invoke(Capability::TabsCreate, json!(null));
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(bridge.sweep_expired(), 1);
        assert_eq!(bridge.pending_calls(), 0);
        assert_eq!(bridge.stats().timed_out, 1);
        assert!(matches!(completion.await, Err(CallError::TimedOut)));
    }

    #[tokio::test]
    async fn test_dropping_the_bridge_cancels_pending_completions() {
        let (bridge, _requests) = bridge_with_channel();
        let completion = bridge.invoke(Capability::TabsCreate, json!(null));

        drop(bridge);
        assert!(matches!(completion.await, Err(CallError::Cancelled)));
    }
}
