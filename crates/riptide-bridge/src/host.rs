//! The host side of the capability surface.
//!
//! The shell that owns tabs and notifications lives outside this crate;
//! what it must provide is the [`CapabilityHost`] trait. `connect_local`
//! wires a bridge to such a host over an in-process channel, which is how
//! shell-internal callers and the integration tests run the full loop.

use std::sync::{Arc, Weak};

use riptide_core::BridgeConfig;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::bridge::ExtensionBridge;
use crate::capability::Capability;
use crate::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::transport::ChannelTransport;

/// What the host must implement for the bridge's capability surface.
///
/// `Err` carries the host-defined failure payload; it reaches the caller
/// verbatim as the rejection value of the completion.
pub trait CapabilityHost: Send + Sync {
    /// `tabs.create`
    fn create_tab(&self, args: &Value) -> Result<Value, Value>;

    /// `tabs.executeScript`
    fn execute_script(&self, args: &Value) -> Result<Value, Value>;

    /// `notifications.create`
    fn create_notification(&self, args: &Value) -> Result<Value, Value>;
}

/// Map one request envelope onto the host and wrap the outcome.
pub fn dispatch_to_host(
    host: &dyn CapabilityHost,
    request: &RequestEnvelope,
) -> ResponseEnvelope {
    let outcome = match request.function {
        Capability::TabsCreate => host.create_tab(&request.args),
        Capability::TabsExecuteScript => host.execute_script(&request.args),
        Capability::NotificationsCreate => host.create_notification(&request.args),
    };

    match outcome {
        Ok(payload) => ResponseEnvelope::success(request.sequence, payload),
        Err(payload) => {
            debug!(
                sequence = %request.sequence,
                capability = %request.function,
                "host reported failure"
            );
            ResponseEnvelope::failure(request.sequence, payload)
        }
    }
}

/// Wire a bridge to an in-process host.
///
/// Requests flow out through a [`ChannelTransport`]; a spawned task
/// dispatches each one to `host` and feeds the response back through the
/// router. The task ends once the bridge is dropped and the channel drains.
pub fn connect_local(host: Arc<dyn CapabilityHost>, config: BridgeConfig) -> Arc<ExtensionBridge> {
    let (transport, requests) = ChannelTransport::new();
    let bridge = Arc::new(ExtensionBridge::new(transport, config));
    tokio::spawn(host_loop(requests, host, Arc::downgrade(&bridge)));
    bridge
}

// Holds the bridge weakly: the bridge owns the channel sender, so a strong
// reference here would keep the pair alive forever.
async fn host_loop(
    mut requests: UnboundedReceiver<RequestEnvelope>,
    host: Arc<dyn CapabilityHost>,
    bridge: Weak<ExtensionBridge>,
) {
    while let Some(request) = requests.recv().await {
        let response = dispatch_to_host(host.as_ref(), &request);
        let Some(bridge) = bridge.upgrade() else {
            break;
        };
        bridge.handle_response(response);
    }
    debug!("local host loop finished");
}
