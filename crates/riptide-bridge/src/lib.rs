//! Host/content web-extension bridge for Riptide.
//!
//! Embedded content shares no call stack with the host shell and has no
//! synchronous return channel. This crate provides the machinery built on
//! top of the one-way boundary:
//!
//! - request envelopes carrying a monotonically increasing sequence number
//! - a correlation table mapping outstanding sequence numbers to pending
//!   completions
//! - a router that settles each completion exactly once, in whatever order
//!   responses arrive
//! - the fixed capability surface (`tabs`, `notifications`) content may
//!   call, exposed under both the `browser` and `chrome` names
//!
//! Messages flow in both directions:
//! - **content -> host**: [`ExtensionBridge::invoke`] builds a
//!   [`RequestEnvelope`] and hands it to the [`BoundaryTransport`].
//! - **host -> content**: the inbound side calls
//!   [`ExtensionBridge::handle_response`] with each [`ResponseEnvelope`];
//!   delivery order is arbitrary and strays are dropped.

pub mod api;
pub mod bridge;
pub mod capability;
pub mod envelope;
pub mod host;
pub mod pending;
pub mod script;
pub mod transport;

pub use api::{bind_globals, ExtensionGlobals, Notifications, Tabs, WebExtensionApi};
pub use bridge::{CallError, CallOutcome, Completion, ExtensionBridge};
pub use capability::{Capability, UnknownCapability};
pub use envelope::{RequestEnvelope, ResponseEnvelope, ResponseOutcome};
pub use host::{connect_local, dispatch_to_host, CapabilityHost};
pub use pending::{BridgeStats, StatsSnapshot};
pub use script::{init_script, settle_script};
pub use transport::{BoundaryTransport, ChannelTransport, TransportError};
