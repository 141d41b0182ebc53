//! The fixed capability surface application code calls.
//!
//! Mirrors the extension-API object shape: namespaces first, operations
//! second. Every operation is a thin wrapper over
//! [`ExtensionBridge::invoke`] with its own capability name; arguments pass
//! through opaquely and malformed arguments surface as host-rejected
//! completions, not local errors.

use std::sync::Arc;

use serde_json::Value;

use crate::bridge::{Completion, ExtensionBridge};
use crate::capability::Capability;

/// Entry point for capability calls. Cloning is cheap and shares the
/// underlying bridge.
#[derive(Clone)]
pub struct WebExtensionApi {
    bridge: Arc<ExtensionBridge>,
}

impl WebExtensionApi {
    pub fn new(bridge: Arc<ExtensionBridge>) -> Self {
        Self { bridge }
    }

    /// The `tabs` namespace.
    pub fn tabs(&self) -> Tabs<'_> {
        Tabs {
            bridge: &self.bridge,
        }
    }

    /// The `notifications` namespace.
    pub fn notifications(&self) -> Notifications<'_> {
        Notifications {
            bridge: &self.bridge,
        }
    }
}

/// `browser.tabs.*`
pub struct Tabs<'a> {
    bridge: &'a ExtensionBridge,
}

impl Tabs<'_> {
    /// `tabs.create(args)`
    pub fn create(&self, args: Value) -> Completion {
        self.bridge.invoke(Capability::TabsCreate, args)
    }

    /// `tabs.executeScript(args)`
    pub fn execute_script(&self, args: Value) -> Completion {
        self.bridge.invoke(Capability::TabsExecuteScript, args)
    }
}

/// `browser.notifications.*`
pub struct Notifications<'a> {
    bridge: &'a ExtensionBridge,
}

impl Notifications<'_> {
    /// `notifications.create(args)`
    pub fn create(&self, args: Value) -> Completion {
        self.bridge.invoke(Capability::NotificationsCreate, args)
    }
}

/// The capability surface under both global names legacy call sites use.
///
/// `chrome` is an alias of `browser`, not a second bridge: both handles
/// share one sequence counter and one correlation table.
#[derive(Clone)]
pub struct ExtensionGlobals {
    pub browser: WebExtensionApi,
    pub chrome: WebExtensionApi,
}

/// Bind the facade under both naming conventions. Pure aliasing, done once
/// at bridge setup.
pub fn bind_globals(bridge: &Arc<ExtensionBridge>) -> ExtensionGlobals {
    let browser = WebExtensionApi::new(Arc::clone(bridge));
    let chrome = browser.clone();
    ExtensionGlobals { browser, chrome }
}
