//! Content-side shim for WebView contexts.
//!
//! Rust callers go through [`crate::api`]; page content gets the same
//! surface from a script injected once per WebView. The shim keeps its own
//! promise table keyed by sequence number and posts request envelopes
//! through `window.ipc.postMessage`; the host settles a promise by
//! evaluating the snippet rendered by [`settle_script`] on its
//! fire-and-forget script channel.

use riptide_core::BridgeConfig;

use crate::envelope::{ResponseEnvelope, ResponseOutcome};

/// Installs `window.browser` with the capability surface and the promise
/// table. Injected as an initialization script into every WebView.
const SHIM_BASE: &str = r#"
(function() {
    if (window.browser && window.browser.__riptide) {
        return;
    }
    var pending = {};
    var nextSequence = 1;
    function invoke(fn, args) {
        return new Promise(function (resolve, reject) {
            var sequence = nextSequence++;
            pending[sequence] = { resolve: resolve, reject: reject };
            window.ipc.postMessage(JSON.stringify({
                fn: fn,
                args: args === undefined ? null : args,
                sequence: sequence
            }));
        });
    }
    window.browser = {
        __riptide: true,
        tabs: {
            create: function (args) { return invoke('tabs.create', args); },
            executeScript: function (args) { return invoke('tabs.executeScript', args); }
        },
        notifications: {
            create: function (args) { return invoke('notifications.create', args); }
        },
        _settle: function (sequence, ok, payload) {
            var call = pending[sequence];
            if (!call) {
                return;
            }
            delete pending[sequence];
            (ok ? call.resolve : call.reject)(payload);
        }
    };
})();
"#;

/// Compatibility with call sites written against the Chrome naming.
const CHROME_ALIAS: &str = "window.chrome = window.browser;\n";

/// Render the initialization script for one WebView.
pub fn init_script(config: &BridgeConfig) -> String {
    if config.expose_chrome_alias {
        format!("{SHIM_BASE}{CHROME_ALIAS}")
    } else {
        SHIM_BASE.to_string()
    }
}

/// Render the JS that settles the content-side promise for `envelope`.
///
/// Both arms JSON-encode the payload so it survives embedding in evaluated
/// source.
pub fn settle_script(envelope: &ResponseEnvelope) -> String {
    let (ok, payload) = match &envelope.outcome {
        ResponseOutcome::Success(value) => (true, value),
        ResponseOutcome::Failure(value) => (false, value),
    };
    let payload_json = serde_json::to_string(payload).unwrap_or_else(|_| "null".to_string());
    format!(
        "window.browser._settle({}, {}, {});",
        envelope.sequence, ok, payload_json
    )
}
