//! Bridge configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::RiptideResult;

/// Configuration for one extension bridge instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// How long a call may stay unanswered before it is rejected, in
    /// milliseconds.
    ///
    /// `None` keeps unanswered calls pending indefinitely: their entries
    /// stay in the correlation table until the process exits. That is the
    /// historical behavior of the extension API and the default here;
    /// setting a timeout is an opt-in behavior change.
    pub response_timeout_ms: Option<u64>,

    /// Interval between expiry sweeps, in milliseconds. Only consulted when
    /// `response_timeout_ms` is set.
    pub sweep_interval_ms: u64,

    /// Install the capability surface under `chrome` as well as `browser`
    /// in content contexts.
    pub expose_chrome_alias: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: None,
            sweep_interval_ms: 1_000,
            expose_chrome_alias: true,
        }
    }
}

impl BridgeConfig {
    /// The response timeout as a [`Duration`], if one is configured.
    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout_ms.map(Duration::from_millis)
    }

    /// The sweep interval as a [`Duration`].
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Set a response timeout.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Parse a configuration from a JSON document. Missing fields fall back
    /// to their defaults.
    pub fn from_json(json: &str) -> RiptideResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> RiptideResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}
