//! The closed set of operations content may invoke through the bridge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A capability exposed to content.
///
/// The wire form is the dotted extension-API name (e.g. `tabs.create`).
/// Names outside this set fail to parse, so unsupported operations are
/// rejected before they ever reach the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Open a new tab.
    #[serde(rename = "tabs.create")]
    TabsCreate,

    /// Run a script in a tab.
    #[serde(rename = "tabs.executeScript")]
    TabsExecuteScript,

    /// Show a notification.
    #[serde(rename = "notifications.create")]
    NotificationsCreate,
}

impl Capability {
    /// Every capability the bridge exposes.
    pub const ALL: [Capability; 3] = [
        Capability::TabsCreate,
        Capability::TabsExecuteScript,
        Capability::NotificationsCreate,
    ];

    /// The dotted wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::TabsCreate => "tabs.create",
            Capability::TabsExecuteScript => "tabs.executeScript",
            Capability::NotificationsCreate => "notifications.create",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error produced when a capability name is not part of the surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capability: {0}")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "tabs.create" => Ok(Capability::TabsCreate),
            "tabs.executeScript" => Ok(Capability::TabsExecuteScript),
            "notifications.create" => Ok(Capability::NotificationsCreate),
            other => Err(UnknownCapability(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for capability in Capability::ALL {
            let json = serde_json::to_string(&capability).unwrap();
            assert_eq!(json, format!("\"{}\"", capability.as_str()));

            let parsed: Capability = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, capability);
        }
    }

    #[test]
    fn test_from_str_matches_wire_names() {
        assert_eq!("tabs.create".parse(), Ok(Capability::TabsCreate));
        assert_eq!(
            "tabs.executeScript".parse(),
            Ok(Capability::TabsExecuteScript)
        );
        assert_eq!(
            "notifications.create".parse(),
            Ok(Capability::NotificationsCreate)
        );
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        let err = "tabs.remove".parse::<Capability>().unwrap_err();
        assert_eq!(err, UnknownCapability("tabs.remove".to_string()));

        assert!(serde_json::from_str::<Capability>("\"bookmarks.create\"").is_err());
    }
}
