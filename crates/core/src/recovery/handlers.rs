//! Built-in recovery handlers
//!
//! The handler set is closed: persisted state stores the tag, never a
//! symbolic function name. A tag read back from storage that no longer
//! matches a known handler deserializes as `Default` rather than failing.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use wishbot_domain::ErrorDetails;

/// Closed set of recovery handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// A required file or snapshot document is missing.
    FileNotFound,
    /// An external call failed.
    Network,
    /// A persisted store misbehaved.
    Database,
    /// Fallback logger; also the target for unknown persisted tags.
    Default,
}

impl HandlerKind {
    /// Stable tag persisted in the binding document.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::FileNotFound => "file_not_found",
            Self::Network => "network",
            Self::Database => "database",
            Self::Default => "default",
        }
    }

    /// Resolve a persisted tag. Tags with no matching handler resolve to
    /// [`HandlerKind::Default`] rather than failing.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "file_not_found" => Self::FileNotFound,
            "network" => Self::Network,
            "database" => Self::Database,
            _ => Self::Default,
        }
    }
}

impl Serialize for HandlerKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_tag())
    }
}

impl<'de> Deserialize<'de> for HandlerKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

impl HandlerKind {
    /// Handle routed error details.
    pub fn handle(&self, details: &ErrorDetails) {
        match self {
            Self::FileNotFound => {
                warn!(
                    category = %details.category,
                    timestamp = %details.timestamp,
                    "Handling missing file: {}",
                    details.message
                );
            }
            Self::Network => {
                warn!(
                    category = %details.category,
                    timestamp = %details.timestamp,
                    "Handling network failure: {}",
                    details.message
                );
            }
            Self::Database => {
                error!(
                    category = %details.category,
                    timestamp = %details.timestamp,
                    "Handling database failure: {}",
                    details.message
                );
            }
            Self::Default => {
                error!(
                    category = %details.category,
                    timestamp = %details.timestamp,
                    "Default handler: {}",
                    details.message
                );
            }
        }
    }
}
