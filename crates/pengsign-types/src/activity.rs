//! Document lifecycle activity records
//!
//! Activities are append-only rows produced by the business layer; the
//! sealing engine only reads them to render the audit-trail timeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle event types recorded against a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    Created,
    Sent,
    Viewed,
    Signed,
    Completed,
    Downloaded,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// A single recorded lifecycle event.
///
/// `details` is an action-specific bag of metadata (actor identity, counts,
/// reasons). Consumers extract the keys they know about and degrade
/// gracefully when a key is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub action: ActivityAction,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub details: serde_json::Value,
}

impl ActivityRecord {
    pub fn new(action: ActivityAction, created_at: DateTime<Utc>) -> Self {
        Self {
            action,
            created_at,
            details: serde_json::Value::Null,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// String-valued detail under `key`, if present.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key)?.as_str()
    }

    /// Numeric detail under `key`, if present.
    pub fn detail_u64(&self, key: &str) -> Option<u64> {
        self.details.get(key)?.as_u64()
    }
}
