//! Wire types of the realtime change feed.

use serde::{Deserialize, Serialize};

/// Kind of change applied to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Notification sent to subscribers of `public:<table>` channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Channel name, e.g. `public:pages`.
    pub channel: String,
    pub kind: ChangeKind,
    pub record_id: String,
    pub at: chrono::DateTime<chrono::Utc>,
}

impl ChangeEvent {
    pub fn new(channel: impl Into<String>, kind: ChangeKind, record_id: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            kind,
            record_id: record_id.into(),
            at: chrono::Utc::now(),
        }
    }
}
