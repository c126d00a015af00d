use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::NodeKind;

/// A committed property change in the repository.
///
/// Emitted once per committed property, synchronously on the commit path,
/// possibly before the transaction is visible to other read sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitEvent {
    pub id: Uuid,
    /// Workspace the commit happened in.
    pub workspace: String,
    /// Path of the node owning the committed property.
    pub node_path: String,
    pub node_kind: NodeKind,
    /// Name of the committed property.
    pub property: String,
    pub timestamp: DateTime<Utc>,
}

impl CommitEvent {
    pub fn new(
        workspace: impl Into<String>,
        node_path: impl Into<String>,
        node_kind: NodeKind,
        property: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace: workspace.into(),
            node_path: node_path.into(),
            node_kind,
            property: property.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BINARY_PROPERTY;

    #[test]
    fn test_event_creation() {
        let event = CommitEvent::new(
            "collaboration",
            "/docs/cat.jpg/content",
            NodeKind::Resource,
            BINARY_PROPERTY,
        );
        assert_eq!(event.workspace, "collaboration");
        assert_eq!(event.node_kind, NodeKind::Resource);
        assert_eq!(event.property, BINARY_PROPERTY);
    }

    #[test]
    fn test_event_serialization() {
        let event = CommitEvent::new("collaboration", "/a.png/content", NodeKind::Resource, "data");
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: CommitEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.id, event.id);
        assert_eq!(deserialized.node_path, "/a.png/content");
    }
}
