//! In-memory content repository.
//!
//! Models the file-node / resource-node shape of a content repository: every
//! stored file is a `File` node with a `Resource` child named `content` that
//! holds the binary stream and the descriptive metadata.
//!
//! Commits are two-phase on purpose: `store_file` places the nodes in a
//! pending area and emits the commit event immediately, while sessions only
//! see nodes once `publish` has run. This reproduces the timing of a real
//! repository, where the commit event fires before the transaction is
//! visible to other read sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use autolabel_core::{CommitEvent, NodeKind, BINARY_PROPERTY};

use crate::session::MemorySession;

/// Name of the resource child node holding a file's binary content.
pub const CONTENT_NODE: &str = "content";

/// Buffer size for the commit-event channel.
const EVENT_BUFFER_SIZE: usize = 256;

/// Property name for the MIME type on a resource node.
const MIME_PROPERTY: &str = "mime_type";

#[derive(Debug, Clone)]
pub(crate) struct NodeRecord {
    pub id: Uuid,
    pub name: String,
    pub kind: NodeKind,
    pub data: Option<Vec<u8>>,
    pub mime: Option<String>,
    pub description: Option<String>,
    pub extended_metadata: bool,
}

#[derive(Debug, Default)]
pub(crate) struct WorkspaceStore {
    /// Nodes visible to sessions, keyed by path.
    pub visible: HashMap<String, NodeRecord>,
    /// Committed but not yet visible nodes.
    pub pending: HashMap<String, NodeRecord>,
}

pub(crate) type SharedStore = Arc<RwLock<HashMap<String, WorkspaceStore>>>;

/// In-memory repository: node store plus commit-event emission.
#[derive(Clone)]
pub struct MemoryRepository {
    store: SharedStore,
    events_tx: mpsc::Sender<CommitEvent>,
    /// When set, stored files become visible automatically after this delay.
    auto_publish: Option<Duration>,
}

impl MemoryRepository {
    /// Create a repository and the receiving end of its commit-event channel.
    pub fn new() -> (Self, mpsc::Receiver<CommitEvent>) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER_SIZE);
        let repo = Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            events_tx,
            auto_publish: None,
        };
        (repo, events_rx)
    }

    /// Make stored files visible automatically after `delay`.
    pub fn with_auto_publish(mut self, delay: Duration) -> Self {
        self.auto_publish = Some(delay);
        self
    }

    /// Store a file: creates the file node and its resource child in the
    /// pending area and emits the commit events for the resource node's
    /// properties. Returns the file node's id.
    pub async fn store_file(
        &self,
        workspace: &str,
        path: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> Uuid {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        let content_path = format!("{path}/{CONTENT_NODE}");

        let file_id = Uuid::new_v4();
        let file_node = NodeRecord {
            id: file_id,
            name: name.clone(),
            kind: NodeKind::File,
            data: None,
            mime: None,
            description: None,
            extended_metadata: false,
        };
        let content_node = NodeRecord {
            id: Uuid::new_v4(),
            name: CONTENT_NODE.to_string(),
            kind: NodeKind::Resource,
            data: Some(bytes),
            mime: Some(mime.to_string()),
            description: None,
            extended_metadata: false,
        };

        {
            let mut store = self.store.write().await;
            let ws = store.entry(workspace.to_string()).or_default();
            ws.pending.insert(path.to_string(), file_node);
            ws.pending.insert(content_path.clone(), content_node);
        }
        info!(workspace, path, "Stored file (pending visibility)");

        // One event per committed property on the resource node, the binary
        // payload last.
        self.emit(CommitEvent::new(
            workspace,
            content_path.clone(),
            NodeKind::Resource,
            MIME_PROPERTY,
        ))
        .await;
        self.emit(CommitEvent::new(
            workspace,
            content_path,
            NodeKind::Resource,
            BINARY_PROPERTY,
        ))
        .await;

        if let Some(delay) = self.auto_publish {
            let repo = self.clone();
            let workspace = workspace.to_string();
            let path = path.to_string();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                repo.publish(&workspace, &path).await;
            });
        }

        file_id
    }

    /// Make a pending file (and its resource child) visible to sessions.
    pub async fn publish(&self, workspace: &str, path: &str) {
        let content_path = format!("{path}/{CONTENT_NODE}");
        let mut store = self.store.write().await;
        let Some(ws) = store.get_mut(workspace) else {
            warn!(workspace, path, "Publish on unknown workspace");
            return;
        };
        let mut moved = 0;
        for p in [path, content_path.as_str()] {
            if let Some(node) = ws.pending.remove(p) {
                ws.visible.insert(p.to_string(), node);
                moved += 1;
            }
        }
        debug!(workspace, path, moved, "Published pending nodes");
    }

    /// Open a session scoped to one workspace. Sessions read live visible
    /// state; their writes are staged until `save`.
    pub fn open_session(&self, workspace: &str) -> MemorySession {
        MemorySession::new(workspace.to_string(), Arc::clone(&self.store))
    }

    /// Description currently stored on a file's content node, if any.
    /// Convenience accessor for wiring and assertions.
    pub async fn description(&self, workspace: &str, file_path: &str) -> Option<String> {
        let content_path = format!("{file_path}/{CONTENT_NODE}");
        let store = self.store.read().await;
        store
            .get(workspace)?
            .visible
            .get(&content_path)?
            .description
            .clone()
    }

    async fn emit(&self, event: CommitEvent) {
        if let Err(e) = self.events_tx.send(event).await {
            warn!(error = %e, "Commit event dropped: no consumer");
        }
    }
}
