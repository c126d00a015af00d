use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AutolabelError;
use crate::types::{FileMeta, Label};

/// A remote service that labels image content.
///
/// One implementation exists (the vision API client); tests substitute fakes.
#[async_trait]
pub trait LabelSource: Send + Sync {
    /// Source name for logging (e.g. "google-vision").
    fn name(&self) -> &str;

    /// Classify raw encoded image bytes into labels above the source's
    /// confidence threshold, in the order the remote service returned them.
    async fn classify(&self, image: &[u8]) -> Result<Vec<Label>, AutolabelError>;
}

/// Opens fresh repository read/write sessions.
///
/// Each enrichment task opens its own session; sessions are never shared
/// with the request that triggered the task.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn open(&self, workspace: &str) -> Result<Box<dyn RepoSession>, AutolabelError>;
}

/// A repository session scoped to one workspace.
///
/// Writes are staged on the session and persisted all-or-nothing by `save`.
#[async_trait]
pub trait RepoSession: Send + Sync {
    /// Whether a node exists at the given path, as seen by this session.
    async fn node_exists(&self, path: &str) -> Result<bool, AutolabelError>;

    /// Resolve the file node at `path`. A resource content-holder path
    /// resolves to its parent file node. Returns `None` when the node exists
    /// but is not a file.
    async fn resolve_file(&self, path: &str) -> Result<Option<FileMeta>, AutolabelError>;

    /// Read the full binary content of the file node's resource child.
    async fn read_binary(&self, file_path: &str) -> Result<Vec<u8>, AutolabelError>;

    /// Stage the extended-metadata capability marker on the file's content
    /// node if it does not carry it yet.
    async fn ensure_extended_metadata(&mut self, file_path: &str) -> Result<(), AutolabelError>;

    /// Stage a write of the description field on the file's content node.
    async fn set_description(&mut self, file_path: &str, text: &str) -> Result<(), AutolabelError>;

    /// Persist all staged writes in one atomic commit.
    async fn save(&mut self) -> Result<(), AutolabelError>;
}

/// Marks nodes for search re-indexing.
#[async_trait]
pub trait IndexingService: Send + Sync {
    /// Request a re-index of the node with the given stable identifier,
    /// keyed by a connector type (e.g. `FILE_CONNECTOR`).
    async fn reindex(&self, connector: &str, node_id: Uuid) -> Result<(), AutolabelError>;
}
