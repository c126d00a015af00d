//! Repository sessions with staged, all-or-nothing writes.

use async_trait::async_trait;
use tracing::debug;

use autolabel_core::{
    AutolabelError, FileMeta, NodeKind, RepoSession, SessionProvider,
};

use crate::store::{MemoryRepository, SharedStore};
use crate::CONTENT_NODE;

#[derive(Debug, Clone)]
enum StagedWrite {
    Description { content_path: String, text: String },
    ExtendedMetadata { content_path: String },
}

/// A session scoped to one workspace.
///
/// Reads see the live visible store; writes are staged on the session and
/// applied under a single lock by `save`, so a save is all-or-nothing.
pub struct MemorySession {
    workspace: String,
    store: SharedStore,
    staged: Vec<StagedWrite>,
}

impl MemorySession {
    pub(crate) fn new(workspace: String, store: SharedStore) -> Self {
        Self {
            workspace,
            store,
            staged: Vec::new(),
        }
    }

    fn content_path(file_path: &str) -> String {
        format!("{file_path}/{CONTENT_NODE}")
    }
}

#[async_trait]
impl RepoSession for MemorySession {
    async fn node_exists(&self, path: &str) -> Result<bool, AutolabelError> {
        let store = self.store.read().await;
        Ok(store
            .get(&self.workspace)
            .is_some_and(|ws| ws.visible.contains_key(path)))
    }

    async fn resolve_file(&self, path: &str) -> Result<Option<FileMeta>, AutolabelError> {
        let store = self.store.read().await;
        let ws = store
            .get(&self.workspace)
            .ok_or_else(|| AutolabelError::NodeNotFound(path.to_string()))?;

        let record = ws
            .visible
            .get(path)
            .ok_or_else(|| AutolabelError::NodeNotFound(path.to_string()))?;

        // A content-holder resolves to its parent file node.
        let (file_path, record) = if record.kind == NodeKind::Resource {
            let parent = match path.rfind('/') {
                Some(idx) if idx > 0 => &path[..idx],
                _ => return Ok(None),
            };
            let parent_record = ws
                .visible
                .get(parent)
                .ok_or_else(|| AutolabelError::NodeNotFound(parent.to_string()))?;
            (parent, parent_record)
        } else {
            (path, record)
        };

        if record.kind != NodeKind::File {
            return Ok(None);
        }

        Ok(Some(FileMeta {
            id: record.id,
            workspace: self.workspace.clone(),
            path: file_path.to_string(),
            name: record.name.clone(),
        }))
    }

    async fn read_binary(&self, file_path: &str) -> Result<Vec<u8>, AutolabelError> {
        let content_path = Self::content_path(file_path);
        let store = self.store.read().await;
        let record = store
            .get(&self.workspace)
            .and_then(|ws| ws.visible.get(&content_path))
            .ok_or_else(|| AutolabelError::NodeNotFound(content_path.clone()))?;
        record
            .data
            .clone()
            .ok_or_else(|| AutolabelError::Repository(format!("no binary stream at {content_path}")))
    }

    async fn ensure_extended_metadata(&mut self, file_path: &str) -> Result<(), AutolabelError> {
        let content_path = Self::content_path(file_path);
        let already = {
            let store = self.store.read().await;
            store
                .get(&self.workspace)
                .and_then(|ws| ws.visible.get(&content_path))
                .ok_or_else(|| AutolabelError::NodeNotFound(content_path.clone()))?
                .extended_metadata
        };
        if !already {
            self.staged.push(StagedWrite::ExtendedMetadata { content_path });
        }
        Ok(())
    }

    async fn set_description(&mut self, file_path: &str, text: &str) -> Result<(), AutolabelError> {
        self.staged.push(StagedWrite::Description {
            content_path: Self::content_path(file_path),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn save(&mut self) -> Result<(), AutolabelError> {
        let staged = std::mem::take(&mut self.staged);
        if staged.is_empty() {
            return Ok(());
        }

        let mut store = self.store.write().await;
        let ws = store
            .get_mut(&self.workspace)
            .ok_or_else(|| AutolabelError::Repository(format!("unknown workspace {}", self.workspace)))?;

        // Validate every target before touching anything, so a failed save
        // leaves the store unchanged.
        for write in &staged {
            let path = match write {
                StagedWrite::Description { content_path, .. } => content_path,
                StagedWrite::ExtendedMetadata { content_path } => content_path,
            };
            if !ws.visible.contains_key(path.as_str()) {
                return Err(AutolabelError::NodeNotFound(path.clone()));
            }
        }

        let count = staged.len();
        for write in staged {
            match write {
                StagedWrite::Description { content_path, text } => {
                    if let Some(node) = ws.visible.get_mut(&content_path) {
                        node.description = Some(text);
                    }
                }
                StagedWrite::ExtendedMetadata { content_path } => {
                    if let Some(node) = ws.visible.get_mut(&content_path) {
                        node.extended_metadata = true;
                    }
                }
            }
        }
        debug!(workspace = %self.workspace, writes = count, "Session saved");
        Ok(())
    }
}

#[async_trait]
impl SessionProvider for MemoryRepository {
    async fn open(&self, workspace: &str) -> Result<Box<dyn RepoSession>, AutolabelError> {
        Ok(Box::new(self.open_session(workspace)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_repo() -> MemoryRepository {
        let (repo, _rx) = MemoryRepository::new();
        repo.store_file("collaboration", "/docs/cat.jpg", vec![9, 9, 9], "image/jpeg")
            .await;
        repo.publish("collaboration", "/docs/cat.jpg").await;
        repo
    }

    #[tokio::test]
    async fn resolves_file_from_its_own_path() {
        let repo = seeded_repo().await;
        let session = repo.open_session("collaboration");
        let meta = session.resolve_file("/docs/cat.jpg").await.unwrap().unwrap();
        assert_eq!(meta.name, "cat.jpg");
        assert_eq!(meta.path, "/docs/cat.jpg");
    }

    #[tokio::test]
    async fn resolves_file_from_content_holder_path() {
        let repo = seeded_repo().await;
        let session = repo.open_session("collaboration");
        let meta = session
            .resolve_file("/docs/cat.jpg/content")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(meta.path, "/docs/cat.jpg");
    }

    #[tokio::test]
    async fn reads_binary_stream_of_file() {
        let repo = seeded_repo().await;
        let session = repo.open_session("collaboration");
        let bytes = session.read_binary("/docs/cat.jpg").await.unwrap();
        assert_eq!(bytes, vec![9, 9, 9]);
    }

    #[tokio::test]
    async fn staged_writes_apply_only_on_save() {
        let repo = seeded_repo().await;
        let mut session = repo.open_session("collaboration");
        session
            .ensure_extended_metadata("/docs/cat.jpg")
            .await
            .unwrap();
        session
            .set_description("/docs/cat.jpg", "cat mammal")
            .await
            .unwrap();

        assert_eq!(repo.description("collaboration", "/docs/cat.jpg").await, None);
        session.save().await.unwrap();
        assert_eq!(
            repo.description("collaboration", "/docs/cat.jpg").await,
            Some("cat mammal".to_string())
        );
    }

    #[tokio::test]
    async fn save_on_missing_node_changes_nothing() {
        let repo = seeded_repo().await;
        let mut session = repo.open_session("collaboration");
        session
            .set_description("/docs/cat.jpg", "cat")
            .await
            .unwrap();
        // Second staged write targets a node that does not exist.
        session.set_description("/gone.jpg", "x").await.unwrap();

        assert!(session.save().await.is_err());
        assert_eq!(repo.description("collaboration", "/docs/cat.jpg").await, None);
    }

    #[tokio::test]
    async fn missing_node_lookups_error() {
        let repo = seeded_repo().await;
        let session = repo.open_session("collaboration");
        assert!(matches!(
            session.resolve_file("/nope.jpg").await,
            Err(AutolabelError::NodeNotFound(_))
        ));
        assert!(matches!(
            session.read_binary("/nope.jpg").await,
            Err(AutolabelError::NodeNotFound(_))
        ));
    }
}
