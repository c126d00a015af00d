//! Recording fakes shared by the enrichment tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use autolabel_core::{
    AutolabelError, FileMeta, IndexingService, Label, LabelSource, RepoSession, SessionProvider,
};
use autolabel_repo::MemoryRepository;

use crate::task::{EnrichmentContext, PollPolicy};

/// Label source that returns a fixed result and counts invocations.
pub(crate) struct FakeLabelSource {
    pub labels: Vec<Label>,
    pub fail: bool,
    pub calls: Arc<AtomicUsize>,
}

pub(crate) fn source_with(labels: Vec<Label>) -> FakeLabelSource {
    FakeLabelSource {
        labels,
        fail: false,
        calls: Arc::new(AtomicUsize::new(0)),
    }
}

pub(crate) fn failing_source() -> FakeLabelSource {
    FakeLabelSource {
        labels: Vec::new(),
        fail: true,
        calls: Arc::new(AtomicUsize::new(0)),
    }
}

#[async_trait]
impl LabelSource for FakeLabelSource {
    fn name(&self) -> &str {
        "fake"
    }

    async fn classify(&self, _image: &[u8]) -> Result<Vec<Label>, AutolabelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AutolabelError::classification("fake", "simulated outage"));
        }
        Ok(self.labels.clone())
    }
}

/// Indexer that records every reindex request.
#[derive(Default)]
pub(crate) struct RecordingIndexer {
    calls: Mutex<Vec<(String, Uuid)>>,
}

impl RecordingIndexer {
    pub async fn calls(&self) -> Vec<(String, Uuid)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl IndexingService for RecordingIndexer {
    async fn reindex(&self, connector: &str, node_id: Uuid) -> Result<(), AutolabelError> {
        self.calls.lock().await.push((connector.to_string(), node_id));
        Ok(())
    }
}

/// Session provider that counts `node_exists` checks across its sessions.
pub(crate) struct CountingProvider {
    repo: MemoryRepository,
    pub exists_calls: Arc<AtomicUsize>,
}

pub(crate) fn counting_provider(repo: &MemoryRepository) -> CountingProvider {
    CountingProvider {
        repo: repo.clone(),
        exists_calls: Arc::new(AtomicUsize::new(0)),
    }
}

#[async_trait]
impl SessionProvider for CountingProvider {
    async fn open(&self, workspace: &str) -> Result<Box<dyn RepoSession>, AutolabelError> {
        Ok(Box::new(CountingSession {
            inner: Box::new(self.repo.open_session(workspace)),
            exists_calls: self.exists_calls.clone(),
        }))
    }
}

struct CountingSession {
    inner: Box<dyn RepoSession>,
    exists_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl RepoSession for CountingSession {
    async fn node_exists(&self, path: &str) -> Result<bool, AutolabelError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.node_exists(path).await
    }

    async fn resolve_file(&self, path: &str) -> Result<Option<FileMeta>, AutolabelError> {
        self.inner.resolve_file(path).await
    }

    async fn read_binary(&self, file_path: &str) -> Result<Vec<u8>, AutolabelError> {
        self.inner.read_binary(file_path).await
    }

    async fn ensure_extended_metadata(&mut self, file_path: &str) -> Result<(), AutolabelError> {
        self.inner.ensure_extended_metadata(file_path).await
    }

    async fn set_description(&mut self, file_path: &str, text: &str) -> Result<(), AutolabelError> {
        self.inner.set_description(file_path, text).await
    }

    async fn save(&mut self) -> Result<(), AutolabelError> {
        self.inner.save().await
    }
}

/// Bundle of fakes behind an `EnrichmentContext`, keeping handles for
/// assertions after the context has been moved into a task.
pub(crate) struct TestContext {
    pub sessions: Arc<dyn SessionProvider>,
    pub labels: Arc<dyn LabelSource>,
    pub recording_indexer: Arc<RecordingIndexer>,
}

impl TestContext {
    pub fn new(sessions: Arc<dyn SessionProvider>, source: FakeLabelSource) -> Self {
        Self {
            sessions,
            labels: Arc::new(source),
            recording_indexer: Arc::new(RecordingIndexer::default()),
        }
    }

    pub fn into_context(self) -> EnrichmentContext {
        self.into_context_with_poll(PollPolicy {
            interval: Duration::from_millis(5),
            max_attempts: 10,
        })
    }

    pub fn into_context_with_poll(self, poll: PollPolicy) -> EnrichmentContext {
        EnrichmentContext {
            sessions: self.sessions,
            labels: self.labels,
            indexer: self.recording_indexer,
            poll,
        }
    }
}

/// Context over the real in-memory repository plus a fake source.
pub(crate) fn context(repo: &MemoryRepository, source: FakeLabelSource) -> TestContext {
    TestContext::new(Arc::new(repo.clone()), source)
}
