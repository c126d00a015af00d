//! The asynchronous enrichment task.
//!
//! A task is triggered with a node reference captured at commit time. Because
//! the commit event fires before the transaction is visible to other
//! sessions, the task first polls a freshly opened session for the node, then
//! fetches the binary content, classifies it, and writes the joined label
//! string back as descriptive metadata with one atomic save.
//!
//! Everything the task needs arrives through `EnrichmentContext`; there is
//! no ambient or thread-local state, and each task opens its own session.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use autolabel_core::types::{is_supported_image, join_labels};
use autolabel_core::{
    AutolabelError, IndexingService, LabelSource, NodeRef, RepoSession, SessionProvider,
    FILE_CONNECTOR,
};

/// Visibility-wait tuning. The loop is bounded: a node that never shows up
/// ends the task with `AutolabelError::NeverVisible` instead of leaking a
/// worker forever.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_attempts: 120,
        }
    }
}

/// Collaborators and tuning for one enrichment run, injected explicitly.
#[derive(Clone)]
pub struct EnrichmentContext {
    pub sessions: Arc<dyn SessionProvider>,
    pub labels: Arc<dyn LabelSource>,
    pub indexer: Arc<dyn IndexingService>,
    pub poll: PollPolicy,
}

/// Lifecycle states of an enrichment task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Scheduled,
    WaitingForVisibility,
    Fetching,
    Classifying,
    Writing,
    Done,
    Error,
}

/// How a task run ended (when it did not fail).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Labels were written and a re-index was requested.
    Enriched { label_count: usize },
    /// The node is not a classifiable image file; nothing was done.
    SkippedNotImage,
    /// Classification returned no qualifying label; nothing was written and
    /// no re-index was requested.
    SkippedNoLabels,
}

pub struct EnrichmentTask {
    node: NodeRef,
    ctx: EnrichmentContext,
    state: TaskState,
}

impl EnrichmentTask {
    pub fn new(node: NodeRef, ctx: EnrichmentContext) -> Self {
        Self {
            node,
            ctx,
            state: TaskState::Scheduled,
        }
    }

    /// Run fire-and-forget. Every error is caught and logged here; nothing
    /// escapes to the caller.
    pub fn spawn(self) -> JoinHandle<()> {
        let node = self.node.clone();
        tokio::spawn(async move {
            match self.run().await {
                Ok(outcome) => {
                    debug!(path = %node.path, ?outcome, "Enrichment task finished");
                }
                Err(e) => {
                    error!(
                        workspace = %node.workspace,
                        path = %node.path,
                        error = %e,
                        "Enrichment task failed"
                    );
                }
            }
        })
    }

    /// Drive the task to completion.
    pub async fn run(mut self) -> Result<TaskOutcome, AutolabelError> {
        let result = self.execute().await;
        self.transition(match result {
            Ok(_) => TaskState::Done,
            Err(_) => TaskState::Error,
        });
        result
    }

    async fn execute(&mut self) -> Result<TaskOutcome, AutolabelError> {
        self.transition(TaskState::WaitingForVisibility);
        let mut session = self.ctx.sessions.open(&self.node.workspace).await?;
        self.wait_for_visibility(session.as_ref()).await?;

        self.transition(TaskState::Fetching);
        let Some(file) = session.resolve_file(&self.node.path).await? else {
            info!(path = %self.node.path, "Node is not a file, skipping");
            return Ok(TaskOutcome::SkippedNotImage);
        };
        if !is_supported_image(&file.name) {
            info!(path = %file.path, "Not an image, skipping");
            return Ok(TaskOutcome::SkippedNotImage);
        }
        let bytes = session.read_binary(&file.path).await?;

        self.transition(TaskState::Classifying);
        info!(
            path = %file.path,
            bytes = bytes.len(),
            source = self.ctx.labels.name(),
            "Classifying image"
        );
        let labels = self.ctx.labels.classify(&bytes).await?;

        self.transition(TaskState::Writing);
        if labels.is_empty() {
            info!(path = %file.path, "No label passed the threshold, nothing to write");
            return Ok(TaskOutcome::SkippedNoLabels);
        }

        let description = join_labels(&labels);
        session.ensure_extended_metadata(&file.path).await?;
        session.set_description(&file.path, &description).await?;
        session.save().await?;
        info!(
            path = %file.path,
            labels = labels.len(),
            description = %description,
            "Labels written to file metadata"
        );

        // The metadata is already committed; an indexing failure must not
        // undo it.
        if let Err(e) = self.ctx.indexer.reindex(FILE_CONNECTOR, file.id).await {
            warn!(path = %file.path, error = %e, "Re-index request failed");
        }

        Ok(TaskOutcome::Enriched {
            label_count: labels.len(),
        })
    }

    /// Poll the session until the node exists. Checks first, then sleeps, so
    /// a node visible on attempt N costs N checks and N-1 sleeps.
    async fn wait_for_visibility(
        &self,
        session: &dyn RepoSession,
    ) -> Result<(), AutolabelError> {
        let PollPolicy {
            interval,
            max_attempts,
        } = self.ctx.poll;
        for attempt in 1..=max_attempts {
            if session.node_exists(&self.node.path).await? {
                debug!(path = %self.node.path, attempt, "Node visible");
                return Ok(());
            }
            if attempt < max_attempts {
                sleep(interval).await;
            }
        }
        Err(AutolabelError::NeverVisible {
            path: self.node.path.clone(),
            attempts: max_attempts,
        })
    }

    fn transition(&mut self, next: TaskState) {
        debug!(path = %self.node.path, from = ?self.state, to = ?next, "Task state");
        self.state = next;
    }
}
