//! Event loop driving the commit hook from the repository's event channel.

use tokio::sync::mpsc;
use tracing::{debug, info};

use autolabel_core::CommitEvent;

use crate::hook::CommitHook;

/// Consumes commit events and hands each to the hook. Scheduled tasks run
/// detached; the loop never waits on them.
pub struct EnrichmentService {
    hook: CommitHook,
}

impl EnrichmentService {
    pub fn new(hook: CommitHook) -> Self {
        Self { hook }
    }

    /// Run until the commit-event channel closes.
    pub async fn run(&self, mut rx: mpsc::Receiver<CommitEvent>) {
        info!("Enrichment service started");
        while let Some(event) = rx.recv().await {
            debug!(
                node = %event.node_path,
                property = %event.property,
                "Commit event received"
            );
            let _ = self.hook.on_commit(&event);
        }
        info!("Commit event channel closed, enrichment service stopping");
    }
}
