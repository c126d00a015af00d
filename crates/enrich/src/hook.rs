//! Synchronous commit hook: filter and fire-and-forget dispatch.

use tokio::task::JoinHandle;
use tracing::{debug, info};

use autolabel_core::{CommitEvent, NodeKind, NodeRef, BINARY_PROPERTY};

use crate::task::{EnrichmentContext, EnrichmentTask};

/// Invoked once per committed property change. Runs on the commit path and
/// must return quickly: it only filters and schedules, never waits.
pub struct CommitHook {
    ctx: EnrichmentContext,
}

impl CommitHook {
    pub fn new(ctx: EnrichmentContext) -> Self {
        Self { ctx }
    }

    /// Schedule an enrichment task if the event is a binary-content commit
    /// on a resource node. Anything else is a successful no-op.
    ///
    /// The returned handle is for tests; production wiring drops it.
    pub fn on_commit(&self, event: &CommitEvent) -> Option<JoinHandle<()>> {
        if event.node_kind != NodeKind::Resource || event.property != BINARY_PROPERTY {
            debug!(
                node = %event.node_path,
                property = %event.property,
                "Commit is not a resource binary change, ignoring"
            );
            return None;
        }

        // The resource node is the content holder; the owning file node is
        // its parent.
        let resource = NodeRef::new(&event.workspace, &event.node_path);
        let file = NodeRef::new(&event.workspace, resource.parent_path());
        info!(
            workspace = %file.workspace,
            path = %file.path,
            "Scheduling image enrichment"
        );
        Some(EnrichmentTask::new(file, self.ctx.clone()).spawn())
    }
}
