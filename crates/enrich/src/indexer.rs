//! Index notification over tracing.
//!
//! The search index is an external collaborator; this implementation records
//! the request in the logs, which is all the standalone wiring needs. Real
//! deployments plug their own `IndexingService` into the context.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use autolabel_core::{AutolabelError, IndexingService};

/// Logs every re-index request.
#[derive(Debug, Default, Clone)]
pub struct TracingIndexer;

#[async_trait]
impl IndexingService for TracingIndexer {
    async fn reindex(&self, connector: &str, node_id: Uuid) -> Result<(), AutolabelError> {
        info!(connector, node_id = %node_id, "Re-index requested");
        Ok(())
    }
}
