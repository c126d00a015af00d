pub mod hook;
pub mod indexer;
pub mod service;
pub mod task;

pub use hook::CommitHook;
pub use indexer::TracingIndexer;
pub use service::EnrichmentService;
pub use task::{EnrichmentContext, EnrichmentTask, PollPolicy, TaskOutcome, TaskState};

#[cfg(test)]
pub(crate) mod testutil;
