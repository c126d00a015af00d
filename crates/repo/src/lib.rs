pub mod session;
pub mod store;

pub use session::MemorySession;
pub use store::{MemoryRepository, CONTENT_NODE};
