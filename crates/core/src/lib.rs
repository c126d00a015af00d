pub mod error;
pub mod event;
pub mod traits;
pub mod types;

pub use error::AutolabelError;
pub use event::CommitEvent;
pub use traits::{IndexingService, LabelSource, RepoSession, SessionProvider};
pub use types::{
    FileMeta, Label, NodeKind, NodeRef, BINARY_PROPERTY, DESCRIPTION_FIELD, FILE_CONNECTOR,
};
