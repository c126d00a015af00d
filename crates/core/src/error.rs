use thiserror::Error;

/// Top-level error type for the autolabel enrichment flow.
#[derive(Debug, Error)]
pub enum AutolabelError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("label classification failed ({provider}): {message}")]
    Classification { provider: String, message: String },

    #[error("repository error: {0}")]
    Repository(String),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node {path} never became visible after {attempts} poll attempts")]
    NeverVisible { path: String, attempts: u32 },

    #[error("index notification failed: {0}")]
    Indexing(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AutolabelError {
    pub fn classification(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Classification {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
