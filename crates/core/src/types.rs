use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the binary payload property on a resource node. A commit of this
/// property is what triggers enrichment.
pub const BINARY_PROPERTY: &str = "data";

/// Name of the descriptive-metadata field the joined label string is written to.
pub const DESCRIPTION_FIELD: &str = "description";

/// Connector type key used when requesting a re-index of a file node.
pub const FILE_CONNECTOR: &str = "file";

/// File extensions the enrichment flow considers classifiable images.
const IMAGE_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// Whether a file name ends in a supported image extension (case-insensitive).
pub fn is_supported_image(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// The kind of a repository node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A file node; parent of exactly one resource node.
    File,
    /// The binary content holder child of a file node.
    Resource,
    Folder,
}

/// Reference to a repository node, captured at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub workspace: String,
    pub path: String,
}

impl NodeRef {
    pub fn new(workspace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            path: path.into(),
        }
    }

    /// Path of the parent node, or "/" when already at the root.
    pub fn parent_path(&self) -> &str {
        match self.path.rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &self.path[..idx],
        }
    }
}

/// A resolved file node, with the stable internal identifier used for
/// index notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub id: Uuid,
    pub workspace: String,
    pub path: String,
    pub name: String,
}

/// A label returned by the label source: descriptive text plus a confidence
/// score in [0, 1]. Ephemeral: only the joined text is ever persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub score: f32,
}

impl Label {
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// Join label texts with a single space, in the order given.
pub fn join_labels(labels: &[Label]) -> String {
    labels
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
