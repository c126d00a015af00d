//! Wire types for the `images:annotate` endpoint.

use serde::{Deserialize, Serialize};

pub(crate) const LABEL_DETECTION: &str = "LABEL_DETECTION";

#[derive(Debug, Serialize)]
pub struct AnnotateBatchRequest {
    pub requests: Vec<AnnotateRequest>,
}

#[derive(Debug, Serialize)]
pub struct AnnotateRequest {
    pub image: ImageContent,
    pub features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
pub struct ImageContent {
    /// Base64-encoded image bytes.
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: String,
}

impl AnnotateBatchRequest {
    /// A single label-detection request for one image.
    pub fn labels_for(content_b64: String) -> Self {
        Self {
            requests: vec![AnnotateRequest {
                image: ImageContent {
                    content: content_b64,
                },
                features: vec![Feature {
                    feature_type: LABEL_DETECTION.to_string(),
                }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnnotateBatchResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateResponse {
    #[serde(default)]
    pub label_annotations: Vec<EntityAnnotation>,
    /// Per-image error; set when this item failed even though the HTTP call
    /// succeeded.
    pub error: Option<ItemError>,
}

#[derive(Debug, Deserialize)]
pub struct EntityAnnotation {
    pub description: String,
    #[serde(default)]
    pub score: f32,
}

#[derive(Debug, Deserialize)]
pub struct ItemError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}
