//! Label detection via the Google Vision REST API.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::{error, info};

use autolabel_core::{AutolabelError, Label, LabelSource};

use crate::threshold::LabelThreshold;
use crate::types::{AnnotateBatchRequest, AnnotateBatchResponse};

const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com";
const PROVIDER: &str = "google-vision";

/// Vision client configuration. The threshold is fixed at construction.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub endpoint: String,
    pub api_key: String,
    pub threshold: LabelThreshold,
}

impl VisionConfig {
    pub fn new(api_key: impl Into<String>, threshold: LabelThreshold) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            threshold,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Label source backed by the `images:annotate` endpoint.
///
/// One request per image, label-detection feature only. No state beyond the
/// HTTP client; no retries, failures propagate to the caller.
pub struct VisionClient {
    http: reqwest::Client,
    config: VisionConfig,
}

impl VisionClient {
    pub fn new(config: VisionConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn annotate_url(&self) -> String {
        format!(
            "{}/v1/images:annotate?key={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.api_key
        )
    }
}

#[async_trait]
impl LabelSource for VisionClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn classify(&self, image: &[u8]) -> Result<Vec<Label>, AutolabelError> {
        let body = AnnotateBatchRequest::labels_for(STANDARD.encode(image));

        let response = self
            .http
            .post(self.annotate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| AutolabelError::classification(PROVIDER, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AutolabelError::classification(
                PROVIDER,
                format!("HTTP {status}: {text}"),
            ));
        }

        let parsed: AnnotateBatchResponse = response
            .json()
            .await
            .map_err(|e| AutolabelError::classification(PROVIDER, e.to_string()))?;

        let mut labels = Vec::new();
        for item in &parsed.responses {
            if let Some(item_error) = &item.error {
                error!(
                    code = item_error.code,
                    message = %item_error.message,
                    "Vision API returned a per-image error"
                );
                break;
            }
            for annotation in &item.label_annotations {
                if self.config.threshold.keeps(annotation.score) {
                    info!(
                        label = %annotation.description,
                        score = annotation.score,
                        "Label detected"
                    );
                    labels.push(Label::new(annotation.description.clone(), annotation.score));
                }
            }
        }
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, threshold: f32) -> VisionClient {
        let config = VisionConfig::new("test-key", LabelThreshold::new(threshold))
            .with_endpoint(server.uri());
        VisionClient::new(config)
    }

    #[tokio::test]
    async fn keeps_labels_above_threshold_in_response_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images:annotate"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "requests": [{ "features": [{ "type": "LABEL_DETECTION" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responses": [{
                    "labelAnnotations": [
                        { "description": "cat", "score": 0.9 },
                        { "description": "whiskers", "score": 0.8 },
                        { "description": "animal", "score": 0.4 }
                    ]
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let labels = client_for(&server, 0.75)
            .classify(b"fake image bytes")
            .await
            .unwrap();

        let texts: Vec<_> = labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["cat", "whiskers"]);
    }

    #[tokio::test]
    async fn score_equal_to_threshold_is_discarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responses": [{
                    "labelAnnotations": [{ "description": "cat", "score": 0.75 }]
                }]
            })))
            .mount(&server)
            .await;

        let labels = client_for(&server, 0.75).classify(b"img").await.unwrap();
        assert!(labels.is_empty());
    }

    #[tokio::test]
    async fn per_item_error_stops_processing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responses": [
                    { "error": { "code": 3, "message": "Bad image data." } },
                    { "labelAnnotations": [{ "description": "cat", "score": 0.99 }] }
                ]
            })))
            .mount(&server)
            .await;

        // The error item halts the scan; labels after it are not read.
        let labels = client_for(&server, 0.5).classify(b"img").await.unwrap();
        assert!(labels.is_empty());
    }

    #[tokio::test]
    async fn http_failure_maps_to_classification_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let result = client_for(&server, 0.75).classify(b"img").await;
        assert!(matches!(
            result,
            Err(AutolabelError::Classification { .. })
        ));
    }

    #[tokio::test]
    async fn empty_response_yields_no_labels() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "responses": [{}] })))
            .mount(&server)
            .await;

        let labels = client_for(&server, 0.75).classify(b"img").await.unwrap();
        assert!(labels.is_empty());
    }
}
