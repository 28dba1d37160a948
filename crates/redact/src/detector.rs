//! PII detector seam and the hosted language-service client

use crate::error::DetectError;
use async_trait::async_trait;
use keygate_credential::core::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// One entity the detector found and masked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedEntity {
    /// Entity category, e.g. `Person` or `PhoneNumber`
    pub category: String,
    /// Detector confidence in `[0, 1]`
    #[serde(default)]
    pub confidence_score: f64,
}

/// Result of redacting one chunk
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Chunk text with PII replaced by mask characters
    pub redacted_text: String,
    /// Entities that were masked, in document order
    pub entities: Vec<DetectedEntity>,
}

/// Trait for the PII detection service
///
/// One call per chunk; the caller owns chunking, ordering, and timeout.
#[async_trait]
pub trait PiiDetector: Send + Sync {
    /// Redact one chunk of text
    async fn redact(&self, text: &str) -> Result<Detection, DetectError>;
}

/// Configuration for the hosted language-service detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageDetectorConfig {
    /// Service base address, e.g. `https://aihub-lang.cognitive.example.com`
    pub endpoint: String,

    /// Service API key
    pub api_key: SecretString,

    /// Language hint passed with every document
    #[serde(default = "default_language")]
    pub language: String,

    /// Entity categories left unmasked, e.g. `PersonType`
    #[serde(default)]
    pub excluded_categories: Vec<String>,

    /// REST API version query parameter
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Per-request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_api_version() -> String {
    "2023-04-01".to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl LanguageDetectorConfig {
    /// New configuration with defaults
    pub fn new(endpoint: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            language: default_language(),
            excluded_categories: Vec::new(),
            api_version: default_api_version(),
            timeout: default_timeout(),
        }
    }
}

/// Detector backed by the hosted language analysis REST dialect
#[derive(Debug, Clone)]
pub struct LanguagePiiDetector {
    client: reqwest::Client,
    config: LanguageDetectorConfig,
    url: String,
}

impl LanguagePiiDetector {
    /// Build a detector from configuration
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::Malformed`] for an unusable endpoint and
    /// [`DetectError::Transport`] when the HTTP client cannot be built.
    pub fn new(config: LanguageDetectorConfig) -> Result<Self, DetectError> {
        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            return Err(DetectError::Malformed {
                reason: "endpoint must start with http:// or https://".to_string(),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| DetectError::Transport { source })?;
        let url = format!(
            "{}/language/:analyze-text?api-version={}",
            config.endpoint.trim_end_matches('/'),
            config.api_version
        );
        Ok(Self {
            client,
            config,
            url,
        })
    }

    fn request_body(&self, text: &str) -> serde_json::Value {
        json!({
            "kind": "PiiEntityRecognition",
            "parameters": {
                "modelVersion": "latest",
                "excludedCategories": self.config.excluded_categories,
            },
            "analysisInput": {
                "documents": [{
                    "id": "1",
                    "language": self.config.language,
                    "text": text,
                }]
            }
        })
    }
}

/// Wire shapes of the analysis response, reduced to the fields used
#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    results: AnalyzeResults,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResults {
    documents: Vec<AnalyzedDocument>,
}

#[derive(Debug, Deserialize)]
struct AnalyzedDocument {
    #[serde(rename = "redactedText")]
    redacted_text: String,
    #[serde(default)]
    entities: Vec<WireEntity>,
}

#[derive(Debug, Deserialize)]
struct WireEntity {
    category: String,
    #[serde(rename = "confidenceScore", default)]
    confidence_score: f64,
}

#[async_trait]
impl PiiDetector for LanguagePiiDetector {
    async fn redact(&self, text: &str) -> Result<Detection, DetectError> {
        let response = self
            .config
            .api_key
            .expose_secret(|key| {
                self.client
                    .post(&self.url)
                    .header("ocp-apim-subscription-key", key)
                    .json(&self.request_body(text))
                    .send()
            })
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    DetectError::Timeout {
                        elapsed: self.config.timeout,
                    }
                } else {
                    DetectError::Transport { source }
                }
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(DetectError::Http { status });
        }

        let parsed: AnalyzeResponse =
            response.json().await.map_err(|e| DetectError::Malformed {
                reason: e.to_string(),
            })?;
        let document =
            parsed
                .results
                .documents
                .into_iter()
                .next()
                .ok_or_else(|| DetectError::Malformed {
                    reason: "response contained no documents".to_string(),
                })?;

        Ok(Detection {
            redacted_text: document.redacted_text,
            entities: document
                .entities
                .into_iter()
                .map(|e| DetectedEntity {
                    category: e.category,
                    confidence_score: e.confidence_score,
                })
                .collect(),
        })
    }
}
