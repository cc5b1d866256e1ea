use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SummarizerError {
    #[error("summarizer request failed: {0}")]
    Request(String),
    #[error("summarizer returned status {0}")]
    Status(u16),
    #[error("summarizer response could not be decoded: {0}")]
    Decode(String),
    #[error("summarizer returned no text")]
    Empty,
}

/// Turns a prompt into a short visitor-facing text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, prompt: &str) -> Result<String, SummarizerError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// When false every record's summary is `missing` and no model is called.
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:11434".to_string(),
            model: "phi3".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Clone)]
pub struct OllamaSummarizer {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

impl OllamaSummarizer {
    pub fn new(config: &SummarizerConfig) -> Result<Self, SummarizerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SummarizerError::Request(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String, SummarizerError> {
        let url = format!("{}/api/generate", self.base_url);
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummarizerError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SummarizerError::Status(response.status().as_u16()));
        }

        let body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| SummarizerError::Decode(e.to_string()))?;

        clean_output(&body.response)
    }
}

/// Single-line, trimmed model output.
pub fn clean_output(raw: &str) -> Result<String, SummarizerError> {
    let text = raw.trim().replace("\r\n", " ").replace('\n', " ");
    if text.is_empty() {
        return Err(SummarizerError::Empty);
    }
    Ok(text)
}
