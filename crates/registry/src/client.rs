use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::FetchError;
use crate::policy::{RateGate, RequestPolicy};
use crate::retry::RetryPolicy;
use crate::transport::{HttpTransport, Transport, TransportError, TransportResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub base_url: String,
    /// Path segment the record UUIDs live under, e.g. `raa/lamning`.
    pub resource_namespace: String,
    pub user_agent: String,
    /// Local development only.
    pub accept_invalid_certs: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://kulturarvsdata.se".to_string(),
            resource_namespace: "raa/lamning".to_string(),
            user_agent: concat!("heritage-enrich/", env!("CARGO_PKG_VERSION")).to_string(),
            accept_invalid_certs: false,
        }
    }
}

/// Registry client with a fixed call-rate ceiling, bounded retries and a per-call timeout.
///
/// Both the start and the completion of every attempt pass a rate gate, so
/// a slow call cannot bunch up the completions that follow it.
pub struct ThrottledClient {
    config: RegistryConfig,
    transport: Arc<dyn Transport>,
    gate: RateGate,
    completions: RateGate,
    retry: RetryPolicy,
    timeout: Duration,
}

impl ThrottledClient {
    pub fn new(config: RegistryConfig, policy: &RequestPolicy) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(
            &config.user_agent,
            policy.timeout(),
            config.accept_invalid_certs,
        )
        .map_err(|e| FetchError::InvalidPolicy(e.to_string()))?;

        Self::with_transport(config, policy, Arc::new(transport))
    }

    pub fn with_transport(
        config: RegistryConfig,
        policy: &RequestPolicy,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            config,
            transport,
            gate: policy.rate_gate()?,
            completions: policy.rate_gate()?,
            retry: policy.retry_policy(),
            timeout: policy.timeout(),
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Fetch the graph document for one registry record.
    pub async fn fetch_record(&self, reference: &str) -> Result<Value, FetchError> {
        let uuid = Uuid::parse_str(reference.trim())
            .map_err(|_| FetchError::InvalidReference(reference.to_string()))?;
        let path = format!(
            "/{}/{}",
            self.config.resource_namespace.trim_matches('/'),
            uuid.hyphenated()
        );
        self.fetch(&path, &[]).await
    }

    /// GET `path` relative to the base URL and decode the JSON body.
    pub async fn fetch(&self, path: &str, params: &[(String, String)]) -> Result<Value, FetchError> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        self.retry
            .retry(&url, FetchError::is_transient, || self.attempt(&url, params))
            .await
    }

    async fn attempt(&self, url: &str, params: &[(String, String)]) -> Result<Value, FetchError> {
        self.gate.acquire().await;
        debug!(url = url, "registry request");

        let outcome = tokio::time::timeout(self.timeout, self.transport.get(url, params)).await;
        self.completions.acquire().await;

        let response = match outcome {
            Err(_) | Ok(Err(TransportError::Timeout)) => {
                return Err(FetchError::Transient(format!(
                    "timed out after {}ms",
                    self.timeout.as_millis()
                )));
            }
            Ok(Err(TransportError::Connect(reason))) => return Err(FetchError::Transient(reason)),
            Ok(Ok(response)) => response,
        };

        interpret(url, response)
    }
}

fn interpret(url: &str, response: TransportResponse) -> Result<Value, FetchError> {
    if response.is_success() {
        return serde_json::from_str(&response.body).map_err(|e| FetchError::MalformedDocument {
            url: url.to_string(),
            reason: e.to_string(),
        });
    }

    match response.status {
        404 | 410 => Err(FetchError::NotFound(url.to_string())),
        408 | 429 | 500..=599 => Err(FetchError::Transient(format!(
            "status {} from {}",
            response.status, url
        ))),
        status => Err(FetchError::UnexpectedStatus {
            status,
            url: url.to_string(),
        }),
    }
}
