//! Provider traits and the shared agent HTTP client
//!
//! Each data category sits behind its own trait so the orchestrator can be
//! wired to the agent services, to direct API backends, or to test doubles.

use crate::error::BriefError;
use crate::models::{Context, NarrativeRequest, News, Quote};
use crate::Result;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

pub mod alphavantage;
pub mod http;

pub use alphavantage::AlphaVantageClient;
pub use http::{HttpContextProvider, HttpNarrativeProvider, HttpNewsProvider, HttpQuoteProvider};

/// Quote and fundamentals for one ticker
#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch_quote(&self, ticker: &str) -> Result<Quote>;
}

/// Recent headlines for one ticker
#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch_news(&self, ticker: &str) -> Result<News>;
}

/// Passages retrieved from the document index
#[async_trait::async_trait]
pub trait ContextProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn retrieve(&self, query: &str, top_k: u32) -> Result<Context>;
}

/// Narrative generation from one shaped request
#[async_trait::async_trait]
pub trait NarrativeProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn generate(&self, request: &NarrativeRequest) -> Result<String>;
}

/// Build the pooled client shared by every outbound provider call.
///
/// No request timeout is set: calls are awaited until they finish or fail.
pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(8)
        .build()
        .map_err(|e| BriefError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Connection-pooled client for the agent services
#[derive(Clone)]
pub struct AgentClient {
    client: Client,
}

impl AgentClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| unavailable(url, e))?;

        let body = read_json_body(url, response).await?;
        decode_agent_body(body)
    }

    /// POST and hand back the raw JSON body, for callers with their own
    /// success/error envelope
    pub async fn post_json_value<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| unavailable(url, e))?;

        read_json_body(url, response).await
    }
}

fn unavailable(url: &str, e: reqwest::Error) -> BriefError {
    error!(url = %url, error = %e, "Agent request failed");
    BriefError::ProviderUnavailable(format!("Request to {} failed: {}", url, e))
}

/// Read a response body as JSON, classifying status and transport failures
pub async fn read_json_body(url: &str, response: Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await.map_err(|e| unavailable(url, e))?;

    debug!(url = %url, status = %status, bytes = text.len(), "Agent responded");

    if !status.is_success() {
        return Err(BriefError::ProviderError(format!(
            "{} returned {}: {}",
            url, status, text
        )));
    }

    serde_json::from_str(&text).map_err(|e| {
        BriefError::MalformedResponse(format!("Invalid JSON response from {}: {}", url, e))
    })
}

/// Turn an agent body into a typed payload.
///
/// Agents report their own failures as `{"error": ...}` with a 200 status.
pub fn decode_agent_body<T: DeserializeOwned>(body: Value) -> Result<T> {
    if let Some(err) = body.get("error") {
        let message = err
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(BriefError::ProviderError(message));
    }

    serde_json::from_value(body)
        .map_err(|e| BriefError::MalformedResponse(format!("Unexpected response shape: {}", e)))
}

/// Read the narrative agent's `{summary}` / `{error}` envelope
pub fn decode_narrative_body(body: Value) -> Result<String> {
    if let Some(summary) = body.get("summary").and_then(Value::as_str) {
        return Ok(summary.to_string());
    }

    if let Some(err) = body.get("error") {
        let message = err
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(BriefError::ProviderError(message));
    }

    Err(BriefError::MalformedResponse(
        "Narrative response carried neither summary nor error".to_string(),
    ))
}
