//! Gemini API client and narrative backend
//!
//! Generates the spoken-style brief directly, without the language agent.
//! Shares the process-wide reqwest::Client for connection pooling.

use crate::error::BriefError;
use crate::models::{NarrativeRequest, QuotePayload};
use crate::providers::NarrativeProvider;
use crate::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Key goes in a header so it never shows up in a request url
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Reusable Gemini client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: GEMINI_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Generate text for a single prompt
    pub async fn generate(&self, prompt: &str, config: GenerationConfig) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(BriefError::Config("GEMINI_API_KEY not configured".to_string()));
        }

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: config,
        };

        info!("Calling Gemini API");

        let response = self
            .client
            .post(&self.base_url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!("Gemini API request failed: {}", e);
                BriefError::ProviderUnavailable(format!("Gemini API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error response: {}", error_text);
            return Err(BriefError::ProviderError(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            let e = e.without_url();
            error!("Failed to parse Gemini response: {}", e);
            BriefError::MalformedResponse(format!("Gemini parse error: {}", e))
        })?;

        let answer = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| BriefError::ProviderError("No response from Gemini API".to_string()))?;

        info!(chars = answer.len(), "Gemini response received");

        Ok(answer)
    }
}

/// Narrative provider that prompts Gemini directly
pub struct GeminiNarrator {
    client: GeminiClient,
}

impl GeminiNarrator {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl NarrativeProvider for GeminiNarrator {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, request: &NarrativeRequest) -> Result<String> {
        let prompt = build_brief_prompt(request)?;
        self.client
            .generate(&prompt, GenerationConfig::brief())
            .await
    }
}

/// Render a shaped request into the spoken-brief prompt
pub fn build_brief_prompt(request: &NarrativeRequest) -> Result<String> {
    let stock_info = match &request.quote {
        QuotePayload::Available(quote) => serde_json::to_string_pretty(quote)?,
        QuotePayload::Missing { error } => format!("Price data unavailable: {}", error),
    };

    let headlines = if request.news.top_news.is_empty() {
        "No headlines available.".to_string()
    } else {
        request
            .news
            .top_news
            .iter()
            .map(|item| format!("- {}", item.title))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let context = if request.context.results.is_empty() {
        "No extra context available.".to_string()
    } else {
        request.context.results.join("\n")
    };

    Ok(format!(
        r#"You are a financial assistant for a portfolio manager. Based on the following data, generate a short spoken-style market brief, make it sound interesting (2 or 3 sentences):

Stock Info:
{}

Earnings Headlines:
{}

Context:
{}
"#,
        stock_info, headlines, context
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: i32,
}

impl GenerationConfig {
    /// Sampling used for market briefs
    pub fn brief() -> Self {
        Self {
            temperature: 0.4,
            top_p: 0.8,
            top_k: 40,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Context, News, NewsItem, Quote};
    use crate::providers::build_http_client;
    use axum::extract::Query;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn request_with_news() -> NarrativeRequest {
        NarrativeRequest {
            quote: QuotePayload::Available(Quote {
                ticker: "TSM".into(),
                short_name: "Taiwan Semiconductor".into(),
                current_price: 172.5,
                market_cap: 894_000_000_000.0,
                fifty_two_week_high: 193.47,
                fifty_two_week_low: 84.38,
                previous_close: 170.1,
                open: 171.0,
            }),
            news: News {
                ticker: "TSM".into(),
                top_news: vec![NewsItem {
                    title: "TSMC beats estimates".into(),
                    url: None,
                    summary: None,
                }],
            },
            context: Context::empty("TSM"),
        }
    }

    #[test]
    fn test_request_serialization() {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "Brief me on TSM".to_string(),
                }],
            }],
            generation_config: GenerationConfig::brief(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "Brief me on TSM");
        assert_eq!(value["generationConfig"]["topK"], 40);
    }

    #[test]
    fn test_prompt_includes_data_and_placeholders() {
        let prompt = build_brief_prompt(&request_with_news()).unwrap();
        assert!(prompt.contains("\"shortName\": \"Taiwan Semiconductor\""));
        assert!(prompt.contains("- TSMC beats estimates"));
        assert!(prompt.contains("No extra context available."));
    }

    #[test]
    fn test_prompt_mentions_missing_price() {
        let mut request = request_with_news();
        request.quote = QuotePayload::Missing {
            error: "connection refused".into(),
        };
        request.news = News::empty("TSM");

        let prompt = build_brief_prompt(&request).unwrap();
        assert!(prompt.contains("Price data unavailable: connection refused"));
        assert!(prompt.contains("No headlines available."));
    }

    #[tokio::test]
    async fn test_generate_against_stub() {
        let router = Router::new()
            .route(
                "/ok",
                post(
                    |headers: HeaderMap,
                     Query(params): Query<HashMap<String, String>>,
                     Json(_): Json<Value>| async move {
                        assert_eq!(headers.get("x-goog-api-key").unwrap(), "key");
                        assert!(!params.contains_key("key"));
                        Json(json!({
                            "candidates": [{"content": {"parts": [{"text": "  TSM is rallying.\n"}]}}]
                        }))
                    },
                ),
            )
            .route(
                "/empty",
                post(|Json(_): Json<Value>| async { Json(json!({"candidates": []})) }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let http = build_http_client().unwrap();
        let narrator = GeminiNarrator::new(
            GeminiClient::new(http.clone(), "key".into()).with_base_url(format!("http://{}/ok", addr)),
        );
        assert_eq!(
            narrator.generate(&request_with_news()).await.unwrap(),
            "TSM is rallying."
        );

        let empty = GeminiNarrator::new(
            GeminiClient::new(http, "key".into()).with_base_url(format!("http://{}/empty", addr)),
        );
        let err = empty.generate(&request_with_news()).await.unwrap_err();
        assert!(matches!(err, BriefError::ProviderError(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_expose_key() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GeminiClient::new(build_http_client().unwrap(), "SECRETKEY123".into())
            .with_base_url(format!("http://{}/generate", addr));

        let err = client
            .generate("Brief me on TSM", GenerationConfig::brief())
            .await
            .unwrap_err();
        assert!(matches!(err, BriefError::ProviderUnavailable(_)));
        assert!(!err.to_string().contains("SECRETKEY123"));
    }
}
