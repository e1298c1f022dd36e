//! Alpha Vantage quote and news backend
//!
//! Calls Alpha Vantage directly instead of going through the quote and news
//! agents. Quotes combine GLOBAL_QUOTE with the OVERVIEW fundamentals; news
//! comes from NEWS_SENTIMENT. Both require the same API key.

use super::{NewsProvider, QuoteProvider};
use crate::error::BriefError;
use crate::models::{News, NewsItem, Quote};
use crate::Result;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Headlines kept per ticker
const MAX_NEWS_ITEMS: usize = 3;

pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(BriefError::Config(
                "Alpha Vantage API key required".to_string(),
            ));
        }

        Ok(Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<Value> {
        let mut query: Vec<(&str, &str)> = params.to_vec();
        query.push(("apikey", self.api_key.as_str()));

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                // the request url carries the api key
                let e = e.without_url();
                error!(error = %e, "Alpha Vantage request failed");
                BriefError::ProviderUnavailable(format!("Alpha Vantage request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(BriefError::ProviderError(format!(
                "Alpha Vantage API error: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            BriefError::MalformedResponse(format!(
                "Alpha Vantage returned invalid JSON: {}",
                e.without_url()
            ))
        })?;

        check_api_error(&body)?;
        Ok(body)
    }
}

/// Alpha Vantage reports errors and throttling in-band with a 200 status
fn check_api_error(body: &Value) -> Result<()> {
    if let Some(msg) = body.get("Error Message").and_then(Value::as_str) {
        return Err(BriefError::ProviderError(format!(
            "Alpha Vantage API error: {}",
            msg
        )));
    }
    if let Some(msg) = body.get("Note").and_then(Value::as_str) {
        return Err(BriefError::ProviderError(format!(
            "Alpha Vantage API note: {}",
            msg
        )));
    }
    if let Some(msg) = body.get("Information").and_then(Value::as_str) {
        return Err(BriefError::ProviderError(format!(
            "Alpha Vantage API note: {}",
            msg
        )));
    }
    Ok(())
}

/// Numeric field from a string-valued Alpha Vantage object; absent means 0
fn number_field(obj: &Value, key: &str) -> Result<f64> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::String(raw)) => raw.trim().parse().map_err(|_| {
            BriefError::MalformedResponse(format!("Field '{}' is not numeric: {}", key, raw))
        }),
        Some(Value::Number(n)) => Ok(n.as_f64().unwrap_or(0.0)),
        Some(other) => Err(BriefError::MalformedResponse(format!(
            "Field '{}' is not numeric: {}",
            key, other
        ))),
    }
}

/// Combine GLOBAL_QUOTE and OVERVIEW bodies into a quote
pub fn quote_from_parts(ticker: &str, quote_body: &Value, overview: &Value) -> Result<Quote> {
    let quote = match quote_body.get("Global Quote") {
        Some(q) if q.as_object().is_some_and(|o| !o.is_empty()) => q,
        _ => {
            return Err(BriefError::ProviderError(format!(
                "No data found for ticker: {}",
                ticker
            )))
        }
    };

    Ok(Quote {
        ticker: ticker.to_string(),
        short_name: overview
            .get("Name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        current_price: number_field(quote, "05. price")?,
        market_cap: number_field(overview, "MarketCapitalization")?,
        fifty_two_week_high: number_field(overview, "52WeekHigh")?,
        fifty_two_week_low: number_field(overview, "52WeekLow")?,
        previous_close: number_field(quote, "08. previous close")?,
        open: number_field(quote, "02. open")?,
    })
}

/// Keep the first few NEWS_SENTIMENT feed entries
pub fn news_from_feed(ticker: &str, body: &Value) -> Result<News> {
    let feed = body.get("feed").and_then(Value::as_array).ok_or_else(|| {
        BriefError::ProviderError("No news found or API limit exceeded.".to_string())
    })?;

    let top_news = feed
        .iter()
        .take(MAX_NEWS_ITEMS)
        .map(|item| {
            let title = item
                .get("title")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    BriefError::MalformedResponse("News item without title".to_string())
                })?;

            Ok(NewsItem {
                title: title.to_string(),
                url: item.get("url").and_then(Value::as_str).map(str::to_string),
                summary: item
                    .get("summary")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(News {
        ticker: ticker.to_string(),
        top_news,
    })
}

#[async_trait::async_trait]
impl QuoteProvider for AlphaVantageClient {
    fn name(&self) -> &'static str {
        "alpha_vantage_quote"
    }

    async fn fetch_quote(&self, ticker: &str) -> Result<Quote> {
        let quote_body = self
            .query(&[("function", "GLOBAL_QUOTE"), ("symbol", ticker)])
            .await?;
        let overview = self
            .query(&[("function", "OVERVIEW"), ("symbol", ticker)])
            .await?;

        debug!(ticker = %ticker, "Alpha Vantage quote and overview received");
        quote_from_parts(ticker, &quote_body, &overview)
    }
}

#[async_trait::async_trait]
impl NewsProvider for AlphaVantageClient {
    fn name(&self) -> &'static str {
        "alpha_vantage_news"
    }

    async fn fetch_news(&self, ticker: &str) -> Result<News> {
        let body = self
            .query(&[("function", "NEWS_SENTIMENT"), ("tickers", ticker)])
            .await?;
        news_from_feed(ticker, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailureKind, ProviderOutcome};
    use crate::providers::build_http_client;
    use axum::extract::Query;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn global_quote() -> Value {
        json!({
            "Global Quote": {
                "01. symbol": "TSM",
                "02. open": "171.00",
                "05. price": "172.50",
                "08. previous close": "170.10"
            }
        })
    }

    fn overview() -> Value {
        json!({
            "Name": "Taiwan Semiconductor Manufacturing",
            "MarketCapitalization": "894000000000",
            "52WeekHigh": "193.47",
            "52WeekLow": "84.38"
        })
    }

    #[test]
    fn test_empty_key_rejected() {
        let client = build_http_client().unwrap();
        assert!(matches!(
            AlphaVantageClient::new(client, " "),
            Err(BriefError::Config(_))
        ));
    }

    #[test]
    fn test_quote_from_parts() {
        let quote = quote_from_parts("TSM", &global_quote(), &overview()).unwrap();
        assert_eq!(quote.short_name, "Taiwan Semiconductor Manufacturing");
        assert_eq!(quote.current_price, 172.5);
        assert_eq!(quote.market_cap, 894_000_000_000.0);
        assert_eq!(quote.fifty_two_week_low, 84.38);
        assert_eq!(quote.open, 171.0);
    }

    #[test]
    fn test_quote_defaults_missing_overview_fields() {
        let quote = quote_from_parts("TSM", &global_quote(), &json!({})).unwrap();
        assert_eq!(quote.short_name, "Unknown");
        assert_eq!(quote.market_cap, 0.0);
    }

    #[test]
    fn test_quote_rejects_empty_global_quote() {
        let err = quote_from_parts("ZZZZ", &json!({"Global Quote": {}}), &overview()).unwrap_err();
        assert_eq!(err.detail(), "No data found for ticker: ZZZZ");
    }

    #[test]
    fn test_quote_rejects_non_numeric_fields() {
        let overview = json!({"Name": "X", "MarketCapitalization": "None"});
        let err = quote_from_parts("TSM", &global_quote(), &overview).unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::MalformedResponse);
    }

    #[test]
    fn test_api_error_bodies() {
        let err = check_api_error(&json!({"Note": "Thank you for using Alpha Vantage!"}))
            .unwrap_err();
        assert!(err.detail().starts_with("Alpha Vantage API note:"));

        let err = check_api_error(&json!({"Error Message": "Invalid API call."})).unwrap_err();
        assert_eq!(err.detail(), "Alpha Vantage API error: Invalid API call.");

        assert!(check_api_error(&global_quote()).is_ok());
    }

    #[test]
    fn test_news_keeps_first_three() {
        let feed: Vec<Value> = (1..=5)
            .map(|i| {
                json!({
                    "title": format!("Headline {}", i),
                    "url": format!("https://news.example/{}", i),
                    "summary": "..."
                })
            })
            .collect();

        let news = news_from_feed("TSM", &json!({ "feed": feed })).unwrap();
        assert_eq!(news.ticker, "TSM");
        assert_eq!(news.top_news.len(), 3);
        assert_eq!(news.top_news[2].title, "Headline 3");
    }

    #[test]
    fn test_news_without_feed() {
        let err = news_from_feed("TSM", &json!({"items": "0"})).unwrap_err();
        assert_eq!(err.detail(), "No news found or API limit exceeded.");
    }

    #[tokio::test]
    async fn test_fetch_quote_against_stub() {
        let router = Router::new().route(
            "/query",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("apikey").map(String::as_str), Some("demo"));
                match params.get("function").map(String::as_str) {
                    Some("GLOBAL_QUOTE") => Json(global_quote()),
                    Some("OVERVIEW") => Json(overview()),
                    _ => Json(json!({"Error Message": "Invalid API call."})),
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = AlphaVantageClient::new(build_http_client().unwrap(), "demo")
            .unwrap()
            .with_base_url(format!("http://{}/query", addr));

        let quote = client.fetch_quote("TSM").await.unwrap();
        assert_eq!(quote.previous_close, 170.1);

        let err = client.fetch_news("TSM").await.unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::ProviderError);
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_expose_key() {
        // grab a free port, then close it
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = AlphaVantageClient::new(build_http_client().unwrap(), "SECRETKEY123")
            .unwrap()
            .with_base_url(format!("http://{}/query", addr));

        let outcome: ProviderOutcome<Quote> = client.fetch_quote("TSM").await.into();
        assert!(outcome.error_message().is_some());

        let wire = serde_json::to_string(&outcome).unwrap();
        assert!(wire.contains("provider_unavailable"));
        assert!(!wire.contains("SECRETKEY123"));
    }
}
