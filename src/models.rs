//! Core data models for the market brief

use crate::error::BriefError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Number of context passages requested per ticker
pub const CONTEXT_TOP_K: u32 = 2;

/// Summary used when no ticker produced a narrative
pub const FAILED_SUMMARY: &str = "Failed to generate summary.";

/// Retrieval query issued for a ticker
pub fn context_query(ticker: &str) -> String {
    format!("{} earnings", ticker)
}

//
// ================= Provider Payloads =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub ticker: String,
    pub short_name: String,
    pub current_price: f64,
    pub market_cap: f64,
    pub fifty_two_week_high: f64,
    pub fifty_two_week_low: f64,
    pub previous_close: f64,
    pub open: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct News {
    pub ticker: String,
    pub top_news: Vec<NewsItem>,
}

impl News {
    /// Placeholder sent to the narrative provider when news is unavailable
    pub fn empty(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            top_news: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Context {
    pub query: String,
    pub top_k: u32,
    pub results: Vec<String>,
}

impl Context {
    /// Placeholder sent to the narrative provider when retrieval is unavailable
    pub fn empty(ticker: &str) -> Self {
        Self {
            query: context_query(ticker),
            top_k: CONTEXT_TOP_K,
            results: Vec::new(),
        }
    }
}

//
// ================= Outcomes =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ProviderUnavailable,
    ProviderError,
    MalformedResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::ProviderUnavailable => "provider_unavailable",
            FailureKind::ProviderError => "provider_error",
            FailureKind::MalformedResponse => "malformed_response",
        };
        write!(f, "{}", s)
    }
}

/// Result of one provider call for one ticker.
///
/// Serializes as the payload itself on success and as `{error, kind}` on
/// failure, so callers inspecting `details` see what the provider sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ProviderOutcome<T> {
    Success(T),
    Failure { error: String, kind: FailureKind },
}

impl<T> ProviderOutcome<T> {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        ProviderOutcome::Failure {
            error: message.into(),
            kind,
        }
    }

    pub fn from_error(err: &BriefError) -> Self {
        ProviderOutcome::failure(err.failure_kind(), err.detail())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProviderOutcome::Success(_))
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            ProviderOutcome::Success(payload) => Some(payload),
            ProviderOutcome::Failure { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ProviderOutcome::Success(_) => None,
            ProviderOutcome::Failure { error, .. } => Some(error),
        }
    }
}

impl<T> From<crate::Result<T>> for ProviderOutcome<T> {
    fn from(result: crate::Result<T>) -> Self {
        match result {
            Ok(payload) => ProviderOutcome::Success(payload),
            Err(e) => ProviderOutcome::from_error(&e),
        }
    }
}

/// Everything gathered for one ticker, before normalization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickerBrief {
    pub ticker: String,
    #[serde(rename = "stock_data")]
    pub quote: ProviderOutcome<Quote>,
    #[serde(rename = "earnings_news")]
    pub news: ProviderOutcome<News>,
    #[serde(rename = "retrieved_context")]
    pub context: ProviderOutcome<Context>,
}

impl TickerBrief {
    /// True when none of the three providers answered
    pub fn all_failed(&self) -> bool {
        !self.quote.is_success() && !self.news.is_success() && !self.context.is_success()
    }
}

//
// ================= Narrative =================
//

/// Stock data forwarded to the narrative provider.
///
/// A missing quote is still forwarded as `{error}` so the narrative can
/// mention that price data is unavailable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum QuotePayload {
    Available(Quote),
    Missing { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NarrativeRequest {
    #[serde(rename = "stock_data")]
    pub quote: QuotePayload,
    #[serde(rename = "earnings_news")]
    pub news: News,
    #[serde(rename = "retrieved_context")]
    pub context: Context,
}

/// Terminal state of the fallback loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeOutcome {
    Found { ticker: String, summary: String },
    Exhausted,
}

impl NarrativeOutcome {
    pub fn summary(&self) -> &str {
        match self {
            NarrativeOutcome::Found { summary, .. } => summary,
            NarrativeOutcome::Exhausted => FAILED_SUMMARY,
        }
    }
}

//
// ================= Request / Result =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefRequest {
    #[serde(default)]
    pub tickers: Vec<String>,
    #[serde(default)]
    pub sector: Option<String>,
}

impl BriefRequest {
    /// Reject requests the orchestrator should never see
    pub fn validate(&self) -> crate::Result<()> {
        if self.tickers.is_empty() {
            return Err(BriefError::InvalidRequest(
                "At least one ticker is required".to_string(),
            ));
        }
        if self.tickers.iter().any(|t| t.trim().is_empty()) {
            return Err(BriefError::InvalidRequest(
                "Ticker symbols must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub filename: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefResult {
    pub tickers: Vec<String>,
    pub sector: Option<String>,
    pub details: Vec<TickerBrief>,
    pub final_summary: String,
    pub audio_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_quote() -> Quote {
        Quote {
            ticker: "TSM".to_string(),
            short_name: "Taiwan Semiconductor".to_string(),
            current_price: 172.5,
            market_cap: 894_000_000_000.0,
            fifty_two_week_high: 193.47,
            fifty_two_week_low: 84.38,
            previous_close: 170.1,
            open: 171.0,
        }
    }

    #[test]
    fn test_quote_uses_agent_field_names() {
        let value = serde_json::to_value(sample_quote()).unwrap();
        assert_eq!(value["shortName"], "Taiwan Semiconductor");
        assert_eq!(value["fiftyTwoWeekHigh"], 193.47);
        assert_eq!(value["previousClose"], 170.1);
    }

    #[test]
    fn test_outcome_serializes_payload_or_error() {
        let ok: ProviderOutcome<Context> = ProviderOutcome::Success(Context::empty("TSM"));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"query": "TSM earnings", "top_k": 2, "results": []})
        );

        let failed: ProviderOutcome<Context> =
            ProviderOutcome::failure(FailureKind::ProviderError, "No documents indexed yet.");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"error": "No documents indexed yet.", "kind": "provider_error"})
        );
    }

    #[test]
    fn test_outcome_from_result() {
        let outcome: ProviderOutcome<News> =
            Err(BriefError::ProviderUnavailable("connection refused".into())).into();
        assert_eq!(outcome.error_message(), Some("connection refused"));
        assert!(matches!(
            outcome,
            ProviderOutcome::Failure {
                kind: FailureKind::ProviderUnavailable,
                ..
            }
        ));
    }

    #[test]
    fn test_narrative_request_wire_shape() {
        let request = NarrativeRequest {
            quote: QuotePayload::Missing {
                error: "timeout".to_string(),
            },
            news: News::empty("TSM"),
            context: Context::empty("TSM"),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "stock_data": {"error": "timeout"},
                "earnings_news": {"ticker": "TSM", "top_news": []},
                "retrieved_context": {"query": "TSM earnings", "top_k": 2, "results": []}
            })
        );
    }

    #[test]
    fn test_news_item_optional_fields() {
        let item: NewsItem = serde_json::from_value(json!({"title": "TSMC beats"})).unwrap();
        assert_eq!(item.url, None);
        assert_eq!(item.summary, None);
    }

    #[test]
    fn test_request_validation() {
        let empty = BriefRequest {
            tickers: vec![],
            sector: None,
        };
        assert!(matches!(empty.validate(), Err(BriefError::InvalidRequest(_))));

        let blank = BriefRequest {
            tickers: vec!["TSM".into(), "  ".into()],
            sector: None,
        };
        assert!(blank.validate().is_err());

        let ok = BriefRequest {
            tickers: vec!["TSM".into(), "TSM".into()],
            sector: Some("Asia tech".into()),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_exhausted_summary_is_placeholder() {
        assert_eq!(NarrativeOutcome::Exhausted.summary(), FAILED_SUMMARY);
        let found = NarrativeOutcome::Found {
            ticker: "B".into(),
            summary: "X".into(),
        };
        assert_eq!(found.summary(), "X");
    }
}
