//! Narrative request shaping and ticker fallback
//!
//! The narrative provider gets one request per ticker, tried in request
//! order. The first summary wins; later tickers are never attempted.

use crate::models::{
    Context, NarrativeOutcome, NarrativeRequest, News, ProviderOutcome, QuotePayload, TickerBrief,
};
use crate::providers::NarrativeProvider;
use tracing::{debug, info, warn};

/// Build the narrative request for one ticker.
///
/// Quote failures are forwarded as `{error}` so the narrative can say price
/// data is missing. News and context failures become empty placeholders.
pub fn shape(brief: &TickerBrief) -> NarrativeRequest {
    let quote = match &brief.quote {
        ProviderOutcome::Success(quote) => QuotePayload::Available(quote.clone()),
        ProviderOutcome::Failure { error, .. } => QuotePayload::Missing {
            error: error.clone(),
        },
    };

    let news = match &brief.news {
        ProviderOutcome::Success(news) => news.clone(),
        ProviderOutcome::Failure { .. } => News::empty(&brief.ticker),
    };

    let context = match &brief.context {
        ProviderOutcome::Success(context) => context.clone(),
        ProviderOutcome::Failure { .. } => Context::empty(&brief.ticker),
    };

    NarrativeRequest {
        quote,
        news,
        context,
    }
}

/// Try each ticker in order until the provider returns a summary
pub async fn select_narrative(
    provider: &dyn NarrativeProvider,
    details: &[TickerBrief],
) -> NarrativeOutcome {
    for brief in details {
        let request = shape(brief);
        debug!(ticker = %brief.ticker, provider = provider.name(), "Attempting narrative");

        match provider.generate(&request).await {
            Ok(summary) => {
                info!(ticker = %brief.ticker, "Narrative generated");
                return NarrativeOutcome::Found {
                    ticker: brief.ticker.clone(),
                    summary,
                };
            }
            Err(e) => {
                warn!(
                    ticker = %brief.ticker,
                    kind = %e.failure_kind(),
                    error = %e,
                    "Narrative generation failed, trying next ticker"
                );
            }
        }
    }

    warn!(attempted = details.len(), "No ticker produced a narrative");
    NarrativeOutcome::Exhausted
}
