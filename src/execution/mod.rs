//! Per-ticker data gathering
//!
//! Each ticker gets one quote, one news and one retrieval call. The three
//! calls run concurrently and every result is captured as an outcome, so a
//! failing provider never stops the others.

use crate::models::{context_query, ProviderOutcome, TickerBrief, CONTEXT_TOP_K};
use crate::providers::{ContextProvider, NewsProvider, QuoteProvider};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

pub struct DataGatherer {
    quotes: Arc<dyn QuoteProvider>,
    news: Arc<dyn NewsProvider>,
    context: Arc<dyn ContextProvider>,
}

impl DataGatherer {
    pub fn new(
        quotes: Arc<dyn QuoteProvider>,
        news: Arc<dyn NewsProvider>,
        context: Arc<dyn ContextProvider>,
    ) -> Self {
        Self {
            quotes,
            news,
            context,
        }
    }

    /// Fetch everything for one ticker. Never fails; failures are recorded.
    pub async fn gather(&self, ticker: &str) -> TickerBrief {
        let start = Instant::now();
        let query = context_query(ticker);

        let (quote, news, context) = tokio::join!(
            self.quotes.fetch_quote(ticker),
            self.news.fetch_news(ticker),
            self.context.retrieve(&query, CONTEXT_TOP_K),
        );

        let brief = TickerBrief {
            ticker: ticker.to_string(),
            quote: ProviderOutcome::from(quote),
            news: ProviderOutcome::from(news),
            context: ProviderOutcome::from(context),
        };

        for (provider, error) in [
            (self.quotes.name(), brief.quote.error_message()),
            (self.news.name(), brief.news.error_message()),
            (self.context.name(), brief.context.error_message()),
        ] {
            if let Some(error) = error {
                warn!(ticker = %ticker, provider, error = %error, "Provider call failed");
            }
        }

        debug!(
            ticker = %ticker,
            elapsed_ms = start.elapsed().as_millis() as u64,
            quote_ok = brief.quote.is_success(),
            news_ok = brief.news.is_success(),
            context_ok = brief.context.is_success(),
            "Ticker gathered"
        );

        brief
    }

    /// Gather every ticker in request order, duplicates included
    pub async fn gather_all(&self, tickers: &[String]) -> Vec<TickerBrief> {
        let mut details = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            details.push(self.gather(ticker).await);
        }
        details
    }
}
