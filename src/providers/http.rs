//! Providers backed by the agent services
//!
//! quote:     GET  /stock-data/?ticker=
//! news:      GET  /earnings-news/?ticker=
//! retrieval: GET  /retrieve/?query=&top_k=
//! narrative: POST /generate-summary/

use super::{
    decode_narrative_body, AgentClient, ContextProvider, NarrativeProvider, NewsProvider,
    QuoteProvider,
};
use crate::models::{Context, NarrativeRequest, News, Quote};
use crate::Result;

pub struct HttpQuoteProvider {
    agent: AgentClient,
    url: String,
}

impl HttpQuoteProvider {
    pub fn new(agent: AgentClient, url: impl Into<String>) -> Self {
        Self {
            agent,
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl QuoteProvider for HttpQuoteProvider {
    fn name(&self) -> &'static str {
        "quote_agent"
    }

    async fn fetch_quote(&self, ticker: &str) -> Result<Quote> {
        self.agent
            .get_json(&self.url, &[("ticker", ticker.to_string())])
            .await
    }
}

pub struct HttpNewsProvider {
    agent: AgentClient,
    url: String,
}

impl HttpNewsProvider {
    pub fn new(agent: AgentClient, url: impl Into<String>) -> Self {
        Self {
            agent,
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl NewsProvider for HttpNewsProvider {
    fn name(&self) -> &'static str {
        "news_agent"
    }

    async fn fetch_news(&self, ticker: &str) -> Result<News> {
        self.agent
            .get_json(&self.url, &[("ticker", ticker.to_string())])
            .await
    }
}

pub struct HttpContextProvider {
    agent: AgentClient,
    url: String,
}

impl HttpContextProvider {
    pub fn new(agent: AgentClient, url: impl Into<String>) -> Self {
        Self {
            agent,
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl ContextProvider for HttpContextProvider {
    fn name(&self) -> &'static str {
        "retrieval_agent"
    }

    async fn retrieve(&self, query: &str, top_k: u32) -> Result<Context> {
        self.agent
            .get_json(
                &self.url,
                &[("query", query.to_string()), ("top_k", top_k.to_string())],
            )
            .await
    }
}

pub struct HttpNarrativeProvider {
    agent: AgentClient,
    url: String,
}

impl HttpNarrativeProvider {
    pub fn new(agent: AgentClient, url: impl Into<String>) -> Self {
        Self {
            agent,
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl NarrativeProvider for HttpNarrativeProvider {
    fn name(&self) -> &'static str {
        "language_agent"
    }

    async fn generate(&self, request: &NarrativeRequest) -> Result<String> {
        let body = self.agent.post_json_value(&self.url, request).await?;
        decode_narrative_body(body)
    }
}
