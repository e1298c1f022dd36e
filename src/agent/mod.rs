//! Brief orchestrator
//!
//! GATHER → SHAPE → NARRATE (first success wins) → RENDER → ASSEMBLE
//!
//! Every stage turns its own failures into values, so `run` always returns
//! a result body.

use crate::audio::{AudioWriter, GoogleTranslateTts};
use crate::config::{BriefConfig, MarketDataBackend, NarrativeBackend};
use crate::error::BriefError;
use crate::execution::DataGatherer;
use crate::gemini::{GeminiClient, GeminiNarrator};
use crate::models::{
    AudioArtifact, BriefRequest, BriefResult, NarrativeOutcome, TickerBrief, FAILED_SUMMARY,
};
use crate::narrative::select_narrative;
use crate::providers::{
    build_http_client, AgentClient, AlphaVantageClient, ContextProvider, HttpContextProvider,
    HttpNarrativeProvider, HttpNewsProvider, HttpQuoteProvider, NarrativeProvider, NewsProvider,
    QuoteProvider,
};
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

pub struct BriefOrchestrator {
    gatherer: DataGatherer,
    narrator: Arc<dyn NarrativeProvider>,
    audio: AudioWriter,
}

impl BriefOrchestrator {
    pub fn new(
        gatherer: DataGatherer,
        narrator: Arc<dyn NarrativeProvider>,
        audio: AudioWriter,
    ) -> Self {
        Self {
            gatherer,
            narrator,
            audio,
        }
    }

    /// Wire providers from configuration. One HTTP client is shared by
    /// every outbound call.
    pub fn from_config(config: &BriefConfig) -> Result<Self> {
        config.validate()?;

        let client = build_http_client()?;
        let agent = AgentClient::new(client.clone());

        let quotes: Arc<dyn QuoteProvider>;
        let news: Arc<dyn NewsProvider>;
        match config.market_data_backend {
            MarketDataBackend::Agents => {
                quotes = Arc::new(HttpQuoteProvider::new(agent.clone(), &config.quote_agent_url));
                news = Arc::new(HttpNewsProvider::new(agent.clone(), &config.news_agent_url));
            }
            MarketDataBackend::AlphaVantage => {
                let key = config.alpha_vantage_key.clone().ok_or_else(|| {
                    BriefError::Config("ALPHA_VANTAGE_KEY environment variable is not set".into())
                })?;
                let alpha = Arc::new(AlphaVantageClient::new(client.clone(), key)?);
                quotes = alpha.clone();
                news = alpha;
            }
        }

        let context: Arc<dyn ContextProvider> = Arc::new(HttpContextProvider::new(
            agent.clone(),
            &config.retrieval_agent_url,
        ));

        let narrator: Arc<dyn NarrativeProvider> = match config.narrative_backend {
            NarrativeBackend::Agent => Arc::new(HttpNarrativeProvider::new(
                agent,
                &config.language_agent_url,
            )),
            NarrativeBackend::Gemini => {
                let key = config.gemini_api_key.clone().ok_or_else(|| {
                    BriefError::Config("GEMINI_API_KEY environment variable is not set".into())
                })?;
                Arc::new(GeminiNarrator::new(GeminiClient::new(client.clone(), key)))
            }
        };

        let audio = AudioWriter::new(
            Arc::new(GoogleTranslateTts::new(client)),
            &config.audio_dir,
            &config.audio_language,
        );

        info!(
            market_data = ?config.market_data_backend,
            narrative = narrator.name(),
            audio_dir = %config.audio_dir.display(),
            "Orchestrator wired"
        );

        Ok(Self::new(DataGatherer::new(quotes, news, context), narrator, audio))
    }

    /// Produce a brief for the requested tickers
    pub async fn run(&self, request: BriefRequest) -> BriefResult {
        let start = Instant::now();
        let request_id = Uuid::new_v4();
        let BriefRequest { tickers, sector } = request;

        info!(
            %request_id,
            tickers = ?tickers,
            sector = ?sector,
            "Brief requested"
        );

        let details = self.gatherer.gather_all(&tickers).await;
        debug!(%request_id, gathered = details.len(), "Gathering complete");

        let narrative = select_narrative(self.narrator.as_ref(), &details).await;

        let audio = match &narrative {
            NarrativeOutcome::Found { summary, .. } if should_speak(summary) => {
                self.audio.render(summary, &tickers).await
            }
            _ => None,
        };

        info!(
            %request_id,
            narrated = matches!(narrative, NarrativeOutcome::Found { .. }),
            audio = audio.is_some(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Brief complete"
        );

        assemble(tickers, sector, details, narrative, audio)
    }
}

/// Only real summaries are spoken; blank text and the failure placeholder are not
fn should_speak(summary: &str) -> bool {
    !summary.trim().is_empty() && summary != FAILED_SUMMARY
}

/// Fold the stage outputs into the response body
pub fn assemble(
    tickers: Vec<String>,
    sector: Option<String>,
    details: Vec<TickerBrief>,
    narrative: NarrativeOutcome,
    audio: Option<AudioArtifact>,
) -> BriefResult {
    BriefResult {
        tickers,
        sector,
        details,
        final_summary: narrative.summary().to_string(),
        audio_file: audio.map(|a| a.filename),
    }
}
