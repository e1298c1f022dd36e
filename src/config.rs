//! Process configuration
//!
//! Read once from the environment (after `.env` is loaded by the binary)
//! and handed to the component builders. Nothing here is global.

use crate::error::BriefError;
use crate::Result;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_QUOTE_AGENT_URL: &str = "http://localhost:8001/stock-data/";
pub const DEFAULT_NEWS_AGENT_URL: &str = "http://localhost:8002/earnings-news/";
pub const DEFAULT_RETRIEVAL_AGENT_URL: &str = "http://localhost:8003/retrieve/";
pub const DEFAULT_LANGUAGE_AGENT_URL: &str = "http://localhost:8005/generate-summary/";
pub const DEFAULT_AUDIO_DIR: &str = "audio_files";
pub const DEFAULT_AUDIO_LANGUAGE: &str = "en";

/// Where quotes and news come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketDataBackend {
    /// The quote and news agent services
    Agents,
    /// Alpha Vantage, called directly
    AlphaVantage,
}

impl FromStr for MarketDataBackend {
    type Err = BriefError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "agents" | "agent" | "" => Ok(MarketDataBackend::Agents),
            "alphavantage" | "alpha_vantage" | "alpha-vantage" => {
                Ok(MarketDataBackend::AlphaVantage)
            }
            other => Err(BriefError::Config(format!(
                "Unknown MARKET_DATA_BACKEND: {}",
                other
            ))),
        }
    }
}

/// Where narratives come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeBackend {
    /// The language agent service
    Agent,
    /// Gemini, called directly
    Gemini,
}

impl FromStr for NarrativeBackend {
    type Err = BriefError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "agent" | "agents" | "" => Ok(NarrativeBackend::Agent),
            "gemini" => Ok(NarrativeBackend::Gemini),
            other => Err(BriefError::Config(format!(
                "Unknown NARRATIVE_BACKEND: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BriefConfig {
    pub port: u16,
    pub quote_agent_url: String,
    pub news_agent_url: String,
    pub retrieval_agent_url: String,
    pub language_agent_url: String,
    pub audio_dir: PathBuf,
    pub audio_language: String,
    pub market_data_backend: MarketDataBackend,
    pub narrative_backend: NarrativeBackend,
    pub alpha_vantage_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            quote_agent_url: DEFAULT_QUOTE_AGENT_URL.to_string(),
            news_agent_url: DEFAULT_NEWS_AGENT_URL.to_string(),
            retrieval_agent_url: DEFAULT_RETRIEVAL_AGENT_URL.to_string(),
            language_agent_url: DEFAULT_LANGUAGE_AGENT_URL.to_string(),
            audio_dir: PathBuf::from(DEFAULT_AUDIO_DIR),
            audio_language: DEFAULT_AUDIO_LANGUAGE.to_string(),
            market_data_backend: MarketDataBackend::Agents,
            narrative_backend: NarrativeBackend::Agent,
            alpha_vantage_key: None,
            gemini_api_key: None,
        }
    }
}

impl BriefConfig {
    /// Build from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map here)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT").or_else(|| get("API_PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| BriefError::Config(format!("Invalid port: {}", raw)))?,
            None => defaults.port,
        };

        let market_data_backend = get("MARKET_DATA_BACKEND")
            .map(|v| v.parse::<MarketDataBackend>())
            .transpose()?
            .unwrap_or(defaults.market_data_backend);

        let narrative_backend = get("NARRATIVE_BACKEND")
            .map(|v| v.parse::<NarrativeBackend>())
            .transpose()?
            .unwrap_or(defaults.narrative_backend);

        let config = Self {
            port,
            quote_agent_url: get("QUOTE_AGENT_URL").unwrap_or(defaults.quote_agent_url),
            news_agent_url: get("NEWS_AGENT_URL").unwrap_or(defaults.news_agent_url),
            retrieval_agent_url: get("RETRIEVAL_AGENT_URL")
                .unwrap_or(defaults.retrieval_agent_url),
            language_agent_url: get("LANGUAGE_AGENT_URL").unwrap_or(defaults.language_agent_url),
            audio_dir: get("AUDIO_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.audio_dir),
            audio_language: get("AUDIO_LANGUAGE").unwrap_or(defaults.audio_language),
            market_data_backend,
            narrative_backend,
            alpha_vantage_key: get("ALPHA_VANTAGE_KEY"),
            gemini_api_key: get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")),
        };

        config.validate()?;
        Ok(config)
    }

    /// A selected backend must have its credentials
    pub fn validate(&self) -> Result<()> {
        if self.market_data_backend == MarketDataBackend::AlphaVantage
            && self.alpha_vantage_key.is_none()
        {
            return Err(BriefError::Config(
                "ALPHA_VANTAGE_KEY environment variable is not set".to_string(),
            ));
        }

        if self.narrative_backend == NarrativeBackend::Gemini && self.gemini_api_key.is_none() {
            return Err(BriefError::Config(
                "GEMINI_API_KEY (or GOOGLE_API_KEY) environment variable is not set".to_string(),
            ));
        }

        Ok(())
    }
}
