//! Market Brief Orchestrator
//!
//! Builds a spoken market brief for a list of tickers:
//! - Gathers quote, news and retrieved context per ticker from pluggable providers
//! - Records every provider failure in the result instead of aborting
//! - Asks a narrative provider for a summary, falling back ticker by ticker
//! - Renders the summary to an MP3 file when possible
//!
//! PIPELINE:
//! REQUEST → GATHER → SHAPE → NARRATE → RENDER → ASSEMBLE

pub mod agent;
pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod execution;
pub mod gemini;
pub mod models;
pub mod narrative;
pub mod providers;

pub use error::Result;

// Re-export common types
pub use agent::BriefOrchestrator;
pub use config::BriefConfig;
pub use models::*;
