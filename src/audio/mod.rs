//! Audio rendering of the final summary
//!
//! Output files are named from the first requested ticker, so two requests
//! sharing a first ticker write the same file and the last writer wins.
//! There is no locking and no eviction.

use crate::error::BriefError;
use crate::models::AudioArtifact;
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{info, warn};

pub mod gtts;

pub use gtts::GoogleTranslateTts;

/// Token used in the filename when no ticker was requested
pub const FALLBACK_TOKEN: &str = "all";

/// Speech synthesis into an arbitrary byte sink
#[async_trait::async_trait]
pub trait AudioRenderer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn render(
        &self,
        text: &str,
        language: &str,
        out: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<()>;
}

/// Deterministic artifact name for a request
pub fn audio_filename(tickers: &[String]) -> String {
    let token = tickers.first().map(String::as_str).unwrap_or(FALLBACK_TOKEN);
    format!("summary_audio_{}.mp3", token)
}

/// Writes rendered summaries into the audio directory
pub struct AudioWriter {
    renderer: Arc<dyn AudioRenderer>,
    dir: PathBuf,
    language: String,
}

impl AudioWriter {
    pub fn new(renderer: Arc<dyn AudioRenderer>, dir: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            renderer,
            dir: dir.into(),
            language: language.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render `summary` to disk. Any failure degrades to `None`.
    pub async fn render(&self, summary: &str, tickers: &[String]) -> Option<AudioArtifact> {
        let filename = audio_filename(tickers);
        let path = self.dir.join(&filename);

        match self.write_file(summary, &path).await {
            Ok(()) => {
                info!(file = %filename, renderer = self.renderer.name(), "Audio rendered");
                Some(AudioArtifact { filename, path })
            }
            Err(e) => {
                warn!(file = %filename, error = %e, "Error generating audio");
                if let Err(rm) = tokio::fs::remove_file(&path).await {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        warn!(file = %filename, error = %rm, "Could not remove partial audio file");
                    }
                }
                None
            }
        }
    }

    async fn write_file(&self, text: &str, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let file = File::create(path).await?;
        let mut writer = BufWriter::new(file);

        let rendered = self
            .renderer
            .render(text, &self.language, &mut writer)
            .await;

        // flush and close on every path, including a failed render
        let closed = writer.shutdown().await;
        drop(writer);

        rendered.map_err(|e| BriefError::RenderingFailure(e.detail()))?;
        closed?;
        Ok(())
    }
}
