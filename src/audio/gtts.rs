//! Google Translate text-to-speech
//!
//! The endpoint only accepts short inputs, so text is split into chunks of at
//! most `MAX_CHUNK_CHARS` characters on word boundaries. Each chunk comes
//! back as a standalone MP3 segment; segments are concatenated in order.

use super::AudioRenderer;
use crate::error::BriefError;
use crate::Result;
use reqwest::Client;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

const TTS_URL: &str = "https://translate.google.com/translate_tts";

pub const MAX_CHUNK_CHARS: usize = 100;

pub struct GoogleTranslateTts {
    client: Client,
    base_url: String,
}

impl GoogleTranslateTts {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: TTS_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Split text into pieces of at most `max` characters.
///
/// Words are never split unless a single word is longer than `max`.
pub fn chunk_text(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current_len + needed > max {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[async_trait::async_trait]
impl AudioRenderer for GoogleTranslateTts {
    fn name(&self) -> &'static str {
        "google_translate_tts"
    }

    async fn render(
        &self,
        text: &str,
        language: &str,
        out: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<()> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(BriefError::RenderingFailure("No text to speak".to_string()));
        }

        let total = chunks.len().to_string();
        for (idx, chunk) in chunks.iter().enumerate() {
            let idx_param = idx.to_string();
            let textlen = chunk.chars().count().to_string();
            let mut response = self
                .client
                .get(&self.base_url)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", language),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx_param.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await
                .map_err(|e| BriefError::RenderingFailure(format!("TTS request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(BriefError::RenderingFailure(format!(
                    "TTS returned {} for chunk {}",
                    response.status(),
                    idx
                )));
            }

            let mut bytes = 0usize;
            while let Some(data) = response
                .chunk()
                .await
                .map_err(|e| BriefError::RenderingFailure(format!("TTS stream failed: {}", e)))?
            {
                out.write_all(&data).await?;
                bytes += data.len();
            }

            debug!(chunk = idx, bytes, "TTS chunk written");
        }

        Ok(())
    }
}
