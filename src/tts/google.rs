//! Online synthesis through the Google Translate TTS endpoint.
//!
//! The endpoint only accepts short requests, so the text is split into
//! [`MAX_CHUNK_CHARS`]-character pieces on word boundaries. Each piece comes
//! back as an MP3 stream; MP3 frames concatenate cleanly, so the pieces are
//! appended into a single `narration.mp3`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::synthesizer::{SpeechSynthesizer, SynthesisError};
use crate::config::TtsConfig;

pub const MAX_CHUNK_CHARS: usize = 100;

const MP3_FILE: &str = "narration.mp3";

pub struct GoogleTtsSynthesizer {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTtsSynthesizer {
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.request_timeout_secs`.
    pub fn from_config(config: &TtsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoint: format!("https://translate.google.{}/translate_tts", config.google_tld),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>, SynthesisError> {
        let total = total.to_string();
        let idx_str = idx.to_string();
        let textlen = chunk.chars().count().to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", language),
                ("client", "tw-ob"),
                ("total", total.as_str()),
                ("idx", idx_str.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynthesisError::Backend(format!(
                "HTTP {status} for chunk {idx} (language {language:?})"
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        dir: &Path,
    ) -> Result<PathBuf, SynthesisError> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        log::info!("tts: requesting {} chunk(s) from {}", chunks.len(), self.endpoint);

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let bytes = self.fetch_chunk(chunk, language, idx, chunks.len()).await?;
            audio.extend_from_slice(&bytes);
        }

        let path = dir.join(MP3_FILE);
        tokio::fs::write(&path, &audio)
            .await
            .map_err(|source| SynthesisError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Pieces break between words; a single word longer than `max_chars` is cut
/// at character boundaries. Whitespace between words collapses to one space.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word = word;
        let mut word_len = word.chars().count();

        while word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let split = word
                .char_indices()
                .nth(max_chars)
                .map_or(word.len(), |(i, _)| i);
            chunks.push(word[..split].to_owned());
            word = &word[split..];
            word_len -= max_chars;
        }
        if word_len == 0 {
            continue;
        }

        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current_len + needed > max_chars {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("Hello world.", 100), vec!["Hello world."]);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_text("", 100).is_empty());
        assert!(chunk_text("   ", 100).is_empty());
    }

    #[test]
    fn breaks_on_word_boundaries() {
        assert_eq!(
            chunk_text("aaa bbb ccc ddd", 7),
            vec!["aaa bbb", "ccc ddd"]
        );
        assert_eq!(chunk_text("aaa bbb ccc", 8), vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn long_word_is_cut() {
        assert_eq!(chunk_text("ab abcdefgh c", 3), vec!["ab", "abc", "def", "gh", "c"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let chunks = chunk_text("ééé ééé", 3);
        assert_eq!(chunks, vec!["ééé", "ééé"]);
    }

    #[test]
    fn chunks_respect_limit_and_keep_every_word() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(20);
        let chunks = chunk_text(&text, MAX_CHUNK_CHARS);
        assert!(chunks.iter().all(|c| c.chars().count() <= MAX_CHUNK_CHARS));
        assert_eq!(
            chunks.join(" "),
            text.split_whitespace().collect::<Vec<_>>().join(" ")
        );
    }

    #[test]
    fn endpoint_uses_configured_tld() {
        let config = TtsConfig {
            google_tld: "co.uk".into(),
            ..TtsConfig::default()
        };
        assert_eq!(
            GoogleTtsSynthesizer::from_config(&config).endpoint(),
            "https://translate.google.co.uk/translate_tts"
        );
    }
}
