use base64::Engine;
use bytes::{Bytes, BytesMut};
use serde_json::json;

/// ElevenLabs text-to-speech client.
///
/// Returns MP3 audio. With no API key configured every call yields empty audio.
pub struct TtsClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

/// Characters sent per request; longer replies are split at sentence boundaries.
const MAX_CHARS: usize = 2500;

impl TtsClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Convert text to MP3 bytes using an explicit voice ID.
    pub async fn synthesize_with_voice(
        &self,
        text: &str,
        voice_id: &str,
    ) -> Result<Bytes, TtsError> {
        if !self.is_enabled() {
            return Err(TtsError::Disabled);
        }

        let chunks = split_text(text, MAX_CHARS);
        let mut all_audio = BytesMut::new();

        for chunk in &chunks {
            let audio = self.synthesize_chunk(chunk, voice_id).await?;
            all_audio.extend_from_slice(&audio);
        }

        tracing::info!(bytes = all_audio.len(), "TTS synthesized");
        Ok(all_audio.freeze())
    }

    /// Synthesize and base64-encode for WebSocket transport. Empty on any failure.
    pub async fn synthesize_base64(&self, text: &str, voice_id: &str) -> String {
        match self.synthesize_with_voice(text, voice_id).await {
            Ok(audio) if !audio.is_empty() => {
                base64::engine::general_purpose::STANDARD.encode(audio)
            }
            Ok(_) => String::new(),
            Err(TtsError::Disabled) => {
                tracing::debug!("ElevenLabs key not set, TTS disabled");
                String::new()
            }
            Err(e) => {
                tracing::error!("TTS error: {e}");
                String::new()
            }
        }
    }

    /// Synthesize a single chunk (must be <= MAX_CHARS).
    async fn synthesize_chunk(&self, text: &str, voice_id: &str) -> Result<Bytes, TtsError> {
        let body = json!({
            "text": text,
            "model_id": &self.model,
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.75,
                "style": 0.5,
                "use_speaker_boost": true
            }
        });

        let resp = self
            .client
            .post(format!(
                "https://api.elevenlabs.io/v1/text-to-speech/{voice_id}"
            ))
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| TtsError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(TtsError::Api(format!("{status}: {body}")));
        }

        resp.bytes()
            .await
            .map_err(|e| TtsError::Request(e.to_string()))
    }
}

/// Split text at sentence boundaries to stay under the character limit.
///
/// Splits on `. `, `! `, `? ` boundaries. If a single sentence exceeds the
/// limit, falls back to splitting at the limit on a char boundary.
fn split_text(text: &str, max_chars: usize) -> Vec<&str> {
    if text.len() <= max_chars {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= max_chars {
            chunks.push(remaining);
            break;
        }

        let mut limit = max_chars;
        while !remaining.is_char_boundary(limit) {
            limit -= 1;
        }

        // Find the last sentence boundary within the limit
        let search_slice = &remaining[..limit];
        let split_pos = search_slice
            .rmatch_indices(". ")
            .chain(search_slice.rmatch_indices("! "))
            .chain(search_slice.rmatch_indices("? "))
            .map(|(i, s)| i + s.len())
            .max();

        let pos = split_pos.unwrap_or(limit);
        chunks.push(&remaining[..pos]);
        remaining = remaining[pos..].trim_start();
    }

    chunks
}

#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    #[error("TTS disabled: no API key")]
    Disabled,
    #[error("HTTP request failed: {0}")]
    Request(String),
    #[error("API error: {0}")]
    Api(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_not_split() {
        let chunks = split_text("Hello world.", 2500);
        assert_eq!(chunks, vec!["Hello world."]);
    }

    #[test]
    fn splits_at_sentence_boundary() {
        let text = "Your order shipped. It arrives Monday. Anything else?";
        let chunks = split_text(text, 40);
        assert_eq!(chunks[0], "Your order shipped. It arrives Monday. ");
        assert_eq!(chunks[1], "Anything else?");
    }

    #[test]
    fn hard_split_respects_char_boundaries() {
        let text = "é".repeat(2000);
        let chunks = split_text(&text, 2501);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 2500);
        assert_eq!(chunks[1].len(), 1500);
    }

    #[tokio::test]
    async fn disabled_without_key() {
        let tts = TtsClient::new(String::new(), "eleven_multilingual_v2".into());
        assert!(!tts.is_enabled());
        assert!(tts.synthesize_base64("hello", "voice").await.is_empty());
        assert!(matches!(
            tts.synthesize_with_voice("hello", "voice").await,
            Err(TtsError::Disabled)
        ));
    }
}
