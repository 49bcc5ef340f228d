use rand::seq::SliceRandom;
use serde::Deserialize;

use super::llm::is_plausible_key;

const TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Stand-in transcripts used when no real key is configured or Whisper fails.
pub const DEMO_PHRASES: &[&str] = &[
    "Hello, I need help with my recent order.",
    "Can you tell me the status of my delivery?",
    "I'd like to return a product, please.",
    "I'm having an urgent issue with my account.",
    "What are your business hours?",
    "I need to speak with a manager immediately.",
    "Thank you for your help, that's very kind.",
    "This is frustrating, I've been waiting for days.",
    "Can you help me reset my password?",
    "I'd like to know more about your premium plans.",
];

/// OpenAI Whisper speech-to-text client.
pub struct SttClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl SttClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    pub fn is_live(&self) -> bool {
        is_plausible_key(&self.api_key)
    }

    /// Transcribe audio, substituting a demo phrase in demo mode or on failure.
    pub async fn transcribe_or_demo(&self, audio: &[u8], language: &str) -> String {
        if !self.is_live() {
            let phrase = demo_phrase();
            tracing::info!(demo = true, transcript = phrase, "Simulated transcription");
            return phrase.to_string();
        }

        match self.transcribe(audio, language).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("STT error: {e}");
                let phrase = demo_phrase();
                tracing::info!(demo = true, transcript = phrase, "Using demo phrase");
                phrase.to_string()
            }
        }
    }

    /// Upload audio to Whisper. `language` is passed through unless it is `auto`.
    pub async fn transcribe(&self, audio: &[u8], language: &str) -> Result<String, SttError> {
        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("audio.webm")
            .mime_str("audio/webm")
            .map_err(|e| SttError::Request(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .part("file", part);
        if !language.is_empty() && language != "auto" {
            form = form.text("language", language.to_string());
        }

        let resp = self
            .client
            .post(TRANSCRIPTION_URL)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SttError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SttError::Api(format!("{status}: {body}")));
        }

        let parsed: TranscriptionResponse = resp
            .json()
            .await
            .map_err(|e| SttError::Request(e.to_string()))?;

        let text = parsed.text.trim().to_string();
        tracing::info!(chars = text.len(), "Transcribed audio");
        Ok(text)
    }
}

fn demo_phrase() -> &'static str {
    DEMO_PHRASES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(DEMO_PHRASES[0])
}

#[derive(Debug, thiserror::Error)]
pub enum SttError {
    #[error("HTTP request failed: {0}")]
    Request(String),
    #[error("API error: {0}")]
    Api(String),
}
