use serde::{Deserialize, Serialize};
use serde_json::json;

const CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Whether an OpenAI key looks real rather than empty or a template placeholder.
pub fn is_plausible_key(key: &str) -> bool {
    !key.is_empty()
        && key.starts_with("sk-")
        && key.len() >= 30
        && !key.to_lowercase().contains("your")
}

/// HTTP client for OpenAI chat completions.
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    /// Send a full message list and return the first choice's text.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = json!({
            "model": &self.model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let resp = self
            .client
            .post(CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Response(format!("HTTP {status}: {body}")));
        }

        let parsed: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| LlmError::Parse("Empty completion".into()))
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Request(String),
    #[error("LLM returned error: {0}")]
    Response(String),
    #[error("Failed to parse LLM response: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plausible_key_rules() {
        assert!(is_plausible_key("sk-abcdefghijklmnopqrstuvwxyz0123"));
        assert!(!is_plausible_key(""));
        assert!(!is_plausible_key("sk-short"));
        assert!(!is_plausible_key("pk-abcdefghijklmnopqrstuvwxyz0123"));
        assert!(!is_plausible_key("sk-your-openai-api-key-goes-here-123"));
        assert!(!is_plausible_key("sk-YOUR-OPENAI-API-KEY-GOES-HERE-123"));
    }

    #[test]
    fn messages_serialize_with_lowercase_roles() {
        let msg = ChatMessage::new(Role::Assistant, "hi");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"role": "assistant", "content": "hi"}));
    }

    #[test]
    fn completion_shape_parses() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"  Hello!  "}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("  Hello!  ")
        );
    }
}
