pub mod fraud;
pub mod llm;
pub mod sentiment;
pub mod stt;
pub mod tts;

use llm::{is_plausible_key, ChatMessage, LlmClient, Role};

use crate::responder::Responder;

/// Reply sent when the voice or phone path cannot produce an answer.
pub const APOLOGY: &str = "I'm having a little trouble right now. Could you try again? 😊";

pub const SYSTEM_PROMPT: &str = "You are an advanced AI voice assistant for customer support.
You are empathetic, professional, and helpful. You:
- Understand and respond in multiple languages including Hindi, Tamil, Telugu, Bengali, and English
- Detect customer emotions and adjust your tone accordingly
- Identify urgent situations and flag them
- Provide concise, clear answers
- Ask clarifying questions when needed
- Escalate to human agents when you cannot resolve an issue
- Never fabricate information

Keep responses conversational and under 3 sentences unless detail is needed.";

/// Turns of history forwarded to the live model.
const HISTORY_WINDOW: usize = 20;
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 500;

/// Picks the live model when a real key is configured, the keyword responder otherwise.
pub struct Assistant {
    llm: Option<LlmClient>,
    responder: Responder,
}

impl Assistant {
    pub fn new(api_key: &str, model: &str) -> Self {
        let llm = is_plausible_key(api_key)
            .then(|| LlmClient::new(api_key.to_string(), model.to_string()));
        if llm.is_none() {
            tracing::info!("No OpenAI key configured, replies come from the keyword responder");
        }
        Self {
            llm,
            responder: Responder::new(),
        }
    }

    pub fn is_live(&self) -> bool {
        self.llm.is_some()
    }

    /// Answer the last user message in `history`.
    pub async fn generate(
        &self,
        history: &[ChatMessage],
        context: Option<&str>,
        language: &str,
    ) -> String {
        if let Some(llm) = &self.llm {
            let messages = build_messages(history, context, language);
            match llm.complete(&messages, TEMPERATURE, MAX_TOKENS).await {
                Ok(reply) => return reply,
                Err(e) => tracing::error!("LLM error, falling back to responder: {e}"),
            }
        }

        self.demo_reply(history)
    }

    fn demo_reply(&self, history: &[ChatMessage]) -> String {
        let last = history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let turns = history.iter().filter(|m| m.role == Role::User).count();

        let reply = self.responder.respond(last, turns);
        tracing::info!(
            demo = true,
            turns,
            input = %preview(last, 40),
            reply = %preview(&reply, 50),
            "Responder reply"
        );
        reply
    }
}

fn build_messages(history: &[ChatMessage], context: Option<&str>, language: &str) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::new(Role::System, SYSTEM_PROMPT)];
    if language != "en" {
        messages.push(ChatMessage::new(
            Role::System,
            format!("Respond in '{language}' language when appropriate."),
        ));
    }
    if let Some(ctx) = context.filter(|c| !c.is_empty()) {
        messages.push(ChatMessage::new(
            Role::System,
            format!("Knowledge context:\n{ctx}"),
        ));
    }

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    messages.extend_from_slice(&history[start..]);
    messages
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
