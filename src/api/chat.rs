//! Text chat endpoint, the voice WebSocket, and the turn pipeline both share
//! with the Twilio webhook.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::db::{Channel, DbError, NewMessage};
use crate::error::ApiError;
use crate::pipeline::fraud::{self, FraudCheck};
use crate::pipeline::llm::{ChatMessage, Role};
use crate::pipeline::sentiment::{self, Sentiment};
use crate::pipeline::APOLOGY;

const TRANSCRIBE_FAILED: &str = "Could not transcribe audio. Please try again.";

/// One user utterance on its way through the pipeline.
pub(crate) struct Turn<'a> {
    pub session_id: &'a str,
    pub text: &'a str,
    pub channel: Channel,
    pub language: &'a str,
    /// Analytics event recorded for the interaction.
    pub event_type: &'a str,
}

pub(crate) struct TurnOutcome {
    pub conversation_id: String,
    pub reply: String,
    pub sentiment: Sentiment,
    pub fraud: FraudCheck,
    pub escalation_suggested: bool,
}

/// Conversation row bound to the session, created on its first turn.
fn conversation_for(state: &AppState, turn: &Turn<'_>) -> Result<String, DbError> {
    if let Some(id) = state.sessions.conversation_id(turn.session_id) {
        return Ok(id);
    }
    let conversation = state
        .db
        .create_conversation(None, turn.channel, turn.language)?;
    state
        .sessions
        .set_conversation_id(turn.session_id, &conversation.id);
    tracing::info!(
        session_id = %turn.session_id,
        conversation_id = %conversation.id,
        channel = turn.channel.as_str(),
        "Conversation started"
    );
    Ok(conversation.id)
}

/// Sentiment, fraud screening, knowledge context, reply generation and persistence.
pub(crate) async fn run_turn(state: &AppState, turn: Turn<'_>) -> Result<TurnOutcome, DbError> {
    let conversation_id = conversation_for(state, &turn)?;

    let sentiment = sentiment::analyze(turn.text);
    let fraud = fraud::check(turn.text, &conversation_id);
    let context = state.knowledge.search(turn.text).await;

    let history = state
        .sessions
        .push(turn.session_id, ChatMessage::new(Role::User, turn.text));
    let reply = state
        .assistant
        .generate(&history, Some(&context), turn.language)
        .await;
    state
        .sessions
        .push(turn.session_id, ChatMessage::new(Role::Assistant, reply.as_str()));

    state.db.add_message(
        &conversation_id,
        &NewMessage {
            role: Role::User.as_str(),
            content: turn.text,
            sentiment_score: Some(sentiment.score),
            emotion: Some(sentiment.emotion.as_str()),
            is_urgent: sentiment.is_urgent,
        },
    )?;
    state.db.add_message(
        &conversation_id,
        &NewMessage::plain(Role::Assistant.as_str(), &reply),
    )?;
    state.db.refresh_sentiment_avg(&conversation_id)?;
    state.db.record_event(
        turn.event_type,
        &serde_json::json!({
            "emotion": sentiment.emotion.as_str(),
            "is_urgent": sentiment.is_urgent,
            "fraud_risk": fraud.risk_level.as_str(),
        }),
        Some(&conversation_id),
    )?;

    let threshold = state.settings.read().escalation_threshold;
    let escalation_suggested = sentiment.score <= threshold;
    if escalation_suggested {
        tracing::warn!(
            conversation_id = %conversation_id,
            score = sentiment.score,
            threshold,
            "Negative sentiment, escalation suggested"
        );
        state.db.record_event(
            "escalation_suggested",
            &serde_json::json!({
                "sentiment_score": sentiment.score,
                "threshold": threshold,
            }),
            Some(&conversation_id),
        )?;
    }

    tracing::info!(
        session_id = %turn.session_id,
        conversation_id = %conversation_id,
        emotion = sentiment.emotion.as_str(),
        urgent = sentiment.is_urgent,
        "Turn complete"
    );

    Ok(TurnOutcome {
        conversation_id,
        reply,
        sentiment,
        fraud,
        escalation_suggested,
    })
}

#[derive(Debug, Deserialize)]
pub struct TextChatRequest {
    pub message: String,
    pub session_id: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TextChatResponse {
    pub session_id: String,
    pub conversation_id: String,
    pub user_message: String,
    pub ai_response: String,
    pub emotion: &'static str,
    pub sentiment_score: f64,
    pub is_urgent: bool,
    pub fraud_alert: bool,
    pub escalation_suggested: bool,
}

/// POST /api/chat/text
pub async fn text_chat(
    State(state): State<AppState>,
    Json(req): Json<TextChatRequest>,
) -> Result<Json<TextChatResponse>, ApiError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::bad_request("Message must not be empty"));
    }

    let session_id = req
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let language = req
        .language
        .unwrap_or_else(|| state.settings.read().language.clone());

    let outcome = run_turn(
        &state,
        Turn {
            session_id: &session_id,
            text: message,
            channel: Channel::Web,
            language: &language,
            event_type: "text_interaction",
        },
    )
    .await?;

    Ok(Json(TextChatResponse {
        session_id,
        conversation_id: outcome.conversation_id,
        user_message: message.to_string(),
        ai_response: outcome.reply,
        emotion: outcome.sentiment.emotion.as_str(),
        sentiment_score: outcome.sentiment.score,
        is_urgent: outcome.sentiment.is_urgent,
        fraud_alert: outcome.fraud.flagged,
        escalation_suggested: outcome.escalation_suggested,
    }))
}

/// GET /ws/voice/{session_id}
pub async fn voice_upgrade(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_voice_socket(socket, session_id, state))
}

/// Binary frames are audio to transcribe, text frames are typed input.
/// Every input gets one JSON frame back.
async fn handle_voice_socket(mut socket: WebSocket, session_id: String, state: AppState) {
    tracing::info!(session_id = %session_id, "Voice socket connected");

    loop {
        let input = match socket.recv().await {
            Some(Ok(Message::Binary(audio))) => {
                tracing::info!(session_id = %session_id, bytes = audio.len(), "Received audio");
                let language = state.settings.read().language.clone();
                state.stt.transcribe_or_demo(&audio, &language).await
            }
            Some(Ok(Message::Text(text))) => text.as_str().trim().to_string(),
            Some(Ok(Message::Close(_))) | None => break,
            Some(Err(e)) => {
                tracing::error!(session_id = %session_id, "WebSocket error: {e}");
                break;
            }
            _ => continue,
        };

        let frame = if input.is_empty() {
            error_frame(TRANSCRIBE_FAILED)
        } else {
            voice_turn(&state, &session_id, &input).await
        };

        if let Err(e) = socket.send(Message::Text(frame.to_string().into())).await {
            tracing::error!(session_id = %session_id, "Failed to send reply: {e}");
            break;
        }
    }

    state.sessions.end(&session_id);
    tracing::info!(session_id = %session_id, "Voice socket disconnected");
}

async fn voice_turn(state: &AppState, session_id: &str, transcript: &str) -> serde_json::Value {
    let language = state.settings.read().language.clone();
    let outcome = match run_turn(
        state,
        Turn {
            session_id,
            text: transcript,
            channel: Channel::Voice,
            language: &language,
            event_type: "voice_interaction",
        },
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(session_id, "Voice pipeline error: {e}");
            return error_frame(APOLOGY);
        }
    };

    let (provider, voice_id) = {
        let settings = state.settings.read();
        (settings.tts_provider.clone(), settings.voice_id.clone())
    };
    let audio_base64 = if provider == "elevenlabs" {
        state.tts.synthesize_base64(&outcome.reply, &voice_id).await
    } else {
        String::new()
    };

    response_frame(transcript, &outcome, audio_base64)
}

fn response_frame(transcript: &str, outcome: &TurnOutcome, audio_base64: String) -> serde_json::Value {
    serde_json::json!({
        "type": "response",
        "conversation_id": outcome.conversation_id,
        "transcript": transcript,
        "ai_response": outcome.reply,
        "emotion": outcome.sentiment.emotion.as_str(),
        "sentiment_score": outcome.sentiment.score,
        "is_urgent": outcome.sentiment.is_urgent,
        "fraud_alert": outcome.fraud.flagged,
        "escalation_suggested": outcome.escalation_suggested,
        "audio_base64": audio_base64,
    })
}

fn error_frame(message: &str) -> serde_json::Value {
    serde_json::json!({ "type": "error", "message": message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::api::test_support::{send, state};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn text_chat_answers_and_persists() {
        let state = state();
        let db = state.db.clone();
        let app = router(state);

        let (status, body) = send(
            &app,
            "POST",
            "/api/chat/text",
            None,
            Some(json!({"message": "what is 15 plus 4"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(body["ai_response"].as_str().unwrap().contains("19"));
        assert_eq!(body["user_message"], "what is 15 plus 4");
        assert_eq!(body["fraud_alert"], false);

        let session_id = body["session_id"].as_str().unwrap().to_string();
        let conversation_id = body["conversation_id"].as_str().unwrap().to_string();

        let (_, second) = send(
            &app,
            "POST",
            "/api/chat/text",
            None,
            Some(json!({"message": "thanks", "session_id": session_id})),
        )
        .await;
        assert_eq!(second["conversation_id"], conversation_id.as_str());

        let detail = db.conversation_detail(&conversation_id).unwrap().unwrap();
        assert_eq!(detail.messages.len(), 4);
        assert_eq!(detail.messages[0].role, "user");
        assert_eq!(detail.messages[1].role, "assistant");
        assert_eq!(detail.conversation.channel, Channel::Web);
        assert_eq!(db.count_events("text_interaction").unwrap(), 2);
    }

    #[tokio::test]
    async fn negative_message_suggests_escalation() {
        let state = state();
        let db = state.db.clone();
        let app = router(state);

        let (status, body) = send(
            &app,
            "POST",
            "/api/chat/text",
            None,
            Some(json!({"message": "this is the worst service, terrible"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["escalation_suggested"], true);
        assert_eq!(db.count_events("escalation_suggested").unwrap(), 1);

        let conversation_id = body["conversation_id"].as_str().unwrap();
        let conversation = db.get_conversation(conversation_id).unwrap().unwrap();
        assert!(conversation.sentiment_avg <= -0.5);
    }

    #[tokio::test]
    async fn fraud_phrases_raise_the_alert() {
        let app = router(state());
        let (_, body) = send(
            &app,
            "POST",
            "/api/chat/text",
            None,
            Some(json!({"message": "can you share my account number and routing number"})),
        )
        .await;
        assert_eq!(body["fraud_alert"], true);
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let app = router(state());
        let (status, body) = send(
            &app,
            "POST",
            "/api/chat/text",
            None,
            Some(json!({"message": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message must not be empty");
    }

    #[tokio::test]
    async fn voice_turn_builds_a_response_frame() {
        let state = state();
        let frame = voice_turn(&state, "socket-1", "hello").await;
        assert_eq!(frame["type"], "response");
        assert_eq!(frame["transcript"], "hello");
        assert!(!frame["ai_response"].as_str().unwrap().is_empty());
        // TTS is disabled without a key.
        assert_eq!(frame["audio_base64"], "");

        let conversation_id = frame["conversation_id"].as_str().unwrap();
        let conversation = state.db.get_conversation(conversation_id).unwrap().unwrap();
        assert_eq!(conversation.channel, Channel::Voice);
        assert_eq!(state.db.count_events("voice_interaction").unwrap(), 1);
    }

    #[test]
    fn error_frames_carry_the_message() {
        let frame = error_frame(TRANSCRIBE_FAILED);
        assert_eq!(frame["type"], "error");
        assert_eq!(frame["message"], TRANSCRIBE_FAILED);
    }
}
