use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use quick_xml::escape::escape;
use serde::Deserialize;

use crate::api::chat::{run_turn, Turn};
use crate::api::AppState;
use crate::config::TwilioConfig;
use crate::db::{Channel, ConversationStatus};
use crate::greeting;
use crate::pipeline::APOLOGY;

const PROCESS_SPEECH_PATH: &str = "/api/twilio/process-speech";
const NO_INPUT_GOODBYE: &str = "I didn't catch that. Goodbye!";
const FOLLOW_UP: &str = "Is there anything else I can help you with?";
const CLOSING: &str = "Thank you for calling. Goodbye!";
const REPROMPT: &str = "Sorry, I didn't catch that. Could you say it again?";

/// Call states after which Twilio sends no further webhooks.
const TERMINAL_STATUSES: &[&str] = &["completed", "busy", "failed", "no-answer", "canceled"];

#[derive(Debug, Deserialize)]
pub struct SpeechForm {
    #[serde(rename = "CallSid", default)]
    pub call_sid: String,
    #[serde(rename = "SpeechResult", default)]
    pub speech_result: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    #[serde(rename = "CallSid", default)]
    pub call_sid: String,
    #[serde(rename = "CallStatus", default = "unknown_status")]
    pub call_status: String,
}

fn unknown_status() -> String {
    "unknown".to_string()
}

/// Handle POST /api/twilio/voice: an incoming call.
///
/// Greets the caller and gathers speech, which Twilio posts to
/// `/api/twilio/process-speech`.
pub async fn handle_voice(State(state): State<AppState>) -> Response {
    let greeting = greeting::select_greeting(&state.config.identity.name);
    tracing::info!(greeting = %greeting, "Twilio incoming call");

    let twiml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
    {gather}
    {goodbye}
    <Hangup/>
</Response>"#,
        gather = gather(&state, &greeting),
        goodbye = say(&state.config.twilio, NO_INPUT_GOODBYE),
    );
    twiml_response(twiml)
}

/// Handle POST /api/twilio/process-speech: one gathered utterance.
///
/// The call's `CallSid` keys the chat session, so a call maps to one
/// conversation on the phone channel.
pub async fn handle_process_speech(
    State(state): State<AppState>,
    Form(form): Form<SpeechForm>,
) -> Response {
    let speech = form.speech_result.trim();
    let session_id = if form.call_sid.is_empty() {
        "twilio-unknown-call"
    } else {
        form.call_sid.as_str()
    };
    tracing::info!(call_sid = %session_id, speech = %speech, "Twilio speech");

    if speech.is_empty() {
        let twiml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
    {gather}
    {goodbye}
    <Hangup/>
</Response>"#,
            gather = gather(&state, REPROMPT),
            goodbye = say(&state.config.twilio, NO_INPUT_GOODBYE),
        );
        return twiml_response(twiml);
    }

    let language = state.settings.read().language.clone();
    let reply = match run_turn(
        &state,
        Turn {
            session_id,
            text: speech,
            channel: Channel::Phone,
            language: &language,
            event_type: "phone_interaction",
        },
    )
    .await
    {
        Ok(outcome) => outcome.reply,
        Err(e) => {
            tracing::error!(call_sid = %session_id, "Phone pipeline error: {e}");
            APOLOGY.to_string()
        }
    };

    let twiml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
    {reply}
    {gather}
    {closing}
    <Hangup/>
</Response>"#,
        reply = say(&state.config.twilio, &speakable(&reply)),
        gather = gather(&state, FOLLOW_UP),
        closing = say(&state.config.twilio, CLOSING),
    );
    twiml_response(twiml)
}

/// Handle POST /api/twilio/status-callback: call lifecycle updates.
///
/// A terminal status ends the call's session and closes its conversation
/// unless it was escalated.
pub async fn handle_status_callback(
    State(state): State<AppState>,
    Form(form): Form<StatusForm>,
) -> impl IntoResponse {
    tracing::info!(call_sid = %form.call_sid, status = %form.call_status, "Twilio call status");

    if TERMINAL_STATUSES.contains(&form.call_status.as_str()) {
        if let Some(conversation_id) = state.sessions.end(&form.call_sid) {
            close_conversation(&state, &conversation_id);
        }
    }

    Json(serde_json::json!({ "status": "received" }))
}

fn close_conversation(state: &AppState, conversation_id: &str) {
    let still_active = matches!(
        state.db.get_conversation(conversation_id),
        Ok(Some(c)) if c.status == ConversationStatus::Active
    );
    if !still_active {
        return;
    }
    match state
        .db
        .set_conversation_status(conversation_id, ConversationStatus::Closed)
    {
        Ok(_) => tracing::info!(conversation_id, "Call conversation closed"),
        Err(e) => tracing::error!(conversation_id, "Failed to close conversation: {e}"),
    }
}

fn gather(state: &AppState, prompt: &str) -> String {
    let twilio = &state.config.twilio;
    format!(
        r#"<Gather input="speech" action="{action}" language="{language}" speechTimeout="auto" timeout="5">
        {say}
    </Gather>"#,
        action = escape(&process_speech_url(&state.config.server.external_url)),
        language = escape(&twilio.language),
        say = say(twilio, prompt),
    )
}

fn say(twilio: &TwilioConfig, text: &str) -> String {
    format!(
        r#"<Say voice="{voice}" language="{language}">{text}</Say>"#,
        voice = escape(&twilio.voice),
        language = escape(&twilio.language),
        text = escape(text),
    )
}

/// Absolute callback URL when the public address is known, else relative.
fn process_speech_url(external_url: &str) -> String {
    format!(
        "{}{PROCESS_SPEECH_PATH}",
        external_url.trim().trim_end_matches('/')
    )
}

/// Drop markdown emphasis that would otherwise be read aloud.
fn speakable(reply: &str) -> String {
    reply.replace("**", "").replace(['*', '#', '`'], "")
}

fn twiml_response(twiml: String) -> Response {
    ([("Content-Type", "text/xml")], twiml).into_response()
}
