use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::auth::CurrentUser;
use crate::db::ConversationStatus;
use crate::error::ApiError;
use crate::integrations::PushOutcome;

#[derive(Debug, Deserialize)]
pub struct EscalationRequest {
    pub conversation_id: String,
    #[serde(default = "default_reason")]
    pub reason: String,
    /// low, normal, high or critical.
    #[serde(default = "default_priority")]
    pub priority: String,
}

fn default_reason() -> String {
    "User requested human agent".to_string()
}

fn default_priority() -> String {
    "normal".to_string()
}

#[derive(Debug, Serialize)]
pub struct EscalationResponse {
    pub status: &'static str,
    pub conversation_id: String,
    pub escalation_id: String,
    pub message: &'static str,
    pub crm: PushOutcome,
    pub erp: PushOutcome,
}

/// POST /api/escalation
pub async fn escalate(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<EscalationRequest>,
) -> Result<Json<EscalationResponse>, ApiError> {
    let conversation = state
        .db
        .set_conversation_status(&req.conversation_id, ConversationStatus::Escalated)?;

    let escalation_id = uuid::Uuid::new_v4().to_string();
    state.db.record_event(
        "escalation",
        &serde_json::json!({
            "reason": req.reason,
            "priority": req.priority,
            "escalation_id": escalation_id,
        }),
        Some(&conversation.id),
    )?;

    let crm = state
        .integrations
        .push_to_crm(&conversation.id, &req.reason, conversation.sentiment_avg)
        .await;
    let erp = state
        .integrations
        .create_ticket(
            &conversation.id,
            &format!("Escalation: {}", req.reason),
            &req.priority,
        )
        .await;

    tracing::info!(
        conversation_id = %conversation.id,
        escalation_id = %escalation_id,
        user_id = %user.id,
        priority = %req.priority,
        "Conversation escalated"
    );

    Ok(Json(EscalationResponse {
        status: "escalated",
        conversation_id: conversation.id,
        escalation_id,
        message: "Conversation has been escalated to a human agent.",
        crm,
        erp,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::router;
    use crate::api::test_support::{send, state};
    use crate::db::{Channel, ConversationStatus};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn escalation_marks_conversation_and_records_event() {
        let state = state();
        let conv = state.db.create_conversation(None, Channel::Web, "en").unwrap();
        let db = state.db.clone();
        let app = router(state);

        let (status, body) = send(
            &app,
            "POST",
            "/api/escalation",
            Some("demo-token"),
            Some(json!({"conversation_id": conv.id, "priority": "high"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "escalated");
        assert_eq!(body["crm"]["status"], "skipped");
        assert_eq!(body["erp"]["status"], "skipped");
        assert!(!body["escalation_id"].as_str().unwrap().is_empty());

        let stored = db.get_conversation(&conv.id).unwrap().unwrap();
        assert_eq!(stored.status, ConversationStatus::Escalated);
        assert!(stored.ended_at.is_some());
        assert_eq!(db.count_events("escalation").unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_conversation_is_404() {
        let app = router(state());
        let (status, body) = send(
            &app,
            "POST",
            "/api/escalation",
            Some("demo-token"),
            Some(json!({"conversation_id": "missing"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Conversation not found");
    }
}
