use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;

use super::AppState;
use crate::auth::CurrentUser;
use crate::db::{ConversationDetail, ConversationFilter, ConversationSummary};
use crate::error::ApiError;

/// GET /api/conversations?skip=&limit=&status=
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filter): Query<ConversationFilter>,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    Ok(Json(state.db.list_conversations(&filter)?))
}

/// GET /api/conversations/{id}
pub async fn detail(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ConversationDetail>, ApiError> {
    state
        .db
        .conversation_detail(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Conversation not found"))
}

/// DELETE /api/conversations/{id}
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_conversation(&id)?;
    tracing::info!(conversation_id = %id, user_id = %user.id, "Conversation deleted");
    Ok(Json(serde_json::json!({
        "status": "deleted",
        "conversation_id": id,
    })))
}

#[cfg(test)]
mod tests {
    use crate::api::router;
    use crate::api::test_support::{send, state};
    use crate::db::{Channel, ConversationStatus, NewMessage};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn list_detail_and_delete() {
        let state = state();
        let first = state.db.create_conversation(None, Channel::Web, "en").unwrap();
        let second = state.db.create_conversation(None, Channel::Phone, "hi").unwrap();
        state
            .db
            .add_message(&second.id, &NewMessage::plain("user", "hello"))
            .unwrap();
        state
            .db
            .set_conversation_status(&first.id, ConversationStatus::Escalated)
            .unwrap();
        let app = router(state);
        let token = Some("demo-token");

        let (status, list) = send(&app, "GET", "/api/conversations", token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 2);

        let (_, escalated) =
            send(&app, "GET", "/api/conversations?status=escalated", token, None).await;
        let escalated = escalated.as_array().unwrap();
        assert_eq!(escalated.len(), 1);
        assert_eq!(escalated[0]["id"], first.id.as_str());

        let uri = format!("/api/conversations/{}", second.id);
        let (status, detail) = send(&app, "GET", &uri, token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["channel"], "phone");
        assert_eq!(detail["messages"][0]["content"], "hello");

        let (status, body) = send(&app, "DELETE", &uri, token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "deleted");

        let (status, body) = send(&app, "GET", &uri, token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Conversation not found");
        let (status, _) = send(&app, "DELETE", &uri, token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listing_requires_auth() {
        let app = router(state());
        let (status, _) = send(&app, "GET", "/api/conversations", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
