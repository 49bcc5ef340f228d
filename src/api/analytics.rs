use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::AppState;
use crate::auth::CurrentUser;
use crate::db::AnalyticsSummary;
use crate::error::ApiError;

const MAX_TIMELINE_DAYS: u32 = 365;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimelineQuery {
    pub days: u32,
}

impl Default for TimelineQuery {
    fn default() -> Self {
        Self { days: 7 }
    }
}

/// GET /api/analytics/summary
pub async fn summary(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<AnalyticsSummary>, ApiError> {
    Ok(Json(state.db.analytics_summary(Utc::now())?))
}

/// GET /api/analytics/timeline?days=
pub async fn timeline(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<TimelineQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let days = query.days.min(MAX_TIMELINE_DAYS);
    let points = state.db.conversation_timeline(days, Utc::now())?;
    Ok(Json(serde_json::json!({ "timeline": points })))
}

#[cfg(test)]
mod tests {
    use crate::api::router;
    use crate::api::test_support::{send, state};
    use crate::db::Channel;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn summary_and_timeline() {
        let state = state();
        state.db.create_conversation(None, Channel::Web, "en").unwrap();
        let app = router(state);

        let (status, summary) =
            send(&app, "GET", "/api/analytics/summary", Some("demo-token"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["total_conversations"], 1);
        assert_eq!(summary["active_conversations"], 1);
        assert!(summary["top_emotions"].is_object());

        let (status, body) =
            send(&app, "GET", "/api/analytics/timeline", Some("demo-token"), None).await;
        assert_eq!(status, StatusCode::OK);
        let timeline = body["timeline"].as_array().unwrap();
        assert_eq!(timeline.len(), 7);
        assert_eq!(timeline[6]["conversations"], 1);

        let (_, body) = send(
            &app,
            "GET",
            "/api/analytics/timeline?days=3",
            Some("demo-token"),
            None,
        )
        .await;
        assert_eq!(body["timeline"].as_array().unwrap().len(), 3);
    }
}
