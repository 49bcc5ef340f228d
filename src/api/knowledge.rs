use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::knowledge::Document;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub title: String,
    pub content: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "general".to_string()
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
    pub documents_indexed: usize,
    pub message: String,
}

/// POST /api/knowledge/ingest
pub async fn ingest(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(req): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    if req.title.trim().is_empty() || req.content.trim().is_empty() {
        return Err(ApiError::bad_request("Title and content are required"));
    }

    let title = req.title.clone();
    let total = state
        .knowledge
        .ingest(Document {
            title: req.title,
            content: req.content,
            category: req.category,
        })
        .await?;
    tracing::info!(admin = %admin.username, title = %title, total, "Knowledge ingest");

    Ok(Json(IngestResponse {
        status: "ok",
        documents_indexed: total,
        message: format!("Document '{title}' ingested successfully"),
    }))
}
