use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::auth::AdminUser;
use crate::config::Config;

/// Settings adjustable at runtime without a restart. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminSettings {
    pub language: String,
    pub voice_id: String,
    pub tts_provider: String,
    /// Sentiment score at or below which escalation is suggested.
    pub escalation_threshold: f64,
}

impl AdminSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            language: "en".to_string(),
            voice_id: config.elevenlabs.voice_id.clone(),
            tts_provider: "elevenlabs".to_string(),
            escalation_threshold: -0.5,
        }
    }

    /// Apply only the fields present in `update`.
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(language) = update.language {
            self.language = language;
        }
        if let Some(voice_id) = update.voice_id {
            self.voice_id = voice_id;
        }
        if let Some(provider) = update.tts_provider {
            self.tts_provider = provider;
        }
        if let Some(threshold) = update.escalation_threshold {
            self.escalation_threshold = threshold;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    pub language: Option<String>,
    pub voice_id: Option<String>,
    pub tts_provider: Option<String>,
    pub escalation_threshold: Option<f64>,
}

/// GET /api/admin/settings
pub async fn get_settings(State(state): State<AppState>, _admin: AdminUser) -> impl IntoResponse {
    Json(state.settings.read().clone())
}

/// PUT /api/admin/settings
pub async fn update_settings(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(update): Json<SettingsUpdate>,
) -> impl IntoResponse {
    let settings = {
        let mut settings = state.settings.write();
        settings.apply(update);
        settings.clone()
    };
    tracing::info!(admin = %admin.username, ?settings, "Settings updated");

    Json(serde_json::json!({
        "status": "updated",
        "settings": settings,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::api::test_support::{register, send, state};
    use axum::http::StatusCode;

    #[test]
    fn apply_only_touches_present_fields() {
        let mut settings = AdminSettings::from_config(&Config::default());
        settings.apply(SettingsUpdate {
            language: Some("hi".into()),
            ..Default::default()
        });
        assert_eq!(settings.language, "hi");
        assert_eq!(settings.voice_id, "21m00Tcm4TlvDq8ikWAM");
        assert_eq!(settings.escalation_threshold, -0.5);
    }

    #[tokio::test]
    async fn settings_require_admin() {
        let app = router(state());
        let admin = register(&app, "admin").await;
        let member = register(&app, "member").await;

        let (status, _) = send(&app, "GET", "/api/admin/settings", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(&app, "GET", "/api/admin/settings", Some(&member), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, "GET", "/api/admin/settings", Some("demo-token"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            "PUT",
            "/api/admin/settings",
            Some(&admin),
            Some(serde_json::json!({ "escalation_threshold": -0.3 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "updated");
        assert_eq!(body["settings"]["escalation_threshold"], -0.3);
        assert_eq!(body["settings"]["language"], "en");

        let (_, body) = send(&app, "GET", "/api/admin/settings", Some(&admin), None).await;
        assert_eq!(body["escalation_threshold"], -0.3);
    }
}
