use serde::Serialize;

use crate::config::IntegrationsConfig;

/// Result of pushing an escalation to an external system.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PushOutcome {
    /// No endpoint configured.
    Skipped,
    Sent,
    Failed { error: String },
}

#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
}

struct Endpoint {
    base_url: String,
    api_key: String,
}

impl Endpoint {
    fn from_parts(url: &str, api_key: &str) -> Option<Self> {
        let base_url = url.trim().trim_end_matches('/');
        (!base_url.is_empty()).then(|| Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

/// Optional CRM and ERP webhooks fired on escalation.
pub struct Integrations {
    http: reqwest::Client,
    crm: Option<Endpoint>,
    erp: Option<Endpoint>,
}

impl Integrations {
    pub fn new(config: &IntegrationsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            crm: Endpoint::from_parts(&config.crm_api_url, &config.crm_api_key),
            erp: Endpoint::from_parts(&config.erp_api_url, &config.erp_api_key),
        }
    }

    /// Send the escalated conversation to the CRM.
    pub async fn push_to_crm(&self, conversation_id: &str, summary: &str, sentiment: f64) -> PushOutcome {
        let Some(crm) = &self.crm else {
            tracing::info!(conversation_id, "CRM integration not configured, skipping");
            return PushOutcome::Skipped;
        };

        let body = serde_json::json!({
            "conversation_id": conversation_id,
            "summary": summary,
            "sentiment": sentiment,
        });
        self.post(crm, "conversations", &body, "CRM", conversation_id)
            .await
    }

    /// Open a support ticket in the ERP.
    pub async fn create_ticket(&self, conversation_id: &str, subject: &str, priority: &str) -> PushOutcome {
        let Some(erp) = &self.erp else {
            tracing::info!(conversation_id, "ERP integration not configured, skipping");
            return PushOutcome::Skipped;
        };

        let body = serde_json::json!({
            "conversation_id": conversation_id,
            "subject": subject,
            "priority": priority,
        });
        self.post(erp, "tickets", &body, "ERP", conversation_id)
            .await
    }

    async fn post(
        &self,
        endpoint: &Endpoint,
        path: &str,
        body: &serde_json::Value,
        system: &str,
        conversation_id: &str,
    ) -> PushOutcome {
        match self.send(endpoint, path, body).await {
            Ok(()) => {
                tracing::info!(conversation_id, system, "Escalation pushed");
                PushOutcome::Sent
            }
            Err(e) => {
                tracing::warn!(conversation_id, system, "Escalation push failed: {e}");
                PushOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn send(
        &self,
        endpoint: &Endpoint,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<(), IntegrationError> {
        let mut request = self
            .http
            .post(format!("{}/{path}", endpoint.base_url))
            .json(body);
        if !endpoint.api_key.is_empty() {
            request = request.bearer_auth(&endpoint.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| IntegrationError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(IntegrationError::Api { status, body });
        }
        Ok(())
    }
}
