use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub openai: OpenAiConfig,
    pub elevenlabs: ElevenLabsConfig,
    pub twilio: TwilioConfig,
    pub identity: IdentityConfig,
    pub knowledge: KnowledgeConfig,
    pub sessions: SessionsConfig,
    pub rate_limit: RateLimitConfig,
    pub integrations: IntegrationsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub external_url: String,
    /// Allowed CORS origins. `*` allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            external_url: String::new(),
            cors_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub secret_key: String,
    pub token_expire_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: "change-me-in-production".to_string(),
            token_expire_minutes: 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("voicebot.db"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub whisper_model: String,
    pub embedding_model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-4o".to_string(),
            whisper_model: "whisper-1".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub voice_id: String,
    pub model: String,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(),
            model: "eleven_multilingual_v2".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub phone_number: String,
    /// Polly voice used for `<Say>`.
    pub voice: String,
    pub language: String,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            phone_number: String::new(),
            voice: "Polly.Aditi".to_string(),
            language: "en-IN".to_string(),
        }
    }
}

impl TwilioConfig {
    /// Whether account credentials are present for the webhook number.
    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IdentityConfig {
    /// Application name reported by `/api/health`.
    pub app_name: String,
    /// Name the assistant uses for itself on calls.
    pub name: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            app_name: "AI Voice Chatbot".to_string(),
            name: "VoiceBot".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub store_path: PathBuf,
    pub top_k: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("data/vector_store"),
            top_k: 3,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionsConfig {
    pub ttl_secs: u64,
    pub max_sessions: usize,
    pub max_history: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 1800,
            max_sessions: 10_000,
            max_history: 40,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RateLimitConfig {
    pub per_minute: u32,
    /// Key clients by `X-Forwarded-For`/`X-Real-IP`. Only safe behind a proxy
    /// that overwrites those headers.
    pub trust_proxy: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_minute: 60,
            trust_proxy: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct IntegrationsConfig {
    pub crm_api_url: String,
    pub crm_api_key: String,
    pub erp_api_url: String,
    pub erp_api_key: String,
}

impl Config {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file from same directory as config.toml
        let env_path = config_dir().join(".env");
        match dotenvy::from_path(&env_path) {
            Ok(()) => tracing::info!("Loaded .env from {}", env_path.display()),
            Err(dotenvy::Error::Io(_)) => {
                tracing::debug!(
                    "No .env file at {}, using environment only",
                    env_path.display()
                );
            }
            Err(e) => tracing::warn!("Failed to parse .env: {e}"),
        }

        let path = config_path();
        let mut config = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!("Loading config from {}", path.display());
                Self::from_toml(&contents)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "No config at {}, starting with defaults (demo mode)",
                    path.display()
                );
                Config::default()
            }
            Err(e) => {
                return Err(format!("Failed to read config at {}: {}", path.display(), e).into())
            }
        };

        config.apply_env();
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Allow env var overrides for secrets
    fn apply_env(&mut self) {
        let overrides: [(&str, &mut String); 8] = [
            ("OPENAI_API_KEY", &mut self.openai.api_key),
            ("ELEVENLABS_API_KEY", &mut self.elevenlabs.api_key),
            ("TWILIO_ACCOUNT_SID", &mut self.twilio.account_sid),
            ("TWILIO_AUTH_TOKEN", &mut self.twilio.auth_token),
            ("VOICEBOT_SECRET_KEY", &mut self.auth.secret_key),
            ("CRM_API_KEY", &mut self.integrations.crm_api_key),
            ("ERP_API_KEY", &mut self.integrations.erp_api_key),
            ("SERVER_EXTERNAL_URL", &mut self.server.external_url),
        ];
        for (var, slot) in overrides {
            if let Ok(v) = std::env::var(var) {
                *slot = v;
            }
        }

        if let Ok(v) = std::env::var("VOICEBOT_DATABASE") {
            self.database.path = PathBuf::from(v);
        }
    }
}

fn config_dir() -> PathBuf {
    if let Ok(p) = std::env::var("VOICEBOT_CONFIG") {
        // If pointing to a file, use its parent directory
        let path = PathBuf::from(p);
        return path.parent().map(|p| p.to_path_buf()).unwrap_or(path);
    }

    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".voicebot")
}

fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("VOICEBOT_CONFIG") {
        return PathBuf::from(p);
    }

    config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.elevenlabs.voice_id, "21m00Tcm4TlvDq8ikWAM");
        assert_eq!(config.rate_limit.per_minute, 60);
        assert!(!config.rate_limit.trust_proxy);
        assert_eq!(config.server.cors_origins, vec!["*"]);
        assert!(!config.twilio.is_configured());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 9000

            [sessions]
            max_history = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.sessions.max_history, 10);
        assert_eq!(config.sessions.ttl_secs, 1800);
        assert_eq!(config.auth.token_expire_minutes, 60);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(Config::from_toml("[server]\nport = \"eighty\"").is_err());
    }
}
