//! Application configuration. WhatsApp credentials, CDN, assistant, state bounds.

use serde::Deserialize;

/// Seconds a conversation may sit untouched before its state is dropped.
pub const DEFAULT_STATE_TTL_SECS: u64 = 30 * 60;

/// Maximum number of senders with an active flow held in memory.
pub const DEFAULT_STATE_CAPACITY: usize = 10_000;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// WhatsApp Cloud API access token. Read from MEDPET_API_TOKEN.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Business phone number id that sends replies. Read from MEDPET_BUSINESS_PHONE.
    #[serde(default)]
    pub business_phone: Option<String>,

    /// Graph API version. Read from MEDPET_API_VERSION.
    #[serde(default)]
    pub api_version: Option<String>,

    /// Graph API host. Read from MEDPET_BASE_URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Token expected in the webhook subscription handshake. Read from MEDPET_WEBHOOK_VERIFY_TOKEN.
    #[serde(default)]
    pub webhook_verify_token: Option<String>,

    /// HTTP port for the webhook server. Read from MEDPET_PORT (or PORT).
    #[serde(default)]
    pub port: Option<u16>,

    /// Base URL of the sample media files. Read from MEDPET_CDN_BASE_URL.
    #[serde(default)]
    pub cdn_base_url: Option<String>,

    /// Where completed appointments are written. Read from MEDPET_APPOINTMENTS_PATH.
    #[serde(default)]
    pub appointments_path: Option<String>,

    /// Conversation state expiry. Read from MEDPET_STATE_TTL_SECS.
    #[serde(default)]
    pub state_ttl_secs: Option<u64>,

    /// Conversation state capacity. Read from MEDPET_STATE_CAPACITY.
    #[serde(default)]
    pub state_capacity: Option<usize>,

    // ─────────────────────────────────────────────────────────────────────────
    // Assistant Configuration
    // ─────────────────────────────────────────────────────────────────────────
    /// Assistant API key. Read from MEDPET_AI_API_KEY (or OPENAI_API_KEY).
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// Assistant API URL. Defaults to OpenAI. Read from MEDPET_AI_API_URL.
    #[serde(default)]
    pub ai_api_url: Option<String>,

    /// Assistant model name. Defaults to "gpt-4o-mini". Read from MEDPET_AI_MODEL.
    #[serde(default)]
    pub ai_model: Option<String>,
}

impl AppConfig {
    /// Build from the environment. Callers load `.env` first.
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("MEDPET_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c = c.add_source(config::Environment::with_prefix("MEDPET"));
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // PORT is read directly (no prefix) so hosting platforms that inject it just work
        if cfg.port.is_none() {
            if let Ok(s) = std::env::var("PORT") {
                if let Ok(port) = s.parse::<u16>() {
                    cfg.port = Some(port);
                }
            }
        }
        if cfg.ai_api_key.is_none() {
            cfg.ai_api_key = std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty());
        }
        Ok(cfg)
    }

    pub fn api_version_or_default(&self) -> String {
        self.api_version
            .clone()
            .unwrap_or_else(|| "v21.0".to_string())
    }

    pub fn base_url_or_default(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| "https://graph.facebook.com".to_string())
    }

    /// Returns the webhook port. Defaults to 3000.
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(3000)
    }

    pub fn cdn_base_url_or_default(&self) -> String {
        self.cdn_base_url
            .clone()
            .unwrap_or_else(|| "https://cdn.medpet.example".to_string())
    }

    pub fn appointments_path_or_default(&self) -> String {
        self.appointments_path
            .clone()
            .unwrap_or_else(|| "./data/appointments.jsonl".to_string())
    }

    /// Returns state TTL in seconds. Defaults to DEFAULT_STATE_TTL_SECS.
    pub fn state_ttl_secs_or_default(&self) -> u64 {
        self.state_ttl_secs.unwrap_or(DEFAULT_STATE_TTL_SECS)
    }

    /// Returns state capacity. Defaults to DEFAULT_STATE_CAPACITY.
    pub fn state_capacity_or_default(&self) -> usize {
        self.state_capacity.unwrap_or(DEFAULT_STATE_CAPACITY)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Assistant Configuration Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the assistant API URL. Defaults to OpenAI chat completions endpoint.
    pub fn ai_api_url_or_default(&self) -> String {
        self.ai_api_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string())
    }

    /// Returns the assistant model name. Defaults to "gpt-4o-mini".
    pub fn ai_model_or_default(&self) -> String {
        self.ai_model
            .clone()
            .unwrap_or_else(|| "gpt-4o-mini".to_string())
    }

    /// Returns true if the assistant is configured (API key present).
    pub fn is_ai_configured(&self) -> bool {
        self.ai_api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Returns true if outbound WhatsApp credentials are present.
    pub fn is_whatsapp_configured(&self) -> bool {
        self.api_token.as_deref().is_some_and(|t| !t.is_empty())
            && self.business_phone.as_deref().is_some_and(|p| !p.is_empty())
    }
}
