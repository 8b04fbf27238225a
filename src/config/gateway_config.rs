//! config/gateway_config.rs
//! Credenciales y parámetros del gateway SMS (Africa's Talking).

use std::env;
use std::time::Duration;

/// Valores de ejemplo que vienen en el .env de plantilla; equivalen a "sin configurar".
const PLACEHOLDER_API_KEYS: [&str; 2] = ["your-api-key-here", "your_api_key"];
const SANDBOX_USERNAMES: [&str; 2] = ["sandbox", "your_username"];

pub const SANDBOX_BASE_URL: &str = "https://api.sandbox.africastalking.com";
pub const LIVE_BASE_URL: &str = "https://api.africastalking.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Usuario de la cuenta (Africa's Talking lo llama "username")
    pub account_id: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(account_id: impl Into<String>, api_key: Option<String>) -> Self {
        let account_id = account_id.into();
        let base_url = default_base_url(&account_id).to_string();
        GatewayConfig {
            account_id,
            api_key,
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Config sin credenciales: todos los envíos se simulan.
    pub fn unconfigured() -> Self {
        GatewayConfig::new("sandbox", None)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// AFRICAS_TALKING_USERNAME, AFRICAS_TALKING_API_KEY,
    /// AFRICAS_TALKING_BASE_URL y AFRICAS_TALKING_TIMEOUT_SECS
    pub fn from_env() -> Self {
        let account_id =
            env::var("AFRICAS_TALKING_USERNAME").unwrap_or_else(|_| "sandbox".to_string());
        let api_key = env::var("AFRICAS_TALKING_API_KEY").ok();

        let mut config = GatewayConfig::new(account_id, api_key);

        if let Ok(url) = env::var("AFRICAS_TALKING_BASE_URL") {
            if !url.trim().is_empty() {
                config = config.with_base_url(url.trim());
            }
        }

        if let Ok(raw) = env::var("AFRICAS_TALKING_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => log::warn!(
                    "AFRICAS_TALKING_TIMEOUT_SECS inválido ('{}'), usando {}s",
                    raw,
                    DEFAULT_TIMEOUT.as_secs()
                ),
            }
        }

        config
    }

    /// La API key existe y no es un valor de plantilla.
    pub fn is_configured(&self) -> bool {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) => !key.is_empty() && !PLACEHOLDER_API_KEYS.contains(&key),
            None => false,
        }
    }

    pub fn is_sandbox(&self) -> bool {
        SANDBOX_USERNAMES.contains(&self.account_id.as_str())
    }

    pub fn messaging_url(&self) -> String {
        format!("{}/version1/messaging", self.base_url)
    }
}

fn default_base_url(account_id: &str) -> &'static str {
    if SANDBOX_USERNAMES.contains(&account_id) {
        SANDBOX_BASE_URL
    } else {
        LIVE_BASE_URL
    }
}
