//! Service configuration.
//!
//! Defaults are compiled in; every knob can be overridden through the
//! environment (loaded from `.env` by the binary before this runs). Invalid
//! override values are logged and ignored rather than failing startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::gate::{CooldownPolicy, GateMode};
use crate::providers::openai::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, OPENAI_API_BASE};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub gate: GateConfig,
    pub provider: ProviderConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (default: 127.0.0.1).
    pub bind: String,
    /// Listener port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Request-gating configuration, shared by the brief and image routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Max admitted operations per identity per UTC day.
    pub daily_limit: u32,
    /// Minimum gap between admitted brief requests per identity.
    pub brief_cooldown_secs: u64,
    /// Minimum gap between admitted image requests per identity.
    pub image_cooldown_secs: u64,
    /// When the cooldown window is armed (see [`CooldownPolicy`]).
    pub cooldown_policy: CooldownPolicy,
    /// Concurrency discipline for the gate maps (see [`GateMode`]).
    pub mode: GateMode,
    /// Run payload validation before the gates, so malformed requests cost
    /// the client nothing. Off by default: the gates run first and an
    /// invalid request still consumes one unit of daily quota.
    pub validate_before_gate: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            daily_limit: 10,
            brief_cooldown_secs: 30,
            image_cooldown_secs: 60,
            cooldown_policy: CooldownPolicy::OnAdmission,
            mode: GateMode::Strict,
            validate_before_gate: false,
        }
    }
}

impl GateConfig {
    pub fn brief_cooldown(&self) -> Duration {
        Duration::from_secs(self.brief_cooldown_secs)
    }

    pub fn image_cooldown(&self) -> Duration {
        Duration::from_secs(self.image_cooldown_secs)
    }
}

/// Upstream generative provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key. Falls back to `OPENAI_API_KEY` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// OpenAI-compatible API base URL.
    pub base_url: String,
    /// Chat-completion model for brief generation.
    pub text_model: String,
    /// Image-generation model.
    pub image_model: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: OPENAI_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

impl Config {
    /// Build a config from defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(bind) = std::env::var("BRIEFSMITH_BIND") {
            config.server.bind = bind;
        }
        parse_env("BRIEFSMITH_PORT", &mut config.server.port);
        parse_env("BRIEFSMITH_DAILY_LIMIT", &mut config.gate.daily_limit);
        parse_env(
            "BRIEFSMITH_BRIEF_COOLDOWN_SECS",
            &mut config.gate.brief_cooldown_secs,
        );
        parse_env(
            "BRIEFSMITH_IMAGE_COOLDOWN_SECS",
            &mut config.gate.image_cooldown_secs,
        );
        parse_env(
            "BRIEFSMITH_VALIDATE_BEFORE_GATE",
            &mut config.gate.validate_before_gate,
        );

        if let Ok(raw) = std::env::var("BRIEFSMITH_COOLDOWN_POLICY") {
            match raw.as_str() {
                "on-admission" => config.gate.cooldown_policy = CooldownPolicy::OnAdmission,
                "on-success" => config.gate.cooldown_policy = CooldownPolicy::OnSuccess,
                other => warn!("ignoring invalid BRIEFSMITH_COOLDOWN_POLICY: {other:?}"),
            }
        }
        if let Ok(raw) = std::env::var("BRIEFSMITH_GATE_MODE") {
            match raw.as_str() {
                "strict" => config.gate.mode = GateMode::Strict,
                "relaxed" => config.gate.mode = GateMode::Relaxed,
                other => warn!("ignoring invalid BRIEFSMITH_GATE_MODE: {other:?}"),
            }
        }

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                config.provider.api_key = Some(key);
            }
        }
        if let Ok(base) = std::env::var("OPENAI_BASE_URL") {
            config.provider.base_url = base;
        }
        if let Ok(model) = std::env::var("BRIEFSMITH_TEXT_MODEL") {
            config.provider.text_model = model;
        }
        if let Ok(model) = std::env::var("BRIEFSMITH_IMAGE_MODEL") {
            config.provider.image_model = model;
        }

        config
    }
}

/// Overwrite `target` with a parsed env value; warn and keep the default on
/// parse failure.
fn parse_env<T: std::str::FromStr>(name: &str, target: &mut T) {
    if let Ok(raw) = std::env::var(name) {
        match raw.parse() {
            Ok(value) => *target = value,
            Err(_) => warn!("ignoring invalid {name}: {raw:?}"),
        }
    }
}
