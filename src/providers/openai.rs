//! OpenAI-compatible REST provider for text and image generation.
//!
//! Auth priority: config key → OPENAI_API_KEY. A missing key is surfaced as
//! a per-request configuration fault rather than a startup failure, so the
//! service can boot (and serve its health endpoint) before credentials are
//! provisioned.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{BriefsmithError, Result};

use super::{GenerativeProvider, ImageSize};

/// OpenAI-compatible REST API base.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Chat model used when none is configured.
pub const DEFAULT_TEXT_MODEL: &str = "gpt-4.1-mini";

/// Image model used when none is configured.
pub const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1";

/// Provider speaking the OpenAI chat-completions and images APIs.
pub struct OpenAiProvider {
    api_key: Option<String>,
    base_url: String,
    text_model: String,
    image_model: String,
    client: Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

impl OpenAiProvider {
    /// Build from config, falling back to the `OPENAI_API_KEY` environment
    /// variable for the key. Never fails: a key-less provider errors per
    /// request instead.
    pub fn from_config(config: &ProviderConfig) -> Self {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()));

        Self {
            api_key,
            base_url: config.base_url.clone(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            client: Self::build_client(),
        }
    }

    /// Manual construction for tests.
    pub fn new_with_key(api_key: &str, base_url: &str) -> Self {
        Self {
            api_key: Some(api_key.to_string()),
            base_url: base_url.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            client: Self::build_client(),
        }
    }

    /// Whether credentials were resolved at construction time.
    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn build_client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client")
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| BriefsmithError::Config("OPENAI_API_KEY is not set".to_string()))
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn images_url(&self) -> String {
        format!("{}/images/generations", self.base_url)
    }

    /// Extract the assistant text from a chat-completions response.
    pub fn extract_text(response: &Value) -> Option<String> {
        response["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
    }

    /// Extract the base64 image payload from an images response.
    pub fn extract_image_b64(response: &Value) -> Option<String> {
        response["data"][0]["b64_json"]
            .as_str()
            .filter(|b64| !b64.is_empty())
            .map(String::from)
    }

    /// POST a JSON body and parse the JSON reply, mapping transport errors
    /// and non-success statuses to [`BriefsmithError::Upstream`].
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        let key = self.api_key()?;

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {key}"))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| BriefsmithError::Upstream(format!("OpenAI request failed: {e}")))?;

        if response.status().is_success() {
            return response.json().await.map_err(|e| {
                BriefsmithError::MalformedResponse(format!(
                    "failed to parse OpenAI response: {e}"
                ))
            });
        }

        let status = response.status().as_u16();
        let error_text = response.text().await.unwrap_or_default();

        // Pull the human-readable message out of the error body when present.
        let message = serde_json::from_str::<Value>(&error_text)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or(error_text);

        Err(BriefsmithError::Upstream(format!(
            "OpenAI API error ({status}): {message}"
        )))
    }
}

#[async_trait]
impl GenerativeProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate_text(&self, system: &str, user: &str) -> Result<String> {
        debug!(model = %self.text_model, "chat completion request");

        let body = json!({
            "model": self.text_model,
            "temperature": 0.7,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let response = self.post_json(&self.chat_url(), &body).await?;
        Self::extract_text(&response).ok_or_else(|| {
            BriefsmithError::MalformedResponse("chat completion had no content".to_string())
        })
    }

    async fn generate_image(&self, prompt: &str, size: ImageSize) -> Result<String> {
        debug!(model = %self.image_model, size = size.as_str(), "image generation request");

        let body = json!({
            "model": self.image_model,
            "prompt": prompt,
            "size": size.as_str(),
        });

        let response = self.post_json(&self.images_url(), &body).await?;
        Self::extract_image_b64(&response)
            .ok_or_else(|| BriefsmithError::MalformedResponse("No image returned.".to_string()))
    }
}

impl Default for OpenAiProvider {
    fn default() -> Self {
        Self::from_config(&ProviderConfig::default())
    }
}
