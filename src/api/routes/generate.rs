//! GET/POST /api/generate — gated image generation.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::api::response::Failure;
use crate::api::server::AppState;
use crate::gate::{client_identity, CooldownPolicy};
use crate::providers::ImageSize;

/// GET /api/generate — usage hint for people poking at the endpoint.
pub async fn usage_hint() -> Json<Value> {
    Json(json!({
        "ok": true,
        "message": "POST /api/generate with JSON body: { prompt: '...', size?: '1024x1536' }",
    }))
}

/// Handle an image request: identity → cooldown → daily quota → validate →
/// upstream image generation → response shaping.
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let gate = &state.config.gate;
    let identity = client_identity(&headers);
    let cooldown = gate.image_cooldown();

    let mut validated = None;
    if gate.validate_before_gate {
        match extract_prompt(&body) {
            Some(prompt) => validated = Some(prompt),
            None => return Failure::bad_request("Missing prompt.", None).into_response(),
        }
    }

    // 1) Cooldown gate.
    let cooldown_gate = match gate.cooldown_policy {
        CooldownPolicy::OnAdmission => state.image_cooldown.try_admit(&identity, cooldown),
        CooldownPolicy::OnSuccess => state.image_cooldown.check(&identity),
    };
    if !cooldown_gate.admitted {
        info!(ip = %identity, wait = cooldown_gate.wait_secs(), "image rejected: cooldown");
        return Failure::cooldown(cooldown_gate.wait_secs()).into_response();
    }

    // 2) Daily gate.
    let quota = state.image_quota.try_consume(&identity, gate.daily_limit);
    if !quota.admitted {
        info!(ip = %identity, "image rejected: daily limit");
        return Failure::daily_limit(format!(
            "Daily image limit reached ({}/day). Create briefs freely, then generate images tomorrow.",
            gate.daily_limit
        ))
        .into_response();
    }

    // 3) Validate, unless already done above.
    let prompt = match validated {
        Some(prompt) => prompt,
        None => match extract_prompt(&body) {
            Some(prompt) => prompt,
            None => return Failure::bad_request("Missing prompt.", None).into_response(),
        },
    };
    let size = ImageSize::normalize(body["size"].as_str());

    info!(
        ip = %identity,
        size = size.as_str(),
        remaining_today = quota.remaining,
        "image request"
    );

    // 4) Upstream call. Gate state stays committed on failure.
    match state.provider.generate_image(&prompt, size).await {
        Ok(b64) => {
            if gate.cooldown_policy == CooldownPolicy::OnSuccess {
                state.image_cooldown.start(&identity, cooldown);
            }
            (
                StatusCode::OK,
                Json(json!({
                    "ok": true,
                    "b64": b64,
                    "remainingToday": quota.remaining,
                    "cooldownSeconds": gate.image_cooldown_secs,
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(ip = %identity, error = %e, "image upstream call failed");
            Failure::server_error(e.to_string()).into_response()
        }
    }
}

/// The prompt must be a non-empty string.
fn extract_prompt(body: &Value) -> Option<String> {
    body["prompt"]
        .as_str()
        .filter(|p| !p.is_empty())
        .map(String::from)
}
