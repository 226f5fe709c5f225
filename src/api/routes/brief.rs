//! POST /api/brief — gated design-brief generation.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::api::response::Failure;
use crate::api::server::AppState;
use crate::brief::prompt::{finalize_brief, parse_model_json, user_payload, BRIEF_SYSTEM_PROMPT};
use crate::brief::season::seasonal_context;
use crate::brief::NormalizedBrief;
use crate::error::BriefsmithError;
use crate::gate::{client_identity, CooldownPolicy};

/// Handle a brief request: identity → cooldown → daily quota → validate →
/// upstream chat completion → response shaping.
pub async fn create_brief(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let gate = &state.config.gate;
    let identity = client_identity(&headers);
    let cooldown = gate.brief_cooldown();

    // Optional validate-before-gate: malformed payloads cost the client
    // nothing when enabled.
    let mut validated = None;
    if gate.validate_before_gate {
        match NormalizedBrief::from_value(&body) {
            Ok(brief) => validated = Some(brief),
            Err(e) => return validation_failure(e, None),
        }
    }

    // 1) Cooldown gate.
    let cooldown_gate = match gate.cooldown_policy {
        CooldownPolicy::OnAdmission => state.brief_cooldown.try_admit(&identity, cooldown),
        CooldownPolicy::OnSuccess => state.brief_cooldown.check(&identity),
    };
    if !cooldown_gate.admitted {
        info!(ip = %identity, wait = cooldown_gate.wait_secs(), "brief rejected: cooldown");
        return Failure::cooldown(cooldown_gate.wait_secs()).into_response();
    }

    // 2) Daily gate.
    let quota = state.brief_quota.try_consume(&identity, gate.daily_limit);
    if !quota.admitted {
        info!(ip = %identity, "brief rejected: daily limit");
        return Failure::daily_limit(format!(
            "Daily brief limit reached ({}/day). Try again tomorrow.",
            gate.daily_limit
        ))
        .into_response();
    }

    // 3) Validate and normalize, unless already done above. By default an
    // invalid request has consumed one unit of quota by this point.
    let brief = match validated {
        Some(brief) => brief,
        None => match NormalizedBrief::from_value(&body) {
            Ok(brief) => brief,
            Err(e) => return validation_failure(e, Some(quota.remaining)),
        },
    };

    let ctx = seasonal_context(Utc::now());
    info!(
        ip = %identity,
        mode = ?brief.mode,
        design_type = ?brief.design_type,
        size = %format!("{}x{}", brief.render_size.width, brief.render_size.height),
        remaining_today = quota.remaining,
        "brief request"
    );

    // 4) Upstream call. Quota and cooldown stay committed whatever happens
    // below: an admitted-but-failed call is still assumed to have incurred
    // provider-side cost.
    let payload = user_payload(&brief, &ctx).to_string();
    let result = state
        .provider
        .generate_text(BRIEF_SYSTEM_PROMPT, &payload)
        .await
        .and_then(|text| parse_model_json(&text));

    match result {
        Ok(mut value) => {
            finalize_brief(&mut value);
            if gate.cooldown_policy == CooldownPolicy::OnSuccess {
                state.brief_cooldown.start(&identity, cooldown);
            }
            (
                StatusCode::OK,
                Json(json!({
                    "ok": true,
                    "remainingToday": quota.remaining,
                    "brief": value,
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(ip = %identity, error = %e, "brief upstream call failed");
            Failure::server_error(e.to_string()).into_response()
        }
    }
}

/// Map a normalization error to the wire: validation failures become 400s,
/// anything else is a server fault.
fn validation_failure(err: BriefsmithError, remaining_today: Option<u32>) -> Response {
    match err {
        BriefsmithError::Validation(msg) => {
            Failure::bad_request(msg, remaining_today).into_response()
        }
        other => Failure::server_error(other.to_string()).into_response(),
    }
}
