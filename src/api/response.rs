//! Wire shapes for gate rejections and other failure responses.
//!
//! Every failure is a structured JSON body with an explanatory `error`
//! string, a machine-readable `code`, and numeric wait/remaining hints where
//! applicable, so a client can render a countdown or disable a retry button.
//! Success bodies are operation-specific and built in the route handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Machine-readable failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    Cooldown,
    DailyLimit,
    BadRequest,
    ServerError,
}

impl ReasonCode {
    /// HTTP status for the code: rate limits → 429, bad payloads → 400,
    /// upstream/config faults → 500.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Cooldown | Self::DailyLimit => StatusCode::TOO_MANY_REQUESTS,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failure response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    /// Always `false`; present so clients can branch on one field.
    pub ok: bool,
    pub error: String,
    pub code: ReasonCode,
    /// Seconds until the next admission, for `COOLDOWN` rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_seconds: Option<u64>,
    /// Admissions left today, where the handler knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_today: Option<u32>,
}

impl Failure {
    pub fn cooldown(wait_secs: u64) -> Self {
        Self {
            ok: false,
            error: format!("Please wait {wait_secs}s before generating again (cooldown)."),
            code: ReasonCode::Cooldown,
            cooldown_seconds: Some(wait_secs),
            remaining_today: None,
        }
    }

    pub fn daily_limit(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            code: ReasonCode::DailyLimit,
            cooldown_seconds: None,
            remaining_today: Some(0),
        }
    }

    pub fn bad_request(error: impl Into<String>, remaining_today: Option<u32>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            code: ReasonCode::BadRequest,
            cooldown_seconds: None,
            remaining_today,
        }
    }

    pub fn server_error(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            code: ReasonCode::ServerError,
            cooldown_seconds: None,
            remaining_today: None,
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_code_wire_format() {
        assert_eq!(
            serde_json::to_string(&ReasonCode::DailyLimit).unwrap(),
            "\"DAILY_LIMIT\""
        );
        assert_eq!(
            serde_json::to_string(&ReasonCode::Cooldown).unwrap(),
            "\"COOLDOWN\""
        );
        assert_eq!(
            serde_json::to_string(&ReasonCode::BadRequest).unwrap(),
            "\"BAD_REQUEST\""
        );
        assert_eq!(
            serde_json::to_string(&ReasonCode::ServerError).unwrap(),
            "\"SERVER_ERROR\""
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ReasonCode::Cooldown.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ReasonCode::DailyLimit.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ReasonCode::BadRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ReasonCode::ServerError.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_cooldown_body_shape() {
        let body = serde_json::to_value(Failure::cooldown(7)).unwrap();
        assert_eq!(body["ok"], false);
        assert_eq!(body["code"], "COOLDOWN");
        assert_eq!(body["cooldownSeconds"], 7);
        assert!(body["error"].as_str().unwrap().contains("wait 7s"));
        assert!(body.get("remainingToday").is_none());
    }

    #[test]
    fn test_daily_limit_body_shape() {
        let body = serde_json::to_value(Failure::daily_limit("Daily brief limit reached.")).unwrap();
        assert_eq!(body["code"], "DAILY_LIMIT");
        assert_eq!(body["remainingToday"], 0);
        assert!(body.get("cooldownSeconds").is_none());
    }

    #[test]
    fn test_bad_request_optionally_carries_remaining() {
        let with = serde_json::to_value(Failure::bad_request("Missing format.", Some(9))).unwrap();
        assert_eq!(with["remainingToday"], 9);
        let without = serde_json::to_value(Failure::bad_request("Missing prompt.", None)).unwrap();
        assert!(without.get("remainingToday").is_none());
    }
}
