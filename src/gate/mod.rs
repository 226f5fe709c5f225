//! Request gating: per-client daily quota and cooldown throttle.
//!
//! Every brief/image request passes two gates before the upstream generative
//! call is made:
//!
//! 1. [`CooldownThrottle`] — enforces a minimum time gap between admitted
//!    requests from the same client.
//! 2. [`DailyQuota`] — caps admitted requests per client per UTC calendar day.
//!
//! Both gates key their state on a client identity derived from the
//! `x-forwarded-for` header (see [`identity::client_identity`]). State lives
//! in process memory only and is lost on restart — this is soft spend
//! control, not billing enforcement.

pub mod cooldown;
pub mod identity;
pub mod quota;

pub use cooldown::{CooldownDecision, CooldownThrottle};
pub use identity::client_identity;
pub use quota::{DailyQuota, QuotaDecision};

use serde::{Deserialize, Serialize};

/// Concurrency discipline for the shared gate maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GateMode {
    /// Check-and-commit under a single mutex guard. Concurrent requests from
    /// one identity can never over-admit past the configured limit (default).
    #[default]
    Strict,
    /// Read under one guard, commit under a second. Two simultaneous requests
    /// can both observe "admitted" before either commits, allowing brief
    /// over-admission. This reproduces the unsynchronized read-modify-write
    /// of the original limiter and is acceptable for soft IP throttling.
    Relaxed,
}

/// When the cooldown window is armed relative to the upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CooldownPolicy {
    /// Arm the cooldown the moment the request is admitted, before the
    /// upstream call runs. Bounds per-identity upstream concurrency to one
    /// in-flight call (default).
    #[default]
    OnAdmission,
    /// Arm the cooldown only after the upstream call succeeds, so a failed
    /// call does not cost the client a wait window.
    OnSuccess,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_mode_default_is_strict() {
        assert_eq!(GateMode::default(), GateMode::Strict);
    }

    #[test]
    fn test_gate_mode_serde_roundtrip() {
        let encoded = serde_json::to_string(&GateMode::Relaxed).unwrap();
        assert_eq!(encoded, "\"relaxed\"");
        let decoded: GateMode = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, GateMode::Relaxed);
    }

    #[test]
    fn test_cooldown_policy_default_is_on_admission() {
        assert_eq!(CooldownPolicy::default(), CooldownPolicy::OnAdmission);
    }

    #[test]
    fn test_cooldown_policy_serde_kebab_case() {
        let encoded = serde_json::to_string(&CooldownPolicy::OnSuccess).unwrap();
        assert_eq!(encoded, "\"on-success\"");
        let decoded: CooldownPolicy = serde_json::from_str("\"on-admission\"").unwrap();
        assert_eq!(decoded, CooldownPolicy::OnAdmission);
    }
}
