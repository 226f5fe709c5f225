//! Per-client cooldown throttle.
//!
//! Enforces a minimum time gap between two admitted operations for the same
//! identity, independent of the daily count. Each identity stores at most a
//! single instant after which the next operation is allowed; no record means
//! the identity is always admitted.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::GateMode;

/// Outcome of a cooldown check or admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownDecision {
    /// Whether the request may proceed.
    pub admitted: bool,
    /// Time left until the next admission. Zero when admitted.
    pub wait_remaining: Duration,
}

impl CooldownDecision {
    fn admitted() -> Self {
        Self {
            admitted: true,
            wait_remaining: Duration::ZERO,
        }
    }

    fn rejected(wait_remaining: Duration) -> Self {
        Self {
            admitted: false,
            wait_remaining,
        }
    }

    /// Remaining wait in whole seconds, rounded up for user display — a
    /// client told to wait "5s" must not be rejected again at t+5.
    pub fn wait_secs(&self) -> u64 {
        let secs = self.wait_remaining.as_secs();
        if self.wait_remaining.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Process-wide cooldown throttle, keyed by client identity.
///
/// Thread-safe via an internal `Mutex`. Same lifetime model as
/// [`super::DailyQuota`]: process memory only, empty on start.
pub struct CooldownThrottle {
    /// Identity → instant after which the next operation is allowed.
    state: Mutex<HashMap<String, Instant>>,
    mode: GateMode,
}

impl CooldownThrottle {
    pub fn new(mode: GateMode) -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
            mode,
        }
    }

    /// Admit-and-arm in one step: if the identity is out of cooldown, start a
    /// new `cooldown` window immediately. This is the on-admission policy —
    /// the window opens before the upstream call runs.
    pub fn try_admit(&self, identity: &str, cooldown: Duration) -> CooldownDecision {
        self.try_admit_at(identity, cooldown, Instant::now())
    }

    /// Seam for tests: admit against an explicit `now`.
    pub fn try_admit_at(
        &self,
        identity: &str,
        cooldown: Duration,
        now: Instant,
    ) -> CooldownDecision {
        match self.mode {
            GateMode::Strict => {
                let mut guard = self.state.lock().expect("cooldown state lock poisoned");
                if let Some(&next_allowed) = guard.get(identity) {
                    if now < next_allowed {
                        return CooldownDecision::rejected(next_allowed - now);
                    }
                }
                guard.insert(identity.to_string(), now + cooldown);
                CooldownDecision::admitted()
            }
            GateMode::Relaxed => {
                // Read and commit under separate guards: two simultaneous
                // requests can both pass the check before either arms the
                // window.
                let wait = {
                    let guard = self.state.lock().expect("cooldown state lock poisoned");
                    guard
                        .get(identity)
                        .filter(|&&next_allowed| now < next_allowed)
                        .map(|&next_allowed| next_allowed - now)
                };
                if let Some(wait) = wait {
                    return CooldownDecision::rejected(wait);
                }
                let mut guard = self.state.lock().expect("cooldown state lock poisoned");
                guard.insert(identity.to_string(), now + cooldown);
                CooldownDecision::admitted()
            }
        }
    }

    /// Check without arming: used by the on-success policy, which only calls
    /// [`CooldownThrottle::start`] after the upstream call completes. Expired
    /// records are dropped here so the map does not grow with one-shot
    /// visitors.
    pub fn check(&self, identity: &str) -> CooldownDecision {
        self.check_at(identity, Instant::now())
    }

    /// Seam for tests: check against an explicit `now`.
    pub fn check_at(&self, identity: &str, now: Instant) -> CooldownDecision {
        let mut guard = self.state.lock().expect("cooldown state lock poisoned");
        match guard.get(identity) {
            Some(&next_allowed) if now < next_allowed => {
                CooldownDecision::rejected(next_allowed - now)
            }
            Some(_) => {
                guard.remove(identity);
                CooldownDecision::admitted()
            }
            None => CooldownDecision::admitted(),
        }
    }

    /// Arm a new cooldown window for `identity`, overwriting any prior one.
    pub fn start(&self, identity: &str, cooldown: Duration) {
        self.start_at(identity, cooldown, Instant::now());
    }

    /// Seam for tests: arm against an explicit `now`.
    pub fn start_at(&self, identity: &str, cooldown: Duration, now: Instant) {
        let mut guard = self.state.lock().expect("cooldown state lock poisoned");
        guard.insert(identity.to_string(), now + cooldown);
    }

    /// Number of identities currently holding a record.
    pub fn tracked(&self) -> usize {
        self.state
            .lock()
            .expect("cooldown state lock poisoned")
            .len()
    }
}
