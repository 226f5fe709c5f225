//! Per-client daily quota counter.
//!
//! Tracks how many gated operations each client identity has been admitted
//! for today (UTC). Rejects once the configured ceiling is reached; resets
//! implicitly when the calendar day rolls over — a record dated yesterday is
//! treated as absent, so rejection never persists across the day boundary.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::GateMode;

/// Live usage record for one identity. At most one record per identity; a
/// record whose day differs from today is overwritten rather than carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaRecord {
    /// UTC calendar day key, `YYYY-MM-DD`.
    pub day: String,
    /// Admitted operations on that day.
    pub count: u32,
}

/// Outcome of a quota consumption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    /// Whether the request may proceed.
    pub admitted: bool,
    /// Admissions left today after this decision. Zero when rejected.
    pub remaining: u32,
}

/// Process-wide daily quota counter, keyed by client identity.
///
/// Thread-safe via an internal `Mutex`. State lives for the process lifetime
/// only; there is no persistence and no cross-instance coordination.
pub struct DailyQuota {
    /// Identity → usage record for the current day.
    state: Mutex<HashMap<String, QuotaRecord>>,
    mode: GateMode,
}

impl DailyQuota {
    pub fn new(mode: GateMode) -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
            mode,
        }
    }

    /// Compute the UTC calendar-day key (`YYYY-MM-DD`) for a timestamp.
    pub fn day_key(now: DateTime<Utc>) -> String {
        now.format("%Y-%m-%d").to_string()
    }

    /// Try to consume one unit of today's quota for `identity`.
    ///
    /// The first request of a new day always succeeds: a stale record is
    /// overwritten with `count = 1` regardless of yesterday's state. A
    /// rejected attempt leaves the stored count unchanged.
    ///
    /// `daily_limit` is caller-supplied rather than baked in so each
    /// operation type can carry its own ceiling.
    pub fn try_consume(&self, identity: &str, daily_limit: u32) -> QuotaDecision {
        self.try_consume_on(identity, daily_limit, &Self::day_key(Utc::now()))
    }

    /// Seam for tests: consume against an explicit day key instead of the
    /// wall clock.
    pub fn try_consume_on(&self, identity: &str, daily_limit: u32, day: &str) -> QuotaDecision {
        match self.mode {
            GateMode::Strict => self.consume_strict(identity, daily_limit, day),
            GateMode::Relaxed => self.consume_relaxed(identity, daily_limit, day),
        }
    }

    /// Point-in-time copy of all live records.
    pub fn snapshot(&self) -> HashMap<String, QuotaRecord> {
        self.state
            .lock()
            .expect("quota state lock poisoned")
            .clone()
    }

    /// Check-and-increment under a single guard: the decision and the commit
    /// are one critical section, so concurrent requests cannot over-admit.
    fn consume_strict(&self, identity: &str, daily_limit: u32, day: &str) -> QuotaDecision {
        let mut guard = self.state.lock().expect("quota state lock poisoned");

        match guard.get_mut(identity) {
            Some(record) if record.day == day => {
                if record.count >= daily_limit {
                    return QuotaDecision {
                        admitted: false,
                        remaining: 0,
                    };
                }
                record.count += 1;
                QuotaDecision {
                    admitted: true,
                    remaining: daily_limit.saturating_sub(record.count),
                }
            }
            // No record, or a record from a previous day: start fresh.
            _ => {
                guard.insert(
                    identity.to_string(),
                    QuotaRecord {
                        day: day.to_string(),
                        count: 1,
                    },
                );
                QuotaDecision {
                    admitted: true,
                    remaining: daily_limit.saturating_sub(1),
                }
            }
        }
    }

    /// Read under one guard, commit under a second. Between the two, another
    /// request for the same identity may also observe "admitted" — the
    /// deliberate over-admission window of the relaxed mode.
    fn consume_relaxed(&self, identity: &str, daily_limit: u32, day: &str) -> QuotaDecision {
        let at_limit = {
            let guard = self.state.lock().expect("quota state lock poisoned");
            guard
                .get(identity)
                .map(|r| r.day == day && r.count >= daily_limit)
                .unwrap_or(false)
        };

        if at_limit {
            return QuotaDecision {
                admitted: false,
                remaining: 0,
            };
        }

        let mut guard = self.state.lock().expect("quota state lock poisoned");
        let record = guard
            .entry(identity.to_string())
            .or_insert_with(|| QuotaRecord {
                day: day.to_string(),
                count: 0,
            });

        if record.day != day {
            record.day = day.to_string();
            record.count = 0;
        }
        record.count += 1;

        QuotaDecision {
            admitted: true,
            remaining: daily_limit.saturating_sub(record.count),
        }
    }
}
