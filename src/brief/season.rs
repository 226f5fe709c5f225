//! Seasonal context for brief generation.
//!
//! The model gets told what time of year it is so theme suggestions can lean
//! on holidays and seasons. Pure functions over a caller-supplied timestamp;
//! the route passes `Utc::now()`.

use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Date-derived hints injected into the model's user payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalContext {
    /// RFC 3339 timestamp of "now".
    pub iso: String,
    /// Coarse season bucket, e.g. `Holiday Season (December)`.
    pub season_label: String,
    /// Holiday-proximity lines, empty outside holiday windows.
    pub holiday_hints: Vec<String>,
    pub days_to_christmas: i64,
    pub days_to_new_year: i64,
}

/// Days from `now` until the next occurrence of `month`/`day` (1-based),
/// rounded to the nearest day and clamped at zero.
pub fn days_until_month_day(now: DateTime<Utc>, month: u32, day: u32) -> i64 {
    let this_year = match Utc.with_ymd_and_hms(now.year(), month, day, 0, 0, 0).single() {
        Some(t) => t,
        None => return 0,
    };
    let target = if this_year >= now {
        this_year
    } else {
        match Utc
            .with_ymd_and_hms(now.year() + 1, month, day, 0, 0, 0)
            .single()
        {
            Some(t) => t,
            None => return 0,
        }
    };
    let days = (target - now).num_milliseconds() as f64 / 86_400_000.0;
    (days.round() as i64).max(0)
}

/// Compute the seasonal context for a timestamp.
pub fn seasonal_context(now: DateTime<Utc>) -> SeasonalContext {
    let month = now.month();
    let day = now.day();

    let days_to_christmas = days_until_month_day(now, 12, 25);
    let days_to_new_year = days_until_month_day(now, 1, 1);

    // Coarse buckets are good enough for design suggestions.
    let season_label = match month {
        12 => "Holiday Season (December)",
        1 => "New Year / Fresh Start (January)",
        6..=8 => "Summer (June–August)",
        9..=11 => "Fall (September–November)",
        2..=5 => "Spring (February–May)",
        _ => "General",
    }
    .to_string();

    let mut holiday_hints = Vec::new();
    if month == 12 && day <= 25 {
        holiday_hints.push(format!("It is {days_to_christmas} day(s) before Christmas."));
        holiday_hints
            .push("Holiday attention span is short. Make the CTA extremely obvious.".to_string());
    }
    if days_to_new_year <= 14 {
        holiday_hints.push(format!("New Year is coming in {days_to_new_year} day(s)."));
        holiday_hints
            .push("'Fresh start' messaging can outperform generic promos.".to_string());
    }

    SeasonalContext {
        iso: now.to_rfc3339(),
        season_label,
        holiday_hints,
        days_to_christmas,
        days_to_new_year,
    }
}
