//! Shift-limit classification of projected end times.
//!
//! The active boundary is chosen from `now`'s time of day only: the earlier
//! limit while it has not been reached yet, the later one afterwards. A plan
//! that runs past midnight is still compared against the boundary on `now`'s
//! calendar day.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::config::{Config, ShiftLimit, MAX_CONFIG_MIN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Ok,
    /// Ends within the warning threshold before the limit.
    Warning,
    /// Ends strictly after the limit.
    OverLimit,
}

impl Classification {
    pub fn label(self) -> &'static str {
        match self {
            Classification::Ok => "ok",
            Classification::Warning => "warning",
            Classification::OverLimit => "over-limit",
        }
    }
}

/// The limit that applies at `now` in zone `tz`.
pub fn active_limit<'a, Tz: TimeZone>(config: &'a Config, now: DateTime<Utc>, tz: &Tz) -> &'a ShiftLimit {
    let (early, late) = config.ordered_limits();
    let local_time = now.with_timezone(tz).time();
    if local_time < clock_time(early) {
        early
    } else {
        late
    }
}

/// The instant of the active limit on `now`'s local calendar day.
pub fn limit_instant<Tz: TimeZone>(config: &Config, now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let limit = active_limit(config, now, tz);
    let local_now = now.with_timezone(tz);
    let naive = local_now.date_naive().and_time(clock_time(limit));
    match tz.from_local_datetime(&naive).earliest() {
        Some(at) => at.with_timezone(&Utc),
        // Wall-clock time skipped by a DST jump: offset from `now` instead.
        None => now + (naive - local_now.naive_local()),
    }
}

/// Classify a projected end time against the active limit.
pub fn classify<Tz: TimeZone>(
    config: &Config,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Classification {
    let boundary = limit_instant(config, now, tz);
    if end > boundary {
        return Classification::OverLimit;
    }
    let gap = boundary - end;
    let yellow = Duration::minutes(config.yellow_threshold_min.clamp(0, MAX_CONFIG_MIN));
    if gap > Duration::zero() && gap <= yellow {
        Classification::Warning
    } else {
        Classification::Ok
    }
}

fn clock_time(limit: &ShiftLimit) -> NaiveTime {
    NaiveTime::from_hms_opt(limit.hour, limit.min, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, m, 0).unwrap()
    }

    #[test]
    fn earlier_limit_applies_before_it_is_reached() {
        let cfg = Config::default();
        assert_eq!(active_limit(&cfg, at(12, 0), &Utc).hour, 13);
        assert_eq!(active_limit(&cfg, at(13, 0), &Utc).hour, 22);
        assert_eq!(active_limit(&cfg, at(21, 50), &Utc).hour, 22);
    }

    #[test]
    fn short_plan_before_midday_is_ok() {
        let cfg = Config::default();
        let now = at(12, 0);
        let end = now + Duration::minutes(30);
        assert_eq!(classify(&cfg, end, now, &Utc), Classification::Ok);
    }

    #[test]
    fn plan_past_midnight_is_over_limit() {
        let cfg = Config::default();
        let now = at(21, 50);
        let end = now + Duration::minutes(170);
        assert_eq!(classify(&cfg, end, now, &Utc), Classification::OverLimit);
    }

    #[test]
    fn exact_boundary_is_ok_and_one_ms_after_is_over() {
        let cfg = Config::default();
        let now = at(14, 0);
        let boundary = at(22, 0);
        assert_eq!(classify(&cfg, boundary, now, &Utc), Classification::Ok);
        assert_eq!(
            classify(&cfg, boundary + Duration::milliseconds(1), now, &Utc),
            Classification::OverLimit
        );
    }

    #[test]
    fn warning_band_inside_threshold() {
        let cfg = Config::default();
        let now = at(12, 0);
        assert_eq!(classify(&cfg, at(12, 50), now, &Utc), Classification::Warning);
        assert_eq!(classify(&cfg, at(12, 45), now, &Utc), Classification::Warning);
        assert_eq!(classify(&cfg, at(12, 44), now, &Utc), Classification::Ok);
    }

    #[test]
    fn boundary_follows_local_zone() {
        let cfg = Config::default();
        let madrid = FixedOffset::east_opt(3600).unwrap();
        // 11:30 UTC is 12:30 local: the 13:00 local limit is 12:00 UTC.
        let now = at(11, 30);
        assert_eq!(limit_instant(&cfg, now, &madrid), at(12, 0));
        assert_eq!(
            classify(&cfg, at(12, 1), now, &madrid),
            Classification::OverLimit
        );
    }
}
