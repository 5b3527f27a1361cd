//! Session engine for the service in the chair.
//!
//! The engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller passes `now` to every command and is
//! responsible for calling `tick()` periodically while a service runs.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Overtime -> Idle
//!            \__________________/
//! ```
//!
//! `finalize` and `stop` both return to `Idle`; only `finalize` reports the
//! finished service so it can be logged.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::service::{ServiceType, Speed};

/// Remaining time at or below which a running service shows a warning.
pub const WARNING_WINDOW_MS: i64 = 2 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Overtime,
}

/// Display sub-mode of a running service. Does not change [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubMode {
    #[default]
    Normal,
    Warning,
}

/// The service currently in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningService {
    pub service: ServiceType,
    pub speed: Speed,
    /// Allotted minutes as estimated when the service started.
    pub duration_min: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,
}

impl RunningService {
    pub fn duration_ms(&self) -> i64 {
        i64::from(self.duration_min) * 60_000
    }

    pub fn planned_end(&self) -> DateTime<Utc> {
        self.started_at + Duration::milliseconds(self.duration_ms())
    }
}

/// A service that was finalized, ready to be written to the day log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedService {
    pub service: ServiceType,
    pub speed: Speed,
    pub estimated_min: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub real_min: u32,
}

/// Realized minutes between two instants: rounded, never below 1.
pub fn realized_minutes(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> u32 {
    let elapsed_ms = (ended_at - started_at).num_milliseconds().max(0);
    let minutes = (elapsed_ms as f64 / 60_000.0).round() as u32;
    minutes.max(1)
}

/// Core session engine.
///
/// Operates on caller-supplied instants -- no internal thread, no clock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEngine {
    #[serde(default)]
    running: Option<RunningService>,
    #[serde(default)]
    sub_mode: SubMode,
    /// Set on the edge into overtime so the alert fires once per episode.
    #[serde(default)]
    overtime_alerted: bool,
}

impl SessionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        match &self.running {
            None => SessionState::Idle,
            Some(_) if self.overtime_alerted => SessionState::Overtime,
            Some(_) => SessionState::Running,
        }
    }

    pub fn sub_mode(&self) -> SubMode {
        self.sub_mode
    }

    pub fn running(&self) -> Option<&RunningService> {
        self.running.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.running.is_some()
    }

    pub fn planned_end(&self) -> Option<DateTime<Utc>> {
        self.running.as_ref().map(RunningService::planned_end)
    }

    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        self.running
            .as_ref()
            .map(|r| (now - r.started_at).num_milliseconds().max(0))
            .unwrap_or(0)
    }

    pub fn remaining_ms(&self, now: DateTime<Utc>) -> i64 {
        self.running
            .as_ref()
            .map(|r| (r.duration_ms() - self.elapsed_ms(now)).max(0))
            .unwrap_or(0)
    }

    pub fn overtime_ms(&self, now: DateTime<Utc>) -> i64 {
        self.running
            .as_ref()
            .map(|r| (self.elapsed_ms(now) - r.duration_ms()).max(0))
            .unwrap_or(0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start `service`, replacing whatever was running.
    pub fn start(
        &mut self,
        service: ServiceType,
        speed: Speed,
        duration_min: u32,
        now: DateTime<Utc>,
    ) -> Event {
        self.running = Some(RunningService {
            service,
            speed,
            duration_min,
            started_at: now,
        });
        self.sub_mode = SubMode::Normal;
        self.overtime_alerted = false;
        tracing::info!(service = %service, speed = %speed, duration_min, "service started");
        Event::ServiceStarted {
            service,
            speed,
            duration_min,
            at: now,
        }
    }

    /// Re-evaluate elapsed time. Returns `Some(Event::OvertimeStarted)` only
    /// on the tick that crosses the allotted duration.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let running = self.running.as_ref()?;
        let allotted = running.duration_ms();
        let elapsed = self.elapsed_ms(now);

        if elapsed <= allotted {
            self.overtime_alerted = false;
            self.sub_mode = if allotted - elapsed <= WARNING_WINDOW_MS {
                SubMode::Warning
            } else {
                SubMode::Normal
            };
            return None;
        }

        self.sub_mode = SubMode::Normal;
        if self.overtime_alerted {
            return None;
        }
        self.overtime_alerted = true;
        tracing::info!(service = %running.service, overtime_ms = elapsed - allotted, "service entered overtime");
        Some(Event::OvertimeStarted {
            service: running.service,
            allotted_ms: allotted,
            at: now,
        })
    }

    /// Finish the running service. Always leaves the engine idle.
    pub fn finalize(&mut self, now: DateTime<Utc>) -> Option<FinishedService> {
        let running = self.reset()?;
        let finished = FinishedService {
            service: running.service,
            speed: running.speed,
            estimated_min: running.duration_min,
            started_at: running.started_at,
            ended_at: now,
            real_min: realized_minutes(running.started_at, now),
        };
        tracing::info!(
            service = %finished.service,
            estimated_min = finished.estimated_min,
            real_min = finished.real_min,
            "service finalized"
        );
        Some(finished)
    }

    /// Drop the running service without reporting it.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let running = self.reset()?;
        tracing::info!(service = %running.service, "service stopped without logging");
        Some(Event::ServiceStopped {
            service: running.service,
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reset(&mut self) -> Option<RunningService> {
        self.sub_mode = SubMode::Normal;
        self.overtime_alerted = false;
        self.running.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap()
    }

    fn started(duration_min: u32) -> SessionEngine {
        let mut engine = SessionEngine::new();
        engine.start(ServiceType::Cut, Speed::Normal, duration_min, t0());
        engine
    }

    #[test]
    fn starts_idle() {
        let engine = SessionEngine::new();
        assert_eq!(engine.state(), SessionState::Idle);
        assert!(engine.running().is_none());
        assert_eq!(engine.remaining_ms(t0()), 0);
    }

    #[test]
    fn start_enters_running() {
        let engine = started(30);
        assert_eq!(engine.state(), SessionState::Running);
        assert_eq!(engine.planned_end(), Some(t0() + Duration::minutes(30)));
    }

    #[test]
    fn warning_sub_mode_inside_last_two_minutes() {
        let mut engine = started(30);
        assert!(engine.tick(t0() + Duration::minutes(27)).is_none());
        assert_eq!(engine.sub_mode(), SubMode::Normal);

        assert!(engine.tick(t0() + Duration::minutes(28)).is_none());
        assert_eq!(engine.sub_mode(), SubMode::Warning);
        assert_eq!(engine.state(), SessionState::Running);
        assert_eq!(engine.remaining_ms(t0() + Duration::minutes(28)), 120_000);
    }

    #[test]
    fn exactly_allotted_is_still_running() {
        let mut engine = started(30);
        assert!(engine.tick(t0() + Duration::minutes(30)).is_none());
        assert_eq!(engine.state(), SessionState::Running);
    }

    #[test]
    fn overtime_alert_fires_once_per_episode() {
        let mut engine = started(30);
        let over = t0() + Duration::minutes(30) + Duration::milliseconds(1);
        assert!(matches!(engine.tick(over), Some(Event::OvertimeStarted { .. })));
        assert_eq!(engine.state(), SessionState::Overtime);
        assert!(engine.tick(over + Duration::seconds(1)).is_none());
        assert!(engine.tick(over + Duration::minutes(10)).is_none());
        assert_eq!(engine.state(), SessionState::Overtime);
        assert_eq!(engine.overtime_ms(over + Duration::minutes(10)), 600_001);
    }

    #[test]
    fn replacing_the_service_rearms_the_alert() {
        let mut engine = started(10);
        let over = t0() + Duration::minutes(11);
        assert!(engine.tick(over).is_some());
        engine.start(ServiceType::Color, Speed::Slow, 10, over);
        assert_eq!(engine.state(), SessionState::Running);
        assert!(engine.tick(over + Duration::minutes(11)).is_some());
    }

    #[test]
    fn finalize_reports_rounded_minutes_and_goes_idle() {
        let mut engine = started(30);
        let done = engine
            .finalize(t0() + Duration::minutes(31) + Duration::seconds(40))
            .unwrap();
        assert_eq!(done.real_min, 32);
        assert_eq!(done.estimated_min, 30);
        assert_eq!(engine.state(), SessionState::Idle);
    }

    #[test]
    fn finalize_immediately_counts_one_minute() {
        let mut engine = started(30);
        let done = engine.finalize(t0() + Duration::seconds(5)).unwrap();
        assert_eq!(done.real_min, 1);
    }

    #[test]
    fn finalize_or_stop_while_idle_is_noop() {
        let mut engine = SessionEngine::new();
        assert!(engine.finalize(t0()).is_none());
        assert!(engine.stop(t0()).is_none());
        assert_eq!(engine.state(), SessionState::Idle);
    }

    #[test]
    fn stop_from_overtime_resets() {
        let mut engine = started(5);
        engine.tick(t0() + Duration::minutes(6));
        assert!(matches!(engine.stop(t0() + Duration::minutes(7)), Some(Event::ServiceStopped { .. })));
        assert_eq!(engine.state(), SessionState::Idle);
        assert_eq!(engine.sub_mode(), SubMode::Normal);
    }

    #[test]
    fn engine_state_survives_serialization() {
        let mut engine = started(5);
        engine.tick(t0() + Duration::minutes(6));
        let json = serde_json::to_string(&engine).unwrap();
        let restored: SessionEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state(), SessionState::Overtime);
        assert_eq!(restored.running(), engine.running());
    }
}
