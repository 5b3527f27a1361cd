//! Render-ready view of the whole application state.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::daylog::{DaySummary, LogEntry};
use crate::limits::{self, Classification};
use crate::service::{ServiceType, Speed};
use crate::storage::config::ShiftLimit;
use crate::timer::{SessionState, SubMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningView {
    pub service: ServiceType,
    pub speed: Speed,
    pub label: String,
    pub duration_min: u32,
    pub started_at: DateTime<Utc>,
    pub planned_end: DateTime<Utc>,
    pub elapsed_ms: i64,
    pub remaining_ms: i64,
    pub overtime_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntryView {
    pub id: String,
    pub service: ServiceType,
    pub speed: Speed,
    pub label: String,
    pub duration_min: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub classification: Classification,
    pub waiting_min: i64,
}

/// Everything a host needs to draw the current screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub at: DateTime<Utc>,
    pub state: SessionState,
    pub sub_mode: SubMode,
    pub running: Option<RunningView>,
    pub queue: Vec<QueueEntryView>,
    /// Queue head waiting to be started while the chair is free.
    pub next_up: Option<String>,
    /// Day log, oldest first.
    pub log: Vec<LogEntry>,
    pub summary: DaySummary,
    pub active_limit: ShiftLimit,
}

impl Snapshot {
    pub fn capture(state: &AppState, now: DateTime<Utc>, tz: &FixedOffset) -> Self {
        let session = &state.session;
        let running = session.running().map(|r| RunningView {
            service: r.service,
            speed: r.speed,
            label: format!("{} · {}", r.service.label(), r.speed.label()),
            duration_min: r.duration_min,
            started_at: r.started_at,
            planned_end: r.planned_end(),
            elapsed_ms: session.elapsed_ms(now),
            remaining_ms: session.remaining_ms(now),
            overtime_ms: session.overtime_ms(now),
        });

        let queue = state
            .queue
            .items()
            .iter()
            .map(|item| QueueEntryView {
                id: item.id.clone(),
                service: item.service,
                speed: item.speed,
                label: item.label(),
                duration_min: item.duration_min,
                start: item.start,
                end: item.end,
                classification: item.classification,
                waiting_min: item.waiting_min(now),
            })
            .collect();

        Self {
            at: now,
            state: session.state(),
            sub_mode: session.sub_mode(),
            running,
            queue,
            next_up: state.next_up().map(|item| item.id.clone()),
            log: state.log.sorted().into_iter().cloned().collect(),
            summary: state.log.summary(),
            active_limit: limits::active_limit(&state.config, now, tz).clone(),
        }
    }
}
