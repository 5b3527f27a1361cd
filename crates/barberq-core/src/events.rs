//! Events emitted by the coordinator.
//!
//! Serialized with a `type` tag in snake_case, so hosts can print them as
//! JSON lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::limits::Classification;
use crate::queue::Plan;
use crate::service::{ServiceType, Speed};

/// Every state change in the system produces an Event.
/// Hosts print or forward them; the render snapshot carries the full state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ServiceStarted {
        service: ServiceType,
        speed: Speed,
        duration_min: u32,
        at: DateTime<Utc>,
    },
    ServiceEnqueued {
        id: String,
        service: ServiceType,
        speed: Speed,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        classification: Classification,
        at: DateTime<Utc>,
    },
    /// A plan was computed for a request that was not submitted.
    PlanPreviewed {
        service: ServiceType,
        speed: Speed,
        plan: Plan,
        at: DateTime<Utc>,
    },
    /// A request would end past the shift limit and was not forced.
    PlanRejected {
        service: ServiceType,
        speed: Speed,
        plan: Plan,
        at: DateTime<Utc>,
    },
    /// The running service passed its allotted time.
    OvertimeStarted {
        service: ServiceType,
        allotted_ms: i64,
        at: DateTime<Utc>,
    },
    ServiceFinalized {
        entry_id: String,
        service: ServiceType,
        estimated_min: u32,
        real_min: u32,
        at: DateTime<Utc>,
    },
    /// The running service was dropped without being logged.
    ServiceStopped {
        service: ServiceType,
        at: DateTime<Utc>,
    },
    /// The queue head is ready to be started.
    NextStaged {
        id: String,
        service: ServiceType,
        speed: Speed,
        at: DateTime<Utc>,
    },
    QueueItemRemoved {
        id: String,
        at: DateTime<Utc>,
    },
    QueueRecomputed {
        items: usize,
        at: DateTime<Utc>,
    },
    LogEntryRemoved {
        id: String,
        at: DateTime<Utc>,
    },
    LogCleared {
        removed: usize,
        at: DateTime<Utc>,
    },
    ConfigUpdated {
        key: String,
        /// False when the value was rejected and the prior one kept.
        applied: bool,
        at: DateTime<Utc>,
    },
    ConfigReset {
        at: DateTime<Utc>,
    },
}
