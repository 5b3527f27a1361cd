//! # BarberQ Core Library
//!
//! Scheduling and estimation engine for a single chair: one running
//! service, a short FIFO queue of waiting clients and a day log of finished
//! work, with every planned finish time checked against the shift limits.
//! The CLI binary is a thin host over this library.
//!
//! ## Architecture
//!
//! - **Duration rules**: pure mapping (service, speed) → minutes
//! - **Limit classifier**: pure mapping (end time, now) → ok / warning / over-limit
//! - **Session engine**: wall-clock state machine for the running service;
//!   the host calls `tick()` while it runs
//! - **Queue planner**: projected start/end for every waiting client
//! - **Day log**: finished services, estimate vs. actual
//! - **Coordinator**: command dispatcher owning all of the above, with the
//!   clock, key-value store, feedback, renderer and ticker injected
//!
//! ## Key Components
//!
//! - [`Coordinator`]: processes [`Command`]s and produces [`Snapshot`]s
//! - [`Config`]: duration rules and shift limits
//! - [`KeyValueStore`]: persistence seam ([`Database`], [`MemoryStore`])

pub mod app;
pub mod clock;
pub mod daylog;
pub mod duration;
pub mod error;
pub mod events;
pub mod feedback;
pub mod limits;
pub mod queue;
pub mod service;
pub mod storage;
pub mod timer;

pub use app::{AppState, Command, Coordinator, NullRenderer, Renderer, Snapshot};
pub use clock::{Clock, ManualClock, SystemClock};
pub use daylog::{DayLog, DaySummary, LogEntry};
pub use duration::calc_duration_min;
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use feedback::{Feedback, FeedbackKind, SilentFeedback};
pub use limits::{classify, Classification};
pub use queue::{Plan, QueueItem, QueuePlanner};
pub use service::{ServiceType, Speed};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
pub use timer::{ManualTicker, SessionEngine, SessionState, SubMode, Ticker};
