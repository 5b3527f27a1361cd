//! Command dispatcher over the application state.
//!
//! Each user action is a [`Command`] processed to completion against
//! [`AppState`]; afterwards the state is persisted (best-effort) and a fresh
//! [`Snapshot`] is handed to the [`Renderer`]. The clock, store, feedback,
//! renderer and ticker are all injected.

pub mod persist;
mod snapshot;

pub use snapshot::{QueueEntryView, RunningView, Snapshot};

use chrono::{DateTime, FixedOffset, Utc};

use crate::clock::Clock;
use crate::daylog::{export_text, DayLog, LogEntry};
use crate::error::Result;
use crate::events::Event;
use crate::feedback::{Feedback, FeedbackKind, SilentFeedback};
use crate::limits::Classification;
use crate::queue::{Plan, QueueItem, QueuePlanner};
use crate::service::{ServiceType, Speed};
use crate::storage::{Config, KeyValueStore, SetOutcome};
use crate::timer::{ManualTicker, SessionEngine, SessionState, Ticker};

/// Receives the recomputed display state after every change.
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot);
}

/// Renderer that discards snapshots.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _snapshot: &Snapshot) {}
}

/// A discrete user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Compute where a request would land without submitting it.
    Preview { service: ServiceType, speed: Speed },
    /// Accept a client. Plans past the shift limit need `force`.
    Request {
        service: ServiceType,
        speed: Speed,
        force: bool,
    },
    /// Move the queue head into the chair when it is free.
    StartNext,
    /// Finish the running service and log it.
    Finalize,
    /// Drop the running service without logging it.
    Cancel,
    RemoveQueued { id: String },
    RemoveLogEntry { id: String },
    ClearLog,
    SetConfig { key: String, value: String },
    ReplaceConfig(Box<Config>),
    ResetConfig,
    /// Re-run the duration rules for every queued item.
    RecomputeQueue,
}

impl Command {
    fn is_mutating(&self) -> bool {
        !matches!(self, Command::Preview { .. })
    }
}

/// Configuration, running service, queue and day log.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub(crate) config: Config,
    pub(crate) session: SessionEngine,
    pub(crate) queue: QueuePlanner,
    pub(crate) log: DayLog,
}

impl AppState {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionEngine {
        &self.session
    }

    pub fn queue(&self) -> &QueuePlanner {
        &self.queue
    }

    pub fn log(&self) -> &DayLog {
        &self.log
    }

    /// The queue head, staged while nothing is running.
    pub fn next_up(&self) -> Option<&QueueItem> {
        if self.session.is_active() {
            None
        } else {
            self.queue.head()
        }
    }
}

pub struct Coordinator {
    state: AppState,
    clock: Box<dyn Clock>,
    store: Box<dyn KeyValueStore>,
    feedback: Box<dyn Feedback>,
    renderer: Box<dyn Renderer>,
    ticker: Box<dyn Ticker>,
}

impl Coordinator {
    /// Load state from `store` and wire up default collaborators.
    pub fn new(store: impl KeyValueStore + 'static, clock: impl Clock + 'static) -> Self {
        let state = persist::load_state(&store);
        tracing::debug!(
            queued = state.queue.len(),
            logged = state.log.len(),
            running = state.session.is_active(),
            "state loaded"
        );
        let mut coordinator = Self {
            state,
            clock: Box::new(clock),
            store: Box::new(store),
            feedback: Box::new(SilentFeedback),
            renderer: Box::new(NullRenderer),
            ticker: Box::new(ManualTicker::new()),
        };
        if coordinator.state.session.is_active() {
            coordinator.ticker.start();
        }
        let (now, tz) = coordinator.now();
        coordinator.rebuild(now, &tz);
        coordinator
    }

    pub fn with_feedback(mut self, feedback: impl Feedback + 'static) -> Self {
        self.feedback = Box::new(feedback);
        self
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Replace the ticker, starting it if a service is already running.
    pub fn with_ticker(mut self, mut ticker: impl Ticker + 'static) -> Self {
        if self.state.session.is_active() {
            ticker.start();
        }
        self.ticker = Box::new(ticker);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn ticker_active(&self) -> bool {
        self.ticker.is_active()
    }

    /// Current display state, with queue projections walked from `now`.
    pub fn snapshot(&self) -> Snapshot {
        let (now, tz) = self.now();
        let mut state = self.state.clone();
        let anchor = state.session.planned_end();
        state.queue.rebuild(&state.config, anchor, now, &tz);
        Snapshot::capture(&state, now, &tz)
    }

    /// The day log as a text block, clock times in the host zone.
    pub fn export_log(&self) -> String {
        let (_, tz) = self.now();
        export_text(&self.state.log, &tz)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Process one command to completion.
    ///
    /// # Errors
    ///
    /// Only configuration edits can fail (unknown key, malformed JSON for
    /// an object key); the state is untouched in that case.
    pub fn dispatch(&mut self, command: Command) -> Result<Vec<Event>> {
        let (now, tz) = self.now();
        let mutating = command.is_mutating();
        // Projections go stale while the chair is idle.
        self.rebuild(now, &tz);

        let events = match command {
            Command::Preview { service, speed } => {
                let plan = self.plan(service, speed, now, &tz);
                self.feedback.notify(FeedbackKind::Open);
                vec![Event::PlanPreviewed {
                    service,
                    speed,
                    plan,
                    at: now,
                }]
            }
            Command::Request {
                service,
                speed,
                force,
            } => self.request(service, speed, force, now, &tz),
            Command::StartNext => self.start_next(now, &tz),
            Command::Finalize => self.finalize(now, &tz),
            Command::Cancel => self.cancel(now, &tz),
            Command::RemoveQueued { id } => match self.state.queue.remove(&id) {
                Some(_) => {
                    self.rebuild(now, &tz);
                    self.feedback.notify(FeedbackKind::Delete);
                    vec![Event::QueueItemRemoved { id, at: now }]
                }
                None => Vec::new(),
            },
            Command::RemoveLogEntry { id } => match self.state.log.remove(&id) {
                Some(_) => {
                    self.feedback.notify(FeedbackKind::Delete);
                    vec![Event::LogEntryRemoved { id, at: now }]
                }
                None => Vec::new(),
            },
            Command::ClearLog => {
                let removed = self.state.log.clear();
                self.feedback.notify(FeedbackKind::Delete);
                vec![Event::LogCleared { removed, at: now }]
            }
            Command::SetConfig { key, value } => {
                let outcome = self.state.config.set(&key, &value)?;
                let applied = outcome == SetOutcome::Applied;
                if applied {
                    self.recompute_queue(now, &tz);
                }
                vec![Event::ConfigUpdated {
                    key,
                    applied,
                    at: now,
                }]
            }
            Command::ReplaceConfig(config) => {
                let mut config = *config;
                config.sanitize();
                self.state.config = config;
                self.recompute_queue(now, &tz);
                vec![Event::ConfigUpdated {
                    key: String::new(),
                    applied: true,
                    at: now,
                }]
            }
            Command::ResetConfig => {
                self.state.config = Config::default();
                self.recompute_queue(now, &tz);
                vec![Event::ConfigReset { at: now }]
            }
            Command::RecomputeQueue => {
                self.recompute_queue(now, &tz);
                vec![Event::QueueRecomputed {
                    items: self.state.queue.len(),
                    at: now,
                }]
            }
        };

        if mutating {
            persist::save_state(self.store.as_mut(), &self.state);
        }
        self.renderer.render(&Snapshot::capture(&self.state, now, &tz));
        Ok(events)
    }

    /// Periodic re-evaluation of the running service.
    ///
    /// Does nothing while the ticker is stopped. Never touches the queue or
    /// the day log.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.ticker.is_active() {
            return None;
        }
        let (now, tz) = self.now();
        let event = self.state.session.tick(now);
        if event.is_some() {
            self.feedback.notify(FeedbackKind::Warn);
            persist::save_session(self.store.as_mut(), &self.state.session);
        }
        if self.state.session.state() == SessionState::Idle {
            self.ticker.stop();
        }
        self.renderer.render(&Snapshot::capture(&self.state, now, &tz));
        event
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn now(&self) -> (DateTime<Utc>, FixedOffset) {
        let now = self.clock.now();
        (now, self.clock.utc_offset(now))
    }

    fn plan(&self, service: ServiceType, speed: Speed, now: DateTime<Utc>, tz: &FixedOffset) -> Plan {
        self.state.queue.plan_for(
            &self.state.config,
            service,
            speed,
            self.state.session.planned_end(),
            now,
            tz,
        )
    }

    fn rebuild(&mut self, now: DateTime<Utc>, tz: &FixedOffset) {
        let anchor = self.state.session.planned_end();
        self.state.queue.rebuild(&self.state.config, anchor, now, tz);
    }

    fn recompute_queue(&mut self, now: DateTime<Utc>, tz: &FixedOffset) {
        self.state.queue.recompute_durations(&self.state.config);
        self.rebuild(now, tz);
    }

    fn request(
        &mut self,
        service: ServiceType,
        speed: Speed,
        force: bool,
        now: DateTime<Utc>,
        tz: &FixedOffset,
    ) -> Vec<Event> {
        let plan = self.plan(service, speed, now, tz);
        if plan.classification == Classification::OverLimit && !force {
            tracing::info!(service = %service, end = %plan.end, "request refused past shift limit");
            self.feedback.notify(FeedbackKind::Warn);
            return vec![Event::PlanRejected {
                service,
                speed,
                plan,
                at: now,
            }];
        }

        self.feedback.notify(FeedbackKind::Select);
        if plan.becomes_current_immediately {
            let started = self.state.session.start(service, speed, plan.duration_min, now);
            self.ticker.start();
            self.rebuild(now, tz);
            return vec![started];
        }

        let item = QueueItem::new(service, speed, plan.duration_min, now);
        let id = item.id.clone();
        self.state.queue.enqueue(item);
        self.rebuild(now, tz);
        match self.state.queue.get(&id) {
            Some(item) => vec![Event::ServiceEnqueued {
                id: item.id.clone(),
                service,
                speed,
                start: item.start,
                end: item.end,
                classification: item.classification,
                at: now,
            }],
            None => Vec::new(),
        }
    }

    fn start_next(&mut self, now: DateTime<Utc>, tz: &FixedOffset) -> Vec<Event> {
        if self.state.session.is_active() {
            return Vec::new();
        }
        let Some(item) = self.state.queue.dequeue_head() else {
            return Vec::new();
        };
        let started = self
            .state
            .session
            .start(item.service, item.speed, item.duration_min, now);
        self.ticker.start();
        self.rebuild(now, tz);
        self.feedback.notify(FeedbackKind::Select);
        vec![started]
    }

    fn finalize(&mut self, now: DateTime<Utc>, tz: &FixedOffset) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(finished) = self.state.session.finalize(now) {
            let entry = LogEntry::from_finished(&finished);
            events.push(Event::ServiceFinalized {
                entry_id: entry.id.clone(),
                service: entry.service_key,
                estimated_min: entry.estimated_min,
                real_min: entry.real_min,
                at: now,
            });
            self.state.log.append(entry);
            self.feedback.notify(FeedbackKind::Soft);
        }
        self.after_session_ended(now, tz, &mut events);
        events
    }

    fn cancel(&mut self, now: DateTime<Utc>, tz: &FixedOffset) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(stopped) = self.state.session.stop(now) {
            events.push(stopped);
            self.feedback.notify(FeedbackKind::Soft);
        }
        self.after_session_ended(now, tz, &mut events);
        events
    }

    fn after_session_ended(&mut self, now: DateTime<Utc>, tz: &FixedOffset, events: &mut Vec<Event>) {
        self.ticker.stop();
        self.rebuild(now, tz);
        if let Some(head) = self.state.next_up() {
            events.push(Event::NextStaged {
                id: head.id.clone(),
                service: head.service,
                speed: head.speed,
                at: now,
            });
        }
    }
}
