//! Loading and saving the application state through a [`KeyValueStore`].
//!
//! Reads never fail: a missing or unreadable document yields the default
//! for that part of the state. Writes are best-effort; failures are logged
//! and otherwise ignored, the in-memory state stays authoritative.

use serde::Serialize;

use super::AppState;
use crate::daylog::DayLog;
use crate::queue::QueuePlanner;
use crate::storage::{Config, KeyValueStore};
use crate::timer::SessionEngine;

pub const CONFIG_KEY: &str = "barberq.config";
pub const DAY_LOG_KEY: &str = "barberq.day_log";
pub const QUEUE_KEY: &str = "barberq.queue";
pub const SESSION_KEY: &str = "barberq.session";

pub(crate) fn load_state(store: &dyn KeyValueStore) -> AppState {
    let config = read(store, CONFIG_KEY)
        .map(|raw| Config::from_json_lenient(&raw))
        .unwrap_or_default();
    let log = read(store, DAY_LOG_KEY)
        .map(|raw| DayLog::from_json_lenient(&raw))
        .unwrap_or_default();
    let queue = read(store, QUEUE_KEY)
        .and_then(|raw| parse_or_warn::<QueuePlanner>(QUEUE_KEY, &raw))
        .unwrap_or_default();
    let session = read(store, SESSION_KEY)
        .and_then(|raw| parse_or_warn::<SessionEngine>(SESSION_KEY, &raw))
        .unwrap_or_default();

    AppState {
        config,
        session,
        queue,
        log,
    }
}

pub(crate) fn save_state(store: &mut dyn KeyValueStore, state: &AppState) {
    write(store, CONFIG_KEY, &state.config);
    write(store, DAY_LOG_KEY, &state.log);
    if state.queue.is_empty() {
        erase(store, QUEUE_KEY);
    } else {
        write(store, QUEUE_KEY, &state.queue);
    }
    save_session(store, &state.session);
}

/// An idle engine leaves no session document behind.
pub(crate) fn save_session(store: &mut dyn KeyValueStore, session: &SessionEngine) {
    if session.is_active() {
        write(store, SESSION_KEY, session);
    } else {
        erase(store, SESSION_KEY);
    }
}

fn read(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "store read failed, using defaults");
            None
        }
    }
}

fn parse_or_warn<T: serde::de::DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding unreadable stored value");
            None
        }
    }
}

fn write<T: Serialize + ?Sized>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(crate::error::CoreError::from)
        .and_then(|json| store.set(key, &json).map_err(Into::into));
    if let Err(e) = result {
        tracing::warn!(key, error = %e, "persisting state failed, continuing in memory");
    }
}

fn erase(store: &mut dyn KeyValueStore, key: &str) {
    if let Err(e) = store.remove(key) {
        tracing::warn!(key, error = %e, "removing stored value failed");
    }
}
