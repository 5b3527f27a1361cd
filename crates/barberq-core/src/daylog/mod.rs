//! Record of finished services for the day.
//!
//! Entries are appended once per finalized service and never edited
//! afterwards; they can only be deleted, singly or all at once.

mod export;

pub use export::export_text;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::service::{ServiceType, Speed};
use crate::timer::FinishedService;

/// A finished service with its estimate and its real duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub service_key: ServiceType,
    pub speed: Speed,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_ts: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end_ts: DateTime<Utc>,
    pub estimated_min: u32,
    pub real_min: u32,
}

impl LogEntry {
    pub fn from_finished(finished: &FinishedService) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            service_key: finished.service,
            speed: finished.speed,
            start_ts: finished.started_at,
            end_ts: finished.ended_at,
            estimated_min: finished.estimated_min,
            real_min: finished.real_min,
        }
    }
}

/// Same shape as [`LogEntry`] but tolerating records written before ids
/// existed.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    #[serde(default)]
    id: Option<String>,
    service_key: ServiceType,
    speed: Speed,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    start_ts: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    end_ts: DateTime<Utc>,
    estimated_min: u32,
    real_min: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub count: usize,
    pub total_real_min: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayLog {
    entries: Vec<LogEntry>,
}

impl DayLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored log. Anything that is not an array yields an empty
    /// log; individual records that cannot be read are dropped. Records
    /// without an id get `legacy-<startTs>-<position>`.
    pub fn from_json_lenient(raw: &str) -> Self {
        let records = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(records)) => records,
            Ok(_) => {
                tracing::warn!("stored day log is not an array, starting empty");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored day log is not valid JSON, starting empty");
                return Self::default();
            }
        };

        let mut entries = Vec::with_capacity(records.len());
        for (position, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<StoredEntry>(record) {
                Ok(stored) => {
                    let id = stored.id.unwrap_or_else(|| {
                        format!("legacy-{}-{}", stored.start_ts.timestamp_millis(), position)
                    });
                    entries.push(LogEntry {
                        id,
                        service_key: stored.service_key,
                        speed: stored.speed,
                        start_ts: stored.start_ts,
                        end_ts: stored.end_ts,
                        estimated_min: stored.estimated_min,
                        real_min: stored.real_min,
                    });
                }
                Err(e) => {
                    tracing::warn!(position, error = %e, "dropping unreadable day log record");
                }
            }
        }
        Self { entries }
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// Remove by id. `None` if no such entry.
    pub fn remove(&mut self, id: &str) -> Option<LogEntry> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx))
    }

    /// Remove everything, returning how many entries were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn summary(&self) -> DaySummary {
        DaySummary {
            count: self.entries.len(),
            total_real_min: self.entries.iter().map(|e| u64::from(e.real_min)).sum(),
        }
    }

    /// Entries ordered by start time, oldest first.
    pub fn sorted(&self) -> Vec<&LogEntry> {
        let mut sorted: Vec<&LogEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.start_ts);
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, m, 0).unwrap()
    }

    fn entry(id: &str, start: DateTime<Utc>, real_min: u32) -> LogEntry {
        LogEntry {
            id: id.into(),
            service_key: ServiceType::Cut,
            speed: Speed::Normal,
            start_ts: start,
            end_ts: start + Duration::minutes(i64::from(real_min)),
            estimated_min: 30,
            real_min,
        }
    }

    #[test]
    fn summary_counts_and_totals() {
        let mut log = DayLog::new();
        assert_eq!(log.summary(), DaySummary::default());
        log.append(entry("a", at(10, 0), 32));
        log.append(entry("b", at(9, 0), 28));
        assert_eq!(
            log.summary(),
            DaySummary {
                count: 2,
                total_real_min: 60
            }
        );
    }

    #[test]
    fn sorted_orders_by_start() {
        let mut log = DayLog::new();
        log.append(entry("late", at(15, 0), 30));
        log.append(entry("early", at(9, 0), 30));
        let ids: Vec<_> = log.sorted().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
        assert_eq!(log.entries()[0].id, "late");
    }

    #[test]
    fn remove_and_clear() {
        let mut log = DayLog::new();
        log.append(entry("a", at(9, 0), 30));
        log.append(entry("b", at(10, 0), 30));
        assert!(log.remove("zzz").is_none());
        assert_eq!(log.remove("a").unwrap().id, "a");
        assert_eq!(log.len(), 1);
        assert_eq!(log.clear(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn persisted_shape_uses_epoch_millis() {
        let mut log = DayLog::new();
        log.append(entry("a", at(9, 0), 30));
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json[0]["serviceKey"], "cut");
        assert_eq!(json[0]["startTs"], at(9, 0).timestamp_millis());
        assert_eq!(json[0]["realMin"], 30);
        assert_eq!(DayLog::from_json_lenient(&json.to_string()), log);
    }

    #[test]
    fn legacy_entries_get_deterministic_ids() {
        let start = at(9, 0).timestamp_millis();
        let raw = format!(
            r#"[
                {{"serviceKey":"color","speed":"slow","startTs":{start},"endTs":{end},"estimatedMin":185,"realMin":190}},
                {{"id":"kept","serviceKey":"cut","speed":"fast","startTs":{start},"endTs":{end},"estimatedMin":25,"realMin":24}}
            ]"#,
            end = start + 60_000
        );
        let log = DayLog::from_json_lenient(&raw);
        assert_eq!(log.entries()[0].id, format!("legacy-{start}-0"));
        assert_eq!(log.entries()[1].id, "kept");
        assert_eq!(DayLog::from_json_lenient(&raw), log);
    }

    #[test]
    fn malformed_log_falls_back_to_empty() {
        assert!(DayLog::from_json_lenient("nope").is_empty());
        assert!(DayLog::from_json_lenient(r#"{"entries":[]}"#).is_empty());
        let partly_bad = r#"[{"serviceKey":"shave"},{"id":"x","serviceKey":"cut","speed":"normal","startTs":0,"endTs":60000,"estimatedMin":30,"realMin":1}]"#;
        let log = DayLog::from_json_lenient(partly_bad);
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].id, "x");
    }
}
