//! FIFO queue of clients waiting for the chair.
//!
//! Items only ever get appended or removed. Every projected start/end and
//! shift classification is derived: [`QueuePlanner::rebuild`] walks the queue
//! from an anchor (the running service's planned end, or `now` when idle)
//! and must be called after any change to the queue, the running service or
//! the configuration.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::duration::calc_duration_min;
use crate::limits::{classify, Classification};
use crate::service::{ServiceType, Speed};
use crate::storage::config::Config;

/// A client waiting in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: String,
    pub service: ServiceType,
    pub speed: Speed,
    pub duration_min: u32,
    #[serde(rename = "startTs", with = "chrono::serde::ts_milliseconds")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endTs", with = "chrono::serde::ts_milliseconds")]
    pub end: DateTime<Utc>,
    pub classification: Classification,
}

impl QueueItem {
    /// New item with a fresh id. Projected times are placeholders until the
    /// next rebuild.
    pub fn new(service: ServiceType, speed: Speed, duration_min: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            service,
            speed,
            duration_min,
            start: now,
            end: now + minutes(duration_min),
            classification: Classification::Ok,
        }
    }

    pub fn label(&self) -> String {
        format!("{} · {}", self.service.label(), self.speed.label())
    }

    /// Whole minutes until this item is projected to start, never negative.
    pub fn waiting_min(&self, now: DateTime<Utc>) -> i64 {
        let ms = (self.start - now).num_milliseconds();
        if ms <= 0 {
            0
        } else {
            (ms + 59_999) / 60_000
        }
    }
}

/// Projected placement of a prospective request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub duration_min: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub classification: Classification,
    /// True when the request would go straight into the chair.
    pub becomes_current_immediately: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueuePlanner {
    items: Vec<QueueItem>,
}

impl QueuePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<QueueItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn head(&self) -> Option<&QueueItem> {
        self.items.first()
    }

    pub fn get(&self, id: &str) -> Option<&QueueItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Where a new request would land, without changing anything.
    ///
    /// It goes straight into the chair only when nothing is running and
    /// nobody is waiting; otherwise it is appended after every existing
    /// commitment. The tail is walked from the anchor rather than read from
    /// the stored projections, which go stale while the chair sits idle.
    pub fn plan_for<Tz: TimeZone>(
        &self,
        config: &Config,
        service: ServiceType,
        speed: Speed,
        running_end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Plan {
        let duration_min = calc_duration_min(config, service, speed);
        let becomes_current_immediately = running_end.is_none() && self.items.is_empty();

        let start = if becomes_current_immediately {
            now
        } else {
            self.tail_end(running_end.unwrap_or(now))
        };
        let end = start + minutes(duration_min);

        Plan {
            duration_min,
            start,
            end,
            classification: classify(config, end, now, tz),
            becomes_current_immediately,
        }
    }

    /// Where the last item ends when the walk starts at `anchor`.
    fn tail_end(&self, anchor: DateTime<Utc>) -> DateTime<Utc> {
        self.items
            .iter()
            .fold(anchor, |cursor, item| cursor + minutes(item.duration_min))
    }

    /// Append without recomputing; callers follow up with [`Self::rebuild`].
    pub fn enqueue(&mut self, item: QueueItem) {
        self.items.push(item);
    }

    /// Recompute every projected start/end and classification in order.
    pub fn rebuild<Tz: TimeZone>(
        &mut self,
        config: &Config,
        running_end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        tz: &Tz,
    ) {
        let mut cursor = running_end.unwrap_or(now);
        for item in &mut self.items {
            item.start = cursor;
            item.end = cursor + minutes(item.duration_min);
            item.classification = classify(config, item.end, now, tz);
            cursor = item.end;
        }
        tracing::debug!(items = self.items.len(), anchor = %running_end.unwrap_or(now), "queue rebuilt");
    }

    /// Re-run the duration rules for every item, keeping order and choices.
    pub fn recompute_durations(&mut self, config: &Config) {
        for item in &mut self.items {
            item.duration_min = calc_duration_min(config, item.service, item.speed);
        }
    }

    pub fn dequeue_head(&mut self) -> Option<QueueItem> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    /// Remove by id. `None` if no such item.
    pub fn remove(&mut self, id: &str) -> Option<QueueItem> {
        let idx = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(idx))
    }
}

fn minutes(n: u32) -> Duration {
    Duration::minutes(i64::from(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, m, 0).unwrap()
    }

    fn push(queue: &mut QueuePlanner, cfg: &Config, service: ServiceType, speed: Speed, now: DateTime<Utc>) {
        let duration = calc_duration_min(cfg, service, speed);
        queue.enqueue(QueueItem::new(service, speed, duration, now));
    }

    #[test]
    fn idle_and_empty_plan_starts_now() {
        let cfg = Config::default();
        let queue = QueuePlanner::new();
        let plan = queue.plan_for(&cfg, ServiceType::Cut, Speed::Normal, None, at(12, 0), &Utc);
        assert!(plan.becomes_current_immediately);
        assert_eq!(plan.start, at(12, 0));
        assert_eq!(plan.end, at(12, 30));
        assert_eq!(plan.classification, Classification::Ok);
    }

    #[test]
    fn idle_late_color_is_over_limit() {
        let cfg = Config::default();
        let queue = QueuePlanner::new();
        let plan = queue.plan_for(&cfg, ServiceType::Color, Speed::Normal, None, at(21, 50), &Utc);
        assert_eq!(plan.end, at(21, 50) + Duration::minutes(170));
        assert_eq!(plan.classification, Classification::OverLimit);
    }

    #[test]
    fn plan_appends_after_running_and_queue() {
        let cfg = Config::default();
        let now = at(9, 0);
        let mut queue = QueuePlanner::new();
        push(&mut queue, &cfg, ServiceType::CutBeard, Speed::Normal, now);
        queue.rebuild(&cfg, Some(at(9, 20)), now, &Utc);

        let plan = queue.plan_for(&cfg, ServiceType::Cut, Speed::Normal, Some(at(9, 20)), now, &Utc);
        assert!(!plan.becomes_current_immediately);
        assert_eq!(plan.start, at(10, 5));
        assert_eq!(plan.end, at(10, 35));
    }

    #[test]
    fn plan_after_running_with_empty_queue() {
        let cfg = Config::default();
        let queue = QueuePlanner::new();
        let plan = queue.plan_for(&cfg, ServiceType::Cut, Speed::Fast, Some(at(9, 20)), at(9, 0), &Utc);
        assert_eq!(plan.start, at(9, 20));
        assert_eq!(plan.duration_min, 25);
    }

    #[test]
    fn idle_with_waiting_clients_appends() {
        let cfg = Config::default();
        let now = at(9, 0);
        let mut queue = QueuePlanner::new();
        push(&mut queue, &cfg, ServiceType::Cut, Speed::Normal, now);
        queue.rebuild(&cfg, None, now, &Utc);
        let plan = queue.plan_for(&cfg, ServiceType::Cut, Speed::Normal, None, now, &Utc);
        assert!(!plan.becomes_current_immediately);
        assert_eq!(plan.start, at(9, 30));
    }

    #[test]
    fn plan_ignores_stale_projections() {
        let cfg = Config::default();
        let mut queue = QueuePlanner::new();
        push(&mut queue, &cfg, ServiceType::Cut, Speed::Normal, at(11, 30));
        queue.rebuild(&cfg, None, at(12, 0), &Utc); // projected 12:00-12:30

        // Twenty idle minutes later the head can start no earlier than now.
        let now = at(12, 20);
        let plan = queue.plan_for(&cfg, ServiceType::Cut, Speed::Normal, None, now, &Utc);
        assert_eq!(plan.start, at(12, 50));
        assert_eq!(plan.end, at(13, 20));
        assert_eq!(plan.classification, Classification::OverLimit);

        queue.enqueue(QueueItem::new(ServiceType::Cut, Speed::Normal, plan.duration_min, now));
        queue.rebuild(&cfg, None, now, &Utc);
        assert_eq!(queue.items()[1].start, plan.start);
        assert_eq!(queue.items()[1].end, plan.end);
    }

    #[test]
    fn rebuild_chains_items_without_gaps() {
        let cfg = Config::default();
        let now = at(9, 0);
        let mut queue = QueuePlanner::new();
        for service in [ServiceType::Cut, ServiceType::CutSeal, ServiceType::Perm, ServiceType::CutBeard] {
            push(&mut queue, &cfg, service, Speed::Normal, now);
        }
        queue.rebuild(&cfg, None, now, &Utc);

        let items = queue.items();
        assert_eq!(items[0].start, now);
        for pair in items.windows(2) {
            assert_eq!(pair[1].start, pair[0].end);
        }
        assert_eq!(items[3].end, now + Duration::minutes(30 + 45 + 150 + 45));
    }

    #[test]
    fn rebuild_is_idempotent() {
        let cfg = Config::default();
        let now = at(11, 0);
        let mut queue = QueuePlanner::new();
        for service in [ServiceType::Color, ServiceType::Cut, ServiceType::Cut] {
            push(&mut queue, &cfg, service, Speed::Slow, now);
        }
        queue.rebuild(&cfg, Some(at(11, 40)), now, &Utc);
        let first = queue.clone();
        queue.rebuild(&cfg, Some(at(11, 40)), now, &Utc);
        assert_eq!(queue, first);
    }

    #[test]
    fn rebuild_classifies_each_item() {
        let cfg = Config::default();
        let now = at(11, 0);
        let mut queue = QueuePlanner::new();
        push(&mut queue, &cfg, ServiceType::Cut, Speed::Normal, now); // 11:30
        push(&mut queue, &cfg, ServiceType::Cut, Speed::Normal, now); // 12:00
        push(&mut queue, &cfg, ServiceType::Cut, Speed::Normal, now); // 12:30
        push(&mut queue, &cfg, ServiceType::Cut, Speed::Normal, now); // 13:00
        push(&mut queue, &cfg, ServiceType::Cut, Speed::Normal, now); // 13:30
        queue.rebuild(&cfg, None, now, &Utc);
        let classes: Vec<_> = queue.items().iter().map(|i| i.classification).collect();
        assert_eq!(
            classes,
            vec![
                Classification::Ok,
                Classification::Ok,
                Classification::Ok,
                Classification::Ok,
                Classification::OverLimit,
            ]
        );
    }

    #[test]
    fn removing_only_item_leaves_nothing_behind() {
        let cfg = Config::default();
        let now = at(9, 0);
        let mut queue = QueuePlanner::new();
        push(&mut queue, &cfg, ServiceType::Cut, Speed::Normal, now);
        let id = queue.items()[0].id.clone();
        assert!(queue.remove(&id).is_some());
        queue.rebuild(&cfg, None, now, &Utc);
        assert!(queue.is_empty());
        assert!(queue.remove(&id).is_none());
    }

    #[test]
    fn dequeue_head_is_fifo_and_empty_is_none() {
        let cfg = Config::default();
        let now = at(9, 0);
        let mut queue = QueuePlanner::new();
        push(&mut queue, &cfg, ServiceType::Cut, Speed::Normal, now);
        push(&mut queue, &cfg, ServiceType::Color, Speed::Normal, now);
        assert_eq!(queue.dequeue_head().unwrap().service, ServiceType::Cut);
        assert_eq!(queue.dequeue_head().unwrap().service, ServiceType::Color);
        assert!(queue.dequeue_head().is_none());
    }

    #[test]
    fn recompute_durations_only_touches_fast_items_when_fast_delta_changes() {
        let mut cfg = Config::default();
        let now = at(9, 0);
        let mut queue = QueuePlanner::new();
        push(&mut queue, &cfg, ServiceType::Cut, Speed::Fast, now);
        push(&mut queue, &cfg, ServiceType::Cut, Speed::Normal, now);
        push(&mut queue, &cfg, ServiceType::Color, Speed::Slow, now);
        let before: Vec<_> = queue.items().iter().map(|i| i.duration_min).collect();

        cfg.speed_delta_fast = -12;
        queue.recompute_durations(&cfg);
        let after: Vec<_> = queue.items().iter().map(|i| i.duration_min).collect();

        assert_eq!(before, vec![25, 30, 185]);
        assert_eq!(after, vec![18, 30, 185]);
    }

    #[test]
    fn waiting_minutes_round_up_and_clamp() {
        let now = at(9, 0);
        let mut item = QueueItem::new(ServiceType::Cut, Speed::Normal, 30, now);
        assert_eq!(item.waiting_min(now), 0);
        item.start = now + Duration::seconds(61);
        assert_eq!(item.waiting_min(now), 2);
        item.start = now - Duration::minutes(3);
        assert_eq!(item.waiting_min(now), 0);
    }
}
