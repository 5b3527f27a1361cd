//! Duration rules and shift limits.
//!
//! The serialized shape is the persisted one: camelCase keys,
//! `limits` as a two-element array of `{hour, min, label}`.
//!
//! Loading never fails. Every field missing from the stored document, or
//! holding something that is not a number, is backfilled from the defaults,
//! and the merged result is sanitized (service bases floored at
//! [`MIN_SERVICE_MIN`], seal deltas and warning threshold non-negative,
//! limits clamped to a real clock time).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;
use crate::service::{ServiceType, Speed};

/// Floor for every computed or configured service duration.
pub const MIN_SERVICE_MIN: i64 = 5;

/// Bound on every configured minute value, in either direction: one day.
pub const MAX_CONFIG_MIN: i64 = 24 * 60;

/// Base duration per service, in minutes. The composite cut+seal has no entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBases {
    pub cut: i64,
    pub cut_beard: i64,
    pub cut_beard_seal: i64,
    pub color: i64,
    pub perm: i64,
}

impl ServiceBases {
    /// Base minutes for `service`, `None` for the composite seal type.
    pub fn get(&self, service: ServiceType) -> Option<i64> {
        match service {
            ServiceType::Cut => Some(self.cut),
            ServiceType::CutSeal => None,
            ServiceType::CutBeard => Some(self.cut_beard),
            ServiceType::CutBeardSeal => Some(self.cut_beard_seal),
            ServiceType::Color => Some(self.color),
            ServiceType::Perm => Some(self.perm),
        }
    }

    fn slots_mut(&mut self) -> [(&'static str, &mut i64); 5] {
        [
            ("cut", &mut self.cut),
            ("cut_beard", &mut self.cut_beard),
            ("cut_beard_seal", &mut self.cut_beard_seal),
            ("color", &mut self.color),
            ("perm", &mut self.perm),
        ]
    }
}

/// Extra minutes a seal finish adds to a plain cut, per speed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealDeltas {
    pub fast: i64,
    pub normal: i64,
    pub slow: i64,
}

impl SealDeltas {
    pub fn get(&self, speed: Speed) -> i64 {
        match speed {
            Speed::Fast => self.fast,
            Speed::Normal => self.normal,
            Speed::Slow => self.slow,
        }
    }

    fn slots_mut(&mut self) -> [(&'static str, &mut i64); 3] {
        [
            ("fast", &mut self.fast),
            ("normal", &mut self.normal),
            ("slow", &mut self.slow),
        ]
    }
}

/// A daily cutoff clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftLimit {
    pub hour: u32,
    pub min: u32,
    #[serde(default)]
    pub label: String,
}

impl ShiftLimit {
    pub fn new(hour: u32, min: u32, label: impl Into<String>) -> Self {
        Self {
            hour,
            min,
            label: label.into(),
        }
    }

    pub fn minutes_of_day(&self) -> u32 {
        self.hour * 60 + self.min
    }
}

/// Scheduling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub service_base_min: ServiceBases,
    pub seal_delta_min: SealDeltas,
    pub speed_delta_fast: i64,
    pub speed_delta_slow_short: i64,
    pub speed_delta_slow_long: i64,
    pub yellow_threshold_min: i64,
    pub limits: [ShiftLimit; 2],
}

impl Default for ServiceBases {
    fn default() -> Self {
        Self {
            cut: 30,
            cut_beard: 45,
            cut_beard_seal: 60,
            color: 170,
            perm: 150,
        }
    }
}

impl Default for SealDeltas {
    fn default() -> Self {
        Self {
            fast: 10,
            normal: 15,
            slow: 20,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_base_min: ServiceBases::default(),
            seal_delta_min: SealDeltas::default(),
            speed_delta_fast: -5,
            speed_delta_slow_short: 5,
            speed_delta_slow_long: 15,
            yellow_threshold_min: 15,
            limits: [
                ShiftLimit::new(13, 0, "Midday"),
                ShiftLimit::new(22, 0, "Closing"),
            ],
        }
    }
}

/// What happened to a `set` request whose key was valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Applied,
    /// Value was not a number; the prior value stays in force.
    Kept,
}

impl Config {
    /// Parse a stored document, falling back to defaults on any problem.
    pub fn from_json_lenient(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value_lenient(&value),
            Err(e) => {
                tracing::warn!(error = %e, "stored config is not valid JSON, using defaults");
                Self::default()
            }
        }
    }

    /// Merge a JSON document over the defaults, field by field.
    pub fn from_value_lenient(value: &Value) -> Self {
        let mut cfg = Self::default();
        let Some(obj) = value.as_object() else {
            tracing::warn!("stored config is not an object, using defaults");
            return cfg;
        };

        if let Some(bases) = obj.get("serviceBaseMin") {
            for (key, slot) in cfg.service_base_min.slots_mut() {
                overlay_i64(slot, bases.get(key));
            }
        }
        if let Some(seal) = obj.get("sealDeltaMin") {
            for (key, slot) in cfg.seal_delta_min.slots_mut() {
                overlay_i64(slot, seal.get(key));
            }
        }
        overlay_i64(&mut cfg.speed_delta_fast, obj.get("speedDeltaFast"));
        overlay_i64(&mut cfg.speed_delta_slow_short, obj.get("speedDeltaSlowShort"));
        overlay_i64(&mut cfg.speed_delta_slow_long, obj.get("speedDeltaSlowLong"));
        overlay_i64(&mut cfg.yellow_threshold_min, obj.get("yellowThresholdMin"));

        if let Some(Value::Array(limits)) = obj.get("limits") {
            for (slot, stored) in cfg.limits.iter_mut().zip(limits.iter()) {
                let mut hour = i64::from(slot.hour);
                let mut min = i64::from(slot.min);
                overlay_i64(&mut hour, stored.get("hour"));
                overlay_i64(&mut min, stored.get("min"));
                slot.hour = hour.clamp(0, 23) as u32;
                slot.min = min.clamp(0, 59) as u32;
                if let Some(Value::String(label)) = stored.get("label") {
                    slot.label = label.clone();
                }
            }
        }

        cfg.sanitize();
        cfg
    }

    /// Enforce the numeric invariants in place.
    ///
    /// Every minute value ends up within one day: bases in
    /// `[MIN_SERVICE_MIN, MAX_CONFIG_MIN]`, seal deltas and the warning
    /// threshold in `[0, MAX_CONFIG_MIN]`, speed deltas in
    /// `[-MAX_CONFIG_MIN, MAX_CONFIG_MIN]`.
    pub fn sanitize(&mut self) {
        for (_, slot) in self.service_base_min.slots_mut() {
            *slot = (*slot).clamp(MIN_SERVICE_MIN, MAX_CONFIG_MIN);
        }
        for (_, slot) in self.seal_delta_min.slots_mut() {
            *slot = (*slot).clamp(0, MAX_CONFIG_MIN);
        }
        for delta in [
            &mut self.speed_delta_fast,
            &mut self.speed_delta_slow_short,
            &mut self.speed_delta_slow_long,
        ] {
            *delta = (*delta).clamp(-MAX_CONFIG_MIN, MAX_CONFIG_MIN);
        }
        self.yellow_threshold_min = self.yellow_threshold_min.clamp(0, MAX_CONFIG_MIN);
        for limit in &mut self.limits {
            limit.hour = limit.hour.min(23);
            limit.min = limit.min.min(59);
        }
    }

    /// Limits ordered earliest first.
    pub fn ordered_limits(&self) -> (&ShiftLimit, &ShiftLimit) {
        let [a, b] = &self.limits;
        if a.minutes_of_day() <= b.minutes_of_day() {
            (a, b)
        } else {
            (b, a)
        }
    }

    fn get_json_value_by_path<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = match current {
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                other => other.get(part)?,
            };
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut Value,
        key: &str,
        value: &str,
    ) -> Result<SetOutcome, ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let parts: Vec<&str> = key.split('.').collect();
        let (leaf, parents) = parts.split_last().ok_or_else(unknown)?;
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        for part in parents {
            current = match current {
                Value::Array(items) => {
                    let idx = part.parse::<usize>().map_err(|_| unknown())?;
                    items.get_mut(idx).ok_or_else(unknown)?
                }
                other => other.get_mut(*part).ok_or_else(unknown)?,
            };
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(*leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            Value::Number(_) => match parse_number(value) {
                Some(n) => Value::Number(n.into()),
                None => {
                    tracing::debug!(key, value, "non-numeric input, keeping prior value");
                    return Ok(SetOutcome::Kept);
                }
            },
            Value::Object(_) | Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                })?
            }
            _ => Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(SetOutcome::Applied)
    }

    /// Get a config value as string by dot-separated key
    /// (e.g. `serviceBaseMin.color`, `limits.1.hour`).
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key.
    ///
    /// A non-numeric value for a numeric field leaves the field unchanged and
    /// reports [`SetOutcome::Kept`]. The result is re-sanitized, so out of
    /// range numbers are clamped rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] if the key does not name a field,
    /// or [`ConfigError::InvalidValue`] for malformed JSON on an object key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<SetOutcome, ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let outcome = Self::set_json_value_by_path(&mut json, key, value)?;
        if outcome == SetOutcome::Applied {
            *self = Self::from_value_lenient(&json);
        }
        Ok(outcome)
    }
}

fn parse_number(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.round() as i64)
}

fn overlay_i64(slot: &mut i64, value: Option<&Value>) {
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Some(Value::String(s)) => parse_number(s),
        _ => None,
    };
    if let Some(n) = parsed {
        *slot = n;
    }
}
