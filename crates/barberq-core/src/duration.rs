//! Service duration rules.
//!
//! ```text
//! cut_seal  : max(5, base(cut) + seal[speed])
//! otherwise : max(5, base(type) + speed_adjustment(type, speed))
//! ```
//!
//! Callers must re-run the calculation after a configuration change; queued
//! items keep whatever value they were given until then.
//!
//! The sums saturate and the result is capped at [`MAX_SERVICE_MIN`], so an
//! unsanitized `Config` cannot overflow.

use crate::service::{ServiceType, Speed};
use crate::storage::config::{Config, MAX_CONFIG_MIN, MIN_SERVICE_MIN};

/// Services whose normal-speed length exceeds this use the long slow delta.
pub const SLOW_LONG_THRESHOLD_MIN: i64 = 60;

/// Longest estimate ever produced: the largest base plus the largest delta
/// a sanitized config allows.
pub const MAX_SERVICE_MIN: i64 = 2 * MAX_CONFIG_MIN;

/// Estimated minutes for `service` at `speed`, in `[5, MAX_SERVICE_MIN]`.
pub fn calc_duration_min(config: &Config, service: ServiceType, speed: Speed) -> u32 {
    let cut = config.service_base_min.cut;
    let raw = match config.service_base_min.get(service) {
        None => cut.saturating_add(config.seal_delta_min.get(speed)),
        Some(base) => base.saturating_add(speed_adjustment(config, service, speed)),
    };
    u32::try_from(raw.clamp(MIN_SERVICE_MIN, MAX_SERVICE_MIN)).unwrap_or(u32::MAX)
}

/// Signed speed adjustment for a non-composite service.
pub fn speed_adjustment(config: &Config, service: ServiceType, speed: Speed) -> i64 {
    match speed {
        Speed::Normal => 0,
        Speed::Fast => config.speed_delta_fast,
        Speed::Slow => {
            if base_for_slow_rule(config, service) > SLOW_LONG_THRESHOLD_MIN {
                config.speed_delta_slow_long
            } else {
                config.speed_delta_slow_short
            }
        }
    }
}

fn base_for_slow_rule(config: &Config, service: ServiceType) -> i64 {
    config
        .service_base_min
        .get(service)
        .unwrap_or_else(|| config.service_base_min.cut.saturating_add(config.seal_delta_min.normal))
}
