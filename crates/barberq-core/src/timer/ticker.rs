//! Periodic re-evaluation control.
//!
//! The coordinator starts the ticker when a service starts and stops it when
//! the session goes idle. Hosts decide what a tick cadence actually is; the
//! coordinator only asks whether ticks are currently wanted.

pub trait Ticker {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_active(&self) -> bool;
}

/// Ticker driven by the host (or a test) calling `Coordinator::tick` directly.
#[derive(Debug, Default, Clone)]
pub struct ManualTicker {
    active: bool,
    starts: u32,
    stops: u32,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `start` was called on an inactive ticker.
    pub fn starts(&self) -> u32 {
        self.starts
    }

    /// How many times `stop` was called on an active ticker.
    pub fn stops(&self) -> u32 {
        self.stops
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self) {
        if !self.active {
            self.active = true;
            self.starts += 1;
        }
    }

    fn stop(&mut self) {
        if self.active {
            self.active = false;
            self.stops += 1;
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
