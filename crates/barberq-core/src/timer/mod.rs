mod engine;
mod ticker;

pub use engine::{
    realized_minutes, FinishedService, RunningService, SessionEngine, SessionState, SubMode,
    WARNING_WINDOW_MS,
};
pub use ticker::{ManualTicker, Ticker};
