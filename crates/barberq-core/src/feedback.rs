//! Qualitative user feedback (sound, vibration) requested by the engine.
//!
//! The engine only says what kind of moment it is; how that sounds or feels
//! is up to the host.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    /// A plan was previewed.
    Open,
    /// A request was accepted or the next client was started.
    Select,
    /// A service was finished or cancelled.
    Soft,
    /// Something was deleted.
    Delete,
    /// A plan was refused or a service ran into overtime.
    Warn,
}

pub trait Feedback {
    fn notify(&mut self, kind: FeedbackKind);
}

/// Feedback sink that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentFeedback;

impl Feedback for SilentFeedback {
    fn notify(&mut self, _kind: FeedbackKind) {}
}
