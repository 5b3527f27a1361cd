use std::io::Write;

use barberq_core::{Coordinator, Database, Event, Feedback, FeedbackKind, SystemClock};

/// Open the coordinator over the on-disk store.
pub fn open() -> Result<Coordinator, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    Ok(Coordinator::new(db, SystemClock).with_feedback(TerminalFeedback))
}

/// Rings the terminal bell for warnings; everything else is only traced.
pub struct TerminalFeedback;

impl Feedback for TerminalFeedback {
    fn notify(&mut self, kind: FeedbackKind) {
        tracing::debug!(?kind, "feedback");
        if kind == FeedbackKind::Warn {
            let mut err = std::io::stderr();
            let _ = err.write_all(b"\x07");
            let _ = err.flush();
        }
    }
}

pub fn print_events(events: &[Event]) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    Ok(())
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
