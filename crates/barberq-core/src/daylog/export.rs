//! Text export of the day log.
//!
//! A two-line header (service count, total realized minutes), a blank line,
//! then one line per entry: `HH:MM-HH:MM  Label · Speed  X min (est. Y min)`.

use chrono::FixedOffset;

use super::DayLog;

/// Plain-text rendering of the log, oldest service first, with clock times
/// in the zone of `offset`.
pub fn export_text(log: &DayLog, offset: &FixedOffset) -> String {
    let summary = log.summary();
    let mut out = format!(
        "Services: {}\nTotal time: {} min\n",
        summary.count, summary.total_real_min
    );
    if summary.count > 0 {
        out.push('\n');
    }
    for entry in log.sorted() {
        out.push_str(&format!(
            "{}-{}  {} · {}  {} min (est. {} min)\n",
            entry.start_ts.with_timezone(offset).format("%H:%M"),
            entry.end_ts.with_timezone(offset).format("%H:%M"),
            entry.service_key.label(),
            entry.speed.label(),
            entry.real_min,
            entry.estimated_min,
        ));
    }
    out
}
