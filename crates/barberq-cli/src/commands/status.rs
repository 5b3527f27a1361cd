use std::thread;
use std::time::Duration;

use barberq_core::{Renderer, Snapshot};

use crate::common::{open, print_events, print_json};

pub fn run_status() -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open()?;
    if let Some(event) = app.tick() {
        print_events(&[event])?;
    }
    print_json(&app.snapshot())?;
    Ok(())
}

/// One status line per re-evaluation.
struct LineRenderer;

impl Renderer for LineRenderer {
    fn render(&mut self, snapshot: &Snapshot) {
        let Some(running) = &snapshot.running else {
            println!("idle, {} waiting", snapshot.queue.len());
            return;
        };
        if running.overtime_ms > 0 {
            println!(
                "{}  overtime {}  ({} waiting)",
                running.label,
                format_ms(running.overtime_ms),
                snapshot.queue.len()
            );
        } else {
            println!(
                "{}  {} left  ({} waiting)",
                running.label,
                format_ms(running.remaining_ms),
                snapshot.queue.len()
            );
        }
    }
}

fn format_ms(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn run_watch(interval_secs: u64, max_ticks: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open()?.with_renderer(LineRenderer);
    if !app.ticker_active() {
        println!("no service running");
        return Ok(());
    }

    let mut ticks = 0u64;
    while app.ticker_active() {
        if let Some(event) = app.tick() {
            print_events(&[event])?;
        }
        ticks += 1;
        if max_ticks.is_some_and(|max| ticks >= max) {
            break;
        }
        thread::sleep(Duration::from_secs(interval_secs));
    }
    Ok(())
}
