//! Console output.
//!
//! Colour-coded status lines for each account and action, plus the
//! countdown shown while waiting. Status lines go through `StatusSink` so
//! tests can capture exactly what would be printed.

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use std::io::Write;

/// Severity/colour of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Account header.
    Account,
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: LineKind,
    pub text: String,
}

impl StatusLine {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Destination for user-facing status lines.
pub trait StatusSink: Send {
    fn emit(&mut self, line: StatusLine);
}

/// Collects lines in memory.
impl StatusSink for Vec<StatusLine> {
    fn emit(&mut self, line: StatusLine) {
        self.push(line);
    }
}

/// Prints coloured lines to stdout.
#[derive(Debug, Default)]
pub struct Console;

impl StatusSink for Console {
    fn emit(&mut self, line: StatusLine) {
        if line.kind == LineKind::Account {
            println!();
        }
        println!("{}", paint(&line));
    }
}

fn paint(line: &StatusLine) -> colored::ColoredString {
    let text = line.text.as_str();
    match line.kind {
        LineKind::Account => text.cyan(),
        LineKind::Info => text.blue().bold(),
        LineKind::Success => text.green().bold(),
        LineKind::Warning => text.yellow().bold(),
        LineKind::Error => text.red().bold(),
    }
}

/// Resume time for a cooldown, in the local timezone
/// (e.g. "Oct 15, 2026, 9:05 PM").
pub fn format_blocked_time(until: DateTime<Utc>) -> String {
    until
        .with_timezone(&Local)
        .format("%b %-d, %Y, %-I:%M %p")
        .to_string()
}

/// One frame of the countdown display.
pub fn countdown_text(remaining_secs: u64) -> String {
    let hours = remaining_secs / 3600;
    let minutes = (remaining_secs % 3600) / 60;
    let secs = remaining_secs % 60;
    format!("Waiting {hours}h:{minutes}m:{secs}s to continue...")
}

/// Redraw the countdown in place.
pub fn render_countdown(remaining_secs: u64) {
    let mut out = std::io::stdout();
    let _ = write!(out, "\r{}", countdown_text(remaining_secs));
    let _ = out.flush();
}

/// Erase the countdown line.
pub fn clear_countdown() {
    let mut out = std::io::stdout();
    let _ = write!(out, "\r{}\r", " ".repeat(60));
    let _ = out.flush();
}
