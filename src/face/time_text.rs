/// Time string formatting and change detection.
use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// 12-hour clock, no leading zero, no seconds ("3:05", "12:40").
pub const TIME_FORMAT: &str = "%-I:%M";

pub fn format_time<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format(TIME_FORMAT).to_string()
}

/// Remembers the last displayed time string so placement only reruns
/// when the visible text actually changes.
#[derive(Debug, Default)]
pub struct TimeChangeDetector {
    last: String,
}

impl TimeChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true (and stores `text`) if it differs from the last one seen.
    pub fn observe(&mut self, text: &str) -> bool {
        if self.last == text {
            return false;
        }
        self.last.clear();
        self.last.push_str(text);
        true
    }
}
