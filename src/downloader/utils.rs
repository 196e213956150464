// Helper functions shared by the renderer and the session

use std::time::Duration;

use regex::Regex;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Parse a backend cool-down hint such as "30s", "15 minutes" or "1h".
///
/// A bare number is read as seconds. Returns `None` for anything else.
pub fn parse_retry_after(hint: &str) -> Option<Duration> {
    lazy_static::lazy_static! {
        static ref RETRY_RE: Regex = Regex::new(
            r"(?i)^\s*(\d+(?:\.\d+)?)\s*(ms|milliseconds?|s|secs?|seconds?|m|mins?|minutes?|h|hrs?|hours?)?\s*$"
        ).unwrap();
    }

    let caps = RETRY_RE.captures(hint)?;
    let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps
        .get(2)
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_default();

    let seconds = match unit.as_str() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => amount,
        "ms" | "millisecond" | "milliseconds" => amount / 1000.0,
        "m" | "min" | "mins" | "minute" | "minutes" => amount * 60.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => amount * 3600.0,
        _ => return None,
    };

    Duration::try_from_secs_f64(seconds).ok()
}

/// Compact human duration: "45s", "2m 5s", "1h 3m"
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 && seconds > 0 {
        format!("{}m {}s", minutes, seconds)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", seconds)
    }
}

/// Unix seconds as RFC 3339, or `None` when out of range
pub fn format_timestamp(unix_seconds: i64) -> Option<String> {
    OffsetDateTime::from_unix_timestamp(unix_seconds)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

/// Media length in seconds as "m:ss" or "h:mm:ss"
pub fn format_media_length(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Thousands separators: 1234567 -> "1,234,567"
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
