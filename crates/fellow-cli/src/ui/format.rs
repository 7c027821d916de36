//! Small text formatters shared by the command handlers.

use chrono::{DateTime, Utc};

/// Shorten `s` to at most `max_len` characters, ending in `...` when
/// anything was cut. Counts characters, not bytes, so multi-byte text
/// never splits mid-character.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return ".".repeat(max_len);
    }
    let kept: String = s.chars().take(max_len - 3).collect();
    format!("{kept}...")
}

/// Render a timestamp the way a human scans a status line: recent times
/// relative, anything older than a week as a plain date.
pub fn format_relative_time(timestamp: DateTime<Utc>) -> String {
    const HOUR: i64 = 3600;
    const DAY: i64 = 24 * HOUR;

    let elapsed = Utc::now().signed_duration_since(timestamp).num_seconds();

    match elapsed {
        s if s < 0 => timestamp.format("%Y-%m-%d").to_string(),
        s if s < 60 => "just now".to_string(),
        s if s < HOUR => format!("{} mins ago", s / 60),
        s if s < DAY => format!("{}h ago", s / HOUR),
        s if s < 7 * DAY => format!("{}d ago", s / DAY),
        _ => timestamp.format("%Y-%m-%d").to_string(),
    }
}

/// Insert `,` thousands separators into an integer.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn truncation_preserves_short_strings() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello", 5), "hello");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn truncation_appends_ellipsis() {
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hello world", 5), "he...");
        assert_eq!(truncate_str("hello", 3), "...");
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(format_relative_time(now), "just now");
        assert_eq!(
            format_relative_time(now - Duration::minutes(5)),
            "5 mins ago"
        );
        assert_eq!(format_relative_time(now - Duration::hours(3)), "3h ago");
        assert_eq!(format_relative_time(now - Duration::days(2)), "2d ago");
        // Older than a week: a date, not a delta
        let old = format_relative_time(now - Duration::days(30));
        assert!(old.contains('-'));
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(12345), "12,345");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }
}
