//! Console rendering of holidays and notifications.
//!
//! Holiday listings are grouped by month in date order, with today's
//! holiday highlighted and past ones marked.

use std::fmt::Write;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use holidaywatch_core::{HolidayRecord, Notification};

// ── Public API ──

/// One-paragraph description of the next holiday relative to `today`.
pub fn describe_upcoming(next: Option<&HolidayRecord>, today: NaiveDate) -> String {
    let Some(h) = next else {
        return "No upcoming holidays found".to_string();
    };
    match (h.date - today).num_days() {
        0 => format!("Today is a Holiday!\n{} ({})", h.name, h.day_of_week),
        1 => format!("Holiday Tomorrow!\n{} ({})", h.name, h.day_of_week),
        days => format!(
            "Next Holiday: {}\nIn {} days ({}, {})",
            h.name,
            days,
            h.date.format("%Y-%m-%d"),
            h.day_of_week
        ),
    }
}

/// `[timestamp] title` followed by the message lines.
pub fn format_notification(n: &Notification, at: NaiveDateTime) -> String {
    format!("[{}] {}\n{}", at.format("%Y-%m-%d %H:%M:%S"), n.title, n.message)
}

/// Print a holiday listing grouped by month.
pub fn print_holidays(records: &[&HolidayRecord], today: NaiveDate) {
    print!("{}", format_holidays(records, today));
}

// ── Listing ──

fn format_holidays(records: &[&HolidayRecord], today: NaiveDate) -> String {
    if records.is_empty() {
        return "No holidays found.\n".to_string();
    }

    let mut out = String::new();
    let mut current: Option<(i32, u32)> = None;
    for h in records {
        let group = (h.date.year(), h.date.month());
        if current != Some(group) {
            if current.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "{}", h.date.format("%B %Y"));
            current = Some(group);
        }

        let marker = if h.date == today {
            "  <- today"
        } else if h.date < today {
            "  (past)"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  {:02} {:<10} {:<40} {}{}",
            h.date.day(),
            h.date.format("%B").to_string(),
            h.name,
            h.day_of_week,
            marker
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn upcoming_today_tomorrow_and_later() {
        let h = HolidayRecord::new(date(2025, 1, 1), "New Year", "Wednesday");
        assert_eq!(
            describe_upcoming(Some(&h), date(2025, 1, 1)),
            "Today is a Holiday!\nNew Year (Wednesday)"
        );
        assert_eq!(
            describe_upcoming(Some(&h), date(2024, 12, 31)),
            "Holiday Tomorrow!\nNew Year (Wednesday)"
        );
        assert_eq!(
            describe_upcoming(Some(&h), date(2024, 12, 20)),
            "Next Holiday: New Year\nIn 12 days (2025-01-01, Wednesday)"
        );
        assert_eq!(describe_upcoming(None, date(2025, 1, 1)), "No upcoming holidays found");
    }

    #[test]
    fn notification_line() {
        let n = Notification::warning("No holidays found or error occurred");
        let at = date(2025, 1, 1).and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(
            format_notification(&n, at),
            "[2025-01-01 09:30:00] Warning\nNo holidays found or error occurred"
        );
    }

    #[test]
    fn listing_groups_by_month_and_marks_days() {
        let a = HolidayRecord::new(date(2025, 1, 1), "New Year", "Wednesday");
        let b = HolidayRecord::new(date(2025, 1, 29), "Chinese New Year", "Wednesday");
        let c = HolidayRecord::new(date(2025, 2, 1), "Federal Territory Day", "Saturday");
        let text = format_holidays(&[&a, &b, &c], date(2025, 1, 29));

        let headers: Vec<&str> = text.lines().filter(|l| !l.starts_with(' ')).collect();
        assert_eq!(headers, vec!["January 2025", "", "February 2025"]);
        assert!(text.lines().nth(1).unwrap().ends_with("(past)"));
        assert!(text.lines().nth(2).unwrap().ends_with("<- today"));
        assert!(text.lines().last().unwrap().trim_end().ends_with("Saturday"));
    }

    #[test]
    fn listing_uses_full_month_names() {
        let h = HolidayRecord::new(date(2025, 9, 16), "Malaysia Day", "Tuesday");
        let text = format_holidays(&[&h], date(2025, 1, 1));
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("September 2025"));
        assert!(lines.next().unwrap().starts_with("  16 September  Malaysia Day "));
    }

    #[test]
    fn empty_listing() {
        assert_eq!(format_holidays(&[], date(2025, 1, 1)), "No holidays found.\n");
    }
}
