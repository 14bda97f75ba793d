//! Display formatting for money, dates and distances

use chrono::{DateTime, NaiveDate, Utc};
use unicode_width::UnicodeWidthChar;

/// Rupee sign used for all amounts
pub const CURRENCY_SYMBOL: &str = "₹";

/// Format an amount the way the en-IN locale does, always with two decimals.
///
/// Digits are grouped Indian style: the last three, then pairs
/// (`₹12,34,567.50`).
pub fn format_currency(amount: f64) -> String {
    let paise = (amount.abs() * 100.0).round() as u64;
    let rupees = paise / 100;
    let fraction = paise % 100;
    let sign = if amount < 0.0 && paise > 0 { "-" } else { "" };
    format!(
        "{sign}{CURRENCY_SYMBOL}{}.{fraction:02}",
        group_indian(rupees)
    )
}

fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Format a calendar date like `5 Jan 2025`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

/// Format a distance in kilometres
pub fn format_distance(km: f64) -> String {
    format!("{km:.1} km")
}

/// Format a rating with one decimal
pub fn format_rating(rating: f64) -> String {
    format!("{rating:.1}")
}

/// Relative time such as `5m ago`
pub fn relative_time(at: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(at);

    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}

/// Truncate to at most `max_width` terminal columns, adding `…` when cut
pub fn truncate(text: &str, max_width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return text.to_string();
    }

    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push('…');
    out
}
