// src/format.rs
//! Display formatting. Pure functions; nothing here touches the network.

use chrono::{DateTime, Utc};
use scraper::Html;

use crate::types::timestamp;

pub const DEFAULT_CURRENCY: &str = "NGN";

/// `Jan 5, 2024`, or an empty string for missing / unparseable input
pub fn format_date(raw: Option<&str>) -> String {
    format_timestamp(raw.and_then(timestamp::parse))
}

pub fn format_timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

/// `Jan 5, 2024, 2:30 PM`
pub fn format_datetime(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|dt| dt.format("%b %-d, %Y, %-I:%M %p").to_string())
        .unwrap_or_default()
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    Some(match code {
        "NGN" => "₦",
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "KES" => "KSh",
        "GHS" => "GH₵",
        "ZAR" => "R",
        "INR" => "₹",
        "JPY" => "¥",
        "CAD" => "CA$",
        "AUD" => "A$",
        _ => return None,
    })
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// `₦1,000`, `$1,250.50`, `XOF 3,000`
pub fn format_currency(amount: f64, currency: &str) -> String {
    if !amount.is_finite() {
        return String::new();
    }

    let code = match currency.trim() {
        "" => DEFAULT_CURRENCY.to_string(),
        code => code.to_uppercase(),
    };

    let cents = (amount.abs() * 100.0).round() as u64;
    let mut number = group_thousands(cents / 100);
    if cents % 100 != 0 {
        number.push_str(&format!(".{:02}", cents % 100));
    }

    let formatted = match currency_symbol(&code) {
        Some(symbol) => format!("{}{}", symbol, number),
        None => format!("{} {}", code, number),
    };

    if amount < 0.0 && cents != 0 {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

pub fn format_salary_range(min: Option<f64>, max: Option<f64>, currency: Option<&str>) -> String {
    let currency = currency.unwrap_or(DEFAULT_CURRENCY);
    match (min, max) {
        (Some(min), Some(max)) if min == max => format_currency(min, currency),
        (Some(min), Some(max)) => format!(
            "{} - {}",
            format_currency(min, currency),
            format_currency(max, currency)
        ),
        (Some(min), None) => format!("From {}", format_currency(min, currency)),
        (None, Some(max)) => format!("Up to {}", format_currency(max, currency)),
        (None, None) => "Not specified".to_string(),
    }
}

/// Cut to `max_chars` characters, ending in `...` when anything was dropped
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{}...", kept.trim_end())
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

pub fn time_ago(value: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - value).num_seconds();
    if seconds < 0 {
        return format_timestamp(Some(value));
    }

    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if seconds < 60 {
        "just now".to_string()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days < 30 {
        plural(days, "day")
    } else if days < 365 {
        plural(days / 30, "month")
    } else {
        plural(days / 365, "year")
    }
}

/// Visible text of rich-text (HTML) content, whitespace collapsed
pub fn html_excerpt(html: &str, max_chars: usize) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&collapsed, max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_format_date_handles_missing_values() {
        assert_eq!(format_date(None), "");
        assert_eq!(format_date(Some("")), "");
        assert_eq!(format_date(Some("not a date")), "");
        assert_eq!(format_timestamp(None), "");
    }

    #[test]
    fn test_format_date_shapes() {
        assert_eq!(format_date(Some("2024-01-05T10:00:00Z")), "Jan 5, 2024");
        assert_eq!(format_date(Some("2024-12-25")), "Dec 25, 2024");

        let dt = Utc.with_ymd_and_hms(2024, 1, 5, 14, 30, 0).unwrap();
        assert_eq!(format_datetime(Some(dt)), "Jan 5, 2024, 2:30 PM");
    }

    #[test]
    fn test_format_currency_naira() {
        let formatted = format_currency(1000.0, "NGN");
        assert!(formatted.contains("1,000"));
        assert!(formatted.contains('₦'));
        assert_eq!(formatted, "₦1,000");
    }

    #[test]
    fn test_format_currency_variants() {
        assert_eq!(format_currency(1250.5, "usd"), "$1,250.50");
        assert_eq!(format_currency(1234567.0, "EUR"), "€1,234,567");
        assert_eq!(format_currency(3000.0, "XOF"), "XOF 3,000");
        assert_eq!(format_currency(-20.0, "GBP"), "-£20");
        assert_eq!(format_currency(999.0, ""), "₦999");
        assert_eq!(format_currency(f64::NAN, "USD"), "");
    }

    #[test]
    fn test_salary_range() {
        assert_eq!(
            format_salary_range(Some(100_000.0), Some(200_000.0), Some("NGN")),
            "₦100,000 - ₦200,000"
        );
        assert_eq!(format_salary_range(Some(5.0), None, Some("USD")), "From $5");
        assert_eq!(format_salary_range(None, Some(5.0), None), "Up to ₦5");
        assert_eq!(format_salary_range(None, None, None), "Not specified");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Hello brave new world", 11), "Hello brave...");
        assert_eq!(truncate("Hello world", 6), "Hello...");
        assert_eq!(truncate("ñandú ñandú", 5), "ñandú...");
    }

    #[test]
    fn test_time_ago() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(time_ago(now - Duration::seconds(20), now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(time_ago(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(time_ago(now - Duration::days(3), now), "3 days ago");
        assert_eq!(time_ago(now - Duration::days(65), now), "2 months ago");
        assert_eq!(time_ago(now - Duration::days(800), now), "2 years ago");
    }

    #[test]
    fn test_html_excerpt() {
        let html = "<h2>Title</h2>\n<p>First   paragraph with <a href=\"#\">a link</a>.</p>";
        assert_eq!(html_excerpt(html, 200), "Title First paragraph with a link .");
        assert_eq!(html_excerpt("<p>abcdef</p>", 3), "abc...");
    }
}
