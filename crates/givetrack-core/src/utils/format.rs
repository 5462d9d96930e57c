use rust_decimal::Decimal;

/// Currency symbol shown before amounts
const CURRENCY_SYMBOL: &str = "₹";

/// Format an amount for display: `₹1,500` or `₹250.75`
pub fn format_amount(amount: Decimal) -> String {
    let normalized = amount.normalize();
    let sign = if normalized.is_sign_negative() { "-" } else { "" };
    let text = normalized.abs().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w.to_string(), Some(f.to_string())),
        None => (text, None),
    };

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match fraction {
        Some(f) => format!("{}{}{}.{}", sign, CURRENCY_SYMBOL, grouped, f),
        None => format!("{}{}{}", sign, CURRENCY_SYMBOL, grouped),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).to_string()
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if let Ok(d) = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        d.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::from(500)), "₹500");
        assert_eq!(format_amount(Decimal::from(1500)), "₹1,500");
        assert_eq!(format_amount(Decimal::from(1234567)), "₹1,234,567");
        assert_eq!(format_amount(Decimal::from_str("1500.00").expect("d")), "₹1,500");
        assert_eq!(format_amount(Decimal::from_str("250.75").expect("d")), "₹250.75");
        assert_eq!(format_amount(Decimal::ZERO), "₹0");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2026-02-06"), "Feb 06, 2026");
        assert_eq!(format_date("2026-02-06T19:00:00+05:30"), "Feb 06, 2026");
        assert_eq!(format_date("tomorrow"), "tomorrow");
    }
}
