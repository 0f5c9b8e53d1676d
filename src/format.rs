//! Display formatting for report values.
//!
//! Reports use Spanish conventions: `.` groups thousands, `,` separates
//! decimals, dates are `DD/MM/YYYY`.

use chrono::NaiveDate;

const MONTHS_ES: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio",
    "julio", "agosto", "septiembre", "octubre", "noviembre", "diciembre",
];

/// Spanish month name for 1-12, empty otherwise.
pub fn month_name_es(month: u32) -> &'static str {
    match month {
        1..=12 => MONTHS_ES[(month - 1) as usize],
        _ => "",
    }
}

/// Format a number with grouped thousands and a fixed number of decimals.
pub fn format_number(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && rendered.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };

    match frac_part {
        Some(f) => format!("{}{},{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// `$ 1.234.567,89`
pub fn format_currency(value: f64) -> String {
    let body = format_number(value.abs(), 2);
    if value < 0.0 && body != "0,00" {
        format!("-$ {}", body)
    } else {
        format!("$ {}", body)
    }
}

/// `33,33 %`
pub fn format_percentage(value: f64) -> String {
    format!("{} %", format_number(value, 2))
}

/// Convert an ISO date (`YYYY-MM-DD`, optionally followed by a time) to
/// `DD/MM/YYYY`. Anything unparseable is returned unchanged.
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1.000");
        assert_eq!(format_number(1234567.891, 2), "1.234.567,89");
        assert_eq!(format_number(-1500.5, 1), "-1.500,5");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234567.89), "$ 1.234.567,89");
        assert_eq!(format_currency(-250.0), "-$ 250,00");
        assert_eq!(format_currency(-0.001), "$ 0,00");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(33.333), "33,33 %");
        assert_eq!(format_percentage(100.0), "100,00 %");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2026-10-05"), "05/10/2026");
        assert_eq!(format_date("2026-10-05T08:30:00"), "05/10/2026");
        assert_eq!(format_date("pendiente"), "pendiente");
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name_es(1), "enero");
        assert_eq!(month_name_es(12), "diciembre");
        assert_eq!(month_name_es(13), "");
    }
}
