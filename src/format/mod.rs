// src/format/mod.rs

use chrono::NaiveDate;
use tracing::trace;

use crate::records::Record;

/// Sheet columns holding dates, normalized for display.
pub static DATE_COLUMNS: &[&str] = &[
    "Sanction Date",
    "Disbursement Date",
    "NPA Date",
    "Demand Notice Date",
    "Sec 09 Filing Date",
    "Sec.138 Filing Date",
    "Last Payment Date",
    "Next Hearing Date",
    "Closure Date",
];

/// Charge columns summed into the snapshot total.
pub static CHARGE_COLUMNS: &[&str] = &[
    "Demand Notice Expense",
    "Sec 09 Expense",
    "Sec.138 Expense",
];

/// Normalize a sheet date cell to `dd/mm/yyyy`.
///
/// Accepts `dd/mm/yyyy`, `dd.mm.yyyy`, `yyyy-mm-dd` (optionally with a time
/// suffix) and `yyyy/mm/dd`. Anything that fails to parse as a real calendar
/// date is returned unchanged; reformatting already-normalized output is a
/// no-op.
pub fn format_date(raw: &str) -> String {
    match parse_sheet_date(raw.trim()) {
        Some(d) => d.format("%d/%m/%Y").to_string(),
        None => {
            trace!(raw, "date left unformatted");
            raw.to_string()
        }
    }
}

fn parse_sheet_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }

    // dd/mm/yyyy or dd.mm.yyyy
    for sep in ['/', '.'] {
        let parts: Vec<&str> = s.split(sep).collect();
        if parts.len() == 3 && parts[2].len() == 4 {
            let d: u32 = parts[0].trim().parse().ok()?;
            let m: u32 = parts[1].trim().parse().ok()?;
            let y: i32 = parts[2].trim().parse().ok()?;
            if y <= 1900 {
                return None;
            }
            return NaiveDate::from_ymd_opt(y, m, d);
        }
    }

    // yyyy-mm-dd / yyyy/mm/dd, with or without a trailing time part
    if s.len() >= 10 && s.is_char_boundary(10) && s[..10].is_ascii() {
        let head = &s[..10];
        let sep = &head[4..5];
        if (sep == "-" || sep == "/") && &head[7..8] == sep {
            let y: i32 = head[0..4].parse().ok()?;
            let m: u32 = head[5..7].parse().ok()?;
            let d: u32 = head[8..10].parse().ok()?;
            return NaiveDate::from_ymd_opt(y, m, d);
        }
    }

    None
}

/// Strip `$` and `,` and parse the remainder as a float.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Render an amount in the en-IN convention: rupee sign, two fraction
/// digits, last group of three then groups of two. Non-numeric → "N/A".
pub fn format_currency(raw: &str) -> String {
    match parse_amount(raw) {
        Some(v) => format_inr(v),
        None => "N/A".to_string(),
    }
}

pub fn format_inr(value: f64) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let grouped = group_indian(int_part);
    if negative {
        format!("-₹{}.{}", grouped, frac_part)
    } else {
        format!("₹{}.{}", grouped, frac_part)
    }
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<String> = Vec::new();
    let chars: Vec<char> = head.chars().collect();
    let mut i = chars.len();
    while i > 0 {
        let start = i.saturating_sub(2);
        groups.push(chars[start..i].iter().collect());
        i = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Sum the three charge columns, each defaulting to 0 when absent or
/// non-numeric.
pub fn total_charges(record: &Record) -> f64 {
    CHARGE_COLUMNS
        .iter()
        .map(|col| {
            record
                .get_str(col)
                .and_then(|v| parse_amount(&v))
                .unwrap_or(0.0)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_date_dotted_and_slashed() {
        assert_eq!(format_date("05.03.2021"), "05/03/2021");
        assert_eq!(format_date("5/3/2021"), "05/03/2021");
        assert_eq!(format_date("31/12/2019"), "31/12/2019");
    }

    #[test]
    fn test_format_date_idempotent() {
        let once = format_date("07.08.2022");
        assert_eq!(once, "07/08/2022");
        assert_eq!(format_date(&once), once);
    }

    #[test]
    fn test_format_date_iso_inputs() {
        assert_eq!(format_date("2023-01-15"), "15/01/2023");
        assert_eq!(format_date("2023-01-15T00:00:00.000Z"), "15/01/2023");
        assert_eq!(format_date("2023/01/15"), "15/01/2023");
    }

    #[test]
    fn test_format_date_passthrough() {
        assert_eq!(format_date("not a date"), "not a date");
        assert_eq!(format_date("12-2021"), "12-2021");
        assert_eq!(format_date("aa/bb/cccc"), "aa/bb/cccc");
        // impossible calendar date
        assert_eq!(format_date("31/02/2021"), "31/02/2021");
        // pre-1900 cutoff
        assert_eq!(format_date("01/01/1899"), "01/01/1899");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,000"), Some(1000.0));
        assert_eq!(parse_amount("$50.5"), Some(50.5));
        assert_eq!(parse_amount("  $1,23,456.78 "), Some(123456.78));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency("1,050.5"), "₹1,050.50");
        assert_eq!(format_currency("250"), "₹250.00");
        assert_eq!(format_currency("123456.78"), "₹1,23,456.78");
        assert_eq!(format_currency("12345678"), "₹1,23,45,678.00");
        assert_eq!(format_currency("abc"), "N/A");
        assert_eq!(format_currency("-1500"), "-₹1,500.00");
    }

    #[test]
    fn test_total_charges_defaults_bad_values_to_zero() {
        let record = Record::from_value(json!({
            "Demand Notice Expense": "1,000",
            "Sec 09 Expense": "$50.5",
            "Sec.138 Expense": "abc",
        }))
        .unwrap();
        assert_eq!(total_charges(&record), 1050.5);
    }

    #[test]
    fn test_total_charges_missing_fields() {
        let record = Record::from_value(json!({ "Loan No": "L-1" })).unwrap();
        assert_eq!(total_charges(&record), 0.0);
    }
}
