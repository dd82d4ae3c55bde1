// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, Table};
use once_cell::sync::OnceCell;
use rust_decimal::Decimal;

const UA: &str = concat!(
    "quickledger/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/quickledger)"
);

pub const CURRENCY_SYMBOL: &str = "₦";

pub fn http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<String> {
    let s = s.trim();
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Thousands-grouped amount with at most two decimals, e.g. `12,500.5`.
pub fn format_number(d: Decimal) -> String {
    let d = d.round_dp(2).normalize();
    let s = d.abs().to_string();
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (s, None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if d.is_sign_negative() && !d.is_zero() { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

pub fn fmt_money(d: Decimal) -> String {
    format!("{}{}", CURRENCY_SYMBOL, format_number(d))
}

static DARK_MODE: OnceCell<bool> = OnceCell::new();

/// Picks the table header palette for the rest of the process. Only the
/// first call has an effect.
pub fn set_dark_mode(dark: bool) {
    let _ = DARK_MODE.set(dark);
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    themed_table(headers, rows, DARK_MODE.get().copied().unwrap_or(false))
}

/// Bright headers for dark terminals, dark blue ones for light terminals.
pub fn themed_table(headers: &[&str], rows: Vec<Vec<String>>, dark: bool) -> Table {
    let header_color = if dark { Color::Cyan } else { Color::DarkBlue };
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(
        headers
            .iter()
            .map(|h| Cell::new(*h).fg(header_color).add_attribute(Attribute::Bold)),
    );
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
    }
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn month_end(date: NaiveDate) -> NaiveDate {
    let last = days_in_month(date.year(), date.month());
    date.with_day(last).unwrap_or(date)
}

pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn dark_mode_changes_header_colour() {
        let render = |dark: bool| {
            let mut t = themed_table(&["Key"], vec![vec!["v".into()]], dark);
            t.force_no_tty().enforce_styling();
            t.to_string()
        };
        let (dark, light) = (render(true), render(false));
        assert!(dark.contains('\u{1b}'));
        assert_ne!(dark, light);
        assert!(dark.contains("Key") && light.contains("Key"));
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(format_number(dec("1500")), "1,500");
        assert_eq!(format_number(dec("1234567.891")), "1,234,567.89");
        assert_eq!(format_number(dec("999")), "999");
        assert_eq!(format_number(dec("-2500.50")), "-2,500.5");
        assert_eq!(fmt_money(dec("0")), "₦0");
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 4), 30);
        let d = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        assert_eq!(month_end(d), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(month_key(d), "2024-02");
    }
}
