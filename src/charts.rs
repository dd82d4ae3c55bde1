// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Labelled series for the dashboard and analytics views, drawn as
//! horizontal text bars.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::analytics::aggregate::{consolidate_categories, DayAmount};
use crate::analytics::category::display_name;
use crate::models::CategoryAmount;
use crate::utils::fmt_money;

pub const TOP_CATEGORIES: usize = 6;
const LABEL_LIMIT: usize = 15;
const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub label: String,
    pub value: Decimal,
    /// Percentage of the series total, for share-of-whole charts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub title: String,
    pub points: Vec<Point>,
}

impl Series {
    fn new(title: &str, points: Vec<Point>) -> Self {
        Series {
            title: title.to_string(),
            points,
        }
    }

    pub fn total(&self) -> Decimal {
        self.points.iter().map(|p| p.value).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn point(label: String, value: Decimal) -> Point {
    Point {
        label,
        value,
        share: None,
    }
}

/// One point per day, labelled like `Mar 5`.
pub fn daily_trend(window: &[DayAmount]) -> Series {
    let points = window
        .iter()
        .map(|d| point(d.day.format("%b %-d").to_string(), d.amount))
        .collect();
    Series::new("Daily Spending", points)
}

/// Dashboard mini trend: weekday labels over the last seven entries.
pub fn weekday_trend(window: &[DayAmount]) -> Series {
    let start = window.len().saturating_sub(7);
    let points = window[start..]
        .iter()
        .map(|d| point(d.day.format("%a").to_string(), d.amount))
        .collect();
    Series::new("Last 7 Days", points)
}

/// `YYYY-MM` keys become `Mar 2024`; keys that are not months keep their text.
pub fn monthly(totals: &BTreeMap<String, Decimal>) -> Series {
    let points = totals
        .iter()
        .map(|(key, v)| {
            let label = NaiveDate::parse_from_str(&format!("{}-01", key), "%Y-%m-%d")
                .map(|d| d.format("%b %Y").to_string())
                .unwrap_or_else(|_| key.clone());
            point(label, *v)
        })
        .collect();
    Series::new("Monthly Spending", points)
}

/// Backend categories merged case-insensitively, biggest first, with shares.
pub fn category_breakdown(categories: &[CategoryAmount], top: Option<usize>) -> Series {
    let merged = consolidate_categories(categories);
    let total: Decimal = merged.iter().map(|c| c.amount).sum();
    let take = top.unwrap_or(merged.len());
    let points = merged
        .into_iter()
        .take(take)
        .map(|c| Point {
            label: display_name(&c.name),
            value: c.amount,
            share: Some(if total.is_zero() {
                Decimal::ZERO
            } else {
                (c.amount / total * Decimal::ONE_HUNDRED).round_dp(1)
            }),
        })
        .collect();
    Series::new("Spending by Category", points)
}

/// Largest individual expenses; long labels are shortened.
pub fn top_expenses(items: &[CategoryAmount]) -> Series {
    let points = items
        .iter()
        .map(|c| {
            let name = c.name.to_lowercase();
            let mut chars = name.chars();
            let mut label: String = chars.next().map(|f| f.to_uppercase().collect()).unwrap_or_default();
            label.push_str(chars.as_str());
            if label.chars().count() > LABEL_LIMIT {
                label = label.chars().take(LABEL_LIMIT).collect::<String>() + "...";
            }
            point(label, c.amount)
        })
        .collect();
    Series::new("Top Expenses", points)
}

fn bar_len(value: Decimal, max: Decimal, width: usize) -> usize {
    if max <= Decimal::ZERO || value <= Decimal::ZERO {
        return 0;
    }
    let cells = (value / max * Decimal::from(width as u64)).round();
    cells.to_usize().unwrap_or(0).clamp(1, width)
}

/// Horizontal bars scaled to the largest value in the series.
pub fn render_bars(series: &Series) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", series.title);
    if series.is_empty() {
        let _ = writeln!(out, "  (no data)");
        return out;
    }
    let max = series
        .points
        .iter()
        .map(|p| p.value)
        .max()
        .unwrap_or(Decimal::ZERO);
    let label_w = series
        .points
        .iter()
        .map(|p| p.label.chars().count())
        .max()
        .unwrap_or(0);
    for p in &series.points {
        let bar = "█".repeat(bar_len(p.value, max, BAR_WIDTH));
        let share = p
            .share
            .map(|s| format!(" ({}%)", s))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {:<label_w$}  {:<bar_w$}  {}{}",
            p.label,
            bar,
            fmt_money(p.value),
            share,
            label_w = label_w,
            bar_w = BAR_WIDTH
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str, amount: i64) -> DayAmount {
        DayAmount {
            day: NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap(),
            amount: Decimal::from(amount),
        }
    }

    #[test]
    fn trend_labels() {
        let w = vec![day("2024-03-04", 100), day("2024-03-05", 0)];
        let s = daily_trend(&w);
        assert_eq!(s.points[0].label, "Mar 4");
        assert_eq!(weekday_trend(&w).points[1].label, "Tue");
    }

    #[test]
    fn month_labels_fall_back_to_key() {
        let mut m = BTreeMap::new();
        m.insert("2024-02".to_string(), Decimal::from(10));
        m.insert("unknown".to_string(), Decimal::from(5));
        let s = monthly(&m);
        assert_eq!(s.points[0].label, "Feb 2024");
        assert_eq!(s.points[1].label, "unknown");
        assert_eq!(s.total(), Decimal::from(15));
    }

    #[test]
    fn breakdown_consolidates_and_caps() {
        let cats = vec![
            CategoryAmount {
                name: "food".into(),
                amount: Decimal::from(300),
            },
            CategoryAmount {
                name: "Food".into(),
                amount: Decimal::from(200),
            },
            CategoryAmount {
                name: "transport".into(),
                amount: Decimal::from(500),
            },
        ];
        let s = category_breakdown(&cats, None);
        assert_eq!(s.points.len(), 2);
        assert_eq!(s.points[0].value, Decimal::from(500));
        assert_eq!(s.points[0].share, Some(Decimal::from(50)));
        assert_eq!(category_breakdown(&cats, Some(1)).points.len(), 1);
    }

    #[test]
    fn long_labels_are_shortened() {
        let s = top_expenses(&[CategoryAmount {
            name: "BIRTHDAY PARTY SUPPLIES".into(),
            amount: Decimal::from(9000),
        }]);
        assert_eq!(s.points[0].label, "Birthday party ...");
    }

    #[test]
    fn bars_scale_to_max() {
        let s = Series::new(
            "t",
            vec![
                point("a".into(), Decimal::from(100)),
                point("b".into(), Decimal::from(50)),
                point("c".into(), Decimal::ZERO),
            ],
        );
        let out = render_bars(&s);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[2].matches('█').count(), BAR_WIDTH / 2);
        assert_eq!(lines[3].matches('█').count(), 0);
        assert!(render_bars(&Series::new("e", vec![])).contains("(no data)"));
    }
}
