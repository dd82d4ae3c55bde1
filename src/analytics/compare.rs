// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::analytics::aggregate::{bucket_by_category, daily_average, total};
use crate::models::Expense;
use crate::utils::{days_in_month, fmt_money, format_number, month_start};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Total,
    Average,
    Transactions,
    Categories,
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "total" => Ok(Metric::Total),
            "average" => Ok(Metric::Average),
            "transactions" => Ok(Metric::Transactions),
            "categories" => Ok(Metric::Categories),
            other => Err(format!(
                "Unknown metric '{}' (use total|average|transactions|categories)",
                other
            )),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Metric::Total => "total",
            Metric::Average => "average",
            Metric::Transactions => "transactions",
            Metric::Categories => "categories",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricValue {
    pub value: Decimal,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increase,
    Decrease,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub current: MetricValue,
    pub previous: MetricValue,
    pub change: Decimal,
    pub percentage_change: Decimal,
    pub trend: Trend,
}

pub fn compute_metric(expenses: &[Expense], metric: Metric) -> MetricValue {
    match metric {
        Metric::Total => {
            let t = total(expenses);
            MetricValue {
                value: t,
                label: fmt_money(t),
            }
        }
        Metric::Average => {
            let avg = daily_average(expenses);
            MetricValue {
                value: avg,
                label: format!("{}/day", fmt_money(avg)),
            }
        }
        Metric::Transactions => {
            let n = expenses.len();
            MetricValue {
                value: Decimal::from(n),
                label: format!("{} transactions", n),
            }
        }
        Metric::Categories => {
            // Ties keep the first category in table order.
            let top = bucket_by_category(expenses)
                .into_iter()
                .fold(None, |best: Option<(_, Decimal)>, (cat, amt)| match best {
                    Some((_, b)) if b >= amt => best,
                    _ => Some((cat, amt)),
                });
            match top {
                Some((cat, amt)) => MetricValue {
                    value: amt,
                    label: format!("{}: {}", cat, fmt_money(amt)),
                },
                None => MetricValue {
                    value: Decimal::ZERO,
                    label: "No data".to_string(),
                },
            }
        }
    }
}

pub fn compare(current: MetricValue, previous: MetricValue) -> Comparison {
    let change = current.value - previous.value;
    let percentage_change = if previous.value > Decimal::ZERO {
        change / previous.value * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    let trend = if change > Decimal::ZERO {
        Trend::Increase
    } else if change < Decimal::ZERO {
        Trend::Decrease
    } else {
        Trend::Stable
    };
    Comparison {
        current,
        previous,
        change,
        percentage_change,
        trend,
    }
}

pub fn compare_expenses(current: &[Expense], previous: &[Expense], metric: Metric) -> Comparison {
    compare(compute_metric(current, metric), compute_metric(previous, metric))
}

/// One-line reading of a comparison for the given metric and period.
pub fn insight(c: &Comparison, metric: Metric, period: Period) -> String {
    if c.trend == Trend::Stable {
        return format!(
            "Your {} has remained stable compared to the previous {}.",
            metric, period
        );
    }
    let direction = if c.trend == Trend::Increase {
        "increased"
    } else {
        "decreased"
    };
    let sentiment = match (c.trend, metric) {
        (Trend::Increase, Metric::Total) => "Consider reviewing your spending habits.",
        (Trend::Decrease, Metric::Total) => "Great job on reducing expenses!",
        _ => "Keep monitoring your spending patterns.",
    };
    format!(
        "Your {} has {} by {}% compared to the previous {}. {}",
        metric,
        direction,
        format_number(c.percentage_change.abs().round_dp(1)),
        period,
        sentiment
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, d: NaiveDate) -> bool {
        d >= self.start && d <= self.end
    }

    /// `start,end` as the backend's `range` query parameter expects it.
    pub fn as_query(&self) -> String {
        format!("{},{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    Month,
    Quarter,
    Year,
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "quarter" => Ok(Period::Quarter),
            "year" => Ok(Period::Year),
            other => Err(format!(
                "Unknown period '{}' (use week|month|quarter|year)",
                other
            )),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
        };
        f.write_str(s)
    }
}

fn first_of(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn last_of(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)).unwrap_or(NaiveDate::MIN)
}

/// `(year, month)` shifted back by `months` calendar months.
fn months_back(year: i32, month: u32, months: u32) -> (i32, u32) {
    let idx = year * 12 + month as i32 - 1 - months as i32;
    (idx.div_euclid(12), idx.rem_euclid(12) as u32 + 1)
}

impl Period {
    /// Current and previous windows for the period that contains `today`.
    /// Weeks run Sunday through Saturday; quarters and years are calendar
    /// aligned.
    pub fn windows(&self, today: NaiveDate) -> (DateRange, DateRange) {
        match self {
            Period::Week => {
                let offset = today.weekday().num_days_from_sunday() as i64;
                let start = today - Duration::days(offset);
                let prev_start = start - Duration::days(7);
                (
                    DateRange {
                        start,
                        end: start + Duration::days(6),
                    },
                    DateRange {
                        start: prev_start,
                        end: prev_start + Duration::days(6),
                    },
                )
            }
            Period::Month => {
                let start = month_start(today);
                let (py, pm) = months_back(today.year(), today.month(), 1);
                (
                    DateRange {
                        start,
                        end: last_of(today.year(), today.month()),
                    },
                    DateRange {
                        start: first_of(py, pm),
                        end: last_of(py, pm),
                    },
                )
            }
            Period::Quarter => {
                let q_first = (today.month() - 1) / 3 * 3 + 1;
                let (py, pm) = months_back(today.year(), q_first, 3);
                let (ey, em) = months_back(today.year(), q_first, 1);
                (
                    DateRange {
                        start: first_of(today.year(), q_first),
                        end: last_of(today.year(), q_first + 2),
                    },
                    DateRange {
                        start: first_of(py, pm),
                        end: last_of(ey, em),
                    },
                )
            }
            Period::Year => {
                let y = today.year();
                (
                    DateRange {
                        start: first_of(y, 1),
                        end: last_of(y, 12),
                    },
                    DateRange {
                        start: first_of(y - 1, 1),
                        end: last_of(y - 1, 12),
                    },
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn exp(date: NaiveDate, label: &str, amount: i64) -> Expense {
        Expense::new(date, label, Decimal::from(amount))
    }

    #[test]
    fn identical_windows_are_stable() {
        let x = vec![
            exp(day(2024, 3, 1), "lunch", 1500),
            exp(day(2024, 3, 2), "taxi", 800),
        ];
        for metric in [
            Metric::Total,
            Metric::Average,
            Metric::Transactions,
            Metric::Categories,
        ] {
            let c = compare_expenses(&x, &x, metric);
            assert_eq!(c.change, Decimal::ZERO);
            assert_eq!(c.percentage_change, Decimal::ZERO);
            assert_eq!(c.trend, Trend::Stable);
        }
    }

    #[test]
    fn average_uses_active_days_only() {
        // Three expenses on two distinct days inside a seven day window.
        let cur = vec![
            exp(day(2024, 3, 3), "lunch", 1000),
            exp(day(2024, 3, 3), "snacks", 200),
            exp(day(2024, 3, 6), "fuel", 1800),
        ];
        let m = compute_metric(&cur, Metric::Average);
        assert_eq!(m.value, Decimal::from(1500));
        assert_eq!(m.label, "₦1,500/day");
    }

    #[test]
    fn percentage_change_against_previous() {
        let cur = vec![exp(day(2024, 3, 3), "lunch", 1500)];
        let prev = vec![exp(day(2024, 2, 3), "lunch", 1000)];
        let c = compare_expenses(&cur, &prev, Metric::Total);
        assert_eq!(c.change, Decimal::from(500));
        assert_eq!(c.percentage_change, Decimal::from(50));
        assert_eq!(c.trend, Trend::Increase);
        assert_eq!(
            insight(&c, Metric::Total, Period::Month),
            "Your total has increased by 50% compared to the previous month. Consider reviewing your spending habits."
        );

        let c = compare_expenses(&[], &cur, Metric::Total);
        assert_eq!(c.trend, Trend::Decrease);
        assert_eq!(c.percentage_change, Decimal::from(-100));

        let c = compare_expenses(&cur, &[], Metric::Transactions);
        assert_eq!(c.percentage_change, Decimal::ZERO);
        assert_eq!(c.trend, Trend::Increase);
    }

    #[test]
    fn top_category_metric() {
        let cur = vec![
            exp(day(2024, 3, 3), "lunch", 1000),
            exp(day(2024, 3, 4), "taxi", 1200),
            exp(day(2024, 3, 5), "dinner", 500),
        ];
        let m = compute_metric(&cur, Metric::Categories);
        assert_eq!(m.value, Decimal::from(1500));
        assert_eq!(m.label, "Food: ₦1,500");
        assert_eq!(compute_metric(&[], Metric::Categories).label, "No data");
    }

    #[test]
    fn week_windows_are_sunday_aligned() {
        // 2024-03-06 is a Wednesday
        let (cur, prev) = Period::Week.windows(day(2024, 3, 6));
        assert_eq!(cur.start, day(2024, 3, 3));
        assert_eq!(cur.end, day(2024, 3, 9));
        assert_eq!(prev.start, day(2024, 2, 25));
        assert_eq!(prev.end, day(2024, 3, 2));
        // A Sunday starts its own week
        let (cur, _) = Period::Week.windows(day(2024, 3, 10));
        assert_eq!(cur.start, day(2024, 3, 10));
    }

    #[test]
    fn month_quarter_year_windows() {
        let (cur, prev) = Period::Month.windows(day(2024, 3, 15));
        assert_eq!((cur.start, cur.end), (day(2024, 3, 1), day(2024, 3, 31)));
        assert_eq!((prev.start, prev.end), (day(2024, 2, 1), day(2024, 2, 29)));

        let (_, prev) = Period::Month.windows(day(2024, 1, 9));
        assert_eq!((prev.start, prev.end), (day(2023, 12, 1), day(2023, 12, 31)));

        let (cur, prev) = Period::Quarter.windows(day(2024, 2, 10));
        assert_eq!((cur.start, cur.end), (day(2024, 1, 1), day(2024, 3, 31)));
        assert_eq!((prev.start, prev.end), (day(2023, 10, 1), day(2023, 12, 31)));

        let (cur, prev) = Period::Quarter.windows(day(2024, 8, 31));
        assert_eq!((cur.start, cur.end), (day(2024, 7, 1), day(2024, 9, 30)));
        assert_eq!((prev.start, prev.end), (day(2024, 4, 1), day(2024, 6, 30)));

        let (cur, prev) = Period::Year.windows(day(2024, 8, 31));
        assert_eq!(cur.as_query(), "2024-01-01,2024-12-31");
        assert_eq!(prev.as_query(), "2023-01-01,2023-12-31");
        assert!(cur.contains(day(2024, 12, 31)));
        assert!(!cur.contains(day(2025, 1, 1)));
    }
}
