// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::analytics::aggregate::last_n_days_window;
use crate::models::Expense;

/// Fixed reference rates that velocity figures are graded against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Benchmarks {
    pub daily: Decimal,
    pub weekly: Decimal,
    pub transactions: Decimal,
}

pub const DAILY_BENCHMARK: i64 = 1500;
pub const WEEKLY_BENCHMARK: i64 = 10500;
pub const TRANSACTIONS_BENCHMARK: i64 = 2;

impl Default for Benchmarks {
    fn default() -> Self {
        Benchmarks {
            daily: Decimal::from(DAILY_BENCHMARK),
            weekly: Decimal::from(WEEKLY_BENCHMARK),
            transactions: Decimal::from(TRANSACTIONS_BENCHMARK),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pace {
    High,
    Normal,
    Low,
}

/// `high` above 120% of the benchmark, `low` below 80%.
pub fn grade(value: Decimal, benchmark: Decimal) -> Pace {
    let high = benchmark * Decimal::new(12, 1);
    let low = benchmark * Decimal::new(8, 1);
    if value > high {
        Pace::High
    } else if value < low {
        Pace::Low
    } else {
        Pace::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rate {
    pub value: Decimal,
    pub pace: Pace,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Velocity {
    pub daily: Rate,
    pub weekly: Rate,
    pub transactions_per_day: Rate,
}

pub fn velocity(
    daily_average: Decimal,
    transaction_count: u64,
    days_tracked: u64,
    benchmarks: &Benchmarks,
) -> Velocity {
    let weekly = daily_average.saturating_mul(Decimal::from(7));
    let tx_rate = Decimal::from(transaction_count) / Decimal::from(days_tracked.max(1));
    Velocity {
        daily: Rate {
            value: daily_average,
            pace: grade(daily_average, benchmarks.daily),
        },
        weekly: Rate {
            value: weekly,
            pace: grade(weekly, benchmarks.weekly),
        },
        transactions_per_day: Rate {
            value: tx_rate,
            pace: grade(tx_rate, benchmarks.transactions),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acceleration {
    pub first_week: Decimal,
    pub second_week: Decimal,
    pub percentage_change: Decimal,
    pub direction: Direction,
}

impl Acceleration {
    pub fn from_totals(first_week: Decimal, second_week: Decimal) -> Acceleration {
        let change = second_week - first_week;
        let percentage_change = if first_week > Decimal::ZERO {
            change / first_week * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
        let direction = if percentage_change.abs() < Decimal::from(5) {
            Direction::Stable
        } else if change > Decimal::ZERO {
            Direction::Increasing
        } else {
            Direction::Decreasing
        };
        Acceleration {
            first_week,
            second_week,
            percentage_change,
            direction,
        }
    }

    /// Compact label: `±0%`, `+12.5%` or `-8.0%`.
    pub fn label(&self) -> String {
        match self.direction {
            Direction::Stable => "±0%".to_string(),
            Direction::Increasing => format!("+{:.1}%", self.percentage_change),
            Direction::Decreasing => format!("{:.1}%", self.percentage_change),
        }
    }

    pub fn pace(&self) -> Pace {
        match self.direction {
            Direction::Stable => Pace::Normal,
            Direction::Increasing => Pace::High,
            Direction::Decreasing => Pace::Low,
        }
    }
}

/// Week-over-week change across the 14 calendar days ending at `today`.
pub fn acceleration(expenses: &[Expense], today: NaiveDate) -> Acceleration {
    let window = last_n_days_window(expenses, 14, today);
    let (first, second) = window.split_at(7);
    let sum = |days: &[crate::analytics::aggregate::DayAmount]| -> Decimal {
        days.iter().map(|d| d.amount).sum()
    };
    Acceleration::from_totals(sum(first), sum(second))
}
