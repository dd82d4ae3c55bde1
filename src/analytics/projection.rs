// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Month-end forecasting from partial-month data.
//!
//! The projection is a straight line: what has been spent so far plus the
//! daily average for every day left in the month. Confidence figures are
//! presentational constants, not statistics.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analytics::category::display_name;
use crate::utils::{days_in_month, fmt_money};

const CONFIDENCE_FLOOR: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
const CONFIDENCE_CEILING: Decimal = Decimal::from_parts(90, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub projected: Decimal,
    pub days_remaining: u32,
    pub confidence: Decimal,
}

pub fn project_month_end(
    current_month_spent: Decimal,
    daily_average: Decimal,
    today: NaiveDate,
) -> Projection {
    let total_days = days_in_month(today.year(), today.month());
    let day = today.day();
    let days_remaining = total_days - day;
    let projected = current_month_spent
        .saturating_add(daily_average.saturating_mul(Decimal::from(days_remaining)));
    let elapsed = Decimal::from(day) / Decimal::from(total_days) * Decimal::ONE_HUNDRED;
    Projection {
        projected,
        days_remaining,
        confidence: elapsed.clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BudgetStatus {
    OnTrack,
    CloseCall,
    OverBudget,
}

impl BudgetStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BudgetStatus::OnTrack => "On Track",
            BudgetStatus::CloseCall => "Close Call",
            BudgetStatus::OverBudget => "Over Budget",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetForecast {
    pub status: BudgetStatus,
    pub projected_percentage: Decimal,
    /// Signed: positive when the projection exceeds the limit.
    pub overage: Decimal,
    pub message: String,
    pub confidence: Decimal,
}

/// Status of a projected month-end total against a monthly limit. `None`
/// when no positive limit is set.
pub fn budget_status(projected: Decimal, limit: Decimal) -> Option<BudgetForecast> {
    if limit <= Decimal::ZERO {
        return None;
    }
    let pct = projected / limit * Decimal::ONE_HUNDRED;
    let overage = projected - limit;
    let (status, message, confidence) = if pct <= Decimal::from(80) {
        (
            BudgetStatus::OnTrack,
            "Likely to stay within budget".to_string(),
            85,
        )
    } else if pct <= Decimal::ONE_HUNDRED {
        (
            BudgetStatus::CloseCall,
            "May approach budget limit".to_string(),
            75,
        )
    } else {
        (
            BudgetStatus::OverBudget,
            format!("May exceed by {}", fmt_money(overage)),
            80,
        )
    };
    Some(BudgetForecast {
        status,
        projected_percentage: pct,
        overage,
        message,
        confidence: Decimal::from(confidence),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShareBand {
    Dominates,
    Major,
    Balanced,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTrend {
    pub top_category: String,
    pub amount: Decimal,
    pub share_of_total: Decimal,
    pub band: ShareBand,
    pub description: String,
    pub confidence: Decimal,
}

pub fn category_trend(category_totals: &BTreeMap<String, Decimal>) -> Option<CategoryTrend> {
    let (name, amount) = category_totals
        .iter()
        .fold(None, |best: Option<(&String, Decimal)>, (n, a)| match best {
            Some((_, b)) if b >= *a => best,
            _ => Some((n, *a)),
        })?;
    let total: Decimal = category_totals.values().copied().sum();
    let share = if total > Decimal::ZERO {
        amount / total * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    let shown = share.round_dp(0);
    let (band, description) = if share > Decimal::from(50) {
        (ShareBand::Dominates, format!("Dominates {}% of spending", shown))
    } else if share > Decimal::from(30) {
        (ShareBand::Major, format!("Major category at {}%", shown))
    } else {
        (ShareBand::Balanced, format!("Balanced spending at {}%", shown))
    };
    Some(CategoryTrend {
        top_category: display_name(name),
        amount,
        share_of_total: share,
        band,
        description,
        confidence: Decimal::from(70),
    })
}
