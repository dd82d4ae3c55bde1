// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analytics::category::Category;
use crate::error::{LedgerError, LedgerResult};

/// A validated expense. Category is derived from the label on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub date: NaiveDate,
    pub expense: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub index: usize,
}

impl Expense {
    pub fn new(date: NaiveDate, expense: impl Into<String>, amount: Decimal) -> Self {
        Expense {
            date,
            expense: expense.into(),
            amount,
            index: 0,
        }
    }

    pub fn category(&self) -> Category {
        Category::classify(&self.expense)
    }
}

/// Largest single amount (10^15) accepted from the backend, an import file
/// or the command line.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// An expense exactly as the backend or an import file delivered it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExpense {
    #[serde(default)]
    pub date: String,
    #[serde(default, alias = "name", alias = "description")]
    pub expense: String,
    #[serde(default)]
    pub amount: serde_json::Value,
    #[serde(default)]
    pub index: usize,
}

impl RawExpense {
    /// Finite, non-negative decimal amount no larger than [`MAX_AMOUNT`],
    /// if the raw value holds one.
    pub fn amount(&self) -> Option<Decimal> {
        let d = match &self.amount {
            serde_json::Value::Number(n) => n.to_string().parse::<Decimal>().ok().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .and_then(|f| Decimal::try_from(f).ok())
            })?,
            serde_json::Value::String(s) => s.trim().parse::<Decimal>().ok()?,
            _ => return None,
        };
        if (d.is_sign_negative() && !d.is_zero()) || d > MAX_AMOUNT {
            return None;
        }
        Some(d)
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }
}

impl From<&Expense> for RawExpense {
    fn from(e: &Expense) -> Self {
        RawExpense {
            date: e.date.to_string(),
            expense: e.expense.clone(),
            amount: serde_json::Value::String(e.amount.to_string()),
            index: e.index,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpensePage {
    #[serde(default)]
    pub expenses: Vec<RawExpense>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub expense: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl NewExpense {
    /// Rejects empty labels and non-positive amounts before anything is sent.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.expense.trim().is_empty() {
            return Err(LedgerError::validation("Expense name cannot be empty"));
        }
        if self.amount <= Decimal::ZERO {
            return Err(LedgerError::validation(format!(
                "Amount must be greater than zero, got {}",
                self.amount
            )));
        }
        if self.amount > MAX_AMOUNT {
            return Err(LedgerError::validation(format!(
                "Amount {} is larger than {}",
                self.amount, MAX_AMOUNT
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpenseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub amount: Option<Decimal>,
}

impl ExpenseUpdate {
    pub fn validate(&self) -> LedgerResult<()> {
        if self.expense.is_none() && self.amount.is_none() {
            return Err(LedgerError::validation("Nothing to update"));
        }
        if self.expense.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(LedgerError::validation("Expense name cannot be empty"));
        }
        if self.amount.is_some_and(|a| a <= Decimal::ZERO) {
            return Err(LedgerError::validation("Amount must be greater than zero"));
        }
        if self.amount.is_some_and(|a| a > MAX_AMOUNT) {
            return Err(LedgerError::validation(format!(
                "Amount must not exceed {}",
                MAX_AMOUNT
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub name: String,
    #[serde(default, alias = "total_amount")]
    pub amount: Decimal,
}

/// Backend-computed aggregates, consumed read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSnapshot {
    pub total_spent: Decimal,
    pub daily_average: Decimal,
    pub transaction_count: u64,
    pub days_tracked: u64,
    pub most_spent_category: Option<serde_json::Value>,
    pub top_categories: Vec<CategoryAmount>,
    pub category_breakdown: BTreeMap<String, Decimal>,
    pub monthly_spending: Option<BTreeMap<String, Decimal>>,
    pub current_month_spent: Option<Decimal>,
    pub current_month_categories: Option<BTreeMap<String, Decimal>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyStats {
    pub total_spent: Decimal,
    pub daily_average: Decimal,
    pub days_tracked: u64,
    pub transaction_count: u64,
    pub categories: BTreeMap<String, Decimal>,
    pub top_expenses: Vec<CategoryAmount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub total: Decimal,
    pub period: String,
    pub transaction_count: u64,
    pub days_with_expenses: Option<u64>,
}

/// `/budget` payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteBudget {
    pub month: String,
    pub budget_amount: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub percentage: Decimal,
    pub over_budget: bool,
    pub reset_from_previous: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedExpense {
    pub expense: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SayResponse {
    pub message: String,
    pub parsed_expenses: Vec<ParsedExpense>,
    pub date: String,
}
