// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The one owner of the user's budget record.
//!
//! Budgets are kept in the local settings store. The monthly figure is also
//! known to the backend; when a client is attached the backend has to accept
//! a new monthly budget before it is written locally.

use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analytics::category::{display_name, Category};
use crate::api::ApiClient;
use crate::config::{KEY_MONTHLY_BUDGET, KEY_WEEKLY_BUDGET};
use crate::db::{delete_setting, get_setting, set_setting};
use crate::error::{LedgerError, LedgerResult};
use crate::models::StatsSnapshot;
use crate::utils::fmt_money;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Budget {
    pub monthly: Decimal,
    pub weekly: Decimal,
    /// Keyed by lower-case category name.
    pub categories: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressLevel {
    Normal,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    pub spent: Decimal,
    pub limit: Decimal,
    /// Clamped to 0..=100 for progress bars.
    pub percentage: Decimal,
    /// Signed; negative once the budget is exceeded.
    pub remaining: Decimal,
    pub level: ProgressLevel,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryWarning {
    pub category: String,
    pub spent: Decimal,
    pub budget: Decimal,
    pub percentage: Decimal,
    pub over: bool,
}

impl CategoryWarning {
    pub fn message(&self) -> String {
        format!(
            "{}: {} budget ({:.1}%)",
            display_name(&self.category),
            if self.over { "Over" } else { "Near" },
            self.percentage
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Monthly,
    Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetAlert {
    pub kind: AlertKind,
    pub message: String,
}

fn parse_stored(key: &str, raw: Option<String>) -> LedgerResult<Decimal> {
    match raw {
        None => Ok(Decimal::ZERO),
        Some(s) => s.parse::<Decimal>().map_err(|_| {
            LedgerError::validation(format!("Stored budget '{}' is not a number: {}", key, s))
        }),
    }
}

fn check_amount(amount: Decimal) -> LedgerResult<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(LedgerError::validation("Please enter a valid budget amount"));
    }
    Ok(())
}

pub struct BudgetManager<'a> {
    conn: &'a Connection,
    remote: Option<&'a ApiClient>,
}

impl<'a> BudgetManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        BudgetManager { conn, remote: None }
    }

    pub fn with_remote(mut self, api: &'a ApiClient) -> Self {
        self.remote = Some(api);
        self
    }

    pub fn load(&self) -> LedgerResult<Budget> {
        let monthly = parse_stored(
            KEY_MONTHLY_BUDGET,
            get_setting(self.conn, KEY_MONTHLY_BUDGET)?,
        )?;
        let weekly = parse_stored(
            KEY_WEEKLY_BUDGET,
            get_setting(self.conn, KEY_WEEKLY_BUDGET)?,
        )?;
        let mut stmt = self
            .conn
            .prepare("SELECT category, amount FROM category_budgets ORDER BY category")?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
        let mut categories = BTreeMap::new();
        for row in rows {
            let (cat, amt) = row?;
            categories.insert(cat.clone(), parse_stored(&cat, Some(amt))?);
        }
        Ok(Budget {
            monthly,
            weekly,
            categories,
        })
    }

    pub fn set_monthly(&self, amount: Decimal) -> LedgerResult<()> {
        check_amount(amount)?;
        if let Some(api) = self.remote {
            api.set_budget(amount)?;
        }
        set_setting(self.conn, KEY_MONTHLY_BUDGET, &amount.to_string())?;
        tracing::info!(%amount, "monthly budget updated");
        Ok(())
    }

    pub fn set_weekly(&self, amount: Decimal) -> LedgerResult<()> {
        check_amount(amount)?;
        set_setting(self.conn, KEY_WEEKLY_BUDGET, &amount.to_string())?;
        tracing::info!(%amount, "weekly budget updated");
        Ok(())
    }

    pub fn set_category(&self, category: Category, amount: Decimal) -> LedgerResult<()> {
        check_amount(amount)?;
        self.conn.execute(
            "INSERT INTO category_budgets(category, amount) VALUES (?1, ?2)
             ON CONFLICT(category) DO UPDATE SET amount=excluded.amount",
            params![category.key(), amount.to_string()],
        )?;
        tracing::info!(%category, %amount, "category budget updated");
        Ok(())
    }

    pub fn reset_all(&self) -> LedgerResult<()> {
        if let Some(api) = self.remote {
            api.delete_budget()?;
        }
        let tx = self.conn.unchecked_transaction()?;
        delete_setting(&tx, KEY_MONTHLY_BUDGET)?;
        delete_setting(&tx, KEY_WEEKLY_BUDGET)?;
        tx.execute("DELETE FROM category_budgets", [])?;
        tx.commit()?;
        tracing::info!("all budgets reset");
        Ok(())
    }
}

/// Monthly progress, or `None` when no monthly budget is set.
pub fn progress(budget: &Budget, spent: Decimal) -> Option<BudgetProgress> {
    let limit = budget.monthly;
    if limit <= Decimal::ZERO {
        return None;
    }
    let raw_pct = spent / limit * Decimal::ONE_HUNDRED;
    let percentage = raw_pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    let remaining = limit - spent;
    let level = if percentage > Decimal::from(90) {
        ProgressLevel::Critical
    } else if percentage > Decimal::from(75) {
        ProgressLevel::Warning
    } else {
        ProgressLevel::Normal
    };
    let status = if remaining > Decimal::ZERO {
        format!("{} remaining this month", fmt_money(remaining))
    } else {
        format!("{} over budget", fmt_money(remaining.abs()))
    };
    Some(BudgetProgress {
        spent,
        limit,
        percentage,
        remaining,
        level,
        status,
    })
}

fn spent_in(categories: &BTreeMap<String, Decimal>, key: &str) -> Decimal {
    categories
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, v)| *v)
        .sum()
}

/// Categories above 90% of their budget.
pub fn category_warnings(
    budget: &Budget,
    current_month_categories: &BTreeMap<String, Decimal>,
) -> Vec<CategoryWarning> {
    budget
        .categories
        .iter()
        .filter(|(_, b)| **b > Decimal::ZERO)
        .filter_map(|(cat, b)| {
            let spent = spent_in(current_month_categories, cat);
            let pct = spent / *b * Decimal::ONE_HUNDRED;
            (pct > Decimal::from(90)).then(|| CategoryWarning {
                category: cat.clone(),
                spent,
                budget: *b,
                percentage: pct,
                over: spent > *b,
            })
        })
        .collect()
}

/// Monthly and category budgets that are already exceeded.
pub fn alerts(budget: &Budget, stats: &StatsSnapshot) -> Vec<BudgetAlert> {
    let mut out = Vec::new();
    let spent = stats.current_month_spent.unwrap_or_default();
    if budget.monthly > Decimal::ZERO && spent > budget.monthly {
        out.push(BudgetAlert {
            kind: AlertKind::Monthly,
            message: format!(
                "Monthly budget exceeded by {}",
                fmt_money(spent - budget.monthly)
            ),
        });
    }
    let empty = BTreeMap::new();
    let cats = stats.current_month_categories.as_ref().unwrap_or(&empty);
    for (cat, b) in &budget.categories {
        if *b <= Decimal::ZERO {
            continue;
        }
        let cat_spent = spent_in(cats, cat);
        if cat_spent > *b {
            out.push(BudgetAlert {
                kind: AlertKind::Category,
                message: format!(
                    "{} budget exceeded by {}",
                    display_name(cat),
                    fmt_money(cat_spent - *b)
                ),
            });
        }
    }
    out
}
