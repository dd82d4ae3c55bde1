// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

use crate::analytics::category::Category;
use crate::models::Expense;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AmountBand {
    UpTo500,
    From500To1000,
    From1000To2000,
    From2000To5000,
    Above5000,
}

impl AmountBand {
    pub fn contains(&self, amount: Decimal) -> bool {
        let d = |v: i64| Decimal::from(v);
        match self {
            AmountBand::UpTo500 => amount >= Decimal::ZERO && amount <= d(500),
            AmountBand::From500To1000 => amount > d(500) && amount <= d(1000),
            AmountBand::From1000To2000 => amount > d(1000) && amount <= d(2000),
            AmountBand::From2000To5000 => amount > d(2000) && amount <= d(5000),
            AmountBand::Above5000 => amount > d(5000),
        }
    }
}

impl FromStr for AmountBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0-500" => Ok(AmountBand::UpTo500),
            "500-1000" => Ok(AmountBand::From500To1000),
            "1000-2000" => Ok(AmountBand::From1000To2000),
            "2000-5000" => Ok(AmountBand::From2000To5000),
            "5000+" => Ok(AmountBand::Above5000),
            other => Err(format!(
                "Unknown amount band '{}' (use 0-500|500-1000|1000-2000|2000-5000|5000+)",
                other
            )),
        }
    }
}

/// Search and filter state for the expense list.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    search: Option<String>,
    pub category: Option<Category>,
    pub amount: Option<AmountBand>,
}

impl ExpenseFilter {
    pub fn with_search(mut self, term: &str) -> Self {
        let t = term.trim().to_lowercase();
        self.search = (!t.is_empty()).then_some(t);
        self
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.category.is_none() && self.amount.is_none()
    }

    pub fn matches(&self, e: &Expense) -> bool {
        if let Some(term) = &self.search {
            if !e.expense.to_lowercase().contains(term.as_str()) {
                return false;
            }
        }
        if let Some(cat) = self.category {
            if e.category() != cat {
                return false;
            }
        }
        if let Some(band) = self.amount {
            if !band.contains(e.amount) {
                return false;
            }
        }
        true
    }

    pub fn apply<'e>(&self, expenses: &'e [Expense]) -> Vec<&'e Expense> {
        expenses.iter().filter(|e| self.matches(e)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// 1-based `(first, last)` item numbers shown on this page.
    pub fn shown_range(&self) -> (usize, usize) {
        if self.items.is_empty() {
            return (0, 0);
        }
        let first = (self.page - 1) * self.per_page + 1;
        (first, first + self.items.len() - 1)
    }
}

/// Slices out 1-based `page`. Pages past the end come back empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);
    let start = (page - 1).saturating_mul(per_page);
    let slice = if start >= total {
        Vec::new()
    } else {
        items[start..(start + per_page).min(total)].to_vec()
    };
    Page {
        items: slice,
        page,
        per_page,
        total,
        total_pages,
    }
}
