// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod analytics;
pub mod budgets;
pub mod dashboard;
pub mod expenses;
pub mod exporter;
pub mod importer;
pub mod nlp;
pub mod notices;
pub mod settings;

use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;

use crate::analytics::category::Category;
use crate::filter::{AmountBand, ExpenseFilter};

pub(crate) fn required<'a>(m: &'a ArgMatches, id: &str) -> Result<&'a String> {
    m.get_one::<String>(id)
        .with_context(|| format!("--{} is required", id))
}

/// Optional string argument; ids a subcommand does not define read as unset.
pub(crate) fn opt<'a>(m: &'a ArgMatches, id: &str) -> Option<&'a String> {
    m.try_get_one::<String>(id).ok().flatten()
}

pub(crate) fn flag(m: &ArgMatches, id: &str) -> bool {
    m.try_get_one::<bool>(id)
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}

pub(crate) fn json_flags(m: &ArgMatches) -> (bool, bool) {
    (flag(m, "json"), flag(m, "jsonl"))
}

pub fn filter_from_args(m: &ArgMatches) -> Result<ExpenseFilter> {
    let mut f = ExpenseFilter::default();
    if let Some(term) = opt(m, "search") {
        f = f.with_search(term);
    }
    if let Some(c) = opt(m, "category") {
        f.category = Some(c.parse::<Category>().map_err(|e| anyhow!(e))?);
    }
    if let Some(a) = opt(m, "amount-band") {
        f.amount = Some(a.parse::<AmountBand>().map_err(|e| anyhow!(e))?);
    }
    Ok(f)
}
