// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, bail, Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analytics::category::{display_name, Category};
use crate::budget::{category_warnings, progress, Budget, BudgetProgress, CategoryWarning};
use crate::commands::{flag, json_flags, opt};
use crate::session::AppContext;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};

pub fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(ctx, sub)?,
        Some(("set", sub)) => set(ctx, sub)?,
        Some(("reset", sub)) => reset(ctx, sub)?,
        Some(("remote", sub)) => remote(ctx, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct BudgetView {
    budget: Budget,
    progress: Option<BudgetProgress>,
    warnings: Vec<CategoryWarning>,
}

fn show(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let budget = ctx.load_budget()?;
    let offline = flag(sub, "offline");
    let (spent, month_cats) = if offline {
        (Decimal::ZERO, BTreeMap::new())
    } else {
        let stats = ctx.api().stats().context("Failed to load statistics")?;
        (
            stats.current_month_spent.unwrap_or_default(),
            stats.current_month_categories.unwrap_or_default(),
        )
    };
    let view = BudgetView {
        progress: progress(&budget, spent),
        warnings: category_warnings(&budget, &month_cats),
        budget,
    };
    let (json_flag, jsonl_flag) = json_flags(sub);
    if maybe_print_json(json_flag, jsonl_flag, &view)? {
        return Ok(());
    }

    let money_or_unset = |d: Decimal| {
        if d > Decimal::ZERO {
            fmt_money(d)
        } else {
            "not set".to_string()
        }
    };
    let mut rows = vec![
        vec!["Monthly".to_string(), money_or_unset(view.budget.monthly)],
        vec!["Weekly".to_string(), money_or_unset(view.budget.weekly)],
    ];
    for (cat, amount) in &view.budget.categories {
        rows.push(vec![display_name(cat), fmt_money(*amount)]);
    }
    println!("{}", pretty_table(&["Budget", "Amount"], rows));
    if let Some(p) = &view.progress {
        if !offline {
            println!(
                "Spent {} of {} ({:.1}%, {:?}) - {}",
                fmt_money(p.spent),
                fmt_money(p.limit),
                p.percentage,
                p.level,
                p.status
            );
        }
    }
    for w in &view.warnings {
        println!("{}", w.message());
    }
    Ok(())
}

fn set(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let mut changed = false;
    // monthly goes through the backend first
    if let Some(raw) = opt(sub, "monthly") {
        let amount = parse_decimal(raw)?;
        ctx.budgets()
            .set_monthly(amount)
            .context("Failed to set monthly budget")?;
        println!("Monthly budget set to {}", fmt_money(amount));
        changed = true;
    }
    if let Some(raw) = opt(sub, "weekly") {
        let amount = parse_decimal(raw)?;
        ctx.budgets()
            .set_weekly(amount)
            .context("Failed to set weekly budget")?;
        println!("Weekly budget set to {}", fmt_money(amount));
        changed = true;
    }
    if let Some(raw) = opt(sub, "category") {
        let cat = raw.parse::<Category>().map_err(|e| anyhow!(e))?;
        let amount = parse_decimal(
            opt(sub, "amount").context("--amount is required with --category")?,
        )?;
        ctx.budgets()
            .set_category(cat, amount)
            .with_context(|| format!("Failed to set {} budget", cat))?;
        println!("{} budget set to {}", cat, fmt_money(amount));
        changed = true;
    }
    if !changed {
        bail!("Nothing to set: use --monthly, --weekly or --category with --amount");
    }
    Ok(())
}

fn reset(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    if !flag(sub, "yes") {
        bail!("This clears every budget. Re-run with --yes to confirm.");
    }
    ctx.budgets()
        .reset_all()
        .context("Failed to reset budgets")?;
    println!("All budgets have been reset");
    Ok(())
}

fn remote(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let b = ctx.api().budget().context("Failed to load backend budget")?;
    let (json_flag, jsonl_flag) = json_flags(sub);
    if maybe_print_json(json_flag, jsonl_flag, &b)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Month".to_string(), b.month.clone()],
        vec!["Budget".to_string(), fmt_money(b.budget_amount)],
        vec!["Spent".to_string(), fmt_money(b.spent)],
        vec!["Remaining".to_string(), fmt_money(b.remaining)],
        vec!["Used".to_string(), format!("{:.1}%", b.percentage)],
        vec![
            "Over budget".to_string(),
            if b.over_budget { "yes" } else { "no" }.to_string(),
        ],
    ];
    println!("{}", pretty_table(&["Backend budget", "Value"], rows));
    if b.reset_from_previous {
        println!("Budget was carried over from the previous month");
    }
    Ok(())
}
