// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::analytics::aggregate::Ledger;
use crate::analytics::compare::DateRange;
use crate::api::ExpenseQuery;
use crate::commands::{filter_from_args, flag, json_flags, opt, required};
use crate::filter::paginate;
use crate::models::{Expense, ExpenseUpdate, NewExpense};
use crate::session::{AppContext, ExpenseRef, BULK_LIMIT};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};

pub fn handle(ctx: &mut AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ctx, sub)?,
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("edit", sub)) => edit(ctx, sub)?,
        Some(("rm", sub)) => remove(ctx, sub)?,
        _ => {}
    }
    Ok(())
}

fn backend_message(v: &Value) -> Option<&str> {
    v.get("message").and_then(Value::as_str)
}

fn add(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?.trim().to_string();
    let amount = parse_decimal(required(sub, "amount")?)?;
    let date = opt(sub, "date").map(|d| parse_date(d)).transpose()?;
    let new = NewExpense {
        expense: name,
        amount,
        date,
    };
    let resp = ctx.api().add_expense(&new).context("Failed to add expense")?;
    match backend_message(&resp) {
        Some(msg) => println!("{}", msg),
        None => println!("Added expense: {} - {}", new.expense, fmt_money(new.amount)),
    }
    Ok(())
}

pub fn query_from_args(sub: &clap::ArgMatches) -> Result<ExpenseQuery> {
    let mut q = if let Some(d) = opt(sub, "date") {
        ExpenseQuery::on(parse_date(d)?)
    } else if flag(sub, "week") {
        ExpenseQuery::week()
    } else if let (Some(from), Some(to)) = (opt(sub, "from"), opt(sub, "to")) {
        ExpenseQuery::range(DateRange {
            start: parse_date(from)?,
            end: parse_date(to)?,
        })
    } else if opt(sub, "from").is_some() || opt(sub, "to").is_some() {
        bail!("--from and --to must be given together");
    } else {
        ExpenseQuery::limit(BULK_LIMIT)
    };
    if let Some(limit) = sub.try_get_one::<usize>("limit").ok().flatten() {
        q.limit = Some(*limit);
    }
    Ok(q)
}

fn list(ctx: &mut AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let query = query_from_args(sub)?;
    ctx.filter = filter_from_args(sub)?;
    let page_no = sub.get_one::<usize>("page").copied().unwrap_or(1);
    let per_page = sub
        .get_one::<usize>("per-page")
        .copied()
        .unwrap_or(ctx.config.page_size);

    // An explicit --limit asks for one page; otherwise follow every page.
    let raw = if sub.try_get_one::<usize>("limit").ok().flatten().is_some() {
        let fetched = ctx
            .api()
            .get_expenses(&query)
            .context("Failed to load expenses")?;
        if fetched.has_more {
            eprintln!(
                "Showing the first {} of {} expenses on the backend",
                fetched.expenses.len(),
                fetched.total
            );
        }
        fetched.expenses
    } else {
        ctx.api()
            .get_all_expenses(&query)
            .context("Failed to load expenses")?
    };
    let ledger = Ledger::from_raw(&raw);
    let mut selected: Vec<Expense> = ctx
        .filter
        .apply(&ledger.expenses)
        .into_iter()
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.date.cmp(&a.date).then(a.index.cmp(&b.index)));
    let page = paginate(&selected, page_no, per_page);

    if maybe_print_json(json_flag, jsonl_flag, &page.items)? {
        return Ok(());
    }
    if ledger.defect_count() > 0 {
        eprintln!(
            "Skipped {} malformed record(s) from the backend",
            ledger.defect_count()
        );
    }
    if page.total == 0 {
        if ctx.filter.is_empty() {
            println!("No expenses recorded yet");
        } else {
            println!("No expenses match the current filters");
        }
        return Ok(());
    }
    let rows = page
        .items
        .iter()
        .map(|e| {
            vec![
                e.date.to_string(),
                e.index.to_string(),
                e.expense.clone(),
                e.category().to_string(),
                fmt_money(e.amount),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "#", "Expense", "Category", "Amount"], rows)
    );
    let (first, last) = page.shown_range();
    if page.items.is_empty() {
        println!(
            "Page {} is past the end ({} pages, {} expenses)",
            page.page, page.total_pages, page.total
        );
    } else {
        println!(
            "Showing {}-{} of {} (page {}/{})",
            first, last, page.total, page.page, page.total_pages
        );
    }
    Ok(())
}

fn edit(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(required(sub, "date")?)?;
    let index = *sub
        .get_one::<usize>("index")
        .context("--index is required")?;
    let update = ExpenseUpdate {
        expense: opt(sub, "name").map(|s| s.trim().to_string()),
        amount: opt(sub, "amount").map(|s| parse_decimal(s)).transpose()?,
    };
    let resp = ctx
        .api()
        .update_expense(date, index, &update)
        .with_context(|| format!("Failed to update expense {} #{}", date, index))?;
    println!(
        "{}",
        backend_message(&resp).unwrap_or("Expense updated successfully")
    );
    Ok(())
}

/// `YYYY-MM-DD:INDEX`
pub fn parse_ref(s: &str) -> Result<ExpenseRef> {
    let (d, i) = s
        .trim()
        .rsplit_once(':')
        .with_context(|| format!("Invalid item '{}', expected YYYY-MM-DD:INDEX", s))?;
    let index = i
        .parse::<usize>()
        .with_context(|| format!("Invalid index '{}' in '{}'", i, s))?;
    Ok(ExpenseRef {
        date: parse_date(d)?,
        index,
    })
}

fn remove(ctx: &mut AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let items = sub
        .get_many::<String>("item")
        .context("at least one --item is required")?
        .map(|s| parse_ref(s))
        .collect::<Result<Vec<_>>>()?;
    let report = ctx.bulk_delete(&items);
    let (json_flag, jsonl_flag) = json_flags(sub);
    if maybe_print_json(json_flag, jsonl_flag, &report)? {
        return Ok(());
    }
    for r in &report.deleted {
        println!("Deleted {} #{}", r.date, r.index);
    }
    if !report.is_complete() {
        let rows = report
            .failed
            .iter()
            .map(|(r, e)| vec![r.date.to_string(), r.index.to_string(), e.clone()])
            .collect();
        println!("{}", pretty_table(&["Date", "#", "Error"], rows));
        bail!(
            "{} of {} deletions failed",
            report.failed.len(),
            report.failed.len() + report.deleted.len()
        );
    }
    Ok(())
}
