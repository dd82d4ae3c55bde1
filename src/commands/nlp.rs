// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use crate::analytics::category::Category;
use crate::commands::json_flags;
use crate::models::ParsedExpense;
use crate::session::AppContext;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};

fn text_arg(m: &clap::ArgMatches) -> Result<String> {
    let words: Vec<&String> = m
        .get_many::<String>("text")
        .context("Say something like: bought bread 500 and fuel 2000")?
        .collect();
    Ok(words
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" "))
}

fn parsed_table(items: &[ParsedExpense]) -> comfy_table::Table {
    let rows = items
        .iter()
        .map(|p| {
            vec![
                p.expense.clone(),
                Category::classify(&p.expense).to_string(),
                fmt_money(p.amount),
            ]
        })
        .collect();
    pretty_table(&["Expense", "Category", "Amount"], rows)
}

/// Records every expense the backend finds in free text.
pub fn say(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    let text = text_arg(m)?;
    let resp = ctx
        .api()
        .nlp_say(&text)
        .context("Failed to record expenses from text")?;
    let (json_flag, jsonl_flag) = json_flags(m);
    if maybe_print_json(json_flag, jsonl_flag, &resp.parsed_expenses)? {
        return Ok(());
    }
    println!("{}", resp.message);
    if !resp.parsed_expenses.is_empty() {
        println!("{}", parsed_table(&resp.parsed_expenses));
    }
    Ok(())
}

/// Preview only; nothing is recorded.
pub fn parse(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    let text = text_arg(m)?;
    let items = ctx
        .api()
        .nlp_parse(&text)
        .context("Failed to parse text")?;
    let (json_flag, jsonl_flag) = json_flags(m);
    if maybe_print_json(json_flag, jsonl_flag, &items)? {
        return Ok(());
    }
    if items.is_empty() {
        println!("No expenses found in '{}'", text);
        return Ok(());
    }
    println!("{}", parsed_table(&items));
    Ok(())
}
