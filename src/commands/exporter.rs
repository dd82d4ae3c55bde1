// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, SecondsFormat, Utc};
use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::analytics::aggregate::Ledger;
use crate::api::ExpenseQuery;
use crate::commands::filter_from_args;
use crate::models::Expense;
use crate::session::{AppContext, BULK_LIMIT};

pub const CSV_HEADER: [&str; 4] = ["Date", "Expense", "Category", "Amount"];

#[derive(Serialize)]
struct ExportRow<'a> {
    date: String,
    expense: &'a str,
    category: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    amount: rust_decimal::Decimal,
}

#[derive(Serialize)]
struct ExportEnvelope<'a> {
    exported_at: String,
    total_expenses: usize,
    expenses: Vec<ExportRow<'a>>,
}

fn rows(expenses: &[Expense]) -> Vec<ExportRow<'_>> {
    expenses
        .iter()
        .map(|e| ExportRow {
            date: e.date.to_string(),
            expense: &e.expense,
            category: e.category().as_str(),
            amount: e.amount,
        })
        .collect()
}

/// Header line as-is, then one row per expense with text quoted and the
/// amount left bare.
pub fn write_csv<W: Write>(mut out: W, expenses: &[Expense]) -> Result<()> {
    {
        let mut wtr = WriterBuilder::new().from_writer(&mut out);
        wtr.write_record(CSV_HEADER)?;
        wtr.flush()?;
    }
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(&mut out);
    for e in expenses {
        wtr.write_record([
            e.date.to_string(),
            e.expense.clone(),
            e.category().as_str().to_string(),
            e.amount.normalize().to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(out: W, expenses: &[Expense], exported_at: DateTime<Utc>) -> Result<()> {
    let env = ExportEnvelope {
        exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        total_expenses: expenses.len(),
        expenses: rows(expenses),
    };
    serde_json::to_writer_pretty(out, &env)?;
    Ok(())
}

pub fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    let fmt = m
        .get_one::<String>("format")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "csv".to_string());
    if !matches!(fmt.as_str(), "csv" | "json") {
        anyhow::bail!("Unknown format: {} (use csv|json)", fmt);
    }
    let out = m.get_one::<String>("out").cloned().unwrap_or_else(|| {
        format!(
            "quickledger-expenses-{}.{}",
            Local::now().date_naive(),
            fmt
        )
    });
    let filter = filter_from_args(m)?;

    let raw = ctx
        .api()
        .get_all_expenses(&ExpenseQuery::limit(BULK_LIMIT))
        .context("Failed to fetch expenses for export")?;
    let ledger = Ledger::from_raw(&raw);
    if ledger.defect_count() > 0 {
        eprintln!(
            "Skipping {} malformed record(s) from the backend",
            ledger.defect_count()
        );
    }
    let selected: Vec<Expense> = filter.apply(&ledger.expenses).into_iter().cloned().collect();
    if selected.is_empty() {
        println!("No expenses to export");
        return Ok(());
    }

    let file = File::create(&out).with_context(|| format!("Create {}", out))?;
    let mut w = BufWriter::new(file);
    match fmt.as_str() {
        "csv" => write_csv(&mut w, &selected)?,
        _ => write_json(&mut w, &selected, Utc::now())?,
    }
    w.flush()?;
    tracing::info!(count = selected.len(), path = %out, "export written");
    println!("Exported {} expenses to {}", selected.len(), out);
    Ok(())
}
