// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::api::ApiClient;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{NewExpense, RawExpense};
use crate::session::AppContext;
use crate::utils::{fmt_money, pretty_table};

const NAME_COLUMNS: &[&str] = &["expense", "description", "name"];
const AMOUNT_COLUMNS: &[&str] = &["amount", "cost", "price"];
const DATE_COLUMNS: &[&str] = &["date"];

/// A blank date means today; anything else has to be `YYYY-MM-DD`.
fn row_date(row: usize, raw: &str, today: NaiveDate) -> LedgerResult<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(today);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| LedgerError::import(row, format!("invalid date '{}'", raw)))
}

fn checked(row: usize, expense: NewExpense) -> LedgerResult<NewExpense> {
    expense
        .validate()
        .map_err(|e| LedgerError::import(row, e.to_string()))?;
    Ok(expense)
}

fn column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim().trim_matches('"').to_lowercase();
        names.contains(&h.as_str())
    })
}

/// Rows are numbered by file line, so the first data row is row 2.
pub fn read_csv<R: Read>(input: R, today: NaiveDate) -> LedgerResult<Vec<NewExpense>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);
    let headers = rdr
        .headers()
        .map_err(|e| LedgerError::import(1, e.to_string()))?
        .clone();
    let name_col = column(&headers, NAME_COLUMNS)
        .ok_or_else(|| LedgerError::import(1, "missing Expense column"))?;
    let amount_col = column(&headers, AMOUNT_COLUMNS)
        .ok_or_else(|| LedgerError::import(1, "missing Amount column"))?;
    let date_col = column(&headers, DATE_COLUMNS);

    let mut out = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let row = i + 2;
        let rec = rec.map_err(|e| LedgerError::import(row, e.to_string()))?;
        if rec.iter().all(|f| f.is_empty()) {
            continue;
        }
        let name = rec
            .get(name_col)
            .ok_or_else(|| LedgerError::import(row, "missing expense field"))?;
        let amount_raw = rec
            .get(amount_col)
            .ok_or_else(|| LedgerError::import(row, "missing amount field"))?;
        let amount = amount_raw
            .parse::<Decimal>()
            .map_err(|_| LedgerError::import(row, format!("invalid amount '{}'", amount_raw)))?;
        let date = row_date(row, date_col.and_then(|c| rec.get(c)).unwrap_or(""), today)?;
        out.push(checked(
            row,
            NewExpense {
                expense: name.to_string(),
                amount,
                date: Some(date),
            },
        )?);
    }
    if out.is_empty() {
        return Err(LedgerError::import(1, "no expense rows found"));
    }
    Ok(out)
}

fn from_raw(row: usize, raw: RawExpense, today: NaiveDate) -> LedgerResult<NewExpense> {
    let amount = raw.amount().ok_or_else(|| {
        LedgerError::import(row, format!("invalid amount {}", raw.amount))
    })?;
    let date = row_date(row, &raw.date, today)?;
    checked(
        row,
        NewExpense {
            expense: raw.expense.trim().to_string(),
            amount,
            date: Some(date),
        },
    )
}

fn raw_item(row: usize, v: Value) -> LedgerResult<RawExpense> {
    serde_json::from_value(v).map_err(|e| LedgerError::import(row, e.to_string()))
}

/// Accepts the export envelope, a bare array, or a `{date: [expense, ...]}`
/// ledger dump. Items are numbered from 1.
pub fn read_json<R: Read>(input: R, today: NaiveDate) -> LedgerResult<Vec<NewExpense>> {
    let doc: Value =
        serde_json::from_reader(input).map_err(|e| LedgerError::import(0, e.to_string()))?;
    let mut raws = Vec::new();
    match doc {
        Value::Object(mut obj) if obj.get("expenses").is_some_and(Value::is_array) => {
            if let Some(Value::Array(items)) = obj.remove("expenses") {
                for (i, v) in items.into_iter().enumerate() {
                    raws.push(raw_item(i + 1, v)?);
                }
            }
        }
        Value::Array(items) => {
            for (i, v) in items.into_iter().enumerate() {
                raws.push(raw_item(i + 1, v)?);
            }
        }
        Value::Object(days) => {
            for (date, entries) in days {
                let Value::Array(entries) = entries else {
                    continue;
                };
                for v in entries {
                    let row = raws.len() + 1;
                    let mut raw = raw_item(row, v)?;
                    raw.date = date.clone();
                    raws.push(raw);
                }
            }
        }
        _ => return Err(LedgerError::import(0, "expected an object or an array")),
    }
    if raws.is_empty() {
        return Err(LedgerError::import(0, "no expenses found"));
    }
    raws.into_iter()
        .enumerate()
        .map(|(i, raw)| from_raw(i + 1, raw, today))
        .collect()
}

pub fn read_file(path: &Path, today: NaiveDate) -> Result<Vec<NewExpense>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let file = File::open(path).with_context(|| format!("Open {}", path.display()))?;
    let parsed = match ext.as_str() {
        "csv" => read_csv(file, today),
        "json" => read_json(file, today),
        other => anyhow::bail!(
            "Unsupported file format '{}'. Please use JSON or CSV files.",
            other
        ),
    };
    parsed.with_context(|| format!("Import {}", path.display()))
}

/// Posts expenses in order and stops at the first rejection.
pub fn post_all(api: &ApiClient, expenses: &[NewExpense]) -> Result<usize> {
    for (i, e) in expenses.iter().enumerate() {
        api.add_expense(e).with_context(|| {
            format!(
                "Backend rejected '{}' after {} of {} were imported",
                e.expense,
                i,
                expenses.len()
            )
        })?;
    }
    tracing::info!(count = expenses.len(), "import posted");
    Ok(expenses.len())
}

pub fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    let path = m
        .get_one::<String>("path")
        .map(|s| s.trim().to_string())
        .context("path is required")?;
    let dry_run = m.get_flag("dry-run");
    let expenses = read_file(Path::new(&path), Local::now().date_naive())?;

    if dry_run {
        let rows = expenses
            .iter()
            .map(|e| {
                vec![
                    e.date.map(|d| d.to_string()).unwrap_or_default(),
                    e.expense.clone(),
                    fmt_money(e.amount),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Date", "Expense", "Amount"], rows));
        println!("Dry run: {} expenses would be imported", expenses.len());
        return Ok(());
    }

    let n = post_all(ctx.api(), &expenses)?;
    println!("Successfully imported {} expenses", n);
    Ok(())
}
