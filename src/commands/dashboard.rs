// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::analytics::aggregate::{last_n_days_window, total};
use crate::analytics::category::display_name;
use crate::budget::{category_warnings, progress, BudgetProgress, CategoryWarning};
use crate::charts::{self, TOP_CATEGORIES};
use crate::commands::expenses::query_from_args;
use crate::commands::json_flags;
use crate::models::{Expense, StatsSnapshot};
use crate::notify::{budget_notifications, NotificationSettings};
use crate::session::{AppContext, Dashboard};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};

/// `most_spent_category` arrives as a bare name or as `{name, amount}`.
pub fn top_category_name(stats: &StatsSnapshot) -> String {
    match &stats.most_spent_category {
        Some(Value::String(s)) if !s.is_empty() => display_name(s),
        Some(Value::Object(o)) => o
            .get("name")
            .and_then(Value::as_str)
            .map(display_name)
            .unwrap_or_else(|| "N/A".to_string()),
        _ => "N/A".to_string(),
    }
}

fn stats_rows(stats: &StatsSnapshot) -> Vec<Vec<String>> {
    vec![
        vec!["Total spent".into(), fmt_money(stats.total_spent)],
        vec!["Daily average".into(), fmt_money(stats.daily_average)],
        vec![
            "Transactions".into(),
            stats.transaction_count.to_string(),
        ],
        vec!["Days tracked".into(), stats.days_tracked.to_string()],
        vec!["Top category".into(), top_category_name(stats)],
        vec![
            "This month".into(),
            fmt_money(stats.current_month_spent.unwrap_or_default()),
        ],
    ]
}

pub fn stats(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    let stats = ctx.api().stats().context("Failed to load statistics")?;
    let (json_flag, jsonl_flag) = json_flags(m);
    if maybe_print_json(json_flag, jsonl_flag, &stats)? {
        return Ok(());
    }
    println!("{}", pretty_table(&["Metric", "Value"], stats_rows(&stats)));
    let series = charts::category_breakdown(&stats.top_categories, Some(TOP_CATEGORIES));
    if !series.is_empty() {
        print!("{}", charts::render_bars(&series));
    }
    Ok(())
}

pub fn summary(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    let query = query_from_args(m)?;
    let summary = ctx.api().summary(&query).context("Failed to load summary")?;
    let (json_flag, jsonl_flag) = json_flags(m);
    if maybe_print_json(json_flag, jsonl_flag, &summary)? {
        return Ok(());
    }
    let mut rows = vec![
        vec!["Period".to_string(), summary.period.clone()],
        vec!["Total".to_string(), fmt_money(summary.total)],
        vec!["Transactions".to_string(), summary.transaction_count.to_string()],
    ];
    if let Some(days) = summary.days_with_expenses {
        rows.push(vec!["Active days".to_string(), days.to_string()]);
    }
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}

#[derive(Serialize)]
struct DashboardView<'a> {
    stats: &'a StatsSnapshot,
    week_total: Decimal,
    recent: &'a [Expense],
    budget: Option<BudgetProgress>,
    warnings: Vec<CategoryWarning>,
    skipped_records: usize,
}

fn print_recent(recent: &[Expense]) {
    if recent.is_empty() {
        println!("No recent expenses");
        return;
    }
    let rows = recent
        .iter()
        .map(|e| {
            vec![
                e.date.to_string(),
                e.expense.clone(),
                e.category().to_string(),
                fmt_money(e.amount),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Expense", "Category", "Amount"], rows)
    );
}

pub fn handle(ctx: &mut AppContext, m: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(m);
    let budget = ctx.load_budget()?;
    let settings = NotificationSettings::load(ctx.conn()).context("Failed to load settings")?;

    if !(json_flag || jsonl_flag) {
        let alert_budget = budget.clone();
        ctx.subscribe(move |d: &Dashboard| {
            for n in budget_notifications(&d.stats, &alert_budget, &settings) {
                eprintln!("[{}] {}", n.title, n.message);
            }
        });
    }

    let d = ctx.refresh_dashboard().context("Failed to refresh dashboard")?;
    let today = Local::now().date_naive();
    let spent = d.stats.current_month_spent.unwrap_or_default();
    let empty = Default::default();
    let month_categories = d.stats.current_month_categories.as_ref().unwrap_or(&empty);
    let view = DashboardView {
        stats: &d.stats,
        week_total: total(&d.week.expenses),
        recent: &d.recent.expenses,
        budget: progress(&budget, spent),
        warnings: category_warnings(&budget, month_categories),
        skipped_records: d.defect_count(),
    };
    if maybe_print_json(json_flag, jsonl_flag, &view)? {
        return Ok(());
    }

    println!("{}", pretty_table(&["Metric", "Value"], stats_rows(view.stats)));
    println!("This week: {}", fmt_money(view.week_total));
    if let Some(p) = &view.budget {
        println!(
            "Monthly budget: {} of {} ({:.1}%) - {}",
            fmt_money(p.spent),
            fmt_money(p.limit),
            p.percentage,
            p.status
        );
    }
    for w in &view.warnings {
        println!("{}", w.message());
    }
    println!();
    print_recent(view.recent);
    println!();
    let window = last_n_days_window(&d.all.expenses, 7, today);
    print!("{}", charts::render_bars(&charts::weekday_trend(&window)));
    let cats = charts::category_breakdown(&d.stats.top_categories, Some(TOP_CATEGORIES));
    if !cats.is_empty() {
        println!();
        print!("{}", charts::render_bars(&cats));
    }
    if view.skipped_records > 0 {
        eprintln!("Skipped {} malformed record(s)", view.skipped_records);
    }
    Ok(())
}
