// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analytics::aggregate::{
    bucket_by_category, bucket_by_month, last_n_days_window, window_start, Ledger,
};
use crate::analytics::compare::{compare_expenses, insight, Comparison, DateRange, Metric, Period};
use crate::analytics::projection::{
    budget_status, category_trend, project_month_end, BudgetForecast, CategoryTrend, Projection,
};
use crate::analytics::velocity::{acceleration, velocity, Acceleration, Velocity};
use crate::api::{ApiClient, ExpenseQuery};
use crate::charts;
use crate::commands::{json_flags, opt};
use crate::models::{CategoryAmount, Expense};
use crate::session::{AppContext, BULK_LIMIT};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_month, pretty_table};

pub fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("compare", sub)) => compare_cmd(ctx, sub)?,
        Some(("predict", sub)) => predict(ctx, sub)?,
        Some(("velocity", sub)) => velocity_cmd(ctx, sub)?,
        Some(("trend", sub)) => trend(ctx, sub)?,
        Some(("monthly", sub)) => monthly(ctx, sub)?,
        Some(("breakdown", sub)) => breakdown(ctx, sub)?,
        _ => {}
    }
    Ok(())
}

fn today_arg(m: &clap::ArgMatches) -> Result<NaiveDate> {
    match opt(m, "today") {
        Some(d) => parse_date(d),
        None => Ok(Local::now().date_naive()),
    }
}

fn fetch_range(api: &ApiClient, range: DateRange) -> Result<Vec<Expense>> {
    let raw = api
        .get_all_expenses(&ExpenseQuery::range(range))
        .with_context(|| format!("Failed to load expenses for {} to {}", range.start, range.end))?;
    Ok(Ledger::from_raw(&raw).expenses)
}

#[derive(Serialize)]
struct PeriodComparison {
    period: Period,
    metric: Metric,
    current_window: DateRange,
    previous_window: DateRange,
    #[serde(flatten)]
    comparison: Comparison,
    insight: String,
}

fn compare_cmd(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let period = opt(sub, "period")
        .map(|s| s.parse::<Period>())
        .transpose()
        .map_err(|e| anyhow!(e))?
        .unwrap_or(Period::Month);
    let metric = opt(sub, "metric")
        .map(|s| s.parse::<Metric>())
        .transpose()
        .map_err(|e| anyhow!(e))?
        .unwrap_or(Metric::Total);
    let today = today_arg(sub)?;
    let (current_w, previous_w) = period.windows(today);

    let current = fetch_range(ctx.api(), current_w)?;
    let previous = fetch_range(ctx.api(), previous_w)?;
    let comparison = compare_expenses(&current, &previous, metric);
    let out = PeriodComparison {
        period,
        metric,
        current_window: current_w,
        previous_window: previous_w,
        insight: insight(&comparison, metric, period),
        comparison,
    };
    let (json_flag, jsonl_flag) = json_flags(sub);
    if maybe_print_json(json_flag, jsonl_flag, &out)? {
        return Ok(());
    }
    let c = &out.comparison;
    println!(
        "{}",
        pretty_table(
            &["Window", "From", "To", "Value"],
            vec![
                vec![
                    format!("This {}", period),
                    current_w.start.to_string(),
                    current_w.end.to_string(),
                    c.current.label.clone(),
                ],
                vec![
                    format!("Previous {}", period),
                    previous_w.start.to_string(),
                    previous_w.end.to_string(),
                    c.previous.label.clone(),
                ],
            ],
        )
    );
    println!(
        "Change: {} ({:+.1}%)",
        c.change.round_dp(2),
        c.percentage_change
    );
    println!("{}", out.insight);
    Ok(())
}

#[derive(Serialize)]
struct Prediction {
    month_spent: Decimal,
    projection: Projection,
    budget: Option<BudgetForecast>,
    category: Option<CategoryTrend>,
}

fn predict(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let today = today_arg(sub)?;
    let stats = ctx.api().stats().context("Failed to load statistics")?;
    let budget = ctx.load_budget()?;
    let spent = stats.current_month_spent.unwrap_or_default();
    let projection = project_month_end(spent, stats.daily_average, today);
    let categories = stats
        .current_month_categories
        .clone()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| stats.category_breakdown.clone());
    let out = Prediction {
        month_spent: spent,
        budget: budget_status(projection.projected, budget.monthly),
        category: category_trend(&categories),
        projection,
    };
    let (json_flag, jsonl_flag) = json_flags(sub);
    if maybe_print_json(json_flag, jsonl_flag, &out)? {
        return Ok(());
    }
    let mut rows = vec![
        vec![
            "Month-end projection".to_string(),
            fmt_money(out.projection.projected.round_dp(2)),
            format!(
                "{} days remaining, {}% confidence",
                out.projection.days_remaining,
                out.projection.confidence.round_dp(0)
            ),
        ],
    ];
    match &out.budget {
        Some(b) => rows.push(vec![
            format!("Budget: {}", b.status.label()),
            format!("{:.1}% of budget", b.projected_percentage),
            format!("{} ({}% confidence)", b.message, b.confidence),
        ]),
        None => rows.push(vec![
            "Budget".to_string(),
            "not set".to_string(),
            "Set one with `quickledger budget set --monthly <amount>`".to_string(),
        ]),
    }
    if let Some(t) = &out.category {
        rows.push(vec![
            format!("Top category: {}", t.top_category),
            fmt_money(t.amount),
            format!("{} ({}% confidence)", t.description, t.confidence),
        ]);
    }
    println!("{}", pretty_table(&["Prediction", "Value", "Detail"], rows));
    Ok(())
}

#[derive(Serialize)]
struct VelocityReport {
    velocity: Velocity,
    acceleration: Acceleration,
}

fn velocity_cmd(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let today = today_arg(sub)?;
    let stats = ctx.api().stats().context("Failed to load statistics")?;
    let window = DateRange {
        start: today - chrono::Duration::days(13),
        end: today,
    };
    let recent = fetch_range(ctx.api(), window)?;
    let out = VelocityReport {
        velocity: velocity(
            stats.daily_average,
            stats.transaction_count,
            stats.days_tracked,
            &ctx.config.benchmarks,
        ),
        acceleration: acceleration(&recent, today),
    };
    let (json_flag, jsonl_flag) = json_flags(sub);
    if maybe_print_json(json_flag, jsonl_flag, &out)? {
        return Ok(());
    }
    let v = &out.velocity;
    let a = &out.acceleration;
    let rows = vec![
        vec![
            "Daily rate".into(),
            fmt_money(v.daily.value.round_dp(2)),
            format!("{:?}", v.daily.pace).to_lowercase(),
        ],
        vec![
            "Weekly rate".into(),
            fmt_money(v.weekly.value.round_dp(2)),
            format!("{:?}", v.weekly.pace).to_lowercase(),
        ],
        vec![
            "Transactions/day".into(),
            v.transactions_per_day.value.round_dp(1).to_string(),
            format!("{:?}", v.transactions_per_day.pace).to_lowercase(),
        ],
        vec![
            "Acceleration".into(),
            a.label(),
            format!(
                "{} -> {}",
                fmt_money(a.first_week),
                fmt_money(a.second_week)
            ),
        ],
    ];
    println!("{}", pretty_table(&["Measure", "Value", "Pace"], rows));
    Ok(())
}

fn trend(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let today = today_arg(sub)?;
    let days = sub.get_one::<u32>("days").copied().unwrap_or(30).max(1) as usize;
    let range = DateRange {
        start: window_start(days, today),
        end: today,
    };
    let expenses = fetch_range(ctx.api(), range)?;
    let window = last_n_days_window(&expenses, days, today);
    let (json_flag, jsonl_flag) = json_flags(sub);
    if maybe_print_json(json_flag, jsonl_flag, &window)? {
        return Ok(());
    }
    print!("{}", charts::render_bars(&charts::daily_trend(&window)));
    Ok(())
}

fn monthly(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    if let Some(month) = opt(sub, "month") {
        let month = parse_month(month)?;
        let stats = ctx
            .api()
            .monthly(&month)
            .with_context(|| format!("Failed to load stats for {}", month))?;
        if maybe_print_json(json_flag, jsonl_flag, &stats)? {
            return Ok(());
        }
        let rows = vec![
            vec!["Total spent".into(), fmt_money(stats.total_spent)],
            vec!["Daily average".into(), fmt_money(stats.daily_average)],
            vec!["Transactions".into(), stats.transaction_count.to_string()],
            vec!["Days tracked".into(), stats.days_tracked.to_string()],
        ];
        println!("{}", pretty_table(&[month.as_str(), "Value"], rows));
        let cats: Vec<_> = stats
            .categories
            .iter()
            .map(|(name, amount)| CategoryAmount {
                name: name.clone(),
                amount: *amount,
            })
            .collect();
        print!("{}", charts::render_bars(&charts::category_breakdown(&cats, None)));
        if !stats.top_expenses.is_empty() {
            println!();
            print!("{}", charts::render_bars(&charts::top_expenses(&stats.top_expenses)));
        }
        return Ok(());
    }

    let stats = ctx.api().stats().context("Failed to load statistics")?;
    let totals = match stats.monthly_spending.filter(|m| !m.is_empty()) {
        Some(m) => m,
        None => {
            let raw = ctx
                .api()
                .get_all_expenses(&ExpenseQuery::limit(BULK_LIMIT))
                .context("Failed to load expenses")?;
            bucket_by_month(&Ledger::from_raw(&raw).expenses)
        }
    };
    if maybe_print_json(json_flag, jsonl_flag, &totals)? {
        return Ok(());
    }
    print!("{}", charts::render_bars(&charts::monthly(&totals)));
    Ok(())
}

/// Backend category totals when available, otherwise derived locally.
fn breakdown(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let top = sub.get_one::<usize>("top").copied();
    let stats = ctx.api().stats().context("Failed to load statistics")?;
    let series = if !stats.top_categories.is_empty() {
        charts::category_breakdown(&stats.top_categories, top)
    } else {
        let raw = ctx
            .api()
            .get_all_expenses(&ExpenseQuery::limit(BULK_LIMIT))
            .context("Failed to load expenses")?;
        let local: BTreeMap<_, _> = bucket_by_category(&Ledger::from_raw(&raw).expenses);
        let cats: Vec<_> = local
            .into_iter()
            .map(|(c, amount)| CategoryAmount {
                name: c.to_string(),
                amount,
            })
            .collect();
        charts::category_breakdown(&cats, top)
    };
    if maybe_print_json(json_flag, jsonl_flag, &series.points)? {
        return Ok(());
    }
    print!("{}", charts::render_bars(&series));
    Ok(())
}
