// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Context, Result};
use chrono::Local;

use crate::commands::{json_flags, opt};
use crate::notify::{NotificationSettings, Notifier};
use crate::session::AppContext;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("check", sub)) => check(ctx, sub)?,
        Some(("settings", sub)) => settings(ctx, sub)?,
        _ => {}
    }
    Ok(())
}

fn check(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let now = Local::now().naive_local();
    let stats = ctx.api().stats().context("Failed to load statistics")?;
    let budget = ctx.load_budget()?;
    let notifier = Notifier::load(ctx.conn()).context("Failed to load notification settings")?;
    let notices = notifier
        .check_all(now, &stats, &budget, || ctx.has_expenses_on(now.date()))
        .context("Failed to evaluate notifications")?;

    let (json_flag, jsonl_flag) = json_flags(sub);
    if maybe_print_json(json_flag, jsonl_flag, &notices)? {
        return Ok(());
    }
    if notices.is_empty() {
        println!("Nothing to report");
        return Ok(());
    }
    for n in &notices {
        println!("[{}] {}", n.title, n.message);
    }
    Ok(())
}

fn parse_switch(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => bail!("Expected on|off, got '{}'", other),
    }
}

fn settings(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let mut s = NotificationSettings::load(ctx.conn())?;
    let mut changed = false;
    if let Some(v) = opt(sub, "budget-alerts") {
        s.budget_alerts = parse_switch(v)?;
        changed = true;
    }
    if let Some(v) = opt(sub, "daily-reminders") {
        s.daily_reminders = parse_switch(v)?;
        changed = true;
    }
    if let Some(v) = opt(sub, "achievements") {
        s.achievements = parse_switch(v)?;
        changed = true;
    }
    if changed {
        s.save(ctx.conn())?;
        tracing::info!(?s, "notification settings saved");
        println!("Notification settings saved");
    }
    let (json_flag, jsonl_flag) = json_flags(sub);
    if maybe_print_json(json_flag, jsonl_flag, &s)? {
        return Ok(());
    }
    let on_off = |b: bool| if b { "on" } else { "off" }.to_string();
    println!(
        "{}",
        pretty_table(
            &["Notification", "State"],
            vec![
                vec!["Budget alerts".into(), on_off(s.budget_alerts)],
                vec!["Daily reminders".into(), on_off(s.daily_reminders)],
                vec!["Achievements".into(), on_off(s.achievements)],
            ],
        )
    );
    Ok(())
}
