// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Context, Result};
use rusqlite::Connection;

use crate::commands::{json_flags, required};
use crate::config::{KEY_API_URL, USER_KEYS};
use crate::db::{all_settings, set_setting};
use crate::session::AppContext;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(ctx, sub)?,
        Some(("set", sub)) => {
            let key = required(sub, "key")?;
            let value = required(sub, "value")?;
            let stored = set(ctx.conn(), key, value)?;
            println!("{} = {}", key, stored);
        }
        _ => {}
    }
    Ok(())
}

/// Resolved backend URL and whether it answers, then every stored setting.
pub fn settings_rows(ctx: &AppContext) -> Result<Vec<(String, String)>> {
    let reachable = if ctx.api().health_check() {
        "reachable"
    } else {
        "unreachable"
    };
    let mut rows = vec![
        ("api_url (resolved)".to_string(), ctx.config.api_url.clone()),
        ("backend".to_string(), reachable.to_string()),
    ];
    rows.extend(all_settings(ctx.conn())?);
    Ok(rows)
}

fn show(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let rows = settings_rows(ctx)?;
    let (json_flag, jsonl_flag) = json_flags(sub);
    if maybe_print_json(json_flag, jsonl_flag, &rows)? {
        return Ok(());
    }
    let data = rows.into_iter().map(|(k, v)| vec![k, v]).collect();
    println!("{}", pretty_table(&["Key", "Value"], data));
    Ok(())
}

/// Validates and stores one user-editable key; returns the stored value.
pub fn set(conn: &Connection, key: &str, value: &str) -> Result<String> {
    if !USER_KEYS.contains(&key) {
        bail!("Unknown setting '{}' (use {})", key, USER_KEYS.join("|"));
    }
    let value = value.trim();
    let stored = if key == KEY_API_URL {
        let url = value.trim_end_matches('/');
        reqwest::Url::parse(url).with_context(|| format!("Invalid URL '{}'", value))?;
        url.to_string()
    } else {
        match value.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => "true".to_string(),
            "off" | "false" | "no" | "0" => "false".to_string(),
            other => bail!("{} expects on|off, got '{}'", key, other),
        }
    };
    set_setting(conn, key, &stored)?;
    tracing::info!(key, value = %stored, "setting updated");
    Ok(stored)
}
