// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

use crate::analytics::velocity::Benchmarks;
use crate::db::{get_flag, get_setting};

pub const API_URL_ENV: &str = "QUICKLEDGER_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_PAGE_SIZE: usize = 10;

// settings store keys
pub const KEY_API_URL: &str = "api_url";
pub const KEY_MONTHLY_BUDGET: &str = "monthly_budget";
pub const KEY_WEEKLY_BUDGET: &str = "weekly_budget";
pub const KEY_DARK_MODE: &str = "dark_mode";
pub const KEY_NOTIFY_BUDGET: &str = "notify.budget_alerts";
pub const KEY_NOTIFY_DAILY: &str = "notify.daily_reminders";
pub const KEY_NOTIFY_ACHIEVEMENTS: &str = "notify.achievements";
pub const KEY_LAST_REMINDER: &str = "last_reminder";

/// Keys `config set` accepts. Budgets have their own command.
pub const USER_KEYS: &[&str] = &[
    KEY_API_URL,
    KEY_DARK_MODE,
    KEY_NOTIFY_BUDGET,
    KEY_NOTIFY_DAILY,
    KEY_NOTIFY_ACHIEVEMENTS,
];

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub api_url: String,
    pub timeout_secs: u64,
    pub page_size: usize,
    pub dark_mode: bool,
    pub benchmarks: Benchmarks,
}

impl Config {
    /// Flag, then environment, then the settings store, then the default.
    pub fn resolve(conn: &Connection, flag: Option<&str>) -> Result<Config> {
        let env = std::env::var(API_URL_ENV).ok();
        let stored = get_setting(conn, KEY_API_URL)?;
        let api_url = [flag.map(str::to_string), env, stored]
            .into_iter()
            .flatten()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Ok(Config {
            api_url,
            dark_mode: get_flag(conn, KEY_DARK_MODE, false)?,
            ..Config::default()
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            dark_mode: false,
            benchmarks: Benchmarks::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, set_setting};

    #[test]
    fn flag_beats_stored_value() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        set_setting(&conn, KEY_API_URL, "http://stored:8000/").unwrap();
        let cfg = Config::resolve(&conn, Some("http://flag:9000/")).unwrap();
        assert_eq!(cfg.api_url, "http://flag:9000");
        assert_eq!(cfg.timeout_secs, 15);
        assert_eq!(cfg.page_size, 10);
        assert!(!cfg.dark_mode);
    }

    #[test]
    fn dark_mode_comes_from_the_store() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        set_setting(&conn, KEY_DARK_MODE, "true").unwrap();
        assert!(Config::resolve(&conn, None).unwrap().dark_mode);
    }
}
