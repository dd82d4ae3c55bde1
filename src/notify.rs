// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Reminders, achievements and budget alerts, evaluated on demand.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::budget::{self, Budget};
use crate::config::{
    KEY_LAST_REMINDER, KEY_NOTIFY_ACHIEVEMENTS, KEY_NOTIFY_BUDGET, KEY_NOTIFY_DAILY,
};
use crate::db::{get_flag, get_setting, set_flag, set_setting};
use crate::error::LedgerResult;
use crate::models::StatsSnapshot;

const REMINDER_HOUR: u32 = 18;
const MILESTONES: [u64; 4] = [10, 50, 100, 500];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationSettings {
    pub budget_alerts: bool,
    pub daily_reminders: bool,
    pub achievements: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            budget_alerts: true,
            daily_reminders: true,
            achievements: true,
        }
    }
}

impl NotificationSettings {
    pub fn load(conn: &Connection) -> LedgerResult<Self> {
        let d = NotificationSettings::default();
        Ok(NotificationSettings {
            budget_alerts: get_flag(conn, KEY_NOTIFY_BUDGET, d.budget_alerts)?,
            daily_reminders: get_flag(conn, KEY_NOTIFY_DAILY, d.daily_reminders)?,
            achievements: get_flag(conn, KEY_NOTIFY_ACHIEVEMENTS, d.achievements)?,
        })
    }

    pub fn save(&self, conn: &Connection) -> LedgerResult<()> {
        set_flag(conn, KEY_NOTIFY_BUDGET, self.budget_alerts)?;
        set_flag(conn, KEY_NOTIFY_DAILY, self.daily_reminders)?;
        set_flag(conn, KEY_NOTIFY_ACHIEVEMENTS, self.achievements)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    fn new(kind: NoticeKind, title: &str, message: impl Into<String>) -> Self {
        Notification {
            kind,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

/// True when a reminder may be shown; whether anything was logged today is
/// checked separately because it costs a request.
pub fn reminder_due(
    settings: &NotificationSettings,
    now: NaiveDateTime,
    last_reminder: Option<NaiveDate>,
) -> bool {
    settings.daily_reminders && now.hour() >= REMINDER_HOUR && last_reminder != Some(now.date())
}

pub fn daily_reminder(
    settings: &NotificationSettings,
    now: NaiveDateTime,
    last_reminder: Option<NaiveDate>,
    has_expenses_today: bool,
) -> Option<Notification> {
    if !reminder_due(settings, now, last_reminder) || has_expenses_today {
        return None;
    }
    Some(Notification::new(
        NoticeKind::Info,
        "Daily Reminder",
        "Don't forget to log your expenses for today!",
    ))
}

pub fn achievements(
    stats: &StatsSnapshot,
    budget: &Budget,
    settings: &NotificationSettings,
) -> Vec<Notification> {
    if !settings.achievements {
        return Vec::new();
    }
    let mut out = Vec::new();
    let count = stats.transaction_count;
    if count == 1 {
        out.push(Notification::new(
            NoticeKind::Success,
            "First Step!",
            "You logged your first expense! Great start to tracking your finances.",
        ));
    }
    if MILESTONES.contains(&count) {
        out.push(Notification::new(
            NoticeKind::Success,
            "Milestone Reached!",
            format!("You've logged {} expenses! Keep up the great work.", count),
        ));
    }
    if budget.monthly > Decimal::ZERO {
        let spent = stats.current_month_spent.unwrap_or_default();
        let pct = spent / budget.monthly * Decimal::ONE_HUNDRED;
        if pct <= Decimal::from(80) && stats.days_tracked >= 15 {
            out.push(Notification::new(
                NoticeKind::Success,
                "Budget Master!",
                "You're staying within 80% of your monthly budget. Excellent financial discipline!",
            ));
        }
    }
    if stats.days_tracked >= 30 {
        out.push(Notification::new(
            NoticeKind::Success,
            "Consistency Champion!",
            format!(
                "You've been tracking expenses for {} days. Consistency is key to financial success!",
                stats.days_tracked
            ),
        ));
    }
    out
}

pub fn budget_notifications(
    stats: &StatsSnapshot,
    budget: &Budget,
    settings: &NotificationSettings,
) -> Vec<Notification> {
    if !settings.budget_alerts {
        return Vec::new();
    }
    budget::alerts(budget, stats)
        .into_iter()
        .map(|a| Notification::new(NoticeKind::Warning, "Budget Alert", a.message))
        .collect()
}

/// Reads and records the last-reminder date around [`daily_reminder`].
pub struct Notifier<'a> {
    conn: &'a Connection,
    pub settings: NotificationSettings,
}

impl<'a> Notifier<'a> {
    pub fn load(conn: &'a Connection) -> LedgerResult<Self> {
        Ok(Notifier {
            conn,
            settings: NotificationSettings::load(conn)?,
        })
    }

    pub fn last_reminder(&self) -> LedgerResult<Option<NaiveDate>> {
        Ok(get_setting(self.conn, KEY_LAST_REMINDER)?
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()))
    }

    /// `has_expenses_today` runs only when a reminder is otherwise due.
    pub fn check_reminder<F>(
        &self,
        now: NaiveDateTime,
        has_expenses_today: F,
    ) -> LedgerResult<Option<Notification>>
    where
        F: FnOnce() -> LedgerResult<bool>,
    {
        let last = self.last_reminder()?;
        if !reminder_due(&self.settings, now, last) {
            return Ok(None);
        }
        let notice = daily_reminder(&self.settings, now, last, has_expenses_today()?);
        if notice.is_some() {
            set_setting(self.conn, KEY_LAST_REMINDER, &now.date().to_string())?;
            tracing::info!(date = %now.date(), "daily reminder shown");
        }
        Ok(notice)
    }

    pub fn check_all<F>(
        &self,
        now: NaiveDateTime,
        stats: &StatsSnapshot,
        budget: &Budget,
        has_expenses_today: F,
    ) -> LedgerResult<Vec<Notification>>
    where
        F: FnOnce() -> LedgerResult<bool>,
    {
        let mut out: Vec<Notification> = self
            .check_reminder(now, has_expenses_today)?
            .into_iter()
            .collect();
        out.extend(budget_notifications(stats, budget, &self.settings));
        out.extend(achievements(stats, budget, &self.settings));
        Ok(out)
    }
}
