// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Application context shared by every command.
//!
//! One [`AppContext`] is built in `main` and handed to the command handlers.
//! It owns the backend client, the settings store, the last committed
//! dashboard snapshot and the list filter. Fetches fan out over scoped
//! threads; results are committed back on the calling thread only.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;
use std::thread;

use crate::analytics::aggregate::Ledger;
use crate::api::{ApiClient, ExpenseQuery};
use crate::budget::{Budget, BudgetManager};
use crate::config::Config;
use crate::error::LedgerResult;
use crate::filter::ExpenseFilter;
use crate::models::StatsSnapshot;

pub const RECENT_LIMIT: usize = 10;
pub const BULK_LIMIT: usize = 1000;

/// Everything one dashboard refresh fetched.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub generation: u64,
    pub stats: StatsSnapshot,
    pub recent: Ledger,
    pub week: Ledger,
    pub all: Ledger,
}

impl Dashboard {
    pub fn defect_count(&self) -> usize {
        self.recent.defect_count() + self.week.defect_count() + self.all.defect_count()
    }
}

/// Monotonic request generations. A result is committed only if it is newer
/// than the last committed one.
#[derive(Debug, Default)]
pub struct Generations {
    issued: u64,
    committed: u64,
}

impl Generations {
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn accept(&mut self, generation: u64) -> bool {
        if generation <= self.committed {
            tracing::warn!(
                generation,
                committed = self.committed,
                "discarding stale response"
            );
            return false;
        }
        self.committed = generation;
        true
    }

    pub fn committed(&self) -> u64 {
        self.committed
    }
}

/// Called after every committed dashboard refresh.
pub trait RefreshListener {
    fn on_refresh(&mut self, dashboard: &Dashboard);
}

impl<F: FnMut(&Dashboard)> RefreshListener for F {
    fn on_refresh(&mut self, dashboard: &Dashboard) {
        self(dashboard)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ExpenseRef {
    pub date: NaiveDate,
    pub index: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkDeleteReport {
    pub deleted: Vec<ExpenseRef>,
    pub failed: Vec<(ExpenseRef, String)>,
}

impl BulkDeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

fn joined<T>(handle: thread::ScopedJoinHandle<'_, LedgerResult<T>>, what: &str) -> Result<T> {
    handle
        .join()
        .map_err(|_| anyhow!("{} worker panicked", what))?
        .with_context(|| format!("Failed to fetch {}", what))
}

/// Runs the four dashboard fetches concurrently. Any failure fails the
/// whole batch; nothing partial is returned.
pub fn fetch_dashboard(api: &ApiClient, generation: u64) -> Result<Dashboard> {
    thread::scope(|s| -> Result<Dashboard> {
        let stats = s.spawn(|| api.stats());
        let recent = s.spawn(|| api.get_expenses(&ExpenseQuery::limit(RECENT_LIMIT)));
        let week = s.spawn(|| api.get_expenses(&ExpenseQuery::week()));
        let all = s.spawn(|| api.get_expenses(&ExpenseQuery::limit(BULK_LIMIT)));

        let stats = joined(stats, "stats");
        let recent = joined(recent, "recent expenses");
        let week = joined(week, "this week's expenses");
        let all = joined(all, "expenses");
        Ok(Dashboard {
            generation,
            stats: stats?,
            recent: Ledger::from_raw(&recent?.expenses),
            week: Ledger::from_raw(&week?.expenses),
            all: Ledger::from_raw(&all?.expenses),
        })
    })
}

/// Deletes the selected items. Deletions within one day run highest index
/// first so earlier deletes do not shift later targets; different days run
/// concurrently. Failures are reported, not retried.
pub fn bulk_delete(api: &ApiClient, items: &[ExpenseRef]) -> BulkDeleteReport {
    let mut by_day: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for r in items {
        by_day.entry(r.date).or_default().push(r.index);
    }
    for idx in by_day.values_mut() {
        idx.sort_unstable_by(|a, b| b.cmp(a));
        idx.dedup();
    }

    let outcomes: Vec<(ExpenseRef, Result<(), String>)> = thread::scope(|s| {
        let handles: Vec<_> = by_day
            .iter()
            .map(|(date, indexes)| {
                let date = *date;
                let handle = s.spawn(move || {
                    indexes
                        .iter()
                        .map(|&index| {
                            let r = ExpenseRef { date, index };
                            let res = api
                                .delete_expense(date, index)
                                .map(|_| ())
                                .map_err(|e| e.to_string());
                            (r, res)
                        })
                        .collect::<Vec<_>>()
                });
                (date, indexes, handle)
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|(date, indexes, h)| match h.join() {
                Ok(v) => v,
                Err(_) => indexes
                    .iter()
                    .map(|&index| {
                        (
                            ExpenseRef { date, index },
                            Err("delete worker panicked".to_string()),
                        )
                    })
                    .collect(),
            })
            .collect()
    });

    let mut report = BulkDeleteReport::default();
    for (r, res) in outcomes {
        match res {
            Ok(()) => report.deleted.push(r),
            Err(e) => {
                tracing::warn!(date = %r.date, index = r.index, error = %e, "bulk delete item failed");
                report.failed.push((r, e));
            }
        }
    }
    tracing::info!(
        deleted = report.deleted.len(),
        failed = report.failed.len(),
        "bulk delete finished"
    );
    report
}

pub struct AppContext {
    pub config: Config,
    api: ApiClient,
    conn: Connection,
    pub filter: ExpenseFilter,
    cache: Option<Dashboard>,
    generations: Generations,
    listeners: Vec<Box<dyn RefreshListener>>,
}

impl AppContext {
    pub fn new(config: Config, conn: Connection) -> Result<Self> {
        let api = ApiClient::new(&config).context("Failed to build HTTP client")?;
        Ok(AppContext {
            config,
            api,
            conn,
            filter: ExpenseFilter::default(),
            cache: None,
            generations: Generations::default(),
            listeners: Vec::new(),
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn budgets(&self) -> BudgetManager<'_> {
        BudgetManager::new(&self.conn).with_remote(&self.api)
    }

    pub fn load_budget(&self) -> Result<Budget> {
        BudgetManager::new(&self.conn)
            .load()
            .context("Failed to load budgets")
    }

    pub fn subscribe(&mut self, listener: impl RefreshListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        self.cache.as_ref()
    }

    pub fn begin_fetch(&mut self) -> u64 {
        self.generations.begin()
    }

    /// Stores `dashboard` unless a newer one is already committed, then
    /// notifies listeners. Returns whether it was kept.
    pub fn commit(&mut self, dashboard: Dashboard) -> bool {
        if !self.generations.accept(dashboard.generation) {
            return false;
        }
        if dashboard.defect_count() > 0 {
            tracing::warn!(
                defects = dashboard.defect_count(),
                "skipped malformed expense records"
            );
        }
        for l in self.listeners.iter_mut() {
            l.on_refresh(&dashboard);
        }
        self.cache = Some(dashboard);
        true
    }

    pub fn refresh_dashboard(&mut self) -> Result<&Dashboard> {
        let generation = self.begin_fetch();
        let fetched = fetch_dashboard(&self.api, generation)?;
        self.commit(fetched);
        self.cache
            .as_ref()
            .ok_or_else(|| anyhow!("No dashboard data available"))
    }

    pub fn has_expenses_on(&self, date: NaiveDate) -> LedgerResult<bool> {
        let page = self.api.get_expenses(&ExpenseQuery::on(date))?;
        Ok(!page.expenses.is_empty())
    }

    pub fn bulk_delete(&mut self, items: &[ExpenseRef]) -> BulkDeleteReport {
        let report = bulk_delete(&self.api, items);
        if !report.deleted.is_empty() {
            self.cache = None;
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ctx() -> AppContext {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        AppContext::new(Config::default(), conn).unwrap()
    }

    #[test]
    fn generations_reject_older_results() {
        let mut g = Generations::default();
        let first = g.begin();
        let second = g.begin();
        assert!(g.accept(second));
        assert!(!g.accept(first));
        assert!(!g.accept(second));
        assert_eq!(g.committed(), second);
    }

    #[test]
    fn stale_dashboard_is_not_committed() {
        let mut c = ctx();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        c.subscribe(move |d: &Dashboard| sink.borrow_mut().push(d.generation));

        let old = c.begin_fetch();
        let new = c.begin_fetch();
        assert!(c.commit(Dashboard {
            generation: new,
            ..Default::default()
        }));
        assert!(!c.commit(Dashboard {
            generation: old,
            ..Default::default()
        }));
        assert_eq!(c.dashboard().map(|d| d.generation), Some(new));
        assert_eq!(*seen.borrow(), vec![new]);
    }
}
