// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Blocking client for the QuickLedger REST backend.

use anyhow::Result;
use chrono::NaiveDate;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::analytics::compare::DateRange;
use crate::config::Config;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    ExpensePage, ExpenseUpdate, MonthlyStats, NewExpense, ParsedExpense, RawExpense,
    RemoteBudget, SayResponse, StatsSnapshot, Summary,
};
use crate::utils::http_client;

/// Largest page the backend serves from `GET /expenses`.
pub const PAGE_LIMIT: usize = 1000;

/// Filters accepted by `GET /expenses` and `GET /summary`. The backend
/// applies the first of `date`, `week`, `range` that is set.
#[derive(Debug, Clone, Default)]
pub struct ExpenseQuery {
    pub date: Option<NaiveDate>,
    pub week: bool,
    pub range: Option<DateRange>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ExpenseQuery {
    pub fn limit(limit: usize) -> Self {
        ExpenseQuery {
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn week() -> Self {
        ExpenseQuery {
            week: true,
            ..Default::default()
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        ExpenseQuery {
            date: Some(date),
            ..Default::default()
        }
    }

    pub fn range(range: DateRange) -> Self {
        ExpenseQuery {
            range: Some(range),
            limit: Some(PAGE_LIMIT),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if let Some(r) = &self.range {
            if r.start > r.end {
                return Err(LedgerError::validation(format!(
                    "Invalid date range: {} is after {}",
                    r.start, r.end
                )));
            }
        }
        if let Some(limit) = self.limit {
            if !(1..=PAGE_LIMIT).contains(&limit) {
                return Err(LedgerError::validation(format!(
                    "Limit must be between 1 and {}, got {}",
                    PAGE_LIMIT, limit
                )));
            }
        }
        Ok(())
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(d) = self.date {
            q.push(("date", d.to_string()));
        }
        if self.week {
            q.push(("week", "true".to_string()));
        }
        if let Some(r) = &self.range {
            q.push(("range", r.as_query()));
        }
        if let Some(l) = self.limit {
            q.push(("limit", l.to_string()));
        }
        if let Some(o) = self.offset {
            q.push(("offset", o.to_string()));
        }
        q
    }
}

#[derive(Serialize)]
struct TextBody<'a> {
    text: &'a str,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(ApiClient {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            http: http_client(config.timeout_secs)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, endpoint))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    fn send<T: DeserializeOwned>(&self, endpoint: &str, req: RequestBuilder) -> LedgerResult<T> {
        tracing::debug!(endpoint, "backend request");
        let http_err = |source| LedgerError::Http {
            endpoint: endpoint.to_string(),
            source,
        };
        let resp = req.send().map_err(|e| {
            tracing::warn!(endpoint, error = %e, "backend unreachable");
            http_err(e)
        })?;
        let status = resp.status();
        if !status.is_success() {
            let body: Value = resp.json().unwrap_or(Value::Null);
            let detail = error_detail(&body).unwrap_or_else(|| {
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
                .trim_end_matches([' ', ':'])
                .to_string()
            });
            tracing::warn!(endpoint, status = status.as_u16(), %detail, "backend rejected request");
            return Err(LedgerError::Api {
                status: status.as_u16(),
                detail,
            });
        }
        resp.json::<T>().map_err(http_err)
    }

    pub fn get_expenses(&self, query: &ExpenseQuery) -> LedgerResult<ExpensePage> {
        query.validate()?;
        let req = self.request(Method::GET, "/expenses").query(&query.to_pairs());
        self.send("/expenses", req)
    }

    /// Follows `offset` paging until the backend reports no more records.
    /// The query's own `limit` is the page size.
    pub fn get_all_expenses(&self, query: &ExpenseQuery) -> LedgerResult<Vec<RawExpense>> {
        let mut page_query = query.clone();
        page_query.limit = Some(query.limit.unwrap_or(PAGE_LIMIT));
        page_query.offset = Some(query.offset.unwrap_or(0));
        let mut all = Vec::new();
        loop {
            let page = self.get_expenses(&page_query)?;
            let fetched = page.expenses.len();
            all.extend(page.expenses);
            if !page.has_more || fetched == 0 {
                break;
            }
            page_query.offset = page_query.offset.map(|o| o + fetched);
            tracing::debug!(offset = ?page_query.offset, total = page.total, "fetching next page");
        }
        Ok(all)
    }

    pub fn add_expense(&self, expense: &NewExpense) -> LedgerResult<Value> {
        expense.validate()?;
        let req = self.request(Method::POST, "/expenses").json(expense);
        self.send("/expenses", req)
    }

    pub fn update_expense(
        &self,
        date: NaiveDate,
        index: usize,
        update: &ExpenseUpdate,
    ) -> LedgerResult<Value> {
        update.validate()?;
        let endpoint = format!("/expenses/{}/{}", date, index);
        let req = self.request(Method::PUT, &endpoint).json(update);
        self.send(&endpoint, req)
    }

    pub fn delete_expense(&self, date: NaiveDate, index: usize) -> LedgerResult<Value> {
        let endpoint = format!("/expenses/{}/{}", date, index);
        let req = self.request(Method::DELETE, &endpoint);
        self.send(&endpoint, req)
    }

    pub fn stats(&self) -> LedgerResult<StatsSnapshot> {
        self.send("/stats", self.request(Method::GET, "/stats"))
    }

    pub fn summary(&self, query: &ExpenseQuery) -> LedgerResult<Summary> {
        query.validate()?;
        let pairs: Vec<_> = query
            .to_pairs()
            .into_iter()
            .filter(|(k, _)| !matches!(*k, "limit" | "offset"))
            .collect();
        let req = self.request(Method::GET, "/summary").query(&pairs);
        self.send("/summary", req)
    }

    pub fn monthly(&self, month: &str) -> LedgerResult<MonthlyStats> {
        let endpoint = format!("/monthly/{}", month);
        let req = self.request(Method::GET, &endpoint);
        self.send(&endpoint, req)
    }

    pub fn budget(&self) -> LedgerResult<RemoteBudget> {
        self.send("/budget", self.request(Method::GET, "/budget"))
    }

    pub fn set_budget(&self, amount: Decimal) -> LedgerResult<RemoteBudget> {
        if amount.is_sign_negative() {
            return Err(LedgerError::validation("Budget amount must be positive"));
        }
        let req = self
            .request(Method::POST, "/budget")
            .query(&[("amount", amount.to_string())]);
        self.send("/budget", req)
    }

    pub fn delete_budget(&self) -> LedgerResult<Value> {
        self.send("/budget", self.request(Method::DELETE, "/budget"))
    }

    pub fn nlp_parse(&self, text: &str) -> LedgerResult<Vec<ParsedExpense>> {
        if text.trim().is_empty() {
            return Err(LedgerError::validation("Nothing to parse"));
        }
        let req = self
            .request(Method::POST, "/nlp/parse")
            .json(&TextBody { text });
        self.send("/nlp/parse", req)
    }

    pub fn nlp_say(&self, text: &str) -> LedgerResult<SayResponse> {
        if text.trim().is_empty() {
            return Err(LedgerError::validation("Nothing to record"));
        }
        let req = self.request(Method::POST, "/nlp/say").json(&TextBody { text });
        self.send("/nlp/say", req)
    }

    pub fn health_check(&self) -> bool {
        match self.stats() {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "health check failed");
                false
            }
        }
    }
}

/// The backend's `detail` field: a string, or a validation error list.
fn error_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        Value::Array(items) => {
            let msgs: Vec<String> = items
                .iter()
                .filter_map(|i| i.get("msg").and_then(Value::as_str).map(str::to_string))
                .collect();
            if msgs.is_empty() {
                Some(Value::Array(items.clone()).to_string())
            } else {
                Some(msgs.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}
