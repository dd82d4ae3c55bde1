// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use chrono::NaiveDate;
use quickledger::analytics::compare::DateRange;
use quickledger::api::{ApiClient, ExpenseQuery};
use quickledger::error::LedgerError;
use quickledger::models::{ExpenseUpdate, NewExpense};
use rust_decimal::Decimal;
use serde_json::Value;

fn client(url: &str) -> ApiClient {
    ApiClient::new(&common::config(url)).unwrap()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn expenses_query_is_sent_as_parameters() {
    let server = common::serve(vec![(
        "GET",
        "/expenses",
        200,
        common::expenses_body(&[("2024-03-01", "lunch", 1500.0, 0)]),
    )]);
    let api = client(&server.url);
    let page = api
        .get_expenses(&ExpenseQuery::range(DateRange {
            start: day("2024-03-01"),
            end: day("2024-03-31"),
        }))
        .unwrap();
    assert_eq!(page.expenses.len(), 1);
    assert_eq!(page.expenses[0].amount(), Some(Decimal::from(1500)));

    let reqs = server.requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].query(), "range=2024-03-01%2C2024-03-31&limit=1000");
}

#[test]
fn add_sends_json_body_with_numeric_amount() {
    let server = common::serve(vec![(
        "POST",
        "/expenses",
        200,
        r#"{"message":"Added expense: bread - ₦500"}"#.to_string(),
    )]);
    let api = client(&server.url);
    let resp = api
        .add_expense(&NewExpense {
            expense: "bread".into(),
            amount: Decimal::new(5005, 1),
            date: Some(day("2024-03-02")),
        })
        .unwrap();
    assert_eq!(resp["message"], "Added expense: bread - ₦500");

    let body: Value = serde_json::from_str(&server.requests()[0].body).unwrap();
    assert_eq!(body["expense"], "bread");
    assert_eq!(body["amount"].as_f64(), Some(500.5));
    assert_eq!(body["date"], "2024-03-02");
}

#[test]
fn invalid_input_never_reaches_the_backend() {
    let server = common::serve(vec![]);
    let api = client(&server.url);
    let err = api
        .add_expense(&NewExpense {
            expense: "  ".into(),
            amount: Decimal::from(10),
            date: None,
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert!(api
        .update_expense(day("2024-03-02"), 0, &ExpenseUpdate::default())
        .is_err());
    assert!(api.get_expenses(&ExpenseQuery::limit(5000)).is_err());
    assert!(api.nlp_parse("   ").is_err());
    assert!(server.requests().is_empty());
}

#[test]
fn non_success_status_carries_backend_detail() {
    let server = common::serve(vec![
        (
            "DELETE",
            "/expenses/*",
            404,
            r#"{"detail":"Expense not found"}"#.to_string(),
        ),
        ("GET", "/stats", 500, "oops".to_string()),
    ]);
    let api = client(&server.url);
    match api.delete_expense(day("2024-03-02"), 7).unwrap_err() {
        LedgerError::Api { status, detail } => {
            assert_eq!(status, 404);
            assert_eq!(detail, "Expense not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(server.requests()[0].path(), "/expenses/2024-03-02/7");

    let err = api.stats().unwrap_err();
    assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
}

#[test]
fn budget_amount_goes_in_the_query_string() {
    let server = common::serve(vec![(
        "POST",
        "/budget",
        200,
        r#"{"month":"2024-03","budget_amount":50000,"spent":1200,"remaining":48800,"percentage":2.4,"over_budget":false,"reset_from_previous":false}"#
            .to_string(),
    )]);
    let api = client(&server.url);
    let b = api.set_budget(Decimal::from(50000)).unwrap();
    assert_eq!(b.remaining, Decimal::from(48800));
    assert_eq!(server.requests()[0].query(), "amount=50000");
}

#[test]
fn nlp_endpoints_decode_their_shapes() {
    let server = common::serve(vec![
        (
            "POST",
            "/nlp/parse",
            200,
            r#"[{"expense":"bread","amount":500},{"expense":"fuel","amount":2000}]"#.to_string(),
        ),
        (
            "POST",
            "/nlp/say",
            200,
            r#"{"message":"Recorded 1 expense","parsed_expenses":[{"expense":"bread","amount":500}],"date":"2024-03-02"}"#
                .to_string(),
        ),
    ]);
    let api = client(&server.url);
    let parsed = api.nlp_parse("bread 500 and fuel 2000").unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[1].amount, Decimal::from(2000));
    let said = api.nlp_say("bread 500").unwrap();
    assert_eq!(said.parsed_expenses.len(), 1);
    assert_eq!(said.date, "2024-03-02");

    let body: Value = serde_json::from_str(&server.requests()[0].body).unwrap();
    assert_eq!(body, serde_json::json!({"text": "bread 500 and fuel 2000"}));
}

#[test]
fn unreachable_backend_is_an_http_error() {
    let api = client(&common::dead_url());
    assert!(matches!(api.stats(), Err(LedgerError::Http { .. })));
    assert!(!api.health_check());
}

#[test]
fn summary_drops_paging_parameters() {
    let server = common::serve(vec![(
        "GET",
        "/summary",
        200,
        r#"{"total":2300,"period":"week","transaction_count":2}"#.to_string(),
    )]);
    let api = client(&server.url);
    let summary = api.summary(&ExpenseQuery::week()).unwrap();
    assert_eq!(summary.total, Decimal::from(2300));
    assert_eq!(summary.transaction_count, 2);
    assert_eq!(summary.days_with_expenses, None);
    assert_eq!(server.requests()[0].query(), "week=true");
}

#[test]
fn get_all_expenses_follows_offset_pages() {
    let server = common::serve(vec![
        (
            "GET",
            "/expenses?range=2024-01-01%2C2024-12-31&limit=1000&offset=0",
            200,
            common::expenses_page(
                &[("2024-01-05", "lunch", 1500.0, 0), ("2024-02-01", "taxi", 800.0, 0)],
                0,
                3,
                true,
            ),
        ),
        (
            "GET",
            "/expenses?range=2024-01-01%2C2024-12-31&limit=1000&offset=2",
            200,
            common::expenses_page(&[("2024-06-30", "fuel", 2000.0, 0)], 2, 3, false),
        ),
    ]);
    let api = client(&server.url);
    let all = api
        .get_all_expenses(&ExpenseQuery::range(DateRange {
            start: day("2024-01-01"),
            end: day("2024-12-31"),
        }))
        .unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].expense, "fuel");
    assert_eq!(server.count("GET", "/expenses"), 2);
}

#[test]
fn get_all_expenses_stops_on_an_empty_page() {
    let server = common::serve(vec![(
        "GET",
        "/expenses",
        200,
        common::expenses_page(&[], 0, 5, true),
    )]);
    let api = client(&server.url);
    assert!(api.get_all_expenses(&ExpenseQuery::limit(1000)).unwrap().is_empty());
    assert_eq!(server.count("GET", "/expenses"), 1);
}
