// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use quickledger::analytics::category::Category;
use quickledger::api::ApiClient;
use quickledger::budget::{BudgetManager, ProgressLevel, progress};
use quickledger::cli;
use quickledger::commands::budgets;
use rust_decimal::Decimal;

const BUDGET_OK: &str = r#"{"month":"2024-03","budget_amount":50000,"spent":0,"remaining":50000,"percentage":0,"over_budget":false,"reset_from_previous":false}"#;

#[test]
fn monthly_budget_is_stored_after_backend_accepts_it() {
    let server = common::serve(vec![("POST", "/budget", 200, BUDGET_OK.to_string())]);
    let conn = common::store();
    let api = ApiClient::new(&common::config(&server.url)).unwrap();
    let mgr = BudgetManager::new(&conn).with_remote(&api);

    mgr.set_monthly(Decimal::from(50000)).unwrap();
    assert_eq!(mgr.load().unwrap().monthly, Decimal::from(50000));
    assert_eq!(server.count("POST", "/budget"), 1);

    let p = progress(&mgr.load().unwrap(), Decimal::from(46000)).unwrap();
    assert_eq!(p.level, ProgressLevel::Critical);
}

#[test]
fn rejected_monthly_budget_leaves_local_state_alone() {
    let server = common::serve(vec![(
        "POST",
        "/budget",
        422,
        r#"{"detail":[{"msg":"amount must be positive"}]}"#.to_string(),
    )]);
    let conn = common::store();
    let api = ApiClient::new(&common::config(&server.url)).unwrap();
    let mgr = BudgetManager::new(&conn).with_remote(&api);

    let err = mgr.set_monthly(Decimal::from(10)).unwrap_err();
    assert_eq!(err.to_string(), "amount must be positive");
    assert_eq!(mgr.load().unwrap().monthly, Decimal::ZERO);
}

#[test]
fn weekly_and_category_budgets_stay_local() {
    let server = common::serve(vec![]);
    let conn = common::store();
    let api = ApiClient::new(&common::config(&server.url)).unwrap();
    let mgr = BudgetManager::new(&conn).with_remote(&api);
    mgr.set_weekly(Decimal::from(9000)).unwrap();
    mgr.set_category(Category::Transport, Decimal::from(4000)).unwrap();
    let b = mgr.load().unwrap();
    assert_eq!(b.weekly, Decimal::from(9000));
    assert_eq!(b.categories["transport"], Decimal::from(4000));
    assert!(server.requests().is_empty());
}

#[test]
fn reset_command_needs_confirmation_then_clears_both_sides() {
    let server = common::serve(vec![
        ("POST", "/budget", 200, BUDGET_OK.to_string()),
        ("DELETE", "/budget", 200, r#"{"message":"Budget deleted"}"#.to_string()),
    ]);
    let ctx = common::context(&server.url);
    ctx.budgets().set_monthly(Decimal::from(50000)).unwrap();
    ctx.budgets()
        .set_category(Category::Food, Decimal::from(15000))
        .unwrap();

    let m = cli::build_cli().get_matches_from(["quickledger", "budget", "reset"]);
    let Some(("budget", sub)) = m.subcommand() else {
        panic!("no budget subcommand");
    };
    assert!(budgets::handle(&ctx, sub).is_err());
    assert_eq!(ctx.load_budget().unwrap().monthly, Decimal::from(50000));

    let m = cli::build_cli().get_matches_from(["quickledger", "budget", "reset", "--yes"]);
    let Some(("budget", sub)) = m.subcommand() else {
        panic!("no budget subcommand");
    };
    budgets::handle(&ctx, sub).unwrap();
    let b = ctx.load_budget().unwrap();
    assert_eq!(b.monthly, Decimal::ZERO);
    assert!(b.categories.is_empty());
    assert_eq!(server.count("DELETE", "/budget"), 1);
}
