// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, value_parser, Arg, ArgAction, Command};

/// Ten years of days.
pub const MAX_TREND_DAYS: i64 = 3660;

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn filter_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("search")
            .long("search")
            .help("Case-insensitive text to look for in the expense name"),
    )
    .arg(
        Arg::new("category")
            .long("category")
            .help("Food|Transport|Data|Utilities|Other"),
    )
    .arg(
        Arg::new("amount-band")
            .long("amount-band")
            .help("0-500|500-1000|1000-2000|2000-5000|5000+"),
    )
}

fn today_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("today")
            .long("today")
            .help("Reference date YYYY-MM-DD (defaults to today)"),
    )
}

fn text_arg() -> Arg {
    Arg::new("text")
        .required(true)
        .num_args(1..)
        .help("Free text, e.g. \"bought bread 500 and fuel 2000\"")
}

pub fn build_cli() -> Command {
    Command::new("quickledger")
        .version(crate_version!())
        .about("QuickLedger expense tracker client")
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .help("Backend base URL (overrides QUICKLEDGER_API_URL and the stored setting)"),
        )
        .subcommand(
            Command::new("expense")
                .about("Record, list, edit and delete expenses")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, defaults to today")),
                )
                .subcommand(json_args(filter_args(
                    Command::new("list")
                        .arg(Arg::new("date").long("date").help("Only this day"))
                        .arg(
                            Arg::new("week")
                                .long("week")
                                .action(ArgAction::SetTrue)
                                .help("Only the current week"),
                        )
                        .arg(Arg::new("from").long("from").requires("to"))
                        .arg(Arg::new("to").long("to").requires("from"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize))
                                .help("Records to fetch from the backend (1-1000)"),
                        )
                        .arg(
                            Arg::new("page")
                                .long("page")
                                .value_parser(value_parser!(usize))
                                .default_value("1"),
                        )
                        .arg(
                            Arg::new("per-page")
                                .long("per-page")
                                .value_parser(value_parser!(usize)),
                        ),
                )))
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(
                            Arg::new("index")
                                .long("index")
                                .required(true)
                                .value_parser(value_parser!(usize)),
                        )
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("amount").long("amount")),
                )
                .subcommand(json_args(
                    Command::new("rm").arg(
                        Arg::new("item")
                            .long("item")
                            .required(true)
                            .action(ArgAction::Append)
                            .help("DATE:INDEX, repeat to delete several"),
                    ),
                )),
        )
        .subcommand(json_args(
            Command::new("say")
                .about("Record expenses from natural language")
                .arg(text_arg()),
        ))
        .subcommand(json_args(
            Command::new("parse")
                .about("Preview what the backend would record from text")
                .arg(text_arg()),
        ))
        .subcommand(json_args(
            Command::new("stats").about("Backend statistics"),
        ))
        .subcommand(json_args(
            Command::new("summary")
                .about("Backend totals for a day, the current week or a date range")
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("week").long("week").action(ArgAction::SetTrue))
                .arg(Arg::new("from").long("from").requires("to"))
                .arg(Arg::new("to").long("to").requires("from")),
        ))
        .subcommand(json_args(
            Command::new("dashboard").about("Overview: totals, budget, recent expenses, trend"),
        ))
        .subcommand(
            Command::new("analytics")
                .about("Comparisons, predictions and trends")
                .subcommand(json_args(today_arg(
                    Command::new("compare")
                        .arg(
                            Arg::new("period")
                                .long("period")
                                .help("week|month|quarter|year")
                                .default_value("month"),
                        )
                        .arg(
                            Arg::new("metric")
                                .long("metric")
                                .help("total|average|transactions|categories")
                                .default_value("total"),
                        ),
                )))
                .subcommand(json_args(today_arg(Command::new("predict"))))
                .subcommand(json_args(today_arg(Command::new("velocity"))))
                .subcommand(json_args(today_arg(
                    Command::new("trend").arg(
                        Arg::new("days")
                            .long("days")
                            .value_parser(value_parser!(u32).range(1..=MAX_TREND_DAYS))
                            .default_value("30"),
                    ),
                )))
                .subcommand(json_args(
                    Command::new("monthly").arg(Arg::new("month").long("month").help("YYYY-MM")),
                ))
                .subcommand(json_args(
                    Command::new("breakdown").arg(
                        Arg::new("top")
                            .long("top")
                            .value_parser(value_parser!(usize)),
                    ),
                )),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly, weekly and category budgets")
                .subcommand(json_args(
                    Command::new("show").arg(
                        Arg::new("offline")
                            .long("offline")
                            .action(ArgAction::SetTrue)
                            .help("Skip fetching spend from the backend"),
                    ),
                ))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("monthly").long("monthly"))
                        .arg(Arg::new("weekly").long("weekly"))
                        .arg(Arg::new("category").long("category").requires("amount"))
                        .arg(Arg::new("amount").long("amount")),
                )
                .subcommand(
                    Command::new("reset").arg(
                        Arg::new("yes")
                            .long("yes")
                            .action(ArgAction::SetTrue),
                    ),
                )
                .subcommand(json_args(Command::new("remote"))),
        )
        .subcommand(filter_args(
            Command::new("export")
                .about("Export expenses to CSV or JSON")
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("csv")
                        .help("csv|json"),
                )
                .arg(Arg::new("out").long("out").help("Output file")),
        ))
        .subcommand(
            Command::new("import")
                .about("Import expenses from a CSV or JSON file")
                .arg(Arg::new("path").long("path").required(true))
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Validate and show the rows without sending them"),
                ),
        )
        .subcommand(
            Command::new("notify")
                .about("Reminders, achievements and budget alerts")
                .subcommand(json_args(Command::new("check")))
                .subcommand(json_args(
                    Command::new("settings")
                        .arg(Arg::new("budget-alerts").long("budget-alerts").help("on|off"))
                        .arg(Arg::new("daily-reminders").long("daily-reminders").help("on|off"))
                        .arg(Arg::new("achievements").long("achievements").help("on|off")),
                )),
        )
        .subcommand(
            Command::new("config")
                .about("Local settings")
                .subcommand(json_args(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
}
