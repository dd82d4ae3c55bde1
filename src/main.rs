// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quickledger::config::Config;
use quickledger::session::AppContext;
use quickledger::{cli, commands, db, utils};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "quickledger=warn".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let matches = cli::build_cli().get_matches();

    let conn = db::open_or_init()?;
    let api_flag = matches.get_one::<String>("api-url").map(String::as_str);
    let config = Config::resolve(&conn, api_flag)?;
    utils::set_dark_mode(config.dark_mode);
    let mut ctx = AppContext::new(config, conn)?;

    match matches.subcommand() {
        Some(("expense", sub)) => commands::expenses::handle(&mut ctx, sub)?,
        Some(("say", sub)) => commands::nlp::say(&ctx, sub)?,
        Some(("parse", sub)) => commands::nlp::parse(&ctx, sub)?,
        Some(("stats", sub)) => commands::dashboard::stats(&ctx, sub)?,
        Some(("summary", sub)) => commands::dashboard::summary(&ctx, sub)?,
        Some(("dashboard", sub)) => commands::dashboard::handle(&mut ctx, sub)?,
        Some(("analytics", sub)) => commands::analytics::handle(&ctx, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&ctx, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&ctx, sub)?,
        Some(("import", sub)) => commands::importer::handle(&ctx, sub)?,
        Some(("notify", sub)) => commands::notices::handle(&ctx, sub)?,
        Some(("config", sub)) => commands::settings::handle(&ctx, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
