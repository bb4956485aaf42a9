// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shikkha - coaching-center SMS billing and dispatch service.
//!
//! This is the binary entry point.

use clap::{Parser, Subcommand};

mod serve;
mod status;

/// Shikkha - coaching-center SMS billing and dispatch service.
#[derive(Parser, Debug)]
#[command(name = "shikkha", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the service: schedulers plus graceful shutdown handling.
    Serve,
    /// Show a teacher's balance, usage, and alerts.
    Status {
        /// Teacher id to report on.
        #[arg(long)]
        teacher_id: i64,
    },
    /// Trigger monthly result processing for an explicit period.
    TriggerMonthly {
        /// Year of the period (defaults to the previous month's year).
        #[arg(long)]
        year: Option<i32>,
        /// Month of the period, 1-12 (defaults to the previous month).
        #[arg(long)]
        month: Option<u32>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match shikkha_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            shikkha_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    serve::init_tracing(&config.app.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Status { teacher_id }) => status::run_status(config, teacher_id).await,
        Some(Commands::TriggerMonthly { year, month }) => {
            serve::run_trigger_monthly(config, year, month).await
        }
        None => {
            println!("shikkha: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
