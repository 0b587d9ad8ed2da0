use castaway_pool_engine::config::config::Config;
use castaway_pool_engine::repository::database::Database;
use castaway_pool_engine::service::reconcile::Reconciler;
use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

/// Apply one week's real-world results across every league of the current
/// season: backfill missing picks, score predictions and wagers, and update
/// exile/elimination standings. Safe to re-run with the same arguments.
#[derive(Parser, Debug)]
#[command(name = "castaway-pool-engine")]
struct Cli {
    /// Week number to update
    week_number: i32,
    /// Name of the contestant who was voted out
    voted_out_contestant: String,
    /// Name of the contestant (or tribe) that won immunity
    immunity_winner: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    log4rs::init_file("./log-config.yml", Default::default()).expect("Log config file not found.");
    let cli = Cli::parse();
    let config = Config::init();
    let db = Database::new(&config);
    let reconciler = Reconciler::new(db, &config);

    match reconciler
        .run(
            cli.week_number,
            &cli.voted_out_contestant,
            &cli.immunity_winner,
        )
        .await
    {
        Ok(summary) => {
            info!(
                "Run summary: {}",
                serde_json::to_string(&summary).unwrap_or_else(|_| "{}".to_string())
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Reconciliation aborted before any league could be processed: {err}");
            ExitCode::FAILURE
        }
    }
}
