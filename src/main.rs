use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use pdp_backend::adaptive::types::InteractionStatus;
use pdp_backend::adaptive::RecommendationEngine;
use pdp_backend::config::Config;
use pdp_backend::db::Database;
use pdp_backend::logging;
use pdp_backend::seed;
use pdp_backend::services::{LearningService, NewInteraction};

#[derive(Debug, Parser)]
#[command(name = "pdp-backend", about = "Adaptive learning recommendations over the PDP catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Insert demo learners and catalog when the catalog is empty.
    Seed,
    /// Single next asset for a learner.
    Next { learner_id: String },
    /// Ranked recommendations for a learner.
    Recommend {
        learner_id: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Record an interaction and apply its mastery effects.
    Record {
        #[arg(long)]
        learner: String,
        #[arg(long)]
        asset: String,
        #[arg(long, value_parser = parse_status)]
        status: InteractionStatus,
        #[arg(long)]
        score: Option<f64>,
        #[arg(long, default_value_t = 0)]
        time_spent: u32,
        #[arg(long, default_value_t = 1)]
        attempts: u32,
    },
    /// Completion stats and skill mastery for a learner.
    Summary { learner_id: String },
    /// Study time, completions, weekly activity and skill gaps for a learner.
    Analytics { learner_id: String },
    /// Interactions with asset titles, newest first.
    History {
        learner_id: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Notifications for a learner, newest first.
    Notifications { learner_id: String },
    /// Mark a notification as read.
    Read { notification_id: String },
}

fn parse_status(raw: &str) -> Result<InteractionStatus, String> {
    match raw.to_lowercase().as_str() {
        "started" | "completed" | "failed" => Ok(InteractionStatus::parse(raw)),
        other => Err(format!("unknown status {other:?}, expected started|completed|failed")),
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(2);
        }
    };
    let _log_guard = logging::init_tracing(&config.log_level);

    if let Err(err) = run(cli.command, config).await {
        tracing::error!(error = %format!("{err:#}"), "command failed");
        std::process::exit(1);
    }
}

async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    let db = Arc::new(
        Database::connect(config.database.clone())
            .await
            .context("failed to open database")?,
    );
    db.migrate().await.context("failed to run migrations")?;

    let engine = RecommendationEngine::new(Arc::clone(&db), config.engine.clone());
    let service = LearningService::new(engine);

    match command {
        Command::Migrate => print_json(&serde_json::json!({ "status": "up to date" })),
        Command::Seed => print_json(&seed::seed_demo_data(db.as_ref()).await?),
        Command::Next { learner_id } => {
            print_json(&service.engine().compute_next_asset(&learner_id).await?)
        }
        Command::Recommend { learner_id, limit } => {
            let (assets, notifications) = service.recommendations(&learner_id, limit).await?;
            print_json(&serde_json::json!({
                "recommendations": assets,
                "notifications": notifications,
            }))
        }
        Command::Record {
            learner,
            asset,
            status,
            score,
            time_spent,
            attempts,
        } => {
            let outcome = service
                .record_interaction(NewInteraction {
                    learner_id: learner,
                    asset_id: asset,
                    status,
                    score,
                    time_spent_seconds: time_spent,
                    attempts,
                })
                .await?;
            print_json(&outcome)
        }
        Command::Summary { learner_id } => print_json(&service.summary(&learner_id).await?),
        Command::Analytics { learner_id } => print_json(&service.analytics(&learner_id).await?),
        Command::History { learner_id, limit } => {
            print_json(&service.history(&learner_id, limit).await?)
        }
        Command::Notifications { learner_id } => {
            print_json(&service.notifications().list(&learner_id).await?)
        }
        Command::Read { notification_id } => {
            let updated = service.notifications().mark_read(&notification_id).await?;
            if !updated {
                tracing::warn!(notification_id = %notification_id, "notification not found");
            }
            print_json(&serde_json::json!({ "updated": updated }))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
