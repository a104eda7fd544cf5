use clap::Subcommand;
use serde_json::json;
use sqlx::Executor;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::Database;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Connect to the configured database and run a trivial query")]
    Check,

    #[command(about = "Apply sql/schema.sql (idempotent)")]
    Init,
}

const SCHEMA: &str = include_str!("../../../sql/schema.sql");

pub async fn handle(cmd: DbCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let db = Database::connect(&config.database).await?;

    let outcome = match cmd {
        DbCommands::Check => match db.health_check().await {
            Ok(()) => output_success(
                &output_format,
                "Database reachable",
                Some(json!({ "max_connections": config.database.max_connections })),
            ),
            Err(e) => {
                output_error(&output_format, &e.to_string(), Some("DATABASE_UNAVAILABLE"))?;
                Err(e.into())
            }
        },
        DbCommands::Init => {
            db.pool().execute(SCHEMA).await?;
            output_success(&output_format, "Schema applied", None)
        }
    };

    db.close().await;
    outcome
}
