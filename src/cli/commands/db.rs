use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::{DatabaseManager, Store};

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Apply pending migrations")]
    Migrate,

    #[command(about = "Check that the database is reachable")]
    Ping,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = DatabaseManager::redacted_url(&config::config().database.url);

    match cmd {
        DbCommands::Migrate => {
            let pool = DatabaseManager::connect_lazy(&config::config().database)?;
            DatabaseManager::migrate(&pool).await?;
            output_success(&output_format, "Migrations applied", Some(json!({ "database": url })))
        }
        DbCommands::Ping => {
            crate::cli::repository()?.ping().await?;
            output_success(&output_format, "Database is reachable", Some(json!({ "database": url })))
        }
    }
}
