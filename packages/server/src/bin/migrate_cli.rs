//! CLI for schema migrations and reference data
//!
//! Outputs one JSON object per command for scripting.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dkn_core::kernel::PostgresStore;
use serde::Serialize;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "migrate_cli")]
#[command(about = "Database migration and seeding CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending SQL migrations
    Migrate,

    /// Insert reference regions (existing names are skipped)
    SeedRegions {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Serialize)]
struct Response {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skipped: Option<Vec<String>>,
}

fn output(resp: Response) -> Result<()> {
    println!("{}", serde_json::to_string(&resp)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate => cmd_migrate().await,
        Commands::SeedRegions { names } => cmd_seed_regions(names).await,
    }
}

async fn get_store() -> Result<PostgresStore> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    Ok(PostgresStore::new(pool))
}

async fn cmd_migrate() -> Result<()> {
    let store = get_store().await?;
    store.migrate().await.context("Failed to run migrations")?;
    output(Response {
        success: true,
        message: Some("Migrations applied".to_string()),
        created: None,
        skipped: None,
    })
}

async fn cmd_seed_regions(names: Vec<String>) -> Result<()> {
    let store = get_store().await?;

    let mut created = Vec::new();
    let mut skipped = Vec::new();
    for name in names {
        let name = name.trim().to_string();
        if name.is_empty() {
            continue;
        }
        match store.seed_region(&name).await? {
            Some(region) => created.push(format!("{} ({})", region.region_name, region.id)),
            None => skipped.push(name),
        }
    }

    output(Response {
        success: true,
        message: None,
        created: Some(created),
        skipped: Some(skipped),
    })
}
