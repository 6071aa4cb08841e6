use std::path::PathBuf;

use clap::Parser;
use sea_orm::Database;
use tracing::info;

use yamdb_api::import::{Fixtures, ImportConfig, promote};
use yamdb_core::config::Config;
use yamdb_core::tracing::init_tracing;

/// Load CSV fixtures into an empty database and optionally promote an admin.
#[derive(Parser)]
#[command(name = "import")]
#[command(version)]
struct Cli {
    /// Directory holding users.csv, category.csv, genre.csv, titles.csv,
    /// genre_title.csv, review.csv and comments.csv
    #[arg(long, default_value = "static/data")]
    dir: PathBuf,

    /// Give this existing user the admin role after the import
    #[arg(long, value_name = "USERNAME")]
    promote: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = ImportConfig::from_env()?;

    let fixtures = Fixtures::load(&cli.dir)?;
    if fixtures.is_empty() && cli.promote.is_none() {
        info!(dir = %cli.dir.display(), "no fixture rows found");
        return Ok(());
    }

    let db = Database::connect(&config.database_url).await?;
    if !fixtures.is_empty() {
        fixtures.insert(&db).await?;
        info!(dir = %cli.dir.display(), "fixtures imported");
    }
    if let Some(username) = cli.promote.as_deref() {
        promote(&db, username).await?;
    }
    Ok(())
}
