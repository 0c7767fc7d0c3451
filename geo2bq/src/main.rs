//! Point d'entrée CLI pour geo2bq

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

/// Charger un fichier géographique dans une table BigQuery
#[derive(Parser)]
#[command(name = "geo2bq")]
#[command(author, version)]
#[command(about = "Load a GeoJSON or Shapefile into a BigQuery table with a GEOGRAPHY column")]
struct Cli {
    /// Path to the source file (.geojson, .json, .shp)
    src_path: PathBuf,

    /// Destination table (project.dataset.table), replaced if it exists
    dest_table_path: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();

    let cli = Cli::parse();
    init_logging();

    cli::cmd_load(&cli.src_path, &cli.dest_table_path).await
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
