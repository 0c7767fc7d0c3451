//! Implémentation de la commande de chargement

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use geo2bq::{BigQueryClient, Pipeline, TableReference, WarehouseConfig};

/// Charge `src` dans la table `dest` et affiche le résumé
pub async fn cmd_load(src: &Path, dest: &str) -> Result<()> {
    let destination: TableReference = dest.parse()?;
    let config = WarehouseConfig::from_env()?;
    info!(
        api_url = %config.api_url,
        location = ?config.location,
        "BigQuery configuration"
    );

    let client = BigQueryClient::from_ambient_credentials(config, destination.project.clone())
        .await
        .context("Failed to obtain Google credentials")?;

    let report = Pipeline::new(client)
        .run(src, dest)
        .await
        .with_context(|| format!("Failed to load {} into {}", src.display(), dest))?;

    if report.has_warnings() {
        warn!(
            staging = %report.staging,
            warning = report.cleanup_warning.as_deref().unwrap_or_default(),
            "Staging table left behind"
        );
    }
    debug!(report = %report.to_json()?, "Load report");
    println!("{}", report);
    Ok(())
}
