//! Chargement du CSV dans la table de staging

use std::path::Path;

use tracing::info;

use crate::error::Geo2BqError;
use crate::warehouse::{JobSummary, LoadJobConfig, TableReference, Warehouse, WarehouseError};

/// Charge `csv_path` dans `staging` (schéma auto-détecté, en-tête ignoré, table remplacée)
pub async fn load_staging_table<W: Warehouse + ?Sized>(
    warehouse: &W,
    csv_path: &Path,
    staging: &TableReference,
) -> Result<JobSummary, Geo2BqError> {
    info!(table = %staging, "Loading temporary CSV");
    let to_load_error = |source: WarehouseError| Geo2BqError::LoadJob {
        table: staging.clone(),
        source,
    };

    let file = tokio::fs::File::open(csv_path)
        .await
        .map_err(|e| to_load_error(e.into()))?;

    let summary = warehouse
        .load_table_from_file(file, staging, &LoadJobConfig::staging_csv())
        .await
        .map_err(to_load_error)?;

    info!(
        table = %staging,
        job_id = %summary.job_id,
        rows = ?summary.output_rows,
        "Staging table loaded"
    );
    Ok(summary)
}
