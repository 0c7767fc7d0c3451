//! Création de la table finale depuis la table de staging
//!
//! Le DROP et le CREATE ne sont pas atomiques : si le CREATE échoue, la
//! destination reste absente jusqu'au prochain run réussi.

use tracing::info;

use crate::error::Geo2BqError;
use crate::warehouse::{JobSummary, TableReference, Warehouse};

/// Nom de la colonne géographie (texte WKT en staging, GEOGRAPHY en sortie)
pub const GEOGRAPHY_COLUMN: &str = geofile::GEOMETRY_COLUMN;

/// Script de remplacement de la destination.
///
/// Le DROP complet évite de conserver un partitionnement ou clustering d'un run précédent.
pub fn finalize_sql(staging: &TableReference, destination: &TableReference) -> String {
    let geo = GEOGRAPHY_COLUMN;
    let dest = destination.sql_path();
    format!(
        "DROP TABLE IF EXISTS {dest};\n\
         CREATE TABLE {dest} CLUSTER BY {geo} AS\n\
         SELECT * EXCEPT({geo}), ST_GEOGFROMTEXT({geo}) AS {geo} FROM {staging}",
        staging = staging.sql_path(),
    )
}

/// Remplace `destination` par le contenu de `staging` avec une colonne GEOGRAPHY
pub async fn create_final_table<W: Warehouse + ?Sized>(
    warehouse: &W,
    staging: &TableReference,
    destination: &TableReference,
) -> Result<JobSummary, Geo2BqError> {
    info!(from = %staging, to = %destination, "Creating final table");

    let summary = warehouse
        .execute_query(&finalize_sql(staging, destination))
        .await
        .map_err(|source| Geo2BqError::Transform {
            table: destination.clone(),
            source,
        })?;

    info!(table = %destination, job_id = %summary.job_id, "Final table created");
    Ok(summary)
}
