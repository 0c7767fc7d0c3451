//! Export de la table en CSV (en-tête + lignes, géométrie en WKT)
//!
//! Le fichier est écrit dans un fichier temporaire du même répertoire puis
//! renommé : `data.csv` n'existe jamais à l'état partiel.

use std::io;
use std::path::{Path, PathBuf};

use geofile::{GeoDataset, GEOMETRY_COLUMN};
use geozero::wkt::WktWriter;
use geozero::GeozeroGeometry;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

/// Nom du fichier CSV produit dans le répertoire de travail
pub const CSV_FILE_NAME: &str = "data.csv";

/// Erreurs d'écriture du CSV
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to encode geometry of row {row} to WKT: {reason}")]
    Wkt { row: usize, reason: String },
}

/// Exporte la table dans `dir/data.csv` et retourne le chemin du fichier
pub fn export_to_csv(dataset: &GeoDataset, dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(CSV_FILE_NAME);
    info!(path = %path.display(), rows = dataset.len(), "Dumping temporary CSV");

    let tmp = NamedTempFile::new_in(dir)?;
    let mut writer = csv::Writer::from_writer(tmp);

    writer.write_record(
        dataset
            .columns
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(GEOMETRY_COLUMN)),
    )?;

    let mut wkt_buf = Vec::new();
    for (index, row) in dataset.rows.iter().enumerate() {
        wkt_buf.clear();
        if let Some(geometry) = &row.geometry {
            let mut wkt_writer = WktWriter::new(&mut wkt_buf);
            geometry
                .process_geom(&mut wkt_writer)
                .map_err(|e| ExportError::Wkt {
                    row: index,
                    reason: e.to_string(),
                })?;
        }

        writer.write_record(
            row.attributes
                .iter()
                .map(|v| v.as_deref().unwrap_or("").as_bytes())
                .chain(std::iter::once(wkt_buf.as_slice())),
        )?;
    }

    let tmp = writer.into_inner().map_err(|e| e.into_error())?;
    tmp.persist(&path).map_err(|e| e.error)?;
    debug!(path = %path.display(), "CSV persisted");

    Ok(path)
}
