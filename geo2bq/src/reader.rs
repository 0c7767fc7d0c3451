//! Lecture de la source et reprojection vers WGS84

use std::path::Path;

use geofile::{Crs, GeoDataset};
use tracing::info;

use crate::error::Geo2BqError;
use crate::reproject_lite::{SmartReprojector, TARGET_EPSG};

/// CRS cible de toutes les géométries chargées
pub const TARGET_CRS: Crs = Crs::Epsg(TARGET_EPSG);

/// Résultat de la lecture : table en EPSG:4326 et CRS d'origine
#[derive(Debug)]
pub struct SourceData {
    pub dataset: GeoDataset,
    pub source_crs: Crs,
    pub reprojected: bool,
}

/// Lit un fichier géographique et le reprojette si nécessaire
pub fn load_source(path: &Path) -> Result<SourceData, Geo2BqError> {
    info!(path = %path.display(), "Reading source file");
    let mut dataset =
        geofile::read(path).map_err(|e| Geo2BqError::unreadable(path, e.to_string()))?;

    let source_crs = dataset.crs.clone();
    info!(crs = %source_crs, rows = dataset.len(), "Current CRS is {}", source_crs);

    let reprojector = SmartReprojector::new(&source_crs)
        .map_err(|e| Geo2BqError::unreadable(path, format!("{:#}", e)))?;
    if reprojector.is_identity() {
        return Ok(SourceData {
            dataset,
            source_crs,
            reprojected: false,
        });
    }

    info!(
        backend = reprojector.description(),
        "Reprojecting to {}", TARGET_CRS
    );

    for (index, row) in dataset.rows.iter_mut().enumerate() {
        if let Some(geometry) = row.geometry.as_mut() {
            *geometry = reprojector.transform_geometry(geometry).map_err(|e| {
                Geo2BqError::unreadable(path, format!("row {}: {:#}", index, e))
            })?;
        }
    }
    dataset.crs = TARGET_CRS;

    Ok(SourceData {
        dataset,
        source_crs,
        reprojected: true,
    })
}
