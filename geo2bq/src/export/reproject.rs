//! Reprojection de géométries avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject`.

use anyhow::{Context, Result};
use geo::{Coord, Geometry, MapCoords};
use geofile::Crs;
use proj::Proj;

/// Reprojection de géométries d'un CRS quelconque vers un EPSG cible
pub struct Reprojector {
    proj: Proj,
    source: String,
    target_epsg: u32,
}

impl std::fmt::Debug for Reprojector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reprojector")
            .field("source", &self.source)
            .field("target_epsg", &self.target_epsg)
            .finish()
    }
}

impl Reprojector {
    /// Crée un reprojector depuis un CRS détecté (EPSG ou WKT) vers `target_epsg`
    pub fn new(source: &Crs, target_epsg: u32) -> Result<Self> {
        let source_def = match source {
            Crs::Epsg(code) => format!("EPSG:{}", code),
            Crs::Wkt(wkt) => wkt.clone(),
            Crs::Undefined => anyhow::bail!("Cannot build a projection from an undefined CRS"),
        };
        let target = format!("EPSG:{}", target_epsg);

        // new_known_crs normalise l'ordre des axes (lon/lat en sortie)
        let proj = Proj::new_known_crs(&source_def, &target, None)
            .with_context(|| format!("Failed to create projection from {} to {}", source, target))?;

        Ok(Self {
            proj,
            source: source.to_string(),
            target_epsg,
        })
    }

    /// Transforme une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry> {
        geom.try_map_coords(|c| {
            let (x, y) = self
                .proj
                .convert((c.x, c.y))
                .context("Coordinate transformation failed")?;
            Ok(Coord { x, y })
        })
    }
}
