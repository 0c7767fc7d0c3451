//! Reprojection intelligente : reproject_lite en priorité, fallback sur proj
//!
//! Utilise automatiquement la meilleure option disponible.

use super::{ReprojectorLite, TARGET_EPSG};
use anyhow::{bail, Result};
use geo::Geometry;
use geofile::Crs;

/// Reprojection intelligente vers EPSG:4326
///
/// Essaie d'abord reproject_lite (pure Rust), puis fallback sur proj si disponible.
#[derive(Debug)]
pub enum SmartReprojector {
    /// Reprojection légère (pure Rust)
    Lite(ReprojectorLite),
    /// Reprojection via PROJ (si feature activée)
    #[cfg(feature = "reproject")]
    Proj(crate::export::reproject::Reprojector),
    /// Pas de reprojection (source == cible)
    Identity,
}

impl SmartReprojector {
    /// Crée un reprojector depuis le CRS détecté dans la source
    pub fn new(source: &Crs) -> Result<Self> {
        match source {
            Crs::Epsg(TARGET_EPSG) => Ok(Self::Identity),
            Crs::Undefined => bail!(
                "Source CRS is undefined: cannot reproject naive geometries to EPSG:{}",
                TARGET_EPSG
            ),
            Crs::Epsg(epsg) if ReprojectorLite::is_supported(*epsg) => {
                Ok(Self::Lite(ReprojectorLite::new(*epsg)?))
            }
            other => Self::fallback(other),
        }
    }

    #[cfg(feature = "reproject")]
    fn fallback(source: &Crs) -> Result<Self> {
        let proj = crate::export::reproject::Reprojector::new(source, TARGET_EPSG)?;
        Ok(Self::Proj(proj))
    }

    #[cfg(not(feature = "reproject"))]
    fn fallback(source: &Crs) -> Result<Self> {
        bail!(
            "Reprojection {} → EPSG:{} is not supported.\n\
             Built-in projections: 3857 (Web Mercator), 2154 (Lambert 93), 326xx/327xx (UTM WGS84).\n\
             For other projections, build with: cargo build --features reproject",
            source,
            TARGET_EPSG
        )
    }

    /// Vrai si les géométries seront effectivement modifiées
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Transforme une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry> {
        match self {
            Self::Identity => Ok(geom.clone()),
            Self::Lite(lite) => lite.transform_geometry(geom),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.transform_geometry(geom),
        }
    }

    /// Retourne une description du reprojector utilisé
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Lite(_) => "reproject_lite (pure Rust)",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "proj (PROJ library)",
        }
    }
}
