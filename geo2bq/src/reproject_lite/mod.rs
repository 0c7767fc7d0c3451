//! Reprojection légère vers WGS84 en Rust pur (sans dépendances externes)
//!
//! Sources supportées :
//! - Web Mercator (EPSG:3857, et l'alias historique EPSG:900913)
//! - Lambert 93 (EPSG:2154)
//! - UTM WGS84, toutes zones (EPSG:32601-32660 nord, 32701-32760 sud)
//!
//! Cible unique : WGS84 géographique (EPSG:4326), ordre lon/lat.

mod ellipsoid;
mod lambert;
mod mercator;
mod smart;
mod utm;

pub use smart::SmartReprojector;

use anyhow::{bail, Result};
use geo::{Coord, Geometry, MapCoords};

pub use ellipsoid::{Ellipsoid, GRS80, WGS84};

/// EPSG de la cible
pub const TARGET_EPSG: u32 = 4326;

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }
}

/// Projection source prise en charge en Rust pur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceProjection {
    WebMercator,
    Lambert93,
    Utm { zone: u32, south: bool },
}

impl SourceProjection {
    fn from_epsg(epsg: u32) -> Option<Self> {
        match epsg {
            3857 | 900913 => Some(Self::WebMercator),
            2154 => Some(Self::Lambert93),
            32601..=32660 => Some(Self::Utm {
                zone: epsg - 32600,
                south: false,
            }),
            32701..=32760 => Some(Self::Utm {
                zone: epsg - 32700,
                south: true,
            }),
            _ => None,
        }
    }
}

/// Reprojection légère vers WGS84
#[derive(Debug)]
pub struct ReprojectorLite {
    source_epsg: u32,
    source: SourceProjection,
}

impl ReprojectorLite {
    /// Crée un nouveau reprojector depuis `source_epsg` vers EPSG:4326
    pub fn new(source_epsg: u32) -> Result<Self> {
        let Some(source) = SourceProjection::from_epsg(source_epsg) else {
            bail!(
                "EPSG:{} not supported by the built-in projections. \
                 Supported sources: 3857, 2154, 32601-32660, 32701-32760",
                source_epsg
            );
        };
        Ok(Self {
            source_epsg,
            source,
        })
    }

    /// Vérifie si l'EPSG source est supporté
    pub fn is_supported(epsg: u32) -> bool {
        SourceProjection::from_epsg(epsg).is_some()
    }

    /// Transforme un point (x, y) de la source vers (lon, lat) en degrés
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let geo = match self.source {
            SourceProjection::WebMercator => mercator::web_mercator_to_geographic(x, y),
            SourceProjection::Lambert93 => lambert::lambert93_to_geographic(x, y),
            SourceProjection::Utm { zone, south } => utm::utm_to_geographic(x, y, zone, south),
        };
        let (lon, lat) = geo.to_degrees();
        if !lon.is_finite() || !lat.is_finite() {
            bail!(
                "EPSG:{} coordinate ({}, {}) has no WGS84 equivalent",
                self.source_epsg,
                x,
                y
            );
        }
        Ok((lon, lat))
    }

    /// Transforme une géométrie (tous types, collections comprises)
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry> {
        geom.try_map_coords(|c| {
            let (x, y) = self.transform_point(c.x, c.y)?;
            Ok(Coord { x, y })
        })
    }
}
