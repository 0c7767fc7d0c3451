//! # geofile
//!
//! Lecture de fichiers vecteurs géographiques vers une table en mémoire.
//!
//! ## Features
//!
//! - GeoJSON (FeatureCollection, Feature, Geometry) avec le membre `crs` historique
//! - ESRI Shapefile (.shp/.dbf) avec détection du CRS depuis le `.prj`
//! - Types `geo` pour l'interopérabilité avec l'écosystème Rust géospatial
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geofile::read;
//! use std::path::Path;
//!
//! let dataset = read(Path::new("communes.geojson"))?;
//! println!("CRS: {}", dataset.crs);
//! println!("{} lignes, colonnes {:?}", dataset.len(), dataset.columns);
//! ```

pub mod crs;
pub mod error;
pub mod geojson;
pub mod shapefile;
pub mod types;

pub use error::GeoFileError;
pub use types::{Crs, GeoDataset, Row, GEOMETRY_COLUMN};

use std::io::Read;
use std::path::Path;

/// Formats de fichiers supportés
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    GeoJson,
    Shapefile,
}

/// Détecte le format d'après l'extension, puis d'après le contenu
pub fn detect_format(path: &Path) -> Result<Format, GeoFileError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("geojson") | Some("json") => return Ok(Format::GeoJson),
        Some("shp") => return Ok(Format::Shapefile),
        _ => {}
    }

    // Sniffing : un document JSON commence par '{'
    let mut head = [0u8; 512];
    let n = std::fs::File::open(path)?.read(&mut head)?;
    if head[..n]
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{')
    {
        return Ok(Format::GeoJson);
    }

    Err(GeoFileError::UnsupportedFormat(path.display().to_string()))
}

/// Lit un fichier géographique et retourne la table correspondante.
///
/// # Errors
///
/// Retourne `GeoFileError` si le format n'est pas reconnu ou si le fichier est illisible.
pub fn read(path: &Path) -> Result<GeoDataset, GeoFileError> {
    match detect_format(path)? {
        Format::GeoJson => geojson::read(path),
        Format::Shapefile => shapefile::read(path),
    }
}
