//! Types de données pour le crate geofile

use std::fmt;

use geo::Geometry;

use crate::GeoFileError;

/// Nom réservé de la colonne géométrie
pub const GEOMETRY_COLUMN: &str = "geometry";

/// Système de coordonnées détecté dans la source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Crs {
    /// Code EPSG identifié
    Epsg(u32),

    /// Définition WKT brute (ex: `.prj` ESRI sans autorité reconnue)
    Wkt(String),

    /// Aucune information de projection
    Undefined,
}

impl Crs {
    /// WGS84 géographique (EPSG:4326)
    pub const WGS84: Crs = Crs::Epsg(4326);
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{}", code),
            Crs::Wkt(wkt) => {
                // Le WKT complet est illisible dans les logs
                let head: String = wkt.chars().take(48).collect();
                if head.len() < wkt.len() {
                    write!(f, "WKT[{}…]", head)
                } else {
                    write!(f, "WKT[{}]", head)
                }
            }
            Crs::Undefined => f.write_str("undefined"),
        }
    }
}

/// Une ligne de la table : attributs alignés sur `GeoDataset::columns` + géométrie
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Valeurs textuelles des attributs (None = valeur nulle)
    pub attributes: Vec<Option<String>>,

    /// Géométrie (None si la feature n'en a pas)
    pub geometry: Option<Geometry>,
}

/// Table géographique en mémoire
#[derive(Debug, Clone, PartialEq)]
pub struct GeoDataset {
    /// Noms des colonnes attributaires, dans l'ordre de la source
    pub columns: Vec<String>,

    /// Lignes de la table
    pub rows: Vec<Row>,

    /// Système de coordonnées des géométries
    pub crs: Crs,
}

impl GeoDataset {
    /// Crée une table vide pour les colonnes données
    ///
    /// # Errors
    ///
    /// Retourne `GeoFileError::ReservedColumn` si une colonne s'appelle `geometry`.
    pub fn new(columns: Vec<String>, crs: Crs) -> Result<Self, GeoFileError> {
        if let Some(col) = columns
            .iter()
            .find(|c| c.eq_ignore_ascii_case(GEOMETRY_COLUMN))
        {
            return Err(GeoFileError::ReservedColumn(col.clone()));
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
            crs,
        })
    }

    /// Nombre de lignes
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Vrai si la table ne contient aucune ligne
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Nombre de lignes sans géométrie
    pub fn null_geometries(&self) -> usize {
        self.rows.iter().filter(|r| r.geometry.is_none()).count()
    }
}
