//! Rapport d'un chargement

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

/// Résumé d'un run réussi
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Fichier source
    pub source: PathBuf,
    /// Table de destination (`project.dataset.table`)
    pub destination: String,
    /// Table de staging utilisée (supprimée en fin de run)
    pub staging: String,
    /// CRS détecté dans la source
    pub source_crs: String,
    /// Vrai si les géométries ont été reprojetées en EPSG:4326
    pub reprojected: bool,
    /// Nombre de lignes lues
    pub rows_read: usize,
    /// Nombre de lignes annoncées par le job de chargement
    pub rows_loaded: Option<u64>,
    /// Durée totale
    pub duration_secs: f64,
    /// Échec de suppression de la table de staging, le cas échéant
    pub cleanup_warning: Option<String>,
}

impl LoadReport {
    /// Sérialise le rapport en JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Vrai si la table de staging n'a pas pu être supprimée
    pub fn has_warnings(&self) -> bool {
        self.cleanup_warning.is_some()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loaded {} rows from {} into {} ({}{}) in {:.1}s",
            self.rows_loaded.unwrap_or(self.rows_read as u64),
            self.source.display(),
            self.destination,
            self.source_crs,
            if self.reprojected { " -> EPSG:4326" } else { "" },
            self.duration_secs
        )?;
        if let Some(warning) = &self.cleanup_warning {
            write!(f, " [warning: {}]", warning)?;
        }
        Ok(())
    }
}
