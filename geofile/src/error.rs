//! Types d'erreurs pour le crate geofile

use thiserror::Error;

/// Erreurs pouvant survenir lors de la lecture d'un fichier géographique
#[derive(Debug, Error)]
pub enum GeoFileError {
    /// Erreur d'I/O lors de la lecture du fichier
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Format non reconnu (ni par l'extension, ni par le contenu)
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Erreur de parsing d'un fichier
    #[error("Parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// Géométrie invalide ou non convertible
    #[error("Invalid geometry for feature {index}: {reason}")]
    InvalidGeometry { index: usize, reason: String },

    /// Colonne attributaire en conflit avec la colonne géométrie
    #[error("Attribute column '{0}' collides with the geometry column")]
    ReservedColumn(String),
}

impl GeoFileError {
    /// Crée une erreur de parsing avec contexte
    pub fn parse_error(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            index,
            reason: reason.into(),
        }
    }
}
