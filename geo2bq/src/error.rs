//! Erreurs du pipeline geo2bq

use std::path::PathBuf;

use thiserror::Error;

use crate::export::csv::ExportError;
use crate::warehouse::{TableReference, TableReferenceError, WarehouseError};

/// Erreurs fatales d'un chargement : le run est interrompu après le nettoyage
#[derive(Debug, Error)]
pub enum Geo2BqError {
    /// Chemin de table de destination mal formé
    #[error(transparent)]
    InvalidTableReference(#[from] TableReferenceError),

    /// Fichier source illisible, format inconnu, ou reprojection impossible
    #[error("Unreadable source {}: {reason}", path.display())]
    UnreadableSource { path: PathBuf, reason: String },

    /// Écriture du CSV intermédiaire impossible
    #[error("Failed to export {}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: ExportError,
    },

    /// Chargement de la table de staging refusé par l'entrepôt
    #[error("Load job into `{table}` failed")]
    LoadJob {
        table: TableReference,
        #[source]
        source: WarehouseError,
    },

    /// Création de la table finale refusée par l'entrepôt
    #[error("Transform into `{table}` failed")]
    Transform {
        table: TableReference,
        #[source]
        source: WarehouseError,
    },

    /// Run interrompu (Ctrl-C) pendant le chargement ou la transformation
    #[error("Interrupted while loading `{table}`")]
    Interrupted { table: TableReference },
}

impl Geo2BqError {
    /// Crée une erreur de source illisible
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::UnreadableSource {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Échec non fatal de suppression de la table de staging : journalisé, jamais propagé
#[derive(Debug, Error)]
#[error("Failed to delete staging table `{table}`")]
pub struct CleanupWarning {
    pub table: TableReference,
    #[source]
    pub source: WarehouseError,
}
