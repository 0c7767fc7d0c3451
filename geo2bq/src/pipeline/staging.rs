//! Table de staging : nommage aléatoire et suppression garantie
//!
//! Le nom est `_tmp_` suivi de 12 lettres minuscules tirées au hasard
//! (26^12 ≈ 9.5e16 combinaisons) ; aucune détection de collision n'est faite,
//! la probabilité est considérée négligeable.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::{CleanupWarning, Geo2BqError};
use crate::warehouse::{TableReference, TableReferenceError, Warehouse};

/// Préfixe des tables de staging
pub const STAGING_PREFIX: &str = "_tmp_";

/// Longueur du suffixe aléatoire
pub const SUFFIX_LEN: usize = 12;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Génère un suffixe aléatoire de lettres minuscules
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Référence de staging dans le même projet et dataset que la destination
pub fn staging_reference(destination: &TableReference) -> Result<TableReference, TableReferenceError> {
    destination.sibling(format!("{}{}", STAGING_PREFIX, random_suffix(SUFFIX_LEN)))
}

/// Supprime la table de staging en tolérant son absence.
///
/// Ne propage jamais d'erreur : un échec est journalisé et retourné pour le rapport.
pub async fn cleanup<W: Warehouse + ?Sized>(
    warehouse: &W,
    table: &TableReference,
) -> Option<CleanupWarning> {
    info!(table = %table, "Deleting intermediate table");
    match warehouse.delete_table(table, true).await {
        Ok(()) => None,
        Err(source) => {
            let warning = CleanupWarning {
                table: table.clone(),
                source,
            };
            warn!(error = %warning, cause = %warning.source, "Staging table cleanup failed");
            Some(warning)
        }
    }
}

/// Table de staging possédée par un run
///
/// `scope` exécute le travail puis supprime la table, quel que soit le résultat.
#[derive(Debug)]
pub struct StagingTable {
    reference: TableReference,
}

impl StagingTable {
    /// Réserve un nom de staging pour la destination
    pub fn for_destination(destination: &TableReference) -> Result<Self, TableReferenceError> {
        Ok(Self {
            reference: staging_reference(destination)?,
        })
    }

    /// Référence de la table
    pub fn reference(&self) -> &TableReference {
        &self.reference
    }

    /// Exécute `work` puis supprime la table sur tous les chemins de sortie,
    /// y compris Ctrl-C et panique.
    ///
    /// Retourne le résultat de `work` (l'erreur d'origine n'est jamais masquée)
    /// et l'éventuel avertissement de nettoyage.
    pub async fn scope<W, F, Fut, T>(
        self,
        warehouse: &W,
        work: F,
    ) -> (Result<T, Geo2BqError>, Option<CleanupWarning>)
    where
        W: Warehouse + ?Sized,
        F: FnOnce(TableReference) -> Fut,
        Fut: Future<Output = Result<T, Geo2BqError>>,
    {
        self.scope_until(warehouse, work, ctrl_c()).await
    }

    /// Variante de `scope` interrompue par un futur quelconque
    pub async fn scope_until<W, F, Fut, T, I>(
        self,
        warehouse: &W,
        work: F,
        interrupt: I,
    ) -> (Result<T, Geo2BqError>, Option<CleanupWarning>)
    where
        W: Warehouse + ?Sized,
        F: FnOnce(TableReference) -> Fut,
        Fut: Future<Output = Result<T, Geo2BqError>>,
        I: Future<Output = ()>,
    {
        let work = AssertUnwindSafe(work(self.reference.clone())).catch_unwind();
        let outcome = tokio::select! {
            outcome = work => outcome,
            () = interrupt => {
                warn!(table = %self.reference, "Interrupted, cleaning up");
                Ok(Err(Geo2BqError::Interrupted {
                    table: self.reference.clone(),
                }))
            }
        };

        let warning = cleanup(warehouse, &self.reference).await;
        match outcome {
            Ok(result) => (result, warning),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Se résout au premier Ctrl-C ; jamais si le handler ne peut être installé
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        debug!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_suffix_shape() {
        let suffix = random_suffix(SUFFIX_LEN);
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn test_staging_reference_is_sibling() {
        let dest: TableReference = "proj.ds.t1".parse().unwrap();
        let staging = staging_reference(&dest).unwrap();
        assert_eq!(staging.project, "proj");
        assert_eq!(staging.dataset, "ds");
        assert!(staging.table.starts_with(STAGING_PREFIX));
        assert_eq!(staging.table.len(), STAGING_PREFIX.len() + SUFFIX_LEN);
    }

    #[test]
    fn test_staging_names_are_unique() {
        let dest: TableReference = "proj.ds.t1".parse().unwrap();
        let names: HashSet<String> = (0..10_000)
            .map(|_| staging_reference(&dest).unwrap().table)
            .collect();
        assert_eq!(names.len(), 10_000);
    }
}
