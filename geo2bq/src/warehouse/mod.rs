//! Accès à l'entrepôt de données (BigQuery)
//!
//! Le trait [`Warehouse`] isole les trois opérations utilisées par le pipeline :
//! chargement d'un fichier, exécution d'une requête, suppression d'une table.

pub mod bigquery;
mod job;

pub use bigquery::BigQueryClient;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;

/// Erreurs remontées par l'entrepôt
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// Échec d'authentification (credentials ambiants introuvables, jeton refusé)
    #[error("Authentication failed: {0}")]
    Auth(#[from] gcp_auth::Error),

    /// Erreur de transport HTTP
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Lecture du fichier à charger
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Réponse d'erreur de l'API
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Job terminé en erreur
    #[error("Job {job_id} failed: {message}")]
    JobFailed {
        job_id: String,
        message: String,
        errors: Vec<String>,
    },

    /// Réponse inattendue (en-tête manquant, JSON invalide)
    #[error("Unexpected response: {0}")]
    Protocol(String),
}

/// Erreur de parsing d'une référence de table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid table reference '{input}': {reason}")]
pub struct TableReferenceError {
    pub input: String,
    pub reason: &'static str,
}

fn dataset_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]{1,1024}$").expect("valid regex"))
}

/// Référence complète d'une table : `project.dataset.table`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableReference {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableReference {
    /// Construit une référence après validation de chaque partie
    pub fn new(
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self, TableReferenceError> {
        let reference = Self {
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
        };
        reference.validate()?;
        Ok(reference)
    }

    fn validate(&self) -> Result<(), TableReferenceError> {
        let err = |reason| TableReferenceError {
            input: self.to_string(),
            reason,
        };
        if self.project.is_empty() || self.dataset.is_empty() || self.table.is_empty() {
            return Err(err("expected project.dataset.table with non-empty parts"));
        }
        if self.project.contains('`') || self.table.contains('`') {
            return Err(err("backticks are not allowed"));
        }
        if !dataset_regex().is_match(&self.dataset) {
            return Err(err("dataset may only contain letters, digits and underscores"));
        }
        if self.table.contains('.') {
            return Err(err("table name may not contain '.'"));
        }
        Ok(())
    }

    /// Référence d'une autre table dans le même projet et dataset
    pub fn sibling(&self, table: impl Into<String>) -> Result<Self, TableReferenceError> {
        Self::new(self.project.clone(), self.dataset.clone(), table)
    }

    /// Chemin quoté pour le SQL standard
    pub fn sql_path(&self) -> String {
        format!("`{}.{}.{}`", self.project, self.dataset, self.table)
    }
}

impl FromStr for TableReference {
    type Err = TableReferenceError;

    /// Parse `project.dataset.table` ; un projet à domaine (`example.com:proj`) peut contenir des points
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().rsplitn(3, '.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(table), Some(dataset), Some(project)) => Self::new(project, dataset, table)
                .map_err(|e| TableReferenceError {
                    input: s.to_string(),
                    reason: e.reason,
                }),
            _ => Err(TableReferenceError {
                input: s.to_string(),
                reason: "expected project.dataset.table",
            }),
        }
    }
}

impl fmt::Display for TableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

/// Format source d'un job de chargement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
}

impl SourceFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Csv => "CSV",
        }
    }
}

/// Comportement d'écriture si la table existe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteDisposition {
    WriteTruncate,
}

impl WriteDisposition {
    pub fn as_str(self) -> &'static str {
        match self {
            WriteDisposition::WriteTruncate => "WRITE_TRUNCATE",
        }
    }
}

/// Options d'un job de chargement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadJobConfig {
    pub autodetect: bool,
    pub skip_leading_rows: u32,
    pub write_disposition: WriteDisposition,
    pub source_format: SourceFormat,
}

impl LoadJobConfig {
    /// Options fixes du chargement de staging : CSV avec en-tête, schéma auto-détecté,
    /// table remplacée (rejouable)
    pub fn staging_csv() -> Self {
        Self {
            autodetect: true,
            skip_leading_rows: 1,
            write_disposition: WriteDisposition::WriteTruncate,
            source_format: SourceFormat::Csv,
        }
    }
}

/// Résumé d'un job terminé avec succès
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSummary {
    pub job_id: String,
    /// Lignes écrites (jobs de chargement)
    pub output_rows: Option<u64>,
}

/// Opérations de l'entrepôt utilisées par le pipeline.
///
/// Chaque appel bloque jusqu'à l'état terminal du job correspondant.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Charge un fichier local dans `destination`
    async fn load_table_from_file(
        &self,
        file: tokio::fs::File,
        destination: &TableReference,
        config: &LoadJobConfig,
    ) -> Result<JobSummary, WarehouseError>;

    /// Exécute un script SQL standard
    async fn execute_query(&self, sql: &str) -> Result<JobSummary, WarehouseError>;

    /// Supprime une table ; `not_found_ok` rend la suppression d'une table absente silencieuse
    async fn delete_table(
        &self,
        table: &TableReference,
        not_found_ok: bool,
    ) -> Result<(), WarehouseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table_reference() {
        let r: TableReference = "proj.ds.t1".parse().unwrap();
        assert_eq!(r.project, "proj");
        assert_eq!(r.dataset, "ds");
        assert_eq!(r.table, "t1");
        assert_eq!(r.to_string(), "proj.ds.t1");
        assert_eq!(r.sql_path(), "`proj.ds.t1`");
    }

    #[test]
    fn test_domain_scoped_project() {
        let r: TableReference = "example.com:my-proj.ds.t".parse().unwrap();
        assert_eq!(r.project, "example.com:my-proj");
        assert_eq!(r.dataset, "ds");
    }

    #[test]
    fn test_invalid_references() {
        for input in ["", "ds.t", "proj..t", "proj.ds.", "proj.d-s.t", "pr`oj.ds.t"] {
            assert!(input.parse::<TableReference>().is_err(), "{input}");
        }
    }

    #[test]
    fn test_sibling_shares_project_and_dataset() {
        let dest: TableReference = "proj.ds.t1".parse().unwrap();
        let staging = dest.sibling("_tmp_abc").unwrap();
        assert_eq!(staging.project, dest.project);
        assert_eq!(staging.dataset, dest.dataset);
        assert_eq!(staging.table, "_tmp_abc");
    }

    #[test]
    fn test_staging_load_config() {
        let config = LoadJobConfig::staging_csv();
        assert!(config.autodetect);
        assert_eq!(config.skip_leading_rows, 1);
        assert_eq!(config.write_disposition.as_str(), "WRITE_TRUNCATE");
        assert_eq!(config.source_format.as_str(), "CSV");
    }
}
