//! Orchestration d'un chargement
//!
//! `READ → EXPORT → STAGE_LOAD → FINALIZE`, la table de staging étant
//! supprimée dès que STAGE_LOAD a commencé, quelle que soit l'issue.

pub mod finalize;
pub mod load;
pub mod staging;

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, info_span, Instrument};

use crate::error::Geo2BqError;
use crate::export::{export_to_csv, CSV_FILE_NAME};
use crate::reader::{load_source, SourceData};
use crate::report::LoadReport;
use crate::warehouse::{TableReference, Warehouse};

pub use finalize::{create_final_table, finalize_sql};
pub use load::load_staging_table;
pub use staging::{cleanup, StagingTable};

/// Préfixe du répertoire de travail temporaire
const WORKDIR_PREFIX: &str = "geo2bq-";

/// Pipeline de chargement d'un fichier vers une table de l'entrepôt
pub struct Pipeline<W> {
    warehouse: W,
    /// Parent du répertoire de travail (défaut : répertoire temporaire du système)
    workdir_root: Option<PathBuf>,
}

impl<W: Warehouse> Pipeline<W> {
    pub fn new(warehouse: W) -> Self {
        Self {
            warehouse,
            workdir_root: None,
        }
    }

    /// Crée les répertoires de travail sous `root`
    pub fn with_workdir_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workdir_root = Some(root.into());
        self
    }

    pub fn warehouse(&self) -> &W {
        &self.warehouse
    }

    /// Charge `source` dans `destination` (`project.dataset.table`), en remplaçant la table
    pub async fn run(&self, source: &Path, destination: &str) -> Result<LoadReport, Geo2BqError> {
        let span = info_span!(
            "geo2bq",
            source = %source.display(),
            destination = %destination
        );
        self.run_stages(source, destination).instrument(span).await
    }

    async fn run_stages(&self, source: &Path, destination: &str) -> Result<LoadReport, Geo2BqError> {
        let started = Instant::now();

        // START : la destination est validée avant toute lecture
        let destination: TableReference = destination.parse()?;
        let staging = StagingTable::for_destination(&destination)?;
        let staging_ref = staging.reference().clone();
        debug!(staging = %staging_ref, "Staging table name reserved");

        // READ
        let SourceData {
            dataset,
            source_crs,
            reprojected,
        } = load_source(source)?;
        let rows_read = dataset.len();
        if dataset.null_geometries() > 0 {
            info!(count = dataset.null_geometries(), "Rows without geometry");
        }

        // EXPORT
        let root = self
            .workdir_root
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        let workdir = tempfile::Builder::new()
            .prefix(WORKDIR_PREFIX)
            .tempdir_in(&root)
            .map_err(|e| Geo2BqError::Export {
                path: root,
                source: e.into(),
            })?;
        let csv_path = export_to_csv(&dataset, workdir.path()).map_err(|source| {
            Geo2BqError::Export {
                path: workdir.path().join(CSV_FILE_NAME),
                source,
            }
        })?;
        drop(dataset);

        // STAGE_LOAD + FINALIZE, puis CLEANUP
        let warehouse = &self.warehouse;
        let csv_path = csv_path.as_path();
        let dest = &destination;
        let (outcome, cleanup_warning) = staging
            .scope(warehouse, move |staging| async move {
                let loaded = load_staging_table(warehouse, csv_path, &staging).await?;
                create_final_table(warehouse, &staging, dest).await?;
                Ok::<_, Geo2BqError>(loaded)
            })
            .await;

        if let Err(e) = workdir.close() {
            debug!(error = %e, "Failed to remove working directory");
        }

        let loaded = outcome?;
        let report = LoadReport {
            source: source.to_path_buf(),
            destination: destination.to_string(),
            staging: staging_ref.to_string(),
            source_crs: source_crs.to_string(),
            reprojected,
            rows_read,
            rows_loaded: loaded.output_rows,
            duration_secs: started.elapsed().as_secs_f64(),
            cleanup_warning: cleanup_warning.map(|w| format!("{}: {}", w, w.source)),
        };
        info!(
            rows = rows_read,
            duration_secs = report.duration_secs,
            "Load completed"
        );
        Ok(report)
    }
}
