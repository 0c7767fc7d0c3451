//! # geo2bq
//!
//! Chargement d'un fichier géographique (GeoJSON, Shapefile) dans une table
//! BigQuery avec une colonne `GEOGRAPHY` clusterisée.
//!
//! ## Étapes
//!
//! 1. Lecture et reprojection en WGS84 (EPSG:4326)
//! 2. Export CSV temporaire (géométrie en WKT)
//! 3. Chargement dans une table de staging `_tmp_xxxxxxxxxxxx`
//! 4. Remplacement de la destination via `ST_GEOGFROMTEXT`
//!
//! La table de staging est supprimée dès que le chargement a commencé.
//!
//! ## Usage CLI
//!
//! ```bash
//! geo2bq ./communes.geojson my-project.my_dataset.communes
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod reproject_lite;
pub mod warehouse;

pub use config::WarehouseConfig;
pub use error::{CleanupWarning, Geo2BqError};
pub use pipeline::Pipeline;
pub use report::LoadReport;
pub use warehouse::{BigQueryClient, TableReference, Warehouse, WarehouseError};
