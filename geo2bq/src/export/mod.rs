//! Modules d'export (CSV intermédiaire, reprojection PROJ)

pub mod csv;
#[cfg(feature = "reproject")]
pub mod reproject;

pub use self::csv::{export_to_csv, CSV_FILE_NAME};
