//! Lecture ESRI Shapefile (.shp + .dbf, .prj optionnel)

use std::io::{Read, Seek};
use std::path::Path;

use shapefile::dbase::{self, FieldValue};
use shapefile::Shape;
use tracing::{debug, warn};

use crate::crs;
use crate::types::{Crs, GeoDataset, Row};
use crate::GeoFileError;

/// Lit un shapefile et son fichier d'attributs
pub fn read(path: &Path) -> Result<GeoDataset, GeoFileError> {
    let file_label = path.display().to_string();
    let parse_err = |e: shapefile::Error| GeoFileError::parse_error(file_label.clone(), e.to_string());

    let crs = read_prj(path)?;

    // Le même .dbf sert aux noms de colonnes et aux enregistrements
    let dbf_path = sidecar(path, "dbf");
    let dbase_reader = dbase::Reader::from_path(&dbf_path)
        .map_err(|e| GeoFileError::parse_error(dbf_path.display().to_string(), e.to_string()))?;
    let columns = dbf_columns(&dbase_reader);
    debug!(columns = columns.len(), crs = %crs, "Shapefile header read");

    let shape_reader = shapefile::ShapeReader::from_path(path).map_err(parse_err)?;
    let mut reader = shapefile::Reader::new(shape_reader, dbase_reader);
    let mut dataset = GeoDataset::new(columns, crs)?;

    for (index, item) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = item.map_err(parse_err)?;

        let geometry = match shape {
            Shape::NullShape => None,
            shape => Some(
                geo::Geometry::<f64>::try_from(shape)
                    .map_err(|e| GeoFileError::invalid_geometry(index, format!("{:?}", e)))?,
            ),
        };

        let attributes = dataset
            .columns
            .iter()
            .map(|col| record.get(col).and_then(field_to_string))
            .collect();

        dataset.rows.push(Row {
            attributes,
            geometry,
        });
    }

    Ok(dataset)
}

/// Lit le `.prj` voisin ; absent = CRS indéfini
fn read_prj(path: &Path) -> Result<Crs, GeoFileError> {
    let prj_path = sidecar(path, "prj");
    match std::fs::read_to_string(&prj_path) {
        Ok(content) => Ok(crs::from_prj(&content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "No .prj file next to shapefile, CRS is undefined");
            Ok(Crs::Undefined)
        }
        Err(e) => Err(e.into()),
    }
}

/// Noms des champs DBF dans l'ordre du fichier
fn dbf_columns<R: Read + Seek>(reader: &dbase::Reader<R>) -> Vec<String> {
    reader
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .filter(|name| name != "DeletionFlag")
        .collect()
}

/// Chemin d'un fichier compagnon (`.dbf`, `.prj`) en respectant la casse de l'extension
fn sidecar(path: &Path, ext: &str) -> std::path::PathBuf {
    let upper = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.chars().all(|c| c.is_ascii_uppercase()));
    let candidate = if upper {
        path.with_extension(ext.to_ascii_uppercase())
    } else {
        path.with_extension(ext)
    };
    if candidate.exists() {
        candidate
    } else {
        path.with_extension(ext)
    }
}

/// Rendu textuel d'une valeur DBF (None pour null)
fn field_to_string(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Character(s) => s.as_ref().map(|s| s.trim_end().to_string()),
        FieldValue::Numeric(n) => n.map(format_number),
        FieldValue::Float(f) => f.map(|f| format_number(f as f64)),
        FieldValue::Double(d) => Some(format_number(*d)),
        FieldValue::Currency(c) => Some(format_number(*c)),
        FieldValue::Integer(i) => Some(i.to_string()),
        FieldValue::Logical(b) => b.map(|b| b.to_string()),
        FieldValue::Date(d) => d
            .as_ref()
            .map(|d| format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day())),
        FieldValue::Memo(m) => Some(m.clone()),
        other => Some(format!("{:?}", other)),
    }
}

/// Les numériques DBF entiers s'écrivent sans partie décimale
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
