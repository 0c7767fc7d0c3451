//! Lecture GeoJSON (FeatureCollection, Feature ou Geometry seule)

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geojson::{Feature, GeoJson, JsonObject};
use serde_json::Value;
use tracing::debug;

use crate::crs;
use crate::types::{GeoDataset, Row};
use crate::GeoFileError;

/// Lit un fichier GeoJSON
pub fn read(path: &Path) -> Result<GeoDataset, GeoFileError> {
    let file = File::open(path)?;
    let document = GeoJson::from_reader(BufReader::new(file))
        .map_err(|e| GeoFileError::parse_error(path.display().to_string(), e.to_string()))?;
    from_document(document)
}

/// Construit la table depuis un document GeoJSON déjà parsé
pub fn from_document(document: GeoJson) -> Result<GeoDataset, GeoFileError> {
    let (features, foreign_members) = match document {
        GeoJson::FeatureCollection(fc) => (fc.features, fc.foreign_members),
        GeoJson::Feature(mut feature) => {
            let members = feature.foreign_members.take();
            (vec![feature], members)
        }
        GeoJson::Geometry(mut geometry) => {
            let members = geometry.foreign_members.take();
            (vec![Feature::from(geometry)], members)
        }
    };

    let crs = crs::from_geojson_member(foreign_members.as_ref().and_then(|m| m.get("crs")));
    let columns = collect_columns(&features);
    debug!(features = features.len(), columns = columns.len(), "GeoJSON parsed");

    let mut dataset = GeoDataset::new(columns, crs)?;
    dataset.rows.reserve(features.len());

    for (index, feature) in features.into_iter().enumerate() {
        let attributes = dataset
            .columns
            .iter()
            .map(|col| {
                feature
                    .properties
                    .as_ref()
                    .and_then(|p| p.get(col))
                    .and_then(value_to_string)
            })
            .collect();

        let geometry = feature
            .geometry
            .map(geo::Geometry::<f64>::try_from)
            .transpose()
            .map_err(|e| GeoFileError::invalid_geometry(index, e.to_string()))?;

        dataset.rows.push(Row {
            attributes,
            geometry,
        });
    }

    Ok(dataset)
}

/// Union ordonnée (ordre de première apparition) des clés de propriétés
fn collect_columns(features: &[Feature]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for props in features.iter().filter_map(|f| f.properties.as_ref()) {
        push_new_keys(props, &mut seen, &mut columns);
    }
    columns
}

fn push_new_keys(props: &JsonObject, seen: &mut HashSet<String>, columns: &mut Vec<String>) {
    for key in props.keys() {
        if seen.insert(key.clone()) {
            columns.push(key.clone());
        }
    }
}

/// Rendu textuel d'une valeur de propriété (None pour null)
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        // Objets et tableaux : JSON compact
        other => Some(other.to_string()),
    }
}
