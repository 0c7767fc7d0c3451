//! Tests d'intégration : lecture de fichiers réels écrits sur disque

use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use geo::{Geometry, Point};
use geofile::{Crs, GeoFileError};
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};

const WGS84_PRJ: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

fn write_points_shapefile(path: &Path) {
    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("name").unwrap(), 20)
        .add_numeric_field(FieldName::try_from("pop").unwrap(), 10, 0);
    let mut writer = shapefile::Writer::from_path(path, table).unwrap();

    for (name, pop, x, y) in [("Paris", 2_100_000.0, 2.35, 48.85), ("Lyon", 520_000.0, 4.83, 45.76)] {
        let mut record = Record::default();
        record.insert("name".to_string(), FieldValue::Character(Some(name.to_string())));
        record.insert("pop".to_string(), FieldValue::Numeric(Some(pop)));
        writer
            .write_shape_and_record(&shapefile::Point::new(x, y), &record)
            .unwrap();
    }
}

#[test]
fn test_read_geojson_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("communes.geojson");
    fs::write(
        &path,
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[2.35,48.85]},"properties":{"nom":"Paris"}},
            {"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]},"properties":{"nom":"Carré"}}
        ]}"#,
    )
    .unwrap();

    let dataset = geofile::read(&path).unwrap();
    assert_eq!(dataset.crs, Crs::WGS84);
    assert_eq!(dataset.columns, vec!["nom".to_string()]);
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.rows[1].attributes[0].as_deref(), Some("Carré"));
    assert_eq!(
        dataset.rows[0].geometry,
        Some(Geometry::Point(Point::new(2.35, 48.85)))
    );
}

#[test]
fn test_corrupt_geojson_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.geojson");
    fs::write(&path, r#"{"type":"FeatureCollection","features":[{"#).unwrap();

    assert!(matches!(
        geofile::read(&path),
        Err(GeoFileError::ParseError { .. })
    ));
}

#[test]
fn test_read_shapefile_with_prj() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("villes.shp");
    write_points_shapefile(&path);
    fs::write(dir.path().join("villes.prj"), WGS84_PRJ).unwrap();

    let dataset = geofile::read(&path).unwrap();
    assert_eq!(dataset.crs, Crs::WGS84);
    assert_eq!(dataset.columns, vec!["name".to_string(), "pop".to_string()]);
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.rows[0].attributes[0].as_deref(), Some("Paris"));
    assert_eq!(dataset.rows[1].attributes[1].as_deref(), Some("520000"));
    assert!(matches!(dataset.rows[0].geometry, Some(Geometry::Point(_))));
}

#[test]
fn test_shapefile_without_prj_has_undefined_crs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("villes.shp");
    write_points_shapefile(&path);

    let dataset = geofile::read(&path).unwrap();
    assert_eq!(dataset.crs, Crs::Undefined);
}

#[test]
fn test_upper_case_shapefile_sidecars() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("VILLES.SHP");
    write_points_shapefile(&path);
    fs::rename(dir.path().join("VILLES.dbf"), dir.path().join("VILLES.DBF")).unwrap();
    fs::write(dir.path().join("VILLES.PRJ"), WGS84_PRJ).unwrap();

    let dataset = geofile::read(&path).unwrap();
    assert_eq!(dataset.crs, Crs::WGS84);
    assert_eq!(dataset.columns, vec!["name".to_string(), "pop".to_string()]);
    assert_eq!(dataset.rows[1].attributes[0].as_deref(), Some("Lyon"));
}
