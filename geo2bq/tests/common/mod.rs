//! Entrepôt en mémoire pour les tests du pipeline
//!
//! Reproduit le comportement observable de BigQuery utilisé par geo2bq :
//! chargement CSV avec en-tête, script DROP/CREATE ... CLUSTER BY, suppression.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use tokio::io::AsyncReadExt;

use geo2bq::warehouse::{JobSummary, LoadJobConfig, WriteDisposition};
use geo2bq::{TableReference, Warehouse, WarehouseError};

/// Table stockée par l'entrepôt factice
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FakeTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub clustered_by: Option<String>,
    pub geography_columns: Vec<String>,
}

impl FakeTable {
    pub fn new(columns: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
            ..Default::default()
        }
    }

    pub fn column(&self, name: &str) -> Vec<String> {
        let index = self
            .columns
            .iter()
            .position(|c| c == name)
            .unwrap_or_else(|| panic!("no column {name}"));
        self.rows.iter().map(|r| r[index].clone()).collect()
    }
}

#[derive(Default)]
struct State {
    tables: HashMap<String, FakeTable>,
    loads: Vec<String>,
    queries: Vec<String>,
    deletes: Vec<String>,
    load_failure: Option<String>,
    query_failure: Option<String>,
    delete_failure: bool,
    job_counter: usize,
}

#[derive(Clone, Default)]
pub struct FakeWarehouse {
    state: Arc<Mutex<State>>,
}

impl FakeWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn insert_table(&self, name: &str, table: FakeTable) {
        self.state().tables.insert(name.to_string(), table);
    }

    pub fn table(&self, name: &str) -> Option<FakeTable> {
        self.state().tables.get(name).cloned()
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state().tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Tables de staging encore présentes
    pub fn staging_tables(&self) -> Vec<String> {
        self.table_names()
            .into_iter()
            .filter(|name| name.rsplit('.').next().is_some_and(|t| t.starts_with("_tmp_")))
            .collect()
    }

    pub fn loads(&self) -> Vec<String> {
        self.state().loads.clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.state().queries.clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.state().deletes.clone()
    }

    /// Nombre total d'appels reçus
    pub fn calls(&self) -> usize {
        let state = self.state();
        state.loads.len() + state.queries.len() + state.deletes.len()
    }

    pub fn fail_loads(&self, message: &str) {
        self.state().load_failure = Some(message.to_string());
    }

    pub fn fail_queries(&self, message: &str) {
        self.state().query_failure = Some(message.to_string());
    }

    pub fn fail_deletes(&self) {
        self.state().delete_failure = true;
    }

    fn next_job_id(state: &mut State) -> String {
        state.job_counter += 1;
        format!("job_{}", state.job_counter)
    }
}

fn job_failed(job_id: String, message: impl Into<String>) -> WarehouseError {
    let message = message.into();
    WarehouseError::JobFailed {
        job_id,
        errors: vec![message.clone()],
        message,
    }
}

fn finalize_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?s)^DROP TABLE IF EXISTS `([^`]+)`;\s*CREATE TABLE `([^`]+)` CLUSTER BY (\w+) AS\s*SELECT \* EXCEPT\((\w+)\), ST_GEOGFROMTEXT\((\w+)\) AS (\w+) FROM `([^`]+)`\s*$",
        )
        .unwrap()
    })
}

const WKT_KEYWORDS: &[&str] = &[
    "POINT",
    "LINESTRING",
    "POLYGON",
    "MULTIPOINT",
    "MULTILINESTRING",
    "MULTIPOLYGON",
    "GEOMETRYCOLLECTION",
];

fn is_wkt(value: &str) -> bool {
    let upper = value.trim_start().to_ascii_uppercase();
    WKT_KEYWORDS.iter().any(|k| upper.starts_with(k))
}

fn parse_csv(payload: &[u8]) -> Result<FakeTable, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(payload);
    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(String::from)
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        rows.push(record.iter().map(String::from).collect());
    }
    Ok(FakeTable {
        columns,
        rows,
        ..Default::default()
    })
}

#[async_trait]
impl Warehouse for FakeWarehouse {
    async fn load_table_from_file(
        &self,
        mut file: tokio::fs::File,
        destination: &TableReference,
        config: &LoadJobConfig,
    ) -> Result<JobSummary, WarehouseError> {
        let mut payload = Vec::new();
        file.read_to_end(&mut payload).await?;

        let mut state = self.state();
        state.loads.push(destination.to_string());
        let job_id = Self::next_job_id(&mut state);

        if let Some(message) = state.load_failure.clone() {
            return Err(job_failed(job_id, message));
        }
        assert!(config.autodetect);
        assert_eq!(config.skip_leading_rows, 1);
        assert_eq!(config.write_disposition, WriteDisposition::WriteTruncate);

        let table = parse_csv(&payload).map_err(|e| job_failed(job_id.clone(), e))?;
        let output_rows = table.rows.len() as u64;
        state.tables.insert(destination.to_string(), table);

        Ok(JobSummary {
            job_id,
            output_rows: Some(output_rows),
        })
    }

    async fn execute_query(&self, sql: &str) -> Result<JobSummary, WarehouseError> {
        let mut state = self.state();
        state.queries.push(sql.to_string());
        let job_id = Self::next_job_id(&mut state);

        let caps = finalize_regex()
            .captures(sql)
            .ok_or_else(|| job_failed(job_id.clone(), format!("Syntax error: {sql}")))?;
        let (dropped, created, cluster, except, parsed, alias, staging) = (
            &caps[1], &caps[2], &caps[3], &caps[4], &caps[5], &caps[6], &caps[7],
        );
        assert_eq!(dropped, created);
        assert!(except == parsed && parsed == alias && alias == cluster);

        // Le DROP est exécuté avant toute erreur du CREATE
        state.tables.remove(dropped);

        if let Some(message) = state.query_failure.clone() {
            return Err(job_failed(job_id, message));
        }

        let source = state
            .tables
            .get(staging)
            .cloned()
            .ok_or_else(|| job_failed(job_id.clone(), format!("Not found: Table {staging}")))?;
        let geo_index = source
            .columns
            .iter()
            .position(|c| c == parsed)
            .ok_or_else(|| job_failed(job_id.clone(), format!("Unrecognized name: {parsed}")))?;

        let mut rows = Vec::with_capacity(source.rows.len());
        for row in &source.rows {
            let wkt = &row[geo_index];
            if !wkt.is_empty() && !is_wkt(wkt) {
                return Err(job_failed(
                    job_id,
                    format!("ST_GeogFromText failed: invalid WKT '{wkt}'"),
                ));
            }
            let mut out: Vec<String> = row
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != geo_index)
                .map(|(_, v)| v.clone())
                .collect();
            out.push(wkt.clone());
            rows.push(out);
        }

        let mut columns: Vec<String> = source
            .columns
            .iter()
            .filter(|c| c.as_str() != parsed)
            .cloned()
            .collect();
        columns.push(alias.to_string());

        let output_rows = rows.len() as u64;
        state.tables.insert(
            created.to_string(),
            FakeTable {
                columns,
                rows,
                clustered_by: Some(cluster.to_string()),
                geography_columns: vec![alias.to_string()],
            },
        );

        Ok(JobSummary {
            job_id,
            output_rows: Some(output_rows),
        })
    }

    async fn delete_table(
        &self,
        table: &TableReference,
        not_found_ok: bool,
    ) -> Result<(), WarehouseError> {
        let mut state = self.state();
        let name = table.to_string();
        state.deletes.push(name.clone());

        if state.delete_failure {
            return Err(WarehouseError::Api {
                status: 503,
                message: "Service unavailable".into(),
            });
        }
        if state.tables.remove(&name).is_none() && !not_found_ok {
            return Err(WarehouseError::Api {
                status: 404,
                message: format!("Not found: Table {name}"),
            });
        }
        Ok(())
    }
}

/// Écrit une fixture dans `dir`
pub fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Trois communes en Web Mercator
pub const COMMUNES_3857: &str = r#"{
  "type": "FeatureCollection",
  "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}},
  "features": [
    {"type": "Feature", "properties": {"name": "Paris", "population": 2133111},
     "geometry": {"type": "Point", "coordinates": [261845.7, 6250564.3]}},
    {"type": "Feature", "properties": {"name": "Lyon", "population": 522250},
     "geometry": {"type": "Point", "coordinates": [538256.2, 5741237.8]}},
    {"type": "Feature", "properties": {"name": "Grenoble", "population": 158198},
     "geometry": {"type": "Polygon", "coordinates": [[[638000, 5660000], [641000, 5660000], [641000, 5663000], [638000, 5660000]]]}}
  ]
}"#;

/// Deux points en WGS84 (pas de membre `crs`), schéma différent
pub const STATIONS_4326: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"code": "A1", "active": true},
     "geometry": {"type": "Point", "coordinates": [2.35, 48.85]}},
    {"type": "Feature", "properties": {"code": "B2", "active": false},
     "geometry": null}
  ]
}"#;

/// Extrait les nombres d'un WKT
pub fn wkt_numbers(wkt: &str) -> Vec<f64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?").unwrap())
        .find_iter(wkt)
        .map(|m| m.as_str().parse().unwrap())
        .collect()
}
