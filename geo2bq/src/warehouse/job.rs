//! Ressources JSON de l'API BigQuery v2 (sous-ensemble utilisé)

use serde::{Deserialize, Serialize};

use super::{LoadJobConfig, TableReference};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub configuration: JobConfiguration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<JobReferenceRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReferenceRequest {
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryConfiguration>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadConfiguration {
    pub destination_table: TableRef,
    pub source_format: &'static str,
    pub autodetect: bool,
    pub skip_leading_rows: u32,
    pub write_disposition: &'static str,
}

impl LoadConfiguration {
    pub fn new(destination: &TableReference, config: &LoadJobConfig) -> Self {
        Self {
            destination_table: TableRef::from(destination),
            source_format: config.source_format.as_str(),
            autodetect: config.autodetect,
            skip_leading_rows: config.skip_leading_rows,
            write_disposition: config.write_disposition.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfiguration {
    pub query: String,
    pub use_legacy_sql: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl From<&TableReference> for TableRef {
    fn from(r: &TableReference) -> Self {
        Self {
            project_id: r.project.clone(),
            dataset_id: r.dataset.clone(),
            table_id: r.table.clone(),
        }
    }
}

/// Ressource Job retournée par `jobs.insert` / `jobs.get`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_reference: JobReference,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub statistics: Option<JobStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub project_id: String,
    pub job_id: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub error_result: Option<ErrorProto>,
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorProto {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl std::fmt::Display for ErrorProto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = self.message.as_deref().unwrap_or("unknown error");
        match (&self.reason, &self.location) {
            (Some(reason), Some(location)) => write!(f, "{} ({}, at {})", message, reason, location),
            (Some(reason), None) => write!(f, "{} ({})", message, reason),
            _ => f.write_str(message),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatistics {
    #[serde(default)]
    pub load: Option<LoadStatistics>,
}

/// Les compteurs int64 sont sérialisés en chaînes par l'API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStatistics {
    #[serde(default)]
    pub output_rows: Option<String>,
}

/// Enveloppe d'erreur des réponses HTTP non-2xx
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

impl Job {
    pub fn is_done(&self) -> bool {
        self.status.state == "DONE"
    }

    pub fn output_rows(&self) -> Option<u64> {
        self.statistics
            .as_ref()?
            .load
            .as_ref()?
            .output_rows
            .as_deref()?
            .parse()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::LoadJobConfig;
    use serde_json::json;

    #[test]
    fn test_load_request_wire_format() {
        let dest: TableReference = "proj.ds._tmp_abc".parse().unwrap();
        let request = JobRequest {
            configuration: JobConfiguration {
                load: Some(LoadConfiguration::new(&dest, &LoadJobConfig::staging_csv())),
                ..Default::default()
            },
            job_reference: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "configuration": {
                    "load": {
                        "destinationTable": {"projectId": "proj", "datasetId": "ds", "tableId": "_tmp_abc"},
                        "sourceFormat": "CSV",
                        "autodetect": true,
                        "skipLeadingRows": 1,
                        "writeDisposition": "WRITE_TRUNCATE"
                    }
                }
            })
        );
    }

    #[test]
    fn test_failed_job_deserialization() {
        let job: Job = serde_json::from_value(json!({
            "jobReference": {"projectId": "proj", "jobId": "job_1", "location": "EU"},
            "status": {
                "state": "DONE",
                "errorResult": {"reason": "invalid", "message": "Error while reading data"},
                "errors": [{"reason": "invalid", "location": "row 3", "message": "Too many values"}]
            }
        }))
        .unwrap();

        assert!(job.is_done());
        let error = job.status.error_result.as_ref().unwrap();
        assert_eq!(error.to_string(), "Error while reading data (invalid)");
        assert_eq!(job.status.errors[0].to_string(), "Too many values (invalid, at row 3)");
    }

    #[test]
    fn test_output_rows() {
        let job: Job = serde_json::from_value(json!({
            "jobReference": {"projectId": "p", "jobId": "j"},
            "status": {"state": "DONE"},
            "statistics": {"load": {"outputRows": "1234"}}
        }))
        .unwrap();
        assert_eq!(job.output_rows(), Some(1234));

        let running: Job = serde_json::from_value(json!({
            "jobReference": {"projectId": "p", "jobId": "j"},
            "status": {"state": "RUNNING"}
        }))
        .unwrap();
        assert!(!running.is_done());
        assert_eq!(running.output_rows(), None);
    }
}
