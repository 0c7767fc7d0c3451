//! Client BigQuery (API REST v2)
//!
//! - chargement : upload « resumable » d'un job `load`
//! - requêtes : `jobs.insert` d'un job `query` en SQL standard
//! - attente : `jobs.get` jusqu'à l'état `DONE`
//! - suppression : `tables.delete`

use std::sync::Arc;

use async_trait::async_trait;
use gcp_auth::TokenProvider;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Response, StatusCode};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use super::job::{
    ErrorResponse, Job, JobConfiguration, JobReference, JobReferenceRequest, JobRequest,
    LoadConfiguration, QueryConfiguration,
};
use super::{JobSummary, LoadJobConfig, TableReference, Warehouse, WarehouseError};
use crate::config::WarehouseConfig;

/// Scope OAuth2 requis par l'API BigQuery
const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";

/// Client BigQuery authentifié par les credentials ambiants
pub struct BigQueryClient {
    http: reqwest::Client,
    auth: Arc<dyn TokenProvider>,
    config: WarehouseConfig,
    /// Projet dans lequel les jobs de requête sont exécutés
    project: String,
}

impl BigQueryClient {
    /// Crée un client avec les credentials Google par défaut
    /// (variable `GOOGLE_APPLICATION_CREDENTIALS`, gcloud, metadata server)
    pub async fn from_ambient_credentials(
        config: WarehouseConfig,
        project: impl Into<String>,
    ) -> Result<Self, WarehouseError> {
        let auth = gcp_auth::provider().await?;
        Ok(Self::with_token_provider(config, project, auth))
    }

    /// Crée un client avec un fournisseur de jetons explicite
    pub fn with_token_provider(
        config: WarehouseConfig,
        project: impl Into<String>,
        auth: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth,
            config,
            project: project.into(),
        }
    }

    async fn bearer(&self) -> Result<String, WarehouseError> {
        let token = self.auth.token(&[BIGQUERY_SCOPE]).await?;
        Ok(token.as_str().to_string())
    }

    fn job_reference(&self, project: &str) -> Option<JobReferenceRequest> {
        self.config.location.as_ref().map(|location| JobReferenceRequest {
            project_id: project.to_string(),
            location: Some(location.clone()),
        })
    }

    /// Soumet un job (hors upload) et attend sa fin
    async fn run_job(&self, project: &str, request: JobRequest) -> Result<JobSummary, WarehouseError> {
        let response = self
            .http
            .post(jobs_url(&self.config.api_url, project))
            .bearer_auth(self.bearer().await?)
            .json(&request)
            .send()
            .await?;
        let job: Job = check(response).await?.json().await?;
        self.wait_for(job).await
    }

    async fn get_job(&self, reference: &JobReference) -> Result<Job, WarehouseError> {
        let mut request = self
            .http
            .get(job_url(&self.config.api_url, &reference.project_id, &reference.job_id))
            .bearer_auth(self.bearer().await?);
        if let Some(location) = &reference.location {
            request = request.query(&[("location", location)]);
        }
        Ok(check(request.send().await?).await?.json().await?)
    }

    /// Interroge le job jusqu'à son état terminal
    async fn wait_for(&self, mut job: Job) -> Result<JobSummary, WarehouseError> {
        info!(job_id = %job.job_reference.job_id, "Waiting for job completion");
        loop {
            if job.is_done() {
                return job_outcome(job);
            }
            debug!(job_id = %job.job_reference.job_id, state = %job.status.state, "Job still running");
            tokio::time::sleep(self.config.poll_interval).await;
            job = self.get_job(&job.job_reference).await?;
        }
    }
}

#[async_trait]
impl Warehouse for BigQueryClient {
    async fn load_table_from_file(
        &self,
        mut file: tokio::fs::File,
        destination: &TableReference,
        config: &LoadJobConfig,
    ) -> Result<JobSummary, WarehouseError> {
        let mut payload = Vec::new();
        file.read_to_end(&mut payload).await?;

        let request = JobRequest {
            configuration: JobConfiguration {
                load: Some(LoadConfiguration::new(destination, config)),
                ..Default::default()
            },
            job_reference: self.job_reference(&destination.project),
        };

        // 1. Ouverture de la session d'upload
        let response = self
            .http
            .post(upload_url(&self.config.api_url, &destination.project))
            .bearer_auth(self.bearer().await?)
            .header("X-Upload-Content-Type", "application/octet-stream")
            .header("X-Upload-Content-Length", payload.len())
            .json(&request)
            .send()
            .await?;
        let response = check(response).await?;
        let session_uri = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| WarehouseError::Protocol("upload session has no Location header".into()))?
            .to_string();

        // 2. Envoi du contenu : la réponse est la ressource Job
        debug!(bytes = payload.len(), "Uploading load job payload");
        let response = self
            .http
            .put(session_uri)
            .bearer_auth(self.bearer().await?)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(payload)
            .send()
            .await?;
        let job: Job = check(response).await?.json().await?;

        self.wait_for(job).await
    }

    async fn execute_query(&self, sql: &str) -> Result<JobSummary, WarehouseError> {
        let request = JobRequest {
            configuration: JobConfiguration {
                query: Some(QueryConfiguration {
                    query: sql.to_string(),
                    use_legacy_sql: false,
                }),
                ..Default::default()
            },
            job_reference: self.job_reference(&self.project),
        };
        self.run_job(&self.project, request).await
    }

    async fn delete_table(
        &self,
        table: &TableReference,
        not_found_ok: bool,
    ) -> Result<(), WarehouseError> {
        let response = self
            .http
            .delete(table_url(&self.config.api_url, table))
            .bearer_auth(self.bearer().await?)
            .send()
            .await?;

        if not_found_ok && response.status() == StatusCode::NOT_FOUND {
            debug!(table = %table, "Table already absent");
            return Ok(());
        }
        check(response).await?;
        Ok(())
    }
}

/// Convertit un job terminé en résultat
fn job_outcome(job: Job) -> Result<JobSummary, WarehouseError> {
    if let Some(error) = &job.status.error_result {
        return Err(WarehouseError::JobFailed {
            job_id: job.job_reference.job_id.clone(),
            message: error.to_string(),
            errors: job.status.errors.iter().map(ToString::to_string).collect(),
        });
    }
    Ok(JobSummary {
        output_rows: job.output_rows(),
        job_id: job.job_reference.job_id,
    })
}

/// Transforme une réponse non-2xx en `WarehouseError::Api`
async fn check(response: Response) -> Result<Response, WarehouseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
        _ => body,
    };
    Err(WarehouseError::Api {
        status: status.as_u16(),
        message,
    })
}

fn jobs_url(api_url: &str, project: &str) -> String {
    format!("{}/bigquery/v2/projects/{}/jobs", api_url.trim_end_matches('/'), project)
}

fn job_url(api_url: &str, project: &str, job_id: &str) -> String {
    format!("{}/{}", jobs_url(api_url, project), job_id)
}

fn upload_url(api_url: &str, project: &str) -> String {
    format!(
        "{}/upload/bigquery/v2/projects/{}/jobs?uploadType=resumable",
        api_url.trim_end_matches('/'),
        project
    )
}

fn table_url(api_url: &str, table: &TableReference) -> String {
    format!(
        "{}/bigquery/v2/projects/{}/datasets/{}/tables/{}",
        api_url.trim_end_matches('/'),
        table.project,
        table.dataset,
        table.table
    )
}
