//! Save Page Now 2 (SPN2) client
//!
//! This module speaks the SPN2 wire contract:
//! - `POST <save-endpoint>` with a form body of `url` plus capture parameters,
//!   answered with JSON carrying a `job_id`
//! - `POST <status-endpoint>` with a form body `job_ids=<a,b,c>`, answered
//!   with a JSON array of status objects
//!
//! Authentication and content negotiation are baked into the default headers
//! of the shared `reqwest::Client`.

use crate::client::{CaptureClient, CaptureParams, ClientError, JobId, StatusRecord};
use crate::config::{Credentials, ServiceConfig};
use crate::url::CaptureUrl;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

/// Builds the HTTP client used for every SPN2 call
///
/// # Arguments
///
/// * `service` - Endpoint, user agent and timeout settings
/// * `credentials` - Archive.org S3-style key pair
///
/// # Returns
///
/// * `Ok(Client)` - Client with `Authorization: LOW key:secret` preset
/// * `Err(ClientError)` - The credentials are not valid header text, or the
///   client could not be built
pub fn build_http_client(
    service: &ServiceConfig,
    credentials: &Credentials,
) -> Result<Client, ClientError> {
    let mut headers = HeaderMap::new();

    let mut auth = HeaderValue::from_str(&credentials.authorization_header()).map_err(|_| {
        ClientError::Decode("credentials contain characters not allowed in a header".to_string())
    })?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = Client::builder()
        .user_agent(service.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(service.request_timeout_secs))
        .connect_timeout(Duration::from_secs(service.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Body of a submission response; only `job_id` matters to the workflow
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    job_id: Option<String>,

    #[serde(default)]
    message: Option<String>,
}

/// The status endpoint answers with an array, but a lone object is accepted too
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusResponse {
    Many(Vec<StatusRecord>),
    One(StatusRecord),
}

impl StatusResponse {
    fn into_records(self) -> Vec<StatusRecord> {
        match self {
            Self::Many(records) => records,
            Self::One(record) => vec![record],
        }
    }
}

/// Authenticated client for the SPN2 capture API
#[derive(Debug, Clone)]
pub struct Spn2Client {
    http: Client,
    save_endpoint: String,
    status_endpoint: String,
}

impl Spn2Client {
    /// Creates a client for the endpoints in `service`
    pub fn new(service: &ServiceConfig, credentials: &Credentials) -> Result<Self, ClientError> {
        let http = build_http_client(service, credentials)?;
        Ok(Self::with_http_client(http, service))
    }

    /// Creates a client around an existing `reqwest::Client`
    pub fn with_http_client(http: Client, service: &ServiceConfig) -> Self {
        Self {
            http,
            save_endpoint: service.save_endpoint.clone(),
            status_endpoint: service.status_endpoint.clone(),
        }
    }
}

/// Turns a non-success response into `ClientError::Status`, keeping the body
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl CaptureClient for Spn2Client {
    async fn submit(
        &self,
        url: &CaptureUrl,
        params: &CaptureParams,
    ) -> Result<Option<JobId>, ClientError> {
        let mut form: Vec<(String, String)> = Vec::with_capacity(params.len() + 1);
        form.push(("url".to_string(), url.as_str().to_string()));
        form.extend(params.iter().map(|(k, v)| (k.clone(), v.to_string())));

        tracing::debug!("Submitting {} to SPN2", url);
        let response = self.http.post(&self.save_endpoint).form(&form).send().await?;
        let response = check_status(response).await?;

        let body = response.text().await?;
        let parsed: SubmitResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;

        match parsed.job_id {
            Some(job_id) if !job_id.is_empty() => {
                tracing::debug!("Submitted {}, job_id: {}", url, job_id);
                Ok(Some(JobId::new(job_id)))
            }
            _ => {
                tracing::warn!(
                    "Submission of {} returned no job_id: {}",
                    url,
                    parsed.message.as_deref().unwrap_or("no message")
                );
                Ok(None)
            }
        }
    }

    async fn poll_batch(&self, job_ids: &[JobId]) -> Result<Vec<StatusRecord>, ClientError> {
        let joined = job_ids
            .iter()
            .map(JobId::as_str)
            .collect::<Vec<_>>()
            .join(",");

        tracing::trace!("Checking status of {} jobs", job_ids.len());
        let response = self
            .http
            .post(&self.status_endpoint)
            .form(&[("job_ids", joined)])
            .send()
            .await?;
        let response = check_status(response).await?;

        let body = response.text().await?;
        let parsed: StatusResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;

        Ok(parsed.into_records())
    }
}
