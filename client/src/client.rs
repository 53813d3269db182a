//! HTTP client for the incident API

use std::time::Duration;

use hazard_report_core::schema::ROOT_FIELD;
use hazard_report_core::{
    FieldViolation, Incident, IncidentReceipt, IncidentStatus, IncidentSummary, ViolationCode,
};
use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::ClientConfig;
use crate::draft::IncidentPayload;
use crate::error::{ClientError, Result};

/// Header carrying the submission's idempotency key
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    /// Acknowledgement returned by the server
    pub receipt: IncidentReceipt,

    /// The server already had this submission and returned the original
    pub duplicate: bool,
}

#[derive(Deserialize)]
struct IncidentEnvelope<T> {
    incident: T,
}

#[derive(Deserialize)]
struct IncidentsEnvelope {
    incidents: Vec<Incident>,
}

#[derive(Deserialize)]
struct SummaryEnvelope {
    summary: IncidentSummary,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    details: Vec<FieldViolation>,
}

/// Client for the incident API
#[derive(Debug, Clone)]
pub struct IncidentClient {
    /// Base URL for the API
    base_url: String,

    /// HTTP client
    client: Client,

    /// Timeout for requests
    timeout: Duration,
}

impl IncidentClient {
    /// Create a client for the server at `base_url`
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Create a client from configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut client = Self::new(&config.base_url);
        client.set_timeout(config.timeout);
        client
    }

    /// Set the timeout for requests
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Submit a new incident.
    ///
    /// Sending the same `idempotency_key` again returns the incident created
    /// the first time.
    pub async fn submit(
        &self,
        payload: &IncidentPayload,
        idempotency_key: Option<&str>,
    ) -> Result<Submitted> {
        let mut request = self
            .client
            .post(self.url("/incidents"))
            .timeout(self.timeout)
            .json(payload);

        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_HEADER, key);
        }

        let response = check(request.send().await?).await?;
        let duplicate = response.status() == StatusCode::OK;
        let body: IncidentEnvelope<IncidentReceipt> = response.json().await?;

        debug!("Submitted incident {} (duplicate: {})", body.incident.id, duplicate);
        Ok(Submitted {
            receipt: body.incident,
            duplicate,
        })
    }

    /// All incidents, newest first
    pub async fn list(&self) -> Result<Vec<Incident>> {
        let body: IncidentsEnvelope = self.get_json("/incidents").await?;
        Ok(body.incidents)
    }

    /// One incident by id
    pub async fn get(&self, id: &str) -> Result<Incident> {
        let body: IncidentEnvelope<Incident> =
            self.get_json(&format!("/incidents/{}", id)).await?;
        Ok(body.incident)
    }

    /// Dashboard summary
    pub async fn summary(&self) -> Result<IncidentSummary> {
        let body: SummaryEnvelope = self.get_json("/incidents/summary").await?;
        Ok(body.summary)
    }

    /// Move an incident to `status`
    pub async fn update_status(&self, id: &str, status: IncidentStatus) -> Result<Incident> {
        let response = self
            .client
            .patch(self.url(&format!("/incidents/{}/status", id)))
            .timeout(self.timeout)
            .json(&json!({ "status": status }))
            .send()
            .await?;

        let body: IncidentEnvelope<Incident> = check(response).await?.json().await?;
        Ok(body.incident)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .timeout(self.timeout)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }
}

/// Map unsuccessful responses to errors
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: ErrorBody = response.json().await.unwrap_or_default();
    Err(match status {
        StatusCode::BAD_REQUEST => ClientError::Rejected(body.details),
        StatusCode::PAYLOAD_TOO_LARGE => ClientError::Rejected(vec![FieldViolation::new(
            ROOT_FIELD,
            ViolationCode::TooBig,
            "Payload too large",
        )]),
        StatusCode::NOT_FOUND => ClientError::NotFound,
        StatusCode::CONFLICT => ClientError::Conflict(body.error),
        _ => ClientError::Server {
            status: status.as_u16(),
            message: body.error,
        },
    })
}
