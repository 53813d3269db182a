//! Client submission flow
//!
//! Sends a finished report straight away when online and queues it
//! otherwise. [`SubmissionFlow::replay`] later drains the queue in order.

use std::time::Duration;

use hazard_report_core::utils::{generate_uuid, retry_with_backoff};
use hazard_report_core::FieldViolation;
use log::{info, warn};

use crate::client::{IncidentClient, Submitted};
use crate::config::ClientConfig;
use crate::draft::ReportDraft;
use crate::error::{ClientError, Result};
use crate::queue::{OfflineQueue, QueuedReport};

/// What happened to a submitted draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server accepted the report
    Submitted(Submitted),

    /// The report is waiting in the offline queue
    Queued {
        /// Key the report will be delivered under
        idempotency_key: String,
    },
}

/// A queued report the server refused
#[derive(Debug, Clone)]
pub struct RejectedReport {
    /// The dropped report
    pub report: QueuedReport,
    /// Why the server refused it
    pub details: Vec<FieldViolation>,
}

/// Result of draining the offline queue
#[derive(Debug, Default)]
pub struct ReplayReport {
    /// Reports the server accepted, in queue order
    pub delivered: Vec<Submitted>,
    /// Reports the server refused; they are no longer queued
    pub rejected: Vec<RejectedReport>,
    /// Reports still queued
    pub remaining: usize,
    /// Error that stopped the replay early
    pub last_error: Option<String>,
}

/// Submits reports, falling back to the offline queue
pub struct SubmissionFlow {
    client: IncidentClient,
    queue: OfflineQueue,
    max_retries: usize,
    initial_backoff: Duration,
}

impl SubmissionFlow {
    /// Build a flow from configuration, opening the persisted queue if one is configured
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let queue = match &config.queue_path {
            Some(path) => OfflineQueue::open(path)?,
            None => OfflineQueue::in_memory(),
        };

        Ok(Self::with_queue(config, queue))
    }

    /// Build a flow around an existing queue
    pub fn with_queue(config: &ClientConfig, queue: OfflineQueue) -> Self {
        Self {
            client: IncidentClient::from_config(config),
            queue,
            max_retries: config.max_retries,
            initial_backoff: config.initial_backoff,
        }
    }

    /// The HTTP client
    pub fn client(&self) -> &IncidentClient {
        &self.client
    }

    /// The offline queue
    pub fn queue(&self) -> &OfflineQueue {
        &self.queue
    }

    /// Submit a draft.
    ///
    /// When `online` is false, or the request fails before reaching the
    /// server, the report is queued. Server refusals are returned as errors
    /// and nothing is queued.
    pub async fn submit(&mut self, draft: ReportDraft, online: bool) -> Result<Outcome> {
        let payload = draft.into_payload();

        if !online {
            let idempotency_key = self.queue.enqueue(payload)?;
            info!("Offline, queued report {}", idempotency_key);
            return Ok(Outcome::Queued { idempotency_key });
        }

        let idempotency_key = generate_uuid().to_string();
        match self.client.submit(&payload, Some(idempotency_key.as_str())).await {
            Ok(submitted) => Ok(Outcome::Submitted(submitted)),
            Err(ClientError::Network(e)) => {
                // The server may have stored it; the same key makes the resend harmless
                warn!("Submission failed, queueing report {}: {}", idempotency_key, e);
                self.queue.enqueue_with_key(idempotency_key.clone(), payload)?;
                Ok(Outcome::Queued { idempotency_key })
            }
            Err(e) => Err(e),
        }
    }

    /// Deliver queued reports, oldest first.
    ///
    /// Each report is retried with backoff. Refused reports are dropped. The
    /// replay stops at the first report that still cannot be delivered so
    /// later reports never overtake it.
    pub async fn replay(&mut self) -> Result<ReplayReport> {
        let mut report = ReplayReport::default();

        while let Some(head) = self.queue.peek().cloned() {
            let client = &self.client;
            let result = retry_with_backoff(
                || client.submit(&head.payload, Some(head.idempotency_key.as_str())),
                ClientError::is_retryable,
                self.max_retries,
                self.initial_backoff,
            )
            .await;

            match result {
                Ok(submitted) => {
                    self.queue.pop_front()?;
                    report.delivered.push(submitted);
                }
                Err(ClientError::Rejected(details)) => {
                    warn!("Dropping rejected report {}", head.idempotency_key);
                    self.queue.pop_front()?;
                    report.rejected.push(RejectedReport {
                        report: head,
                        details,
                    });
                }
                Err(e) => {
                    warn!("Replay stopped at report {}: {}", head.idempotency_key, e);
                    self.queue.record_attempt()?;
                    report.last_error = Some(e.to_string());
                    break;
                }
            }
        }

        report.remaining = self.queue.len();
        info!(
            "Replay finished: {} delivered, {} rejected, {} remaining",
            report.delivered.len(),
            report.rejected.len(),
            report.remaining
        );
        Ok(report)
    }
}
