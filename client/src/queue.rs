//! Offline queue
//!
//! Reports made without connectivity wait here, in the order they were made,
//! until they can be replayed. Each carries the idempotency key it will be
//! sent with, so a report is never created twice however often it is resent.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use hazard_report_core::utils::generate_uuid;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::draft::IncidentPayload;
use crate::error::Result;

/// A report waiting to be sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedReport {
    /// Key sent with every delivery attempt
    pub idempotency_key: String,
    /// Submission body
    pub payload: IncidentPayload,
    /// When the report was queued
    pub queued_at: DateTime<Utc>,
    /// Failed delivery attempts so far
    pub attempts: u32,
}

/// FIFO of unsent reports, optionally persisted as JSON
#[derive(Debug, Default)]
pub struct OfflineQueue {
    reports: VecDeque<QueuedReport>,
    path: Option<PathBuf>,
}

impl OfflineQueue {
    /// A queue that lives only in memory
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the queue persisted at `path`, starting empty if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let reports = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            VecDeque::new()
        };

        debug!("Opened offline queue at {:?} with {} report(s)", path, reports.len());
        Ok(Self {
            reports,
            path: Some(path),
        })
    }

    /// Backing file, if persisted
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Queue a report under a fresh idempotency key, returning the key
    pub fn enqueue(&mut self, payload: IncidentPayload) -> Result<String> {
        let key = generate_uuid().to_string();
        self.enqueue_with_key(key.clone(), payload)?;
        Ok(key)
    }

    /// Queue a report under a key that may already have been sent
    pub fn enqueue_with_key(&mut self, idempotency_key: String, payload: IncidentPayload) -> Result<()> {
        self.reports.push_back(QueuedReport {
            idempotency_key,
            payload,
            queued_at: Utc::now(),
            attempts: 0,
        });
        self.persist()
    }

    /// Oldest report
    pub fn peek(&self) -> Option<&QueuedReport> {
        self.reports.front()
    }

    /// Remove and return the oldest report
    pub fn pop_front(&mut self) -> Result<Option<QueuedReport>> {
        let report = self.reports.pop_front();
        if report.is_some() {
            self.persist()?;
        }
        Ok(report)
    }

    /// Count a failed delivery of the oldest report
    pub fn record_attempt(&mut self) -> Result<()> {
        if let Some(report) = self.reports.front_mut() {
            report.attempts += 1;
            self.persist()?;
        }
        Ok(())
    }

    /// Number of queued reports
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Queued reports, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &QueuedReport> {
        self.reports.iter()
    }

    /// Write the queue to its file. The file is replaced atomically.
    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&self.reports)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
