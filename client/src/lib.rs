//! Client library for Hazard Report
//!
//! Builds incident reports, submits them to the API server, and holds them
//! in an offline queue when the device has no connectivity.

pub mod client;
pub mod config;
pub mod draft;
pub mod error;
pub mod flow;
pub mod queue;

pub use client::{IncidentClient, Submitted};
pub use config::ClientConfig;
pub use draft::{IncidentPayload, ReportDraft, KNOWN_PLACES};
pub use error::{ClientError, Result};
pub use flow::{Outcome, ReplayReport, SubmissionFlow};
pub use queue::{OfflineQueue, QueuedReport};
