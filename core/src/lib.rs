//! # Hazard Report Core
//!
//! Core data structures and services for Hazard Report, a community
//! environmental incident reporting service.
//!
//! A submission flows through the [`schema`] (validation), the [`store`]
//! (persistence) and the [`service`] that ties them together. Transport
//! layers talk to [`SubmissionService`] only.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod analytics;
pub mod config;
pub mod error;
pub mod models;
pub mod schema;
pub mod service;
pub mod store;
pub mod utils;

/// Re-export common types for ease of use
pub use analytics::IncidentSummary;
pub use config::{CoreConfig, ValidationConfig};
pub use error::{CoreError, Result};
pub use models::{HazardType, Incident, IncidentReceipt, IncidentStatus, NewIncident};
pub use schema::{FieldViolation, IncidentSchema, ValidationErrors, ViolationCode};
pub use service::SubmissionService;
pub use store::{Created, IncidentStore, MemStorage};

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
