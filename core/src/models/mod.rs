//! Data models for Hazard Report
//!
//! This module provides the incident and user records kept by the store.

mod incident;
mod user;

pub use incident::{
    HazardType, Incident, IncidentReceipt, IncidentStatus, NewIncident, UnknownVariant,
};
pub use user::{NewUser, User};
