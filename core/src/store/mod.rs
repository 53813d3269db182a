//! Incident storage
//!
//! This module provides the [`IncidentStore`] contract used by the
//! submission service, and the in-memory [`MemStorage`] backend.
//!
//! Every operation is atomic with respect to every other operation: a reader
//! never observes a half-built or half-updated record.

mod clock;
mod memory;

pub use clock::{Clock, ManualClock, SystemClock};
pub use memory::MemStorage;

use crate::error::Result;
use crate::models::{Incident, IncidentStatus, NewIncident, NewUser, User};

/// Outcome of an idempotent create
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Created {
    /// A new incident was stored
    New(Incident),
    /// The key was already used; this is the incident stored for it
    Existing(Incident),
}

impl Created {
    /// Whether a new incident was stored
    pub fn is_new(&self) -> bool {
        matches!(self, Created::New(_))
    }

    /// The incident, new or existing
    pub fn incident(&self) -> &Incident {
        match self {
            Created::New(incident) | Created::Existing(incident) => incident,
        }
    }

    /// Take the incident, new or existing
    pub fn into_incident(self) -> Incident {
        match self {
            Created::New(incident) | Created::Existing(incident) => incident,
        }
    }
}

/// Keyed storage of incidents and users
pub trait IncidentStore: Send + Sync {
    /// Store a validated incident, assigning its id and creation time
    fn create_incident(&self, data: NewIncident) -> Result<Incident>;

    /// Store a validated incident at most once per idempotency key
    fn create_incident_once(&self, key: &str, data: NewIncident) -> Result<Created>;

    /// All incidents, newest first. Equal timestamps keep insertion order.
    fn get_incidents(&self) -> Result<Vec<Incident>>;

    /// Look up one incident; a missing id is `Ok(None)`
    fn get_incident(&self, id: &str) -> Result<Option<Incident>>;

    /// Change an incident's status.
    ///
    /// A missing id is a no-op returning `Ok(None)`. Moving backwards in the
    /// lifecycle fails with `InvalidStatusTransition`.
    fn update_incident_status(&self, id: &str, status: IncidentStatus) -> Result<Option<Incident>>;

    /// Record that the notification email went out; a missing id is a no-op
    fn mark_email_sent(&self, id: &str) -> Result<Option<Incident>>;

    /// Number of stored incidents
    fn incident_count(&self) -> Result<usize>;

    /// Create a user; usernames are unique
    fn create_user(&self, user: NewUser) -> Result<User>;

    /// Look up a user by id
    fn get_user(&self, id: &str) -> Result<Option<User>>;

    /// Look up a user by username
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
}
