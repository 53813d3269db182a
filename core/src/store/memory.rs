//! In-memory store backend
//!
//! Records live for the life of the process. Nothing is ever evicted.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, warn};

use super::{Clock, Created, IncidentStore, SystemClock};
use crate::error::{to_storage_error, CoreError, Result};
use crate::models::{Incident, IncidentStatus, NewIncident, NewUser, User};
use crate::utils::generate_uuid;

/// Incident plus its insertion sequence, used to break timestamp ties
#[derive(Debug, Clone)]
struct StoredIncident {
    sequence: u64,
    incident: Incident,
}

#[derive(Debug, Default)]
struct Tables {
    incidents: HashMap<String, StoredIncident>,
    next_sequence: u64,
    /// Idempotency key -> incident id
    idempotency_keys: HashMap<String, String>,
    users: HashMap<String, User>,
}

impl Tables {
    fn insert_incident(&mut self, incident: Incident) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.incidents.insert(
            incident.id.clone(),
            StoredIncident { sequence, incident },
        );
    }
}

/// In-memory implementation of [`IncidentStore`]
#[derive(Debug)]
pub struct MemStorage {
    tables: RwLock<Tables>,
    clock: Arc<dyn Clock>,
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStorage {
    /// Create an empty store using the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store with the given time source
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            clock,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(to_storage_error)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(to_storage_error)
    }

    fn build(&self, data: NewIncident) -> Incident {
        data.into_incident(generate_uuid().to_string(), self.clock.now())
    }
}

impl IncidentStore for MemStorage {
    fn create_incident(&self, data: NewIncident) -> Result<Incident> {
        let incident = self.build(data);
        self.write()?.insert_incident(incident.clone());

        debug!("Stored incident {} ({})", incident.id, incident.hazard_type);
        Ok(incident)
    }

    fn create_incident_once(&self, key: &str, data: NewIncident) -> Result<Created> {
        let mut tables = self.write()?;

        if let Some(id) = tables.idempotency_keys.get(key) {
            let stored = tables.incidents.get(id).ok_or_else(|| {
                CoreError::Storage(format!("idempotency key {} points at missing incident {}", key, id))
            })?;
            if data.describes(&stored.incident) {
                debug!("Idempotency key {} already used by incident {}", key, id);
            } else {
                warn!(
                    "Idempotency key {} reused with a different payload; returning incident {}",
                    key, id
                );
            }
            return Ok(Created::Existing(stored.incident.clone()));
        }

        let incident = self.build(data);
        tables
            .idempotency_keys
            .insert(key.to_string(), incident.id.clone());
        tables.insert_incident(incident.clone());

        debug!("Stored incident {} under idempotency key {}", incident.id, key);
        Ok(Created::New(incident))
    }

    fn get_incidents(&self) -> Result<Vec<Incident>> {
        let tables = self.read()?;

        let mut stored: Vec<&StoredIncident> = tables.incidents.values().collect();
        stored.sort_by(|a, b| {
            b.incident
                .created_at
                .cmp(&a.incident.created_at)
                .then(a.sequence.cmp(&b.sequence))
        });

        Ok(stored.into_iter().map(|s| s.incident.clone()).collect())
    }

    fn get_incident(&self, id: &str) -> Result<Option<Incident>> {
        Ok(self.read()?.incidents.get(id).map(|s| s.incident.clone()))
    }

    fn update_incident_status(&self, id: &str, status: IncidentStatus) -> Result<Option<Incident>> {
        let mut tables = self.write()?;

        let Some(stored) = tables.incidents.get_mut(id) else {
            debug!("Status update for unknown incident {} ignored", id);
            return Ok(None);
        };

        let current = stored.incident.status;
        if !current.can_transition_to(status) {
            return Err(CoreError::InvalidStatusTransition {
                from: current,
                to: status,
            });
        }

        stored.incident.status = status;
        Ok(Some(stored.incident.clone()))
    }

    fn mark_email_sent(&self, id: &str) -> Result<Option<Incident>> {
        let now = self.clock.now();
        let mut tables = self.write()?;

        Ok(tables.incidents.get_mut(id).map(|stored| {
            stored.incident.email_sent = Some(now);
            stored.incident.clone()
        }))
    }

    fn incident_count(&self) -> Result<usize> {
        Ok(self.read()?.incidents.len())
    }

    fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.write()?;

        if tables.users.values().any(|u| u.username == user.username) {
            return Err(CoreError::DuplicateUsername(user.username));
        }

        let user = User {
            id: generate_uuid().to_string(),
            username: user.username,
            password: user.password,
        };
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.read()?.users.get(id).cloned())
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}
