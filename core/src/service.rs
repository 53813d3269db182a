//! Submission service
//!
//! The boundary between transport and storage: validates raw submissions,
//! persists them, and serves lookups. Transport layers only translate the
//! results into their own response shapes.

use std::sync::Arc;

use log::{debug, error, info};
use serde_json::Value;

use crate::analytics::{self, IncidentSummary};
use crate::error::{CoreError, Result};
use crate::models::{Incident, IncidentStatus};
use crate::schema::{FieldViolation, IncidentSchema, ValidationErrors, ViolationCode};
use crate::store::{Created, IncidentStore};

/// Name under which idempotency key violations are reported
pub const IDEMPOTENCY_KEY_FIELD: &str = "Idempotency-Key";

/// Longest accepted idempotency key
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 128;

/// Check that an idempotency key is 1 to 128 visible ASCII characters
pub fn validate_idempotency_key(key: &str) -> std::result::Result<(), ValidationErrors> {
    let valid = !key.is_empty()
        && key.len() <= MAX_IDEMPOTENCY_KEY_LEN
        && key.chars().all(|c| c.is_ascii_graphic());

    if valid {
        Ok(())
    } else {
        Err(ValidationErrors::new(vec![FieldViolation::new(
            IDEMPOTENCY_KEY_FIELD,
            ViolationCode::InvalidType,
            format!(
                "Must be 1 to {} visible ASCII characters",
                MAX_IDEMPOTENCY_KEY_LEN
            ),
        )]))
    }
}

/// Accepts incident submissions and serves stored incidents
#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn IncidentStore>,
    schema: IncidentSchema,
}

impl SubmissionService {
    /// Create a service over `store`
    pub fn new(store: Arc<dyn IncidentStore>, schema: IncidentSchema) -> Self {
        Self { store, schema }
    }

    /// The backing store
    pub fn store(&self) -> &Arc<dyn IncidentStore> {
        &self.store
    }

    /// Validate and persist a submission.
    ///
    /// With an idempotency key, a repeated submission returns the incident
    /// stored the first time instead of creating another one. Nothing is
    /// stored when validation fails.
    pub fn submit(&self, payload: &Value, idempotency_key: Option<&str>) -> Result<Created> {
        let key_check = match idempotency_key {
            Some(key) => validate_idempotency_key(key),
            None => Ok(()),
        };

        // Body and key violations are reported together
        let data = match (self.schema.validate(payload), key_check) {
            (Ok(data), Ok(())) => data,
            (Ok(_), Err(errors)) | (Err(errors), Ok(())) => return Err(reject(errors)),
            (Err(body), Err(key)) => return Err(reject(body.merge(key))),
        };

        let created = match idempotency_key {
            Some(key) => self.store.create_incident_once(key, data),
            None => self.store.create_incident(data).map(Created::New),
        }
        .map_err(|e| log_failure("create incident", e))?;

        let incident = created.incident();
        if created.is_new() {
            info!(
                "New incident created: {} {} {}",
                incident.id, incident.hazard_type, incident.location
            );
        } else {
            info!("Duplicate submission for incident {}", incident.id);
        }

        Ok(created)
    }

    /// All incidents, newest first
    pub fn list(&self) -> Result<Vec<Incident>> {
        self.store
            .get_incidents()
            .map_err(|e| log_failure("fetch incidents", e))
    }

    /// One incident, or `NotFound`
    pub fn get(&self, id: &str) -> Result<Incident> {
        self.store
            .get_incident(id)
            .map_err(|e| log_failure("fetch incident", e))?
            .ok_or_else(|| CoreError::NotFound(format!("incident {}", id)))
    }

    /// Move an incident to `status`, or `NotFound`
    pub fn update_status(&self, id: &str, status: IncidentStatus) -> Result<Incident> {
        let incident = self
            .store
            .update_incident_status(id, status)
            .map_err(|e| log_failure("update incident", e))?
            .ok_or_else(|| CoreError::NotFound(format!("incident {}", id)))?;

        info!("Incident {} is now {}", incident.id, incident.status);
        Ok(incident)
    }

    /// Dashboard summary over all incidents
    pub fn summary(&self) -> Result<IncidentSummary> {
        Ok(analytics::summarize(&self.list()?))
    }

    /// Number of stored incidents
    pub fn incident_count(&self) -> Result<usize> {
        self.store
            .incident_count()
            .map_err(|e| log_failure("count incidents", e))
    }
}

fn reject(errors: ValidationErrors) -> CoreError {
    debug!("Rejected submission: {}", errors);
    CoreError::Validation(errors)
}

/// Server faults are logged here with full detail; client faults pass through
fn log_failure(action: &str, err: CoreError) -> CoreError {
    if !err.is_client_fault() {
        error!("Failed to {}: {}", action, err);
    }
    err
}
