//! Incident schema validation
//!
//! Checks every field of a submission and collects all violations before
//! reporting, so the caller sees the whole picture in one response.

use serde_json::{Map, Value};

use super::{FieldViolation, ValidationErrors, ViolationCode};
use crate::config::ValidationConfig;
use crate::models::{HazardType, IncidentStatus, NewIncident};

/// Field name used when the submission itself is not an object
pub const ROOT_FIELD: &str = "body";

type Object = Map<String, Value>;

/// Validation schema for incident submissions
#[derive(Debug, Clone, Default)]
pub struct IncidentSchema {
    config: ValidationConfig,
}

impl IncidentSchema {
    /// Create a schema with the given limits
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Limits applied by this schema
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate an untyped submission.
    ///
    /// `id`, `createdAt`, `emailSent` and unknown keys are ignored.
    pub fn validate(&self, input: &Value) -> Result<NewIncident, ValidationErrors> {
        let object = input.as_object().ok_or_else(|| {
            ValidationErrors::new(vec![FieldViolation::new(
                ROOT_FIELD,
                ViolationCode::InvalidType,
                format!("Expected object, received {}", type_name(input)),
            )])
        })?;

        let mut violations = Vec::new();

        let hazard_type = hazard_type(object, &mut violations);
        let description = required_text(
            object,
            "description",
            self.config.max_description_len,
            &mut violations,
        );
        let location = required_text(
            object,
            "location",
            self.config.max_location_len,
            &mut violations,
        );
        let known_place = optional_text(object, "knownPlace", self.config.max_field_len, &mut violations);
        let contact_info = optional_text(object, "contactInfo", self.config.max_field_len, &mut violations);
        let image_data = optional_text(object, "imageData", self.config.max_image_data_len, &mut violations);
        let image_name = optional_text(object, "imageName", self.config.max_field_len, &mut violations);
        let status = status(object, &mut violations);

        match (hazard_type, description, location) {
            (Some(hazard_type), Some(description), Some(location)) if violations.is_empty() => {
                Ok(NewIncident {
                    hazard_type,
                    description,
                    location,
                    known_place,
                    contact_info,
                    image_data,
                    image_name,
                    status,
                })
            }
            _ => Err(ValidationErrors::new(violations)),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Fetch a field as a string, treating `null` as absent
fn string_field<'a>(
    object: &'a Object,
    field: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<&'a str> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value.as_str()),
        Some(other) => {
            violations.push(FieldViolation::new(
                field,
                ViolationCode::InvalidType,
                format!("Expected string, received {}", type_name(other)),
            ));
            None
        }
    }
}

fn check_length(
    field: &str,
    value: &str,
    max_len: usize,
    violations: &mut Vec<FieldViolation>,
) -> bool {
    if value.chars().count() > max_len {
        violations.push(FieldViolation::new(
            field,
            ViolationCode::TooBig,
            format!("Must be at most {} characters", max_len),
        ));
        return false;
    }
    true
}

fn required_text(
    object: &Object,
    field: &str,
    max_len: usize,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    if matches!(object.get(field), None | Some(Value::Null)) {
        violations.push(FieldViolation::required(field));
        return None;
    }

    let value = string_field(object, field, violations)?;
    if value.trim().is_empty() {
        violations.push(FieldViolation::new(field, ViolationCode::TooSmall, "Must not be empty"));
        return None;
    }

    check_length(field, value, max_len, violations).then(|| value.to_string())
}

/// Optional text: absent, null and empty all become `None`
fn optional_text(
    object: &Object,
    field: &str,
    max_len: usize,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    let value = string_field(object, field, violations)?;
    if value.is_empty() {
        return None;
    }

    check_length(field, value, max_len, violations).then(|| value.to_string())
}

fn expected_values<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(|value| format!("'{}'", value))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn hazard_type(object: &Object, violations: &mut Vec<FieldViolation>) -> Option<HazardType> {
    const FIELD: &str = "hazardType";

    if matches!(object.get(FIELD), None | Some(Value::Null)) {
        violations.push(FieldViolation::required(FIELD));
        return None;
    }

    let value = string_field(object, FIELD, violations)?;
    match value.parse::<HazardType>() {
        Ok(hazard) => Some(hazard),
        Err(_) => {
            violations.push(FieldViolation::new(
                FIELD,
                ViolationCode::InvalidEnumValue,
                format!(
                    "Invalid enum value. Expected {}, received '{}'",
                    expected_values(HazardType::ALL.iter().map(|h| h.as_str())),
                    value
                ),
            ));
            None
        }
    }
}

fn status(object: &Object, violations: &mut Vec<FieldViolation>) -> IncidentStatus {
    const FIELD: &str = "status";

    let Some(value) = string_field(object, FIELD, violations) else {
        return IncidentStatus::default();
    };

    value.parse::<IncidentStatus>().unwrap_or_else(|_| {
        violations.push(FieldViolation::new(
            FIELD,
            ViolationCode::InvalidEnumValue,
            format!(
                "Invalid enum value. Expected {}, received '{}'",
                expected_values(IncidentStatus::ALL.iter().map(|s| s.as_str())),
                value
            ),
        ));
        IncidentStatus::default()
    })
}
