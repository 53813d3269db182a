//! Incident submission schema
//!
//! This module provides the validation schema that turns an untyped
//! submission into a [`NewIncident`](crate::models::NewIncident), and the
//! structured violations reported when it cannot.

mod validator;

pub use validator::{IncidentSchema, ROOT_FIELD};

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of rule a field broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    /// Field is missing or null
    Required,
    /// Field has the wrong JSON type
    InvalidType,
    /// Value is not a member of the enumeration
    InvalidEnumValue,
    /// Value is empty
    TooSmall,
    /// Value exceeds the configured length
    TooBig,
}

/// A single rule broken by a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Name of the offending field, as submitted
    pub field: String,

    /// Rule that was broken
    pub code: ViolationCode,

    /// Human-readable explanation
    pub message: String,
}

impl FieldViolation {
    /// Create a new violation
    pub fn new(field: impl Into<String>, code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }

    /// Missing required field
    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, ViolationCode::Required, "Required")
    }
}

impl Display for FieldViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation found in one submission
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(transparent)]
#[error("{} invalid field(s): {}", .0.len(), summarize(.0))]
pub struct ValidationErrors(Vec<FieldViolation>);

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|violation| violation.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Wrap a list of violations
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self(violations)
    }

    /// The violations, in field order
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Number of violations
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no violations
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append the violations of `other`
    pub fn merge(mut self, other: ValidationErrors) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Whether any violation concerns `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|violation| violation.field == field)
    }
}
