//! Incident representation
//!
//! This module provides the incident record, its hazard classification and
//! its status lifecycle.

use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of an environmental hazard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HazardType {
    /// Waste dumped outside designated sites
    IllegalDumping,
    /// Animal carcasses dumped in public spaces
    AnimalDumping,
    /// Sewage overflowing or leaking
    SewageSpill,
    /// Unauthorized electricity connections
    IllegalElectricity,
    /// Chemical leaks or spills
    ChemicalSpill,
    /// Smoke, fumes or dust
    AirPollution,
    /// Excessive noise
    NoisePollution,
    /// Illegal clearing of trees
    Deforestation,
    /// Polluted water sources
    WaterContamination,
    /// Poaching of protected wildlife
    WildlifePoaching,
    /// Anything not covered above
    Other,
}

impl HazardType {
    /// Every hazard type, in declaration order
    pub const ALL: [HazardType; 11] = [
        HazardType::IllegalDumping,
        HazardType::AnimalDumping,
        HazardType::SewageSpill,
        HazardType::IllegalElectricity,
        HazardType::ChemicalSpill,
        HazardType::AirPollution,
        HazardType::NoisePollution,
        HazardType::Deforestation,
        HazardType::WaterContamination,
        HazardType::WildlifePoaching,
        HazardType::Other,
    ];

    /// Wire name of the hazard type
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardType::IllegalDumping => "illegal-dumping",
            HazardType::AnimalDumping => "animal-dumping",
            HazardType::SewageSpill => "sewage-spill",
            HazardType::IllegalElectricity => "illegal-electricity",
            HazardType::ChemicalSpill => "chemical-spill",
            HazardType::AirPollution => "air-pollution",
            HazardType::NoisePollution => "noise-pollution",
            HazardType::Deforestation => "deforestation",
            HazardType::WaterContamination => "water-contamination",
            HazardType::WildlifePoaching => "wildlife-poaching",
            HazardType::Other => "other",
        }
    }

    /// Human-readable label shown in reports and dashboards
    pub fn label(&self) -> &'static str {
        match self {
            HazardType::IllegalDumping => "Illegal Dumping",
            HazardType::AnimalDumping => "Animal Dumping",
            HazardType::SewageSpill => "Sewage Spill",
            HazardType::IllegalElectricity => "Illegal Electricity Connections",
            HazardType::ChemicalSpill => "Chemical Spills",
            HazardType::AirPollution => "Air Pollution",
            HazardType::NoisePollution => "Noise Pollution",
            HazardType::Deforestation => "Deforestation",
            HazardType::WaterContamination => "Water Contamination",
            HazardType::WildlifePoaching => "Wildlife Poaching",
            HazardType::Other => "Other Environmental Hazard",
        }
    }
}

impl Display for HazardType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown enumeration value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// Enumeration name
    pub kind: &'static str,
    /// Rejected value
    pub value: String,
}

impl FromStr for HazardType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HazardType::ALL
            .iter()
            .copied()
            .find(|hazard| hazard.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "hazard type",
                value: s.to_string(),
            })
    }
}

/// Lifecycle state of an incident
///
/// Variants are ordered by progress, so a valid transition never moves to a
/// smaller value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    /// Reported, not yet looked at
    #[default]
    Pending,
    /// Under investigation by the authorities
    Investigating,
    /// Closed
    Resolved,
}

impl IncidentStatus {
    /// Every status, in lifecycle order
    pub const ALL: [IncidentStatus; 3] = [
        IncidentStatus::Pending,
        IncidentStatus::Investigating,
        IncidentStatus::Resolved,
    ];

    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Pending => "pending",
            IncidentStatus::Investigating => "investigating",
            IncidentStatus::Resolved => "resolved",
        }
    }

    /// Whether an incident in this status may move to `next`.
    ///
    /// Staying in the same status is allowed.
    pub fn can_transition_to(&self, next: IncidentStatus) -> bool {
        next >= *self
    }
}

impl Display for IncidentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IncidentStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "status",
                value: s.to_string(),
            })
    }
}

/// A stored incident report
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Unique identifier
    pub id: String,

    /// Hazard category
    pub hazard_type: HazardType,

    /// What was observed
    pub description: String,

    /// Free-text address or location description
    pub location: String,

    /// Recognized landmark near the location
    pub known_place: Option<String>,

    /// Reporter phone number or email
    pub contact_info: Option<String>,

    /// Encoded photo
    pub image_data: Option<String>,

    /// Original filename of the photo
    pub image_name: Option<String>,

    /// Lifecycle status
    pub status: IncidentStatus,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// When the notification email was sent
    pub email_sent: Option<DateTime<Utc>>,
}

impl Debug for Incident {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Incident")
            .field("id", &self.id)
            .field("hazard_type", &self.hazard_type)
            .field("location", &self.location)
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .field("has_image", &self.image_data.is_some())
            .finish()
    }
}

impl Incident {
    /// Short acknowledgement returned to the submitter
    pub fn receipt(&self) -> IncidentReceipt {
        IncidentReceipt {
            id: self.id.clone(),
            hazard_type: self.hazard_type,
            location: self.location.clone(),
            created_at: self.created_at,
            status: self.status,
        }
    }
}

/// Acknowledgement of a created incident, without the large fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentReceipt {
    /// Incident identifier
    pub id: String,
    /// Hazard category
    pub hazard_type: HazardType,
    /// Location text
    pub location: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Lifecycle status
    pub status: IncidentStatus,
}

/// A validated incident submission.
///
/// Only the validation schema can build one, so anything handed to the store
/// has already passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncident {
    pub(crate) hazard_type: HazardType,
    pub(crate) description: String,
    pub(crate) location: String,
    pub(crate) known_place: Option<String>,
    pub(crate) contact_info: Option<String>,
    pub(crate) image_data: Option<String>,
    pub(crate) image_name: Option<String>,
    pub(crate) status: IncidentStatus,
}

impl NewIncident {
    /// Hazard category
    pub fn hazard_type(&self) -> HazardType {
        self.hazard_type
    }

    /// Description text
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Location text
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Known place label
    pub fn known_place(&self) -> Option<&str> {
        self.known_place.as_deref()
    }

    /// Contact information
    pub fn contact_info(&self) -> Option<&str> {
        self.contact_info.as_deref()
    }

    /// Encoded photo
    pub fn image_data(&self) -> Option<&str> {
        self.image_data.as_deref()
    }

    /// Photo filename
    pub fn image_name(&self) -> Option<&str> {
        self.image_name.as_deref()
    }

    /// Initial status
    pub fn status(&self) -> IncidentStatus {
        self.status
    }

    /// Whether `incident` holds exactly the submitted fields
    pub fn describes(&self, incident: &Incident) -> bool {
        self.hazard_type == incident.hazard_type
            && self.description == incident.description
            && self.location == incident.location
            && self.known_place == incident.known_place
            && self.contact_info == incident.contact_info
            && self.image_data == incident.image_data
            && self.image_name == incident.image_name
    }

    /// Build the stored record
    pub(crate) fn into_incident(self, id: String, created_at: DateTime<Utc>) -> Incident {
        Incident {
            id,
            hazard_type: self.hazard_type,
            description: self.description,
            location: self.location,
            known_place: self.known_place,
            contact_info: self.contact_info,
            image_data: self.image_data,
            image_name: self.image_name,
            status: self.status,
            created_at,
            email_sent: None,
        }
    }
}
