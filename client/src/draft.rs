//! Building incident submissions
//!
//! A [`ReportDraft`] collects what the reporter filled in and turns it into
//! the JSON body the server expects. Photos are inlined as base64 data URLs.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hazard_report_core::config::MAX_IMAGE_BYTES;
use hazard_report_core::HazardType;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Landmarks offered when picking a location, as `(value, label)`
pub const KNOWN_PLACES: &[(&str, &str)] = &[
    ("mall-eastgate", "Eastgate Shopping Centre"),
    ("mall-sandton", "Sandton City Mall"),
    ("clinic-bara", "Chris Hani Baragwanath Hospital"),
    ("clinic-charlotte", "Charlotte Maxeke Hospital"),
    ("rank-bree", "Bree Street Taxi Rank"),
    ("rank-noord", "Noord Street Taxi Rank"),
    ("school-wits", "University of the Witwatersrand"),
    ("school-uj", "University of Johannesburg"),
    ("other", "Other Location"),
];

/// Label for a known place value
pub fn known_place_label(value: &str) -> Option<&'static str> {
    KNOWN_PLACES
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, label)| *label)
}

/// Request body for `POST /api/incidents`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentPayload {
    /// Hazard category
    pub hazard_type: HazardType,
    /// What was observed
    pub description: String,
    /// Where it was observed
    pub location: String,
    /// Recognized landmark
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_place: Option<String>,
    /// Reporter contact details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    /// Photo as a data URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    /// Photo filename
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
}

/// An incident report being filled in
#[derive(Debug, Clone)]
pub struct ReportDraft {
    payload: IncidentPayload,
}

impl ReportDraft {
    /// Start a report with the required fields
    pub fn new(
        hazard_type: HazardType,
        description: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            payload: IncidentPayload {
                hazard_type,
                description: description.into(),
                location: location.into(),
                known_place: None,
                contact_info: None,
                image_data: None,
                image_name: None,
            },
        }
    }

    /// Name a nearby landmark
    pub fn known_place(mut self, place: impl Into<String>) -> Self {
        self.payload.known_place = Some(place.into());
        self
    }

    /// Add contact details
    pub fn contact_info(mut self, contact: impl Into<String>) -> Self {
        self.payload.contact_info = Some(contact.into());
        self
    }

    /// Inline a photo. Images over 20 MiB are refused.
    pub fn attach_image(mut self, name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ClientError::ImageTooLarge {
                size: bytes.len(),
                max: MAX_IMAGE_BYTES,
            });
        }

        let name = name.into();
        self.payload.image_data = Some(encode_image(&name, bytes));
        self.payload.image_name = Some(name);
        Ok(self)
    }

    /// Finish the draft
    pub fn into_payload(self) -> IncidentPayload {
        self.payload
    }
}

fn mime_type(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Encode a file as a `data:` URL
pub fn encode_image(name: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type(name), STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_payload_omits_optionals() {
        let payload =
            ReportDraft::new(HazardType::IllegalDumping, "trash pile", "Main St").into_payload();

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "hazardType": "illegal-dumping",
                "description": "trash pile",
                "location": "Main St",
            })
        );
    }

    #[test]
    fn test_full_payload() {
        let payload = ReportDraft::new(HazardType::SewageSpill, "overflow", "Bree St")
            .known_place("rank-bree")
            .contact_info("thandi@example.org")
            .attach_image("Drain.JPG", b"ABC")
            .unwrap()
            .into_payload();

        assert_eq!(payload.known_place.as_deref(), Some("rank-bree"));
        assert_eq!(payload.image_name.as_deref(), Some("Drain.JPG"));
        assert_eq!(payload.image_data.as_deref(), Some("data:image/jpeg;base64,QUJD"));
    }

    #[test]
    fn test_image_size_limit() {
        let big = vec![0u8; MAX_IMAGE_BYTES + 1];
        let err = ReportDraft::new(HazardType::Other, "d", "l")
            .attach_image("huge.png", &big)
            .unwrap_err();

        match err {
            ClientError::ImageTooLarge { size, max } => {
                assert_eq!(size, MAX_IMAGE_BYTES + 1);
                assert_eq!(max, MAX_IMAGE_BYTES);
            }
            other => panic!("Expected ImageTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_mime_types() {
        assert!(encode_image("a.png", b"").starts_with("data:image/png;base64,"));
        assert!(encode_image("scan", b"").starts_with("data:application/octet-stream;"));
    }

    #[test]
    fn test_known_place_labels() {
        assert_eq!(known_place_label("school-wits"), Some("University of the Witwatersrand"));
        assert_eq!(known_place_label("mall-nowhere"), None);
    }
}
