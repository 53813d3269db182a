//! Configuration for the core crate
//!
//! Submission size limits shared by the validation schema and the client.

use serde::{Deserialize, Serialize};

/// Largest photo the client accepts before encoding (20 MiB)
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Validation limits for incident submissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum description length in characters
    pub max_description_len: usize,

    /// Maximum location length in characters
    pub max_location_len: usize,

    /// Maximum length of the short optional fields
    /// (known place, contact info, image name)
    pub max_field_len: usize,

    /// Maximum length of the encoded image
    pub max_image_data_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            max_description_len: 5000,
            max_location_len: 500,
            max_field_len: 500,
            // base64 grows the 20 MiB original by a third
            max_image_data_len: 28 * 1024 * 1024,
        }
    }
}

/// Core configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Validation limits
    pub validation: ValidationConfig,
}

impl CoreConfig {
    /// Create a testing configuration with small limits
    pub fn testing() -> Self {
        let mut config = Self::default();
        config.validation.max_description_len = 200;
        config.validation.max_image_data_len = 64 * 1024;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoreConfig::default();

        assert_eq!(config.validation.max_description_len, 5000);
        assert_eq!(config.validation.max_location_len, 500);
        assert!(config.validation.max_image_data_len > MAX_IMAGE_BYTES / 3 * 4);
    }

    #[test]
    fn test_testing_preset() {
        let testing = CoreConfig::testing();
        assert_eq!(testing.validation.max_description_len, 200);
        assert_eq!(testing.validation.max_image_data_len, 64 * 1024);
        assert_eq!(testing.validation.max_location_len, 500);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CoreConfig =
            serde_json::from_str(r#"{"validation": {"max_location_len": 80}}"#).unwrap();

        assert_eq!(config.validation.max_location_len, 80);
        assert_eq!(config.validation.max_description_len, 5000);
    }
}
