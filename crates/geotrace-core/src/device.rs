//! Source-device profile derived from extracted tags.

use serde::{Deserialize, Serialize};

use crate::models::MetadataMap;

/// Camera identity, capture times and capture settings.
///
/// Every field is the display form of the corresponding tag, or `None` when
/// the tag is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub make: Option<String>,
    pub model: Option<String>,
    pub software: Option<String>,
    pub datetime_original: Option<String>,
    pub datetime_digitized: Option<String>,
    pub iso: Option<String>,
    pub aperture: Option<String>,
    pub exposure_time: Option<String>,
    pub focal_length: Option<String>,
}

impl DeviceProfile {
    pub fn from_metadata(metadata: &MetadataMap) -> Self {
        let field = |name: &str| {
            metadata
                .get(name)
                .map(|v| v.to_string())
                .filter(|s| !s.is_empty())
        };
        Self {
            make: field("Make"),
            model: field("Model"),
            software: field("Software"),
            datetime_original: field("DateTimeOriginal"),
            datetime_digitized: field("DateTimeDigitized"),
            iso: field("ISOSpeedRatings"),
            aperture: field("FNumber"),
            exposure_time: field("ExposureTime"),
            focal_length: field("FocalLength"),
        }
    }

    /// Make or model identifies the device.
    pub fn is_identified(&self) -> bool {
        self.make.is_some() || self.model.is_some()
    }
}
