//! GPS coordinate resolution from extracted metadata.
//!
//! Converts the degrees/minutes/seconds sub-tags plus hemisphere references
//! into signed decimal degrees. Both axes must resolve or neither does.

use crate::models::{GpsCoordinate, MetadataMap, TagValue};

pub const LATITUDE_TAG: &str = "GPSLatitude";
pub const LATITUDE_REF_TAG: &str = "GPSLatitudeRef";
pub const LONGITUDE_TAG: &str = "GPSLongitude";
pub const LONGITUDE_REF_TAG: &str = "GPSLongitudeRef";

/// Resolve the GPS position carried by `metadata`.
///
/// Returns `None` unless latitude, longitude and both references are present
/// and well formed.
///
/// # Example
/// ```
/// use geotrace_core::{resolve, MetadataMap, Rational, TagValue};
///
/// let dms = |d, m, s| TagValue::Sequence(vec![
///     TagValue::Rational(Rational::new(d, 1)),
///     TagValue::Rational(Rational::new(m, 1)),
///     TagValue::Rational(Rational::new(s, 1)),
/// ]);
/// let mut tags = MetadataMap::new();
/// tags.insert("GPSLatitudeRef", TagValue::Text("S".into()));
/// tags.insert("GPSLatitude", dms(33, 52, 0));
/// tags.insert("GPSLongitudeRef", TagValue::Text("E".into()));
/// tags.insert("GPSLongitude", dms(151, 12, 0));
///
/// let c = resolve(&tags).unwrap();
/// assert!(c.latitude < 0.0 && c.longitude > 0.0);
/// ```
pub fn resolve(metadata: &MetadataMap) -> Option<GpsCoordinate> {
    let latitude = axis(metadata, LATITUDE_TAG, LATITUDE_REF_TAG)?;
    let longitude = axis(metadata, LONGITUDE_TAG, LONGITUDE_REF_TAG)?;
    Some(GpsCoordinate::new(latitude, longitude))
}

fn axis(metadata: &MetadataMap, value_tag: &str, ref_tag: &str) -> Option<f64> {
    let dms = metadata.get(value_tag)?;
    let reference = reference_letter(metadata.get(ref_tag)?)?;
    Some(apply_reference(dms_to_decimal(dms)?, &reference))
}

/// Hemisphere letter from a reference tag (text, or a single raw byte).
fn reference_letter(value: &TagValue) -> Option<String> {
    let text = match value {
        TagValue::Text(s) => s.trim().to_string(),
        TagValue::Bytes(b) => String::from_utf8_lossy(b).trim().to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// `degrees + minutes/60 + seconds/3600` over the first three components.
///
/// A zero leading component is valid; only missing or non-numeric parts
/// (including zero denominators) fail.
pub fn dms_to_decimal(dms: &TagValue) -> Option<f64> {
    let parts = dms.as_sequence()?;
    if parts.len() < 3 {
        return None;
    }
    let degrees = parts[0].as_f64()?;
    let minutes = parts[1].as_f64()?;
    let seconds = parts[2].as_f64()?;
    Some(degrees + minutes / 60.0 + seconds / 3600.0)
}

/// Negate for southern and western hemispheres.
pub fn apply_reference(decimal: f64, reference: &str) -> f64 {
    if reference.eq_ignore_ascii_case("S") || reference.eq_ignore_ascii_case("W") {
        -decimal
    } else {
        decimal
    }
}
