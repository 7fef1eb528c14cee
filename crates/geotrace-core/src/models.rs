//! Value types shared across geotrace crates.
//!
//! `TagValue` and `MetadataMap` carry extracted tag payloads without lossy
//! coercion; `GpsCoordinate` and `FileDigestSet` are the derived evidence.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::defaults;

// =============================================================================
// TAG VALUES
// =============================================================================

/// A numerator/denominator pair, wide enough for both EXIF RATIONAL and SRATIONAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rational {
    pub numerator: i64,
    pub denominator: i64,
}

impl Rational {
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Value as f64, or `None` for a zero denominator.
    pub fn to_f64(&self) -> Option<f64> {
        if self.denominator == 0 {
            None
        } else {
            Some(self.numerator as f64 / self.denominator as f64)
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_f64() {
            Some(v) => write!(f, "{}", v),
            None => write!(f, "{}/{}", self.numerator, self.denominator),
        }
    }
}

/// Payload of a single metadata tag.
///
/// Byte payloads that decode as UTF-8 become `Text`; everything else stays
/// `Bytes` and serializes as a hex string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TagValue {
    Integer(i64),
    Rational(Rational),
    Float(f64),
    Text(String),
    Bytes(#[serde(with = "hex")] Vec<u8>),
    Sequence(Vec<TagValue>),
}

impl TagValue {
    /// Build a value from a raw byte payload, preferring text when it is valid UTF-8.
    ///
    /// Trailing NUL padding is stripped before decoding.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let end = bytes
            .iter()
            .rposition(|&b| b != 0)
            .map(|i| i + 1)
            .unwrap_or(0);
        match std::str::from_utf8(&bytes[..end]) {
            Ok(text) => TagValue::Text(text.to_string()),
            Err(_) => TagValue::Bytes(bytes),
        }
    }

    /// Collapse a list of component values: one element becomes a scalar.
    pub fn from_components(mut items: Vec<TagValue>) -> Self {
        if items.len() == 1 {
            items.remove(0)
        } else {
            TagValue::Sequence(items)
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of a scalar value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TagValue::Integer(n) => Some(*n as f64),
            TagValue::Rational(r) => r.to_f64(),
            TagValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[TagValue]> {
        match self {
            TagValue::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Integer(n) => write!(f, "{}", n),
            TagValue::Rational(r) => write!(f, "{}", r),
            TagValue::Float(v) => write!(f, "{}", v),
            TagValue::Text(s) => f.write_str(s.trim()),
            TagValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            TagValue::Sequence(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
        }
    }
}

// =============================================================================
// METADATA MAP
// =============================================================================

/// Ordered tag-name → value mapping.
///
/// Iteration order is insertion order. Inserting an existing name replaces
/// the value in place (last write wins, position kept).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataMap {
    entries: Vec<(String, TagValue)>,
}

impl MetadataMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, returning the previous value if the name was present.
    pub fn insert(&mut self, name: impl Into<String>, value: TagValue) -> Option<TagValue> {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Entries whose name satisfies `keep`, order preserved.
    pub fn filter(&self, keep: impl Fn(&str) -> bool) -> MetadataMap {
        MetadataMap {
            entries: self
                .entries
                .iter()
                .filter(|(n, _)| keep(n))
                .cloned()
                .collect(),
        }
    }
}

impl FromIterator<(String, TagValue)> for MetadataMap {
    fn from_iter<I: IntoIterator<Item = (String, TagValue)>>(iter: I) -> Self {
        let mut map = MetadataMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl Serialize for MetadataMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MetadataMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MetadataMapVisitor;

        impl<'de> Visitor<'de> for MetadataMapVisitor {
            type Value = MetadataMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of tag names to tag values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<MetadataMap, A::Error> {
                let mut map = MetadataMap::new();
                while let Some((name, value)) = access.next_entry::<String, TagValue>()? {
                    map.insert(name, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(MetadataMapVisitor)
    }
}

// =============================================================================
// GEOLOCATION
// =============================================================================

/// Signed decimal-degree coordinate (negative = South/West).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// OpenStreetMap link centred on the coordinate.
    ///
    /// # Example
    /// ```
    /// use geotrace_core::GpsCoordinate;
    ///
    /// let c = GpsCoordinate::new(48.8584, 2.2945);
    /// assert_eq!(
    ///     c.map_url(),
    ///     "https://www.openstreetmap.org/?mlat=48.858400&mlon=2.294500#map=15/48.858400/2.294500"
    /// );
    /// ```
    pub fn map_url(&self) -> String {
        let p = defaults::COORDINATE_PRECISION;
        format!(
            "https://www.openstreetmap.org/?mlat={lat:.p$}&mlon={lon:.p$}#map={z}/{lat:.p$}/{lon:.p$}",
            lat = self.latitude,
            lon = self.longitude,
            z = defaults::MAP_LINK_ZOOM,
            p = p,
        )
    }
}

impl fmt::Display for GpsCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = defaults::COORDINATE_PRECISION;
        write!(f, "{:.p$}, {:.p$}", self.latitude, self.longitude, p = p)
    }
}

// =============================================================================
// DIGESTS
// =============================================================================

/// Lowercase hex digests over the exact file content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileDigestSet {
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
}

impl FileDigestSet {
    /// Compare against another digest set, ignoring hex case.
    pub fn matches(&self, other: &FileDigestSet) -> bool {
        self.md5.eq_ignore_ascii_case(&other.md5)
            && self.sha1.eq_ignore_ascii_case(&other.sha1)
            && self.sha256.eq_ignore_ascii_case(&other.sha256)
    }

    /// `(label, digest)` pairs in display order.
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [
            ("MD5", self.md5.as_str()),
            ("SHA1", self.sha1.as_str()),
            ("SHA256", self.sha256.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_utf8_becomes_text() {
        assert_eq!(
            TagValue::from_bytes(b"0231".to_vec()),
            TagValue::Text("0231".to_string())
        );
    }

    #[test]
    fn test_from_bytes_strips_nul_padding() {
        assert_eq!(
            TagValue::from_bytes(b"Canon\0\0".to_vec()),
            TagValue::Text("Canon".to_string())
        );
    }

    #[test]
    fn test_from_bytes_invalid_utf8_kept_raw() {
        let raw = vec![0xFF, 0xFE, 0x00, 0x81];
        assert_eq!(TagValue::from_bytes(raw.clone()), TagValue::Bytes(raw));
    }

    #[test]
    fn test_from_components_collapses_single() {
        assert_eq!(
            TagValue::from_components(vec![TagValue::Integer(6)]),
            TagValue::Integer(6)
        );
        assert_eq!(
            TagValue::from_components(vec![TagValue::Integer(1), TagValue::Integer(2)]),
            TagValue::Sequence(vec![TagValue::Integer(1), TagValue::Integer(2)])
        );
    }

    #[test]
    fn test_rational_zero_denominator() {
        assert_eq!(Rational::new(1, 0).to_f64(), None);
        assert_eq!(Rational::new(1, 0).to_string(), "1/0");
        assert_eq!(Rational::new(28, 10).to_string(), "2.8");
    }

    #[test]
    fn test_tag_value_display() {
        let dms = TagValue::Sequence(vec![
            TagValue::Rational(Rational::new(40, 1)),
            TagValue::Rational(Rational::new(26, 1)),
            TagValue::Rational(Rational::new(46302, 1000)),
        ]);
        assert_eq!(dms.to_string(), "(40, 26, 46.302)");
        assert_eq!(TagValue::Bytes(vec![0xde, 0xad]).to_string(), "0xdead");
    }

    #[test]
    fn test_bytes_serialize_as_hex() {
        let json = serde_json::to_value(TagValue::Bytes(vec![0x01, 0xab])).unwrap();
        assert_eq!(json, serde_json::json!({"type": "bytes", "value": "01ab"}));

        let back: TagValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, TagValue::Bytes(vec![0x01, 0xab]));
    }

    #[test]
    fn test_metadata_map_last_write_wins_keeps_position() {
        let mut map = MetadataMap::new();
        map.insert("Make", TagValue::Text("A".into()));
        map.insert("Model", TagValue::Text("B".into()));
        let prev = map.insert("Make", TagValue::Text("C".into()));

        assert_eq!(prev, Some(TagValue::Text("A".into())));
        assert_eq!(map.len(), 2);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["Make", "Model"]);
        assert_eq!(map.get("Make"), Some(&TagValue::Text("C".into())));
    }

    #[test]
    fn test_metadata_map_serializes_in_order() {
        let map: MetadataMap = vec![
            ("Zeta".to_string(), TagValue::Integer(1)),
            ("Alpha".to_string(), TagValue::Integer(2)),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&map).unwrap();
        assert!(json.find("Zeta").unwrap() < json.find("Alpha").unwrap());

        let back: MetadataMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_metadata_map_filter() {
        let map: MetadataMap = vec![
            ("Make".to_string(), TagValue::Text("X".into())),
            ("GPSLatitudeRef".to_string(), TagValue::Text("N".into())),
        ]
        .into_iter()
        .collect();
        let gps = map.filter(|n| n.starts_with("GPS"));
        assert_eq!(gps.len(), 1);
        assert!(gps.contains_key("GPSLatitudeRef"));
    }

    #[test]
    fn test_coordinate_display_precision() {
        let c = GpsCoordinate::new(40.446195277777776, -79.94886194444445);
        assert_eq!(c.to_string(), "40.446195, -79.948862");
    }

    #[test]
    fn test_digest_matches_ignores_case() {
        let a = FileDigestSet {
            md5: "ABCD".into(),
            sha1: "ef01".into(),
            sha256: "2345".into(),
        };
        let b = FileDigestSet {
            md5: "abcd".into(),
            sha1: "EF01".into(),
            sha256: "2345".into(),
        };
        assert!(a.matches(&b));
    }
}
