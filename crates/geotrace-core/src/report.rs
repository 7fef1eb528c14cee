//! The forensic report record and its parts.
//!
//! A [`ForensicReport`] is assembled once per analysis and exposes only
//! shared references afterwards; a new analysis produces a new report.
//! The serde shape is the structured export format:
//!
//! ```json
//! {
//!   "analysis_info": { "timestamp": "...", "analyzer": "...", "system": "..." },
//!   "metadata": { "file_info": {...}, "hashes": {...}, "exif": {...}, ... }
//! }
//! ```

use std::fmt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::device::DeviceProfile;
use crate::exif::MetadataStatus;
use crate::image_info::ImageProperties;
use crate::models::{FileDigestSet, GpsCoordinate, MetadataMap};
use crate::tags::is_gps_tag;
use crate::{defaults, Error, Result};

// =============================================================================
// ANALYSIS CONTEXT
// =============================================================================

/// Who produced the report, when, and on what host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisInfo {
    pub timestamp: DateTime<Utc>,
    pub analyzer: String,
    pub system: String,
}

impl AnalysisInfo {
    /// Stamp an analysis with the current time and this host's platform.
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            analyzer: analyzer_identity(),
            system: host_platform(),
        }
    }
}

/// "geotrace v<version>"
pub fn analyzer_identity() -> String {
    format!("{} v{}", defaults::ANALYZER_NAME, defaults::ANALYZER_VERSION)
}

/// Host operating system and its release, e.g. "linux 6.8.0-45-generic".
///
/// Falls back to the bare OS name when the release cannot be read.
pub fn host_platform() -> String {
    match sysinfo::System::kernel_version() {
        Some(release) if !release.trim().is_empty() => {
            format!("{} {}", std::env::consts::OS, release.trim())
        }
        _ => std::env::consts::OS.to_string(),
    }
}

// =============================================================================
// FILE IDENTITY
// =============================================================================

/// Filesystem identity of the evidence file at analysis time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIdentity {
    pub name: String,
    /// Exported as a string; non-UTF-8 bytes become U+FFFD
    #[serde(with = "lossy_path")]
    pub path: PathBuf,
    pub size: u64,
    /// Birth time where the filesystem records it, else inode change time
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
}

impl FileIdentity {
    /// Stat `path`. Failure is a fatal [`Error::FileAccess`].
    pub fn stat(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|e| Error::FileAccess {
            path: path.to_path_buf(),
            source: e,
        })?;
        if !meta.is_file() {
            return Err(Error::FileAccess {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a regular file",
                ),
            });
        }

        Ok(Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            size: meta.len(),
            created: created_time(&meta),
            modified: meta.modified().ok().map(to_utc),
            accessed: meta.accessed().ok().map(to_utc),
        })
    }
}

/// Paths are not guaranteed UTF-8, JSON strings are.
mod lossy_path {
    use std::path::{Path, PathBuf};

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&path.to_string_lossy())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PathBuf, D::Error> {
        String::deserialize(deserializer).map(PathBuf::from)
    }
}

fn to_utc(t: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(t)
}

#[cfg(unix)]
fn created_time(meta: &Metadata) -> Option<DateTime<Utc>> {
    use std::os::unix::fs::MetadataExt;

    meta.created()
        .ok()
        .map(to_utc)
        .or_else(|| DateTime::from_timestamp(meta.ctime(), meta.ctime_nsec() as u32))
}

#[cfg(not(unix))]
fn created_time(meta: &Metadata) -> Option<DateTime<Utc>> {
    meta.created().ok().map(to_utc)
}

// =============================================================================
// DIAGNOSTICS
// =============================================================================

/// Pipeline stage a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Stat,
    Extraction,
    ImageProperties,
    Coordinates,
    Geocode,
    Hashing,
    Assemble,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Stat => "stat",
            Stage::Extraction => "extraction",
            Stage::ImageProperties => "image_properties",
            Stage::Coordinates => "coordinates",
            Stage::Geocode => "geocode",
            Stage::Hashing => "hashing",
            Stage::Assemble => "assemble",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// A recovered stage failure or notable condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: Stage,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn info(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            severity: Severity::Info,
            message: message.into(),
        }
    }
}

/// How the address field came to be filled or empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodeOutcome {
    /// No resolvable GPS position, lookup not attempted
    NoGps,
    /// Lookup disabled by configuration
    Disabled,
    /// Address resolved
    Resolved,
    /// Service answered without a display name
    NotFound,
    /// Network failure, timeout, or bad response
    Unavailable,
}

// =============================================================================
// REPORT
// =============================================================================

/// The evidence gathered for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub file_info: FileIdentity,
    pub hashes: FileDigestSet,
    pub image: Option<ImageProperties>,
    pub exif_status: MetadataStatus,
    pub exif: MetadataMap,
    pub coordinates: Option<GpsCoordinate>,
    /// OpenStreetMap link for `coordinates`
    pub map_url: Option<String>,
    pub address: Option<String>,
    pub geocode: GeocodeOutcome,
    pub device: DeviceProfile,
    pub diagnostics: Vec<Diagnostic>,
}

/// Immutable result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForensicReport {
    analysis_info: AnalysisInfo,
    metadata: EvidenceRecord,
}

impl ForensicReport {
    pub fn new(analysis_info: AnalysisInfo, evidence: EvidenceRecord) -> Self {
        Self {
            analysis_info,
            metadata: evidence,
        }
    }

    pub fn analysis_info(&self) -> &AnalysisInfo {
        &self.analysis_info
    }

    pub fn evidence(&self) -> &EvidenceRecord {
        &self.metadata
    }

    pub fn file(&self) -> &FileIdentity {
        &self.metadata.file_info
    }

    pub fn hashes(&self) -> &FileDigestSet {
        &self.metadata.hashes
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata.exif
    }

    pub fn coordinate(&self) -> Option<&GpsCoordinate> {
        self.metadata.coordinates.as_ref()
    }

    pub fn address(&self) -> Option<&str> {
        self.metadata.address.as_deref()
    }

    pub fn geocode_outcome(&self) -> GeocodeOutcome {
        self.metadata.geocode
    }

    pub fn device(&self) -> &DeviceProfile {
        &self.metadata.device
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.metadata.diagnostics
    }

    /// The raw GPS sub-tags, in container order.
    pub fn gps_tags(&self) -> MetadataMap {
        self.metadata.exif.filter(is_gps_tag)
    }

    /// Whether any stage recorded a warning.
    pub fn has_warnings(&self) -> bool {
        self.metadata
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_stat_regular_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"12345").unwrap();
        file.flush().unwrap();

        let id = FileIdentity::stat(file.path()).unwrap();
        assert_eq!(id.size, 5);
        assert_eq!(id.path, file.path());
        assert!(!id.name.is_empty());
        assert!(id.modified.is_some());
    }

    #[test]
    fn test_stat_missing_file() {
        let err = FileIdentity::stat(Path::new("/nonexistent/evidence.jpg")).unwrap_err();
        assert!(matches!(err, Error::FileAccess { .. }));
    }

    #[test]
    fn test_stat_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileIdentity::stat(dir.path()).unwrap_err();
        assert!(matches!(err, Error::FileAccess { .. }));
    }

    #[test]
    fn test_analysis_info_identity() {
        let info = AnalysisInfo::now();
        assert!(info.analyzer.starts_with("geotrace v"));
        assert!(info.system.starts_with(std::env::consts::OS));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_host_platform_includes_release() {
        let release = sysinfo::System::kernel_version().unwrap();
        assert_eq!(host_platform(), format!("linux {}", release.trim()));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_serializes_as_string() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"IMG_\xff\xfe.jpg"));
        std::fs::write(&path, b"12345").unwrap();

        let id = FileIdentity::stat(&path).unwrap();
        let json = serde_json::to_value(&id).unwrap();
        let exported = json["path"].as_str().unwrap();
        assert!(exported.ends_with("IMG_\u{FFFD}\u{FFFD}.jpg"));
        assert_eq!(json["name"], "IMG_\u{FFFD}\u{FFFD}.jpg");

        let back: FileIdentity = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back.path, PathBuf::from(exported));
        assert_eq!(back.size, 5);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let json = serde_json::to_string(&Stage::ImageProperties).unwrap();
        assert_eq!(json, "\"image_properties\"");
        assert_eq!(Stage::ImageProperties.as_str(), "image_properties");
    }

    #[test]
    fn test_geocode_outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&GeocodeOutcome::NoGps).unwrap(),
            "\"no_gps\""
        );
        assert_eq!(
            serde_json::to_string(&GeocodeOutcome::Unavailable).unwrap(),
            "\"unavailable\""
        );
    }
}
