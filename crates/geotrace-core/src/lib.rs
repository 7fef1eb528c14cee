//! # geotrace-core
//!
//! Core types and evidence-gathering stages for geotrace.
//!
//! This crate turns an image file into raw evidence: the flat EXIF/GPS tag
//! map, a resolved GPS coordinate, image header properties, a device
//! profile and integrity digests. Report assembly lives in
//! `geotrace-report`; reverse geocoding lives in `geotrace-geocode`.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Fatal stage failure, report not produced |
//! | WARN  | Recoverable stage failure, recorded as a report diagnostic |
//! | INFO  | Analysis start/completion, exports written |
//! | DEBUG | Stage decisions, intermediate values, config choices |
//! | TRACE | Per-tag iteration |

pub mod coordinates;
pub mod defaults;
pub mod device;
pub mod error;
pub mod exif;
pub mod hashing;
pub mod image_info;
pub mod models;
pub mod report;
pub mod tags;
pub mod traits;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

// Re-export commonly used types at crate root
pub use coordinates::resolve;
pub use device::DeviceProfile;
pub use error::{Error, GeocodeError, Result};
pub use self::exif::MetadataStatus;
pub use hashing::{hash_bytes, hash_file, verify_file};
pub use image_info::ImageProperties;
pub use models::*;
pub use report::{
    AnalysisInfo, Diagnostic, EvidenceRecord, FileIdentity, ForensicReport, GeocodeOutcome,
    Severity, Stage,
};
pub use tags::TagTable;
pub use traits::ReverseGeocoder;
