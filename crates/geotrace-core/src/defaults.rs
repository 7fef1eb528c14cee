//! Centralized default constants for geotrace.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates and the CLI should reference these constants instead of defining
//! their own magic numbers.

// =============================================================================
// ANALYZER IDENTITY
// =============================================================================

/// Analyzer name written into every report.
pub const ANALYZER_NAME: &str = "geotrace";

/// Analyzer version written into every report.
pub const ANALYZER_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// REVERSE GEOCODING
// =============================================================================

/// Default reverse-geocoding endpoint (Nominatim-compatible).
pub const GEOCODE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// Detail level requested from the geocoder (18 = building).
pub const GEOCODE_ZOOM: u8 = 18;

/// Request the structured address breakdown alongside `display_name`.
pub const GEOCODE_ADDRESS_DETAILS: u8 = 1;

/// Timeout for a single reverse-geocoding request (seconds).
pub const GEOCODE_TIMEOUT_SECS: u64 = 10;

/// Client identifier sent as `User-Agent`; public Nominatim rejects anonymous clients.
pub const USER_AGENT: &str = concat!("geotrace/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// PRESENTATION
// =============================================================================

/// Decimal places used when displaying coordinates.
pub const COORDINATE_PRECISION: usize = 6;

/// Zoom level used for generated map links.
pub const MAP_LINK_ZOOM: u8 = 15;

/// Placeholder for values missing from the evidence.
pub const NOT_AVAILABLE: &str = "not available";

// =============================================================================
// I/O
// =============================================================================

/// Read buffer size for streaming hash computation.
pub const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Bytes sniffed from the head of a file for magic-number detection.
pub const SNIFF_LEN: usize = 8192;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_identifies_client() {
        assert!(USER_AGENT.starts_with("geotrace/"));
        assert_eq!(USER_AGENT, format!("{}/{}", ANALYZER_NAME, ANALYZER_VERSION));
    }

    #[test]
    fn test_geocode_defaults() {
        assert!(GEOCODE_URL.starts_with("https://"));
        assert_eq!(GEOCODE_ZOOM, 18);
        assert_eq!(GEOCODE_TIMEOUT_SECS, 10);
    }
}
