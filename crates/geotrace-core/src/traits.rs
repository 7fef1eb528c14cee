//! Collaborator traits consumed by the report pipeline.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::GeocodeError;
use crate::models::GpsCoordinate;

/// Resolves a coordinate to a human-readable place name.
///
/// Implementations make a single best-effort attempt bounded by `timeout`;
/// they never retry.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse_geocode(
        &self,
        coordinate: GpsCoordinate,
        timeout: Duration,
    ) -> std::result::Result<String, GeocodeError>;

    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;
}
