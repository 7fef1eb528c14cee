//! Mock reverse geocoder for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geotrace_geocode::mock::MockGeocoder;
//!
//! let geocoder = MockGeocoder::new()
//!     .with_address("Forbes Avenue, Pittsburgh, PA, USA")
//!     .with_latency_ms(5);
//! assert_eq!(geocoder.call_count(), 0);
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use geotrace_core::{GeocodeError, GpsCoordinate, ReverseGeocoder};

/// What the mock answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    Address(String),
    NotFound,
    Unavailable(String),
}

/// Mock reverse geocoder that records every lookup.
#[derive(Debug, Clone)]
pub struct MockGeocoder {
    response: MockResponse,
    latency_ms: u64,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockCall {
    pub coordinate: GpsCoordinate,
    pub timeout: Duration,
}

impl MockGeocoder {
    /// Resolves every coordinate to "Mock Address".
    pub fn new() -> Self {
        Self {
            response: MockResponse::Address("Mock Address".to_string()),
            latency_ms: 0,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.response = MockResponse::Address(address.into());
        self
    }

    /// Answer every lookup with "no address found".
    pub fn not_found(mut self) -> Self {
        self.response = MockResponse::NotFound;
        self
    }

    /// Fail every lookup as if the service were unreachable.
    pub fn unavailable(mut self, reason: impl Into<String>) -> Self {
        self.response = MockResponse::Unavailable(reason.into());
        self
    }

    /// Delay each answer, e.g. to exercise caller-side timeouts.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

impl Default for MockGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReverseGeocoder for MockGeocoder {
    async fn reverse_geocode(
        &self,
        coordinate: GpsCoordinate,
        timeout: Duration,
    ) -> Result<String, GeocodeError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                coordinate,
                timeout,
            });
        }

        if self.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.latency_ms)).await;
        }

        match &self.response {
            MockResponse::Address(a) => Ok(a.clone()),
            MockResponse::NotFound => Err(GeocodeError::NotFound),
            MockResponse::Unavailable(reason) => Err(GeocodeError::Unavailable(reason.clone())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_address() {
        let geocoder = MockGeocoder::new().with_address("Test Street 1");
        let coord = GpsCoordinate::new(1.0, 2.0);
        let result = geocoder
            .reverse_geocode(coord, Duration::from_secs(1))
            .await;

        assert_eq!(result.unwrap(), "Test Street 1");
        assert_eq!(geocoder.call_count(), 1);
        assert_eq!(geocoder.calls()[0].coordinate, coord);
        assert_eq!(geocoder.calls()[0].timeout, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_mock_failures() {
        let coord = GpsCoordinate::new(0.0, 0.0);
        let not_found = MockGeocoder::new().not_found();
        assert_eq!(
            not_found
                .reverse_geocode(coord, Duration::from_secs(1))
                .await,
            Err(GeocodeError::NotFound)
        );

        let down = MockGeocoder::new().unavailable("connection refused");
        assert!(matches!(
            down.reverse_geocode(coord, Duration::from_secs(1)).await,
            Err(GeocodeError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_clones_share_call_log() {
        let geocoder = MockGeocoder::new();
        let clone = geocoder.clone();
        clone
            .reverse_geocode(GpsCoordinate::new(0.0, 0.0), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(geocoder.call_count(), 1);
    }
}
