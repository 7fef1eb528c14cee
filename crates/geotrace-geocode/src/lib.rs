//! # geotrace-geocode
//!
//! Reverse geocoding for geotrace.
//!
//! This crate provides:
//! - [`GeocodeConfig`]: environment-driven client configuration
//! - [`NominatimClient`]: a [`ReverseGeocoder`] for Nominatim-compatible `/reverse` endpoints
//!
//! Lookups are single best-effort attempts. A failure never aborts an
//! analysis; callers record it and carry on without an address.
//!
//! # Feature Flags
//!
//! - `mock`: Enables [`mock::MockGeocoder`] for deterministic tests
//!
//! # Example
//!
//! ```rust,no_run
//! use geotrace_core::{GpsCoordinate, ReverseGeocoder};
//! use geotrace_geocode::{GeocodeConfig, NominatimClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GeocodeConfig::from_env()?;
//! let client = NominatimClient::new(&config)?;
//! let address = client
//!     .reverse_geocode(GpsCoordinate::new(40.4462, -79.9489), config.timeout())
//!     .await?;
//! println!("{}", address);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod nominatim;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{ConfigError, ConfigResult, GeocodeConfig};
pub use nominatim::NominatimClient;

pub use geotrace_core::{GeocodeError, ReverseGeocoder};
