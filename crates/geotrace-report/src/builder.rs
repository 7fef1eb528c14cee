//! Report pipeline: stat, extract, inspect, resolve, geocode, hash, assemble.
//!
//! Stat and hashing are mandatory and abort the build on failure. Every other
//! stage is best-effort: its failure becomes a [`Diagnostic`] on the report
//! and the pipeline moves on.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, instrument, warn};

use geotrace_core::exif::{self, MetadataStatus};
use geotrace_core::{
    coordinates, defaults, hashing, image_info, AnalysisInfo, DeviceProfile, Diagnostic, Error,
    EvidenceRecord, FileIdentity, ForensicReport, GeocodeError, GeocodeOutcome, GpsCoordinate,
    MetadataMap, Result, ReverseGeocoder, Stage,
};
use geotrace_geocode::{GeocodeConfig, NominatimClient};

use crate::cancel::CancelFlag;

/// Builds one [`ForensicReport`] per call to [`ReportBuilder::build`].
///
/// The builder holds configuration only; every build owns its own tag map,
/// digests and report, so a single builder can serve concurrent builds.
#[derive(Clone)]
pub struct ReportBuilder {
    geocoder: Option<Arc<dyn ReverseGeocoder>>,
    timeout: Duration,
    cancel: CancelFlag,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBuilder {
    /// A builder with reverse geocoding disabled.
    pub fn new() -> Self {
        Self {
            geocoder: None,
            timeout: Duration::from_secs(defaults::GEOCODE_TIMEOUT_SECS),
            cancel: CancelFlag::new(),
        }
    }

    /// A builder using a Nominatim client, or none when `config.enabled` is false.
    pub fn from_config(config: &GeocodeConfig) -> Result<Self> {
        let builder = Self::new().with_timeout(config.timeout());
        if !config.enabled {
            info!("Reverse geocoding disabled by configuration");
            return Ok(builder);
        }
        let client = NominatimClient::new(config)
            .map_err(|e| Error::Config(format!("geocoder: {}", e)))?;
        Ok(builder.with_geocoder(Arc::new(client)))
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Upper bound on a reverse-geocoding attempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn geocoding_enabled(&self) -> bool {
        self.geocoder.is_some()
    }

    /// Analyze the file at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::FileAccess`] if the file cannot be stat'ed
    /// - [`Error::HashComputation`] if its content cannot be read for hashing
    /// - [`Error::Cancelled`] if the cancel flag was raised at a stage boundary
    #[instrument(skip(self, path), fields(subsystem = "report", file_path = %path.as_ref().display()))]
    pub async fn build(&self, path: impl AsRef<Path>) -> Result<ForensicReport> {
        let path = path.as_ref();
        let start = Instant::now();
        info!("Starting analysis");

        let file_info = FileIdentity::stat(path).map_err(|e| {
            error!(error = %e, stage = %Stage::Stat, "Cannot stat evidence file");
            e
        })?;

        let mut diagnostics = Vec::new();

        self.checkpoint(Stage::Extraction)?;
        let (exif_status, exif) = extract_metadata(path, &mut diagnostics);

        let image = if file_info.size == 0 {
            diagnostics.push(Diagnostic::info(
                Stage::ImageProperties,
                "Empty file, no image header to read",
            ));
            None
        } else {
            match image_info::inspect(path) {
                Ok(props) => Some(props),
                Err(e) => {
                    warn!(error = %e, stage = %Stage::ImageProperties, "Image properties unavailable");
                    diagnostics.push(Diagnostic::warning(Stage::ImageProperties, e.to_string()));
                    None
                }
            }
        };

        self.checkpoint(Stage::Coordinates)?;
        let coordinate = coordinates::resolve(&exif);
        match &coordinate {
            Some(c) => debug!(latitude = c.latitude, longitude = c.longitude, "Resolved GPS position"),
            None => debug!("No resolvable GPS position"),
        }

        self.checkpoint(Stage::Geocode)?;
        let (address, geocode) = match coordinate {
            None => (None, GeocodeOutcome::NoGps),
            Some(c) => self.lookup_address(c, &mut diagnostics).await,
        };

        self.checkpoint(Stage::Hashing)?;
        let hashes = hashing::hash_file(path).map_err(|e| {
            error!(error = %e, stage = %Stage::Hashing, "Cannot hash evidence file");
            e
        })?;

        let device = DeviceProfile::from_metadata(&exif);
        let evidence = EvidenceRecord {
            file_info,
            hashes,
            image,
            exif_status,
            exif,
            map_url: coordinate.map(|c| c.map_url()),
            coordinates: coordinate,
            address,
            geocode,
            device,
            diagnostics,
        };
        let report = ForensicReport::new(AnalysisInfo::now(), evidence);

        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            tag_count = report.metadata().len(),
            has_gps = report.coordinate().is_some(),
            warnings = report.has_warnings(),
            "Analysis complete"
        );
        Ok(report)
    }

    fn checkpoint(&self, next: Stage) -> Result<()> {
        if self.cancel.is_cancelled() {
            info!(stage = %next, "Analysis cancelled");
            return Err(Error::Cancelled(next.to_string()));
        }
        Ok(())
    }

    async fn lookup_address(
        &self,
        coordinate: GpsCoordinate,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (Option<String>, GeocodeOutcome) {
        let Some(geocoder) = &self.geocoder else {
            diagnostics.push(Diagnostic::info(
                Stage::Geocode,
                "GPS present, reverse geocoding disabled",
            ));
            return (None, GeocodeOutcome::Disabled);
        };

        // The outer bound holds even if an implementation ignores its timeout.
        let attempt = tokio::time::timeout(
            self.timeout,
            geocoder.reverse_geocode(coordinate, self.timeout),
        )
        .await
        .unwrap_or_else(|_| {
            Err(GeocodeError::Unavailable(format!(
                "timed out after {} ms",
                self.timeout.as_millis()
            )))
        });

        match attempt {
            Ok(address) => {
                debug!(geocoder = geocoder.name(), "Address resolved");
                (Some(address), GeocodeOutcome::Resolved)
            }
            Err(GeocodeError::NotFound) => {
                warn!(geocoder = geocoder.name(), "No address for GPS position");
                diagnostics.push(Diagnostic::warning(
                    Stage::Geocode,
                    "GPS present, no address found for coordinates",
                ));
                (None, GeocodeOutcome::NotFound)
            }
            Err(e) => {
                warn!(geocoder = geocoder.name(), error = %e, "Reverse geocoding unavailable");
                diagnostics.push(Diagnostic::warning(
                    Stage::Geocode,
                    format!("GPS present, lookup unavailable: {}", e),
                ));
                (None, GeocodeOutcome::Unavailable)
            }
        }
    }
}

fn extract_metadata(path: &Path, diagnostics: &mut Vec<Diagnostic>) -> (MetadataStatus, MetadataMap) {
    match exif::extract(path) {
        Ok(map) if map.is_empty() => (MetadataStatus::Absent, map),
        Ok(map) => (MetadataStatus::Present, map),
        Err(e) => {
            warn!(error = %e, stage = %Stage::Extraction, "Metadata extraction failed");
            diagnostics.push(Diagnostic::warning(Stage::Extraction, e.to_string()));
            (MetadataStatus::Failed, MetadataMap::new())
        }
    }
}
