//! Flat-text rendering of a forensic report.
//!
//! Sections appear in a fixed order: header, file summary, cryptographic
//! hashes, image properties, geolocation, device information, diagnostics
//! (only when present) and conclusions.

use std::fmt;

use chrono::{DateTime, Utc};

use geotrace_core::defaults::NOT_AVAILABLE;
use geotrace_core::{ForensicReport, GeocodeOutcome, MetadataStatus, Severity};

const RULE: &str = "============================================================";
const SUB_RULE: &str = "------------------------------------------------------------";

pub const TITLE: &str = "GEOTRACE FORENSIC REPORT";

/// Section headers in output order.
pub const SECTIONS: &[&str] = &[
    "FILE SUMMARY",
    "CRYPTOGRAPHIC HASHES",
    "IMAGE PROPERTIES",
    "GEOLOCATION",
    "DEVICE INFORMATION",
    "DIAGNOSTICS",
    "CONCLUSIONS",
];

/// Render `report` as plain text.
pub fn render(report: &ForensicReport) -> String {
    TextReport(report).to_string()
}

/// [`fmt::Display`] adapter producing the flat-text report.
pub struct TextReport<'a>(pub &'a ForensicReport);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let info = report.analysis_info();

        writeln!(f, "{}", RULE)?;
        writeln!(f, "{}", TITLE)?;
        writeln!(f, "{}", RULE)?;
        field(f, "Analysis time", &timestamp(&info.timestamp))?;
        field(f, "Analyzer", &info.analyzer)?;
        field(f, "System", &info.system)?;

        section(f, "FILE SUMMARY")?;
        let file = report.file();
        field(f, "Name", &file.name)?;
        field(f, "Path", &file.path.display().to_string())?;
        field(f, "Size", &format!("{} bytes", file.size))?;
        field(f, "Created", &optional_time(file.created))?;
        field(f, "Modified", &optional_time(file.modified))?;
        field(f, "Accessed", &optional_time(file.accessed))?;

        section(f, "CRYPTOGRAPHIC HASHES")?;
        for (label, digest) in report.hashes().entries() {
            field(f, label, digest)?;
        }

        section(f, "IMAGE PROPERTIES")?;
        match &report.evidence().image {
            Some(image) => {
                field(f, "Format", image.format.as_deref().unwrap_or(NOT_AVAILABLE))?;
                field(f, "MIME type", image.mime_type.as_deref().unwrap_or(NOT_AVAILABLE))?;
                field(f, "Dimensions", &format!("{} x {}", image.width, image.height))?;
                field(f, "Color mode", &image.color_mode)?;
                if !image.info.is_empty() {
                    writeln!(f, "Additional information:")?;
                    for (key, value) in &image.info {
                        writeln!(f, "  {}: {}", key, value)?;
                    }
                }
            }
            None => writeln!(f, "Image properties {}", NOT_AVAILABLE)?,
        }
        field(f, "EXIF tags", &report.metadata().len().to_string())?;

        section(f, "GEOLOCATION")?;
        write_geolocation(f, report)?;

        section(f, "DEVICE INFORMATION")?;
        let device = report.device();
        let rows = [
            ("Make", &device.make),
            ("Model", &device.model),
            ("Software", &device.software),
            ("Date taken", &device.datetime_original),
            ("Date digitized", &device.datetime_digitized),
            ("ISO", &device.iso),
            ("Aperture", &device.aperture),
            ("Exposure time", &device.exposure_time),
            ("Focal length", &device.focal_length),
        ];
        for (label, value) in rows {
            field(f, label, value.as_deref().unwrap_or(NOT_AVAILABLE))?;
        }

        if !report.diagnostics().is_empty() {
            section(f, "DIAGNOSTICS")?;
            for d in report.diagnostics() {
                let level = match d.severity {
                    Severity::Info => "info",
                    Severity::Warning => "warning",
                };
                writeln!(f, "[{}] {}: {}", level, d.stage, d.message)?;
            }
        }

        section(f, "CONCLUSIONS")?;
        for line in conclusions(report) {
            writeln!(f, "- {}", line)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", RULE)
    }
}

fn write_geolocation(f: &mut fmt::Formatter<'_>, report: &ForensicReport) -> fmt::Result {
    let Some(coordinate) = report.coordinate() else {
        writeln!(f, "No GPS data found")?;
        return Ok(());
    };

    let p = geotrace_core::defaults::COORDINATE_PRECISION;
    field(f, "Latitude", &format!("{:.p$}", coordinate.latitude, p = p))?;
    field(f, "Longitude", &format!("{:.p$}", coordinate.longitude, p = p))?;

    let address = match (report.address(), report.geocode_outcome()) {
        (Some(a), _) => a.to_string(),
        (None, GeocodeOutcome::Disabled) => format!("{} (lookup disabled)", NOT_AVAILABLE),
        (None, GeocodeOutcome::NotFound) => format!("{} (no address found)", NOT_AVAILABLE),
        (None, GeocodeOutcome::Unavailable) => format!("{} (lookup unavailable)", NOT_AVAILABLE),
        (None, _) => NOT_AVAILABLE.to_string(),
    };
    field(f, "Address", &address)?;
    field(f, "Map", &coordinate.map_url())?;

    let gps_tags = report.gps_tags();
    if !gps_tags.is_empty() {
        writeln!(f)?;
        writeln!(f, "GPS tags:")?;
        for (name, value) in gps_tags.iter() {
            writeln!(f, "  {}: {}", name, value)?;
        }
    }
    Ok(())
}

/// Summary lines for the conclusions section.
pub fn conclusions(report: &ForensicReport) -> Vec<String> {
    let evidence = report.evidence();
    let mut lines = Vec::with_capacity(4);

    lines.push(match evidence.exif_status {
        MetadataStatus::Present => format!(
            "EXIF analysis completed: {} tags extracted",
            report.metadata().len()
        ),
        MetadataStatus::Absent => "EXIF analysis completed: no metadata block present".to_string(),
        MetadataStatus::Failed => "EXIF analysis failed: metadata could not be parsed".to_string(),
    });

    lines.push(match (report.coordinate(), report.geocode_outcome()) {
        (None, _) => "No geolocation data found".to_string(),
        (Some(c), GeocodeOutcome::Resolved) => {
            format!("Geolocation extracted ({}) and address resolved", c)
        }
        (Some(c), GeocodeOutcome::Unavailable) => {
            format!("Geolocation extracted ({}), address lookup failed", c)
        }
        (Some(c), _) => format!("Geolocation extracted ({})", c),
    });

    let device = report.device();
    lines.push(if device.is_identified() {
        let name = [device.make.as_deref(), device.model.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        format!("Device identified: {}", name)
    } else {
        "Limited device information".to_string()
    });

    lines.push("File integrity hashes computed (MD5, SHA1, SHA256)".to_string());
    lines
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", SUB_RULE)
}

fn field(f: &mut fmt::Formatter<'_>, label: &str, value: &str) -> fmt::Result {
    writeln!(f, "{:<16}{}", format!("{}:", label), value)
}

fn timestamp(t: &DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn optional_time(t: Option<DateTime<Utc>>) -> String {
    t.as_ref().map(timestamp).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
