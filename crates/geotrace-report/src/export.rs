//! Structured (JSON) export of a forensic report.

use std::fs;
use std::path::Path;

use tracing::info;

use geotrace_core::{Error, ForensicReport, Result};

use crate::text;

/// Output format for a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Text,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Text => "text",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            other => Err(Error::Config(format!("unknown export format: {}", other))),
        }
    }
}

/// Compact JSON.
pub fn to_json(report: &ForensicReport) -> Result<String> {
    Ok(serde_json::to_string(report)?)
}

/// Indented JSON, as written to export files.
pub fn to_json_pretty(report: &ForensicReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Parse a report previously written by [`to_json`] or [`to_json_pretty`].
pub fn from_json(json: &str) -> Result<ForensicReport> {
    Ok(serde_json::from_str(json)?)
}

/// Render `report` in `format`.
pub fn render(report: &ForensicReport, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => to_json_pretty(report),
        ExportFormat::Text => Ok(text::render(report)),
    }
}

/// Render `report` in `format` and write it to `path`.
pub fn write_to(report: &ForensicReport, format: ExportFormat, path: &Path) -> Result<()> {
    let rendered = render(report, format)?;
    fs::write(path, rendered).map_err(|e| Error::FileAccess {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!(
        output = %path.display(),
        format = format.as_str(),
        "Report exported"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("TXT".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert!(matches!(
            "xml".parse::<ExportFormat>(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = from_json("{\"analysis_info\": 5}").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
