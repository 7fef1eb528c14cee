//! Structured and flat-text exports of built reports.

use std::io::Write;
use std::sync::Arc;

use geotrace_core::fixtures::{ExifFixture, FixtureValue};
use geotrace_core::TagValue;
use geotrace_geocode::mock::MockGeocoder;
use geotrace_report::{export, text, ExportFormat, ForensicReport, ReportBuilder};
use tempfile::NamedTempFile;

async fn gps_report() -> (NamedTempFile, ForensicReport) {
    let fixture = ExifFixture::pittsburgh().exif(0x9286, FixtureValue::Undefined(vec![0xFF, 0xFE, 0x00, 0x81]));
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&fixture.to_jpeg()).unwrap();
    file.flush().unwrap();

    let report = ReportBuilder::new()
        .with_geocoder(Arc::new(MockGeocoder::new().with_address("Schenley Park, Pittsburgh")))
        .build(file.path())
        .await
        .unwrap();
    (file, report)
}

#[tokio::test]
async fn test_json_round_trip_preserves_report() {
    let (_file, report) = gps_report().await;

    let json = export::to_json(&report).unwrap();
    let parsed = export::from_json(&json).unwrap();

    assert_eq!(parsed, report);
    assert_eq!(parsed.hashes(), report.hashes());
    assert_eq!(
        parsed.coordinate().unwrap().latitude.to_bits(),
        report.coordinate().unwrap().latitude.to_bits()
    );
    assert_eq!(
        parsed.coordinate().unwrap().longitude.to_bits(),
        report.coordinate().unwrap().longitude.to_bits()
    );
    assert_eq!(
        parsed.analysis_info().timestamp,
        report.analysis_info().timestamp
    );
    assert_eq!(parsed.file().modified, report.file().modified);
}

#[tokio::test]
async fn test_json_shape_has_stable_keys() {
    let (_file, report) = gps_report().await;

    let value: serde_json::Value =
        serde_json::from_str(&export::to_json_pretty(&report).unwrap()).unwrap();

    let info = &value["analysis_info"];
    assert!(info["timestamp"].is_string());
    assert!(info["analyzer"].as_str().unwrap().starts_with("geotrace v"));
    assert!(info["system"].is_string());

    let metadata = &value["metadata"];
    assert!(metadata["file_info"]["size"].is_u64());
    assert_eq!(metadata["hashes"]["sha256"].as_str().unwrap().len(), 64);
    assert_eq!(metadata["exif_status"], "present");
    assert_eq!(metadata["geocode"], "resolved");
    assert_eq!(metadata["address"], "Schenley Park, Pittsburgh");
    assert!(metadata["coordinates"]["latitude"].is_f64());
    assert!(metadata["map_url"].as_str().unwrap().contains("#map=15/"));
    assert_eq!(metadata["exif"]["Make"]["type"], "text");
    assert_eq!(metadata["exif"]["Make"]["value"], "Canon");
}

#[tokio::test]
async fn test_undecodable_bytes_exported_as_hex() {
    let (_file, report) = gps_report().await;

    assert_eq!(
        report.metadata().get("UserComment"),
        Some(&TagValue::Bytes(vec![0xFF, 0xFE, 0x00, 0x81]))
    );

    let value: serde_json::Value =
        serde_json::from_str(&export::to_json(&report).unwrap()).unwrap();
    assert_eq!(value["metadata"]["exif"]["UserComment"]["type"], "bytes");
    assert_eq!(value["metadata"]["exif"]["UserComment"]["value"], "fffe0081");
}

#[tokio::test]
async fn test_text_sections_in_order() {
    let (_file, report) = gps_report().await;
    let rendered = text::render(&report);

    let mut last = 0;
    for header in text::SECTIONS {
        let pos = rendered
            .find(&format!("\n{}\n", header))
            .unwrap_or_else(|| panic!("missing section {}", header));
        assert!(pos > last, "section {} out of order", header);
        last = pos;
    }

    assert!(rendered.starts_with("===="));
    assert!(rendered.contains(text::TITLE));
    assert!(rendered.contains(&report.hashes().sha256));
    assert!(rendered.contains("Schenley Park, Pittsburgh"));
    assert!(rendered.contains("Device identified: Canon EOS 5D Mark IV"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_json_export_of_non_utf8_file_name() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(OsStr::from_bytes(b"IMG_\xff\xfe.jpg"));
    std::fs::write(&path, ExifFixture::pittsburgh().to_jpeg()).unwrap();

    let report = ReportBuilder::new().build(&path).await.unwrap();
    let json = export::to_json(&report).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let exported = value["metadata"]["file_info"]["path"].as_str().unwrap();
    assert!(exported.ends_with("IMG_\u{FFFD}\u{FFFD}.jpg"));

    let parsed = export::from_json(&json).unwrap();
    assert_eq!(parsed.hashes(), report.hashes());
    assert_eq!(parsed.coordinate(), report.coordinate());
    assert_eq!(parsed.file().name, report.file().name);
    assert_eq!(parsed.file().modified, report.file().modified);

    let txt = dir.path().join("report.txt");
    export::write_to(&report, ExportFormat::Text, &txt).unwrap();
    assert!(std::fs::read_to_string(&txt).unwrap().contains("IMG_"));
}

#[tokio::test]
async fn test_write_exports_to_disk() {
    let (_file, report) = gps_report().await;
    let dir = tempfile::tempdir().unwrap();

    let json_path = dir.path().join("report.json");
    let txt_path = dir.path().join("report.txt");
    export::write_to(&report, ExportFormat::Json, &json_path).unwrap();
    export::write_to(&report, ExportFormat::Text, &txt_path).unwrap();

    let json = std::fs::read_to_string(&json_path).unwrap();
    assert_eq!(export::from_json(&json).unwrap(), report);

    let txt = std::fs::read_to_string(&txt_path).unwrap();
    assert_eq!(txt, text::render(&report));
}
