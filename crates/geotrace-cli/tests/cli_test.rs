//! End-to-end tests of the `geotrace` binary.

use std::path::Path;
use std::process::{Command, Output};

use geotrace_core::fixtures::{ExifFixture, TINY_GIF};

fn geotrace(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_geotrace"))
        .args(args)
        .env("RUST_LOG", "off")
        .env_remove("LOG_FILE")
        .env("GEOTRACE_GEOCODE_ENABLED", "false")
        .output()
        .expect("failed to run geotrace")
}

fn write(dir: &Path, name: &str, bytes: &[u8]) -> String {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_analyze_prints_text_report() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write(dir.path(), "gps.jpg", &ExifFixture::pittsburgh().to_jpeg());

    let out = geotrace(&["analyze", &photo, "--no-geocode"]);

    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("GEOTRACE FORENSIC REPORT"));
    assert!(stdout.contains("Latitude:       40.446195"));
    assert!(stdout.contains("not available (lookup disabled)"));
}

#[test]
fn test_batch_exports_and_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write(dir.path(), "gps.jpg", &ExifFixture::pittsburgh().to_jpeg());
    let gif = write(dir.path(), "plain.gif", TINY_GIF);
    let missing = dir.path().join("missing.jpg").to_string_lossy().into_owned();
    let reports = dir.path().join("reports");
    let reports_arg = reports.to_string_lossy().into_owned();

    let out = geotrace(&[
        "analyze", &photo, &missing, &gif, "--quiet", "--json", &reports_arg,
    ]);

    // One file failed, the others were still analyzed
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("missing.jpg"));
    assert!(reports.join("gps.jpg.json").is_file());
    assert!(reports.join("plain.gif.json").is_file());
    assert!(!reports.join("missing.jpg.json").exists());
}

#[test]
fn test_batch_keeps_reports_for_same_file_name() {
    let dir = tempfile::tempdir().unwrap();
    for sub in ["a", "b"] {
        std::fs::create_dir(dir.path().join(sub)).unwrap();
    }
    let first = write(&dir.path().join("a"), "IMG.jpg", &ExifFixture::pittsburgh().to_jpeg());
    let second = write(&dir.path().join("b"), "IMG.jpg", &ExifFixture::camera_only().to_jpeg());
    let reports = dir.path().join("reports");
    let reports_arg = reports.to_string_lossy().into_owned();

    let out = geotrace(&["analyze", &first, &second, "--quiet", "--json", &reports_arg]);

    assert!(out.status.success());
    let mut files: Vec<String> = std::fs::read_dir(&reports)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, ["IMG.jpg-2.json", "IMG.jpg.json"]);

    let json = |name: &str| std::fs::read_to_string(reports.join(name)).unwrap();
    assert!(json("IMG.jpg.json").contains(&first));
    assert!(json("IMG.jpg-2.json").contains(&second));
}

#[test]
fn test_export_failure_does_not_stop_batch() {
    let dir = tempfile::tempdir().unwrap();
    let one = write(dir.path(), "one.jpg", &ExifFixture::pittsburgh().to_jpeg());
    let two = write(dir.path(), "two.jpg", &ExifFixture::pittsburgh().to_jpeg());
    let reports = dir.path().join("reports");
    // A directory where the first report file should go
    std::fs::create_dir_all(reports.join("one.jpg.json")).unwrap();
    let reports_arg = reports.to_string_lossy().into_owned();

    let out = geotrace(&["analyze", &one, &two, "--quiet", "--json", &reports_arg]);

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("one.jpg.json"));
    assert!(reports.join("two.jpg.json").is_file());
}

#[test]
fn test_error_cause_printed_once() {
    let dir = tempfile::tempdir().unwrap();
    let one = write(dir.path(), "one.jpg", &ExifFixture::pittsburgh().to_jpeg());
    let target = dir.path().join("taken");
    std::fs::create_dir(&target).unwrap();
    let out = geotrace(&["analyze", &one, "--quiet", "--json", &target.to_string_lossy()]);

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    let line = stderr.lines().find(|l| l.contains("File access error")).unwrap();
    let cause = line.rsplit(": ").next().unwrap();
    assert_eq!(line.matches(cause).count(), 1, "{}", line);
}

#[test]
fn test_verify_against_exported_report() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write(dir.path(), "gps.jpg", &ExifFixture::pittsburgh().to_jpeg());
    let report = dir.path().join("gps.json").to_string_lossy().into_owned();

    let out = geotrace(&["analyze", &photo, "--quiet", "--json", &report]);
    assert!(out.status.success());

    let ok = geotrace(&["verify", &photo, "--report", &report]);
    assert!(ok.status.success());
    assert!(String::from_utf8_lossy(&ok.stdout).contains("Integrity verified"));

    std::fs::write(&photo, b"tampered").unwrap();
    let bad = geotrace(&["verify", &photo, "--report", &report]);
    assert!(!bad.status.success());
    assert!(String::from_utf8_lossy(&bad.stdout).contains("MISMATCH"));
}
