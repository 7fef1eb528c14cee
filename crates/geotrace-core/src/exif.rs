//! EXIF metadata extraction for image files.
//!
//! Reads the embedded tag block of a JPEG, TIFF, PNG, HEIF or WebP container
//! with kamadak-exif and flattens the primary image's TIFF, Exif, Interop
//! and GPS IFDs into a single [`MetadataMap`]. Tag names come from
//! [`crate::tags`]; IFD pointer tags are structural and are not reported.
//!
//! Absence and corruption are kept apart:
//! - no metadata block (or a container that cannot carry one) → empty map
//! - malformed block or unrecognised container → [`Error::Extraction`]

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use exif::{Context, In, Reader, Tag, Value};
use tracing::{debug, trace, warn};

use crate::defaults;
use crate::models::{MetadataMap, Rational, TagValue};
use crate::tags::{resolve_tag, TagTable};
use crate::{Error, Result};

/// MIME types whose containers never carry an EXIF block.
const NO_EXIF_CONTAINERS: &[&str] = &["image/gif", "image/bmp"];

/// Whether extraction found a metadata block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataStatus {
    /// A block was found and decoded
    Present,
    /// The container has no metadata block
    Absent,
    /// The block or container could not be parsed
    Failed,
}

/// Extract the flat tag map from the image at `path`.
///
/// # Example
/// ```no_run
/// use geotrace_core::exif::extract;
///
/// let tags = extract(std::path::Path::new("photo.jpg")).unwrap();
/// if let Some(make) = tags.get("Make") {
///     println!("Captured with: {}", make);
/// }
/// ```
pub fn extract(path: &Path) -> Result<MetadataMap> {
    let file = File::open(path).map_err(|e| Error::FileAccess {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut reader = BufReader::new(file);

    let mut head = Vec::with_capacity(defaults::SNIFF_LEN);
    reader
        .by_ref()
        .take(defaults::SNIFF_LEN as u64)
        .read_to_end(&mut head)?;
    reader.seek(SeekFrom::Start(0))?;

    if head.is_empty() {
        debug!(file_path = %path.display(), "Empty file, no metadata to extract");
        return Ok(MetadataMap::new());
    }

    if let Some(kind) = infer::get(&head) {
        if NO_EXIF_CONTAINERS.contains(&kind.mime_type()) {
            debug!(
                file_path = %path.display(),
                mime = kind.mime_type(),
                "Container cannot carry EXIF"
            );
            return Ok(MetadataMap::new());
        }
    }

    extract_from_reader(&mut reader)
}

/// Extract the flat tag map from any seekable reader over a container.
pub fn extract_from_reader<R: std::io::BufRead + Seek>(reader: &mut R) -> Result<MetadataMap> {
    let mut exif_reader = Reader::new();
    exif_reader.continue_on_error(true);

    let exif = match exif_reader.read_from_container(reader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(container)) => {
            debug!(container, "No metadata block in container");
            return Ok(MetadataMap::new());
        }
        Err(e) => e
            .distill_partial_result(|errors| {
                for err in errors {
                    warn!(error = %err, "Skipping malformed EXIF entry");
                }
            })
            .map_err(|e| Error::Extraction(format!("Failed to read EXIF data: {}", e)))?,
    };

    let mut map = MetadataMap::new();
    for field in exif.fields() {
        if field.ifd_num != In::PRIMARY || is_pointer(field.tag) {
            continue;
        }
        let table = match field.tag.context() {
            Context::Gps => TagTable::Gps,
            _ => TagTable::Exif,
        };
        let name = resolve_tag(table, field.tag.number());
        trace!(tag = %name, "Decoded tag");
        map.insert(name, convert_value(&field.value));
    }

    debug!(tag_count = map.len(), "EXIF extraction complete");
    Ok(map)
}

fn is_pointer(tag: Tag) -> bool {
    tag == Tag::ExifIFDPointer || tag == Tag::GPSInfoIFDPointer || tag == Tag::InteropIFDPointer
}

/// Convert a raw EXIF value to a [`TagValue`].
///
/// Single-component values collapse to scalars; multi-component values
/// become sequences. BYTE is numeric; UNDEFINED and ASCII are byte payloads.
pub fn convert_value(value: &Value) -> TagValue {
    match value {
        Value::Byte(v) => ints(v.iter().map(|&n| n as i64)),
        Value::SByte(v) => ints(v.iter().map(|&n| n as i64)),
        Value::Short(v) => ints(v.iter().map(|&n| n as i64)),
        Value::SShort(v) => ints(v.iter().map(|&n| n as i64)),
        Value::Long(v) => ints(v.iter().map(|&n| n as i64)),
        Value::SLong(v) => ints(v.iter().map(|&n| n as i64)),
        Value::Rational(v) => TagValue::from_components(
            v.iter()
                .map(|r| TagValue::Rational(Rational::new(r.num as i64, r.denom as i64)))
                .collect(),
        ),
        Value::SRational(v) => TagValue::from_components(
            v.iter()
                .map(|r| TagValue::Rational(Rational::new(r.num as i64, r.denom as i64)))
                .collect(),
        ),
        Value::Float(v) => {
            TagValue::from_components(v.iter().map(|&f| TagValue::Float(f as f64)).collect())
        }
        Value::Double(v) => {
            TagValue::from_components(v.iter().map(|&f| TagValue::Float(f)).collect())
        }
        Value::Ascii(strings) => TagValue::from_components(
            strings
                .iter()
                .map(|s| TagValue::from_bytes(s.clone()))
                .collect(),
        ),
        Value::Undefined(bytes, _) => TagValue::from_bytes(bytes.clone()),
        Value::Unknown(typ, count, _) => {
            TagValue::Text(format!("unknown type {} ({} components)", typ, count))
        }
    }
}

fn ints(values: impl Iterator<Item = i64>) -> TagValue {
    TagValue::from_components(values.map(TagValue::Integer).collect())
}
