//! Image container properties read from the file header.
//!
//! Format, pixel dimensions and colour mode come from the decoder's header
//! parse; pixel data is never decoded. Container fields the decoder does not
//! surface (JFIF density, PNG physical size, GIF version) are read from the
//! leading bytes of the file into [`ImageProperties::info`].

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use image::{ColorType, ImageDecoder, ImageReader};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Container-level image properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageProperties {
    /// Container format name, e.g. "JPEG", "PNG"
    pub format: Option<String>,
    /// MIME type from magic bytes
    pub mime_type: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Colour mode in the conventional short form ("RGB", "RGBA", "L", ...)
    pub color_mode: String,
    /// Additional container fields, e.g. `dpi`, `jfif_version`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub info: BTreeMap<String, String>,
}

/// Bytes scanned for container fields; JFIF, pHYs and the GIF header all
/// sit well inside this.
const HEADER_SCAN_LEN: u64 = 64 * 1024;

/// Read format, dimensions and colour mode of the image at `path`.
pub fn inspect(path: &Path) -> Result<ImageProperties> {
    let reader = ImageReader::open(path)
        .map_err(|e| Error::FileAccess {
            path: path.to_path_buf(),
            source: e,
        })?
        .with_guessed_format()?;

    let format = reader
        .format()
        .map(|f| format!("{:?}", f).to_uppercase());
    let mime_type = reader.format().map(|f| f.to_mime_type().to_string());

    let decoder = reader
        .into_decoder()
        .map_err(|e| Error::Extraction(format!("Unreadable image header: {}", e)))?;
    let (width, height) = decoder.dimensions();
    let color_mode = color_mode(decoder.color_type());
    let info = container_info(&read_header(path)?);

    debug!(
        file_path = %path.display(),
        format = format.as_deref().unwrap_or("unknown"),
        width,
        height,
        info_fields = info.len(),
        "Read image header"
    );

    Ok(ImageProperties {
        format,
        mime_type,
        width,
        height,
        color_mode,
        info,
    })
}

fn read_header(path: &Path) -> Result<Vec<u8>> {
    let file_access = |e| Error::FileAccess {
        path: path.to_path_buf(),
        source: e,
    };
    let mut header = Vec::new();
    File::open(path)
        .map_err(file_access)?
        .take(HEADER_SCAN_LEN)
        .read_to_end(&mut header)
        .map_err(file_access)?;
    Ok(header)
}

/// Container fields found in the leading bytes of an image file.
///
/// Unknown containers and truncated headers yield an empty map.
pub fn container_info(header: &[u8]) -> BTreeMap<String, String> {
    let mut info = BTreeMap::new();
    if header.starts_with(&[0xFF, 0xD8]) {
        jpeg_info(header, &mut info);
    } else if header.starts_with(b"\x89PNG\r\n\x1a\n") {
        png_info(header, &mut info);
    } else if header.starts_with(b"GIF8") {
        gif_info(header, &mut info);
    }
    info
}

fn be16(b: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes(b.get(at..at + 2)?.try_into().ok()?))
}

fn be32(b: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_be_bytes(b.get(at..at + 4)?.try_into().ok()?))
}

fn insert(info: &mut BTreeMap<String, String>, key: &str, value: impl ToString) {
    info.insert(key.to_string(), value.to_string());
}

/// Walks marker segments up to start-of-scan looking for JFIF and Adobe
/// application segments.
fn jpeg_info(b: &[u8], info: &mut BTreeMap<String, String>) {
    let mut pos = 2;
    while pos + 4 <= b.len() && b[pos] == 0xFF {
        let marker = b[pos + 1];
        // Standalone markers carry no length
        if marker == 0x01 || (0xD0..=0xD8).contains(&marker) {
            pos += 2;
            continue;
        }
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        let Some(len) = be16(b, pos + 2).map(usize::from) else {
            break;
        };
        let body = b.get(pos + 4..(pos + 2 + len).min(b.len())).unwrap_or(&[]);
        match marker {
            0xE0 if body.starts_with(b"JFIF\0") && body.len() >= 12 => {
                let (major, minor, unit) = (body[5], body[6], body[7]);
                let (x, y) = (be16(body, 8).unwrap_or(0), be16(body, 10).unwrap_or(0));
                insert(info, "jfif", u16::from(major) << 8 | u16::from(minor));
                insert(info, "jfif_version", format!("{}.{:02}", major, minor));
                insert(info, "jfif_unit", unit);
                insert(info, "jfif_density", format!("{}x{}", x, y));
                let per_inch = match unit {
                    1 => Some(1.0),
                    2 => Some(2.54),
                    _ => None,
                };
                if let Some(scale) = per_inch {
                    insert(
                        info,
                        "dpi",
                        format!("{}x{}", f64::from(x) * scale, f64::from(y) * scale),
                    );
                }
            }
            0xE1 if body.starts_with(b"Exif\0\0") => {
                insert(info, "exif_bytes", body.len() - 6);
            }
            0xEE if body.starts_with(b"Adobe") && body.len() >= 12 => {
                insert(info, "adobe", be16(body, 5).unwrap_or(0));
                insert(info, "adobe_transform", body[11]);
            }
            _ => {}
        }
        pos += 2 + len;
    }
}

/// IHDR interlace flag, pHYs physical size and gAMA, read from the chunks
/// before the first IDAT.
fn png_info(b: &[u8], info: &mut BTreeMap<String, String>) {
    let mut pos = 8;
    while let (Some(len), Some(kind)) = (be32(b, pos), b.get(pos + 4..pos + 8)) {
        let len = len as usize;
        let Some(data) = b.get(pos + 8..pos + 8 + len) else {
            break;
        };
        match kind {
            b"IHDR" if len >= 13 => {
                if data[12] == 1 {
                    insert(info, "interlace", 1);
                }
            }
            b"pHYs" if len >= 9 => {
                let (x, y) = (be32(data, 0).unwrap_or(0), be32(data, 4).unwrap_or(0));
                if data[8] == 1 {
                    // pixels per metre
                    let dpi = |ppm: u32| (f64::from(ppm) * 0.0254).round();
                    insert(info, "dpi", format!("{}x{}", dpi(x), dpi(y)));
                } else {
                    insert(info, "aspect", format!("{}x{}", x, y));
                }
            }
            b"gAMA" if len >= 4 => {
                let gamma = f64::from(be32(data, 0).unwrap_or(0)) / 100_000.0;
                insert(info, "gamma", gamma);
            }
            b"IDAT" | b"IEND" => break,
            _ => {}
        }
        pos += 12 + len;
    }
}

fn gif_info(b: &[u8], info: &mut BTreeMap<String, String>) {
    if let Some(version) = b.get(..6).and_then(|v| std::str::from_utf8(v).ok()) {
        insert(info, "version", version);
    }
    if let Some(&background) = b.get(11) {
        insert(info, "background", background);
    }
}

/// Short colour-mode label for a decoder colour type.
pub fn color_mode(color: ColorType) -> String {
    match color {
        ColorType::L8 => "L".to_string(),
        ColorType::La8 => "LA".to_string(),
        ColorType::Rgb8 => "RGB".to_string(),
        ColorType::Rgba8 => "RGBA".to_string(),
        ColorType::L16 => "I;16".to_string(),
        ColorType::La16 => "LA;16".to_string(),
        ColorType::Rgb16 => "RGB;16".to_string(),
        ColorType::Rgba16 => "RGBA;16".to_string(),
        ColorType::Rgb32F => "RGB;F".to_string(),
        ColorType::Rgba32F => "RGBA;F".to_string(),
        other => format!("{:?}", other),
    }
}
