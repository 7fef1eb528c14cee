//! Synthetic EXIF containers for tests.
//!
//! Builds little-endian TIFF structures (IFD0, Exif IFD, GPS IFD) and wraps
//! them in a minimal JPEG APP1 segment, so tests never depend on checked-in
//! binary images.

/// A tag payload in one of the TIFF field types the fixtures need.
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureValue {
    Ascii(String),
    Short(u16),
    Long(u32),
    Rational(Vec<(u32, u32)>),
    Undefined(Vec<u8>),
}

impl FixtureValue {
    /// Degrees/minutes/seconds triple; seconds given in thousandths.
    pub fn dms(degrees: u32, minutes: u32, seconds_milli: u32) -> Self {
        FixtureValue::Rational(vec![(degrees, 1), (minutes, 1), (seconds_milli, 1000)])
    }

    fn encode(&self) -> (u16, u32, Vec<u8>) {
        match self {
            FixtureValue::Ascii(s) => {
                let mut bytes = s.as_bytes().to_vec();
                bytes.push(0);
                (2, bytes.len() as u32, bytes)
            }
            FixtureValue::Short(n) => (3, 1, n.to_le_bytes().to_vec()),
            FixtureValue::Long(n) => (4, 1, n.to_le_bytes().to_vec()),
            FixtureValue::Rational(parts) => {
                let mut bytes = Vec::with_capacity(parts.len() * 8);
                for (num, denom) in parts {
                    bytes.extend_from_slice(&num.to_le_bytes());
                    bytes.extend_from_slice(&denom.to_le_bytes());
                }
                (5, parts.len() as u32, bytes)
            }
            FixtureValue::Undefined(bytes) => (7, bytes.len() as u32, bytes.clone()),
        }
    }
}

/// 1x1 GIF89a with a two-entry global colour table; carries no EXIF.
pub const TINY_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0xFF, 0xFF,
    0xFF, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02,
    0x02, 0x44, 0x01, 0x00, 0x3B,
];

const EXIF_POINTER: u16 = 0x8769;
const GPS_POINTER: u16 = 0x8825;

type Entries = Vec<(u16, FixtureValue)>;

/// Builder for a TIFF/JPEG byte stream carrying chosen tags.
#[derive(Debug, Clone, Default)]
pub struct ExifFixture {
    ifd0: Entries,
    exif: Entries,
    gps: Entries,
}

impl ExifFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ifd0(mut self, tag: u16, value: FixtureValue) -> Self {
        self.ifd0.push((tag, value));
        self
    }

    pub fn exif(mut self, tag: u16, value: FixtureValue) -> Self {
        self.exif.push((tag, value));
        self
    }

    pub fn gps(mut self, tag: u16, value: FixtureValue) -> Self {
        self.gps.push((tag, value));
        self
    }

    /// Camera tags only, no GPS IFD.
    pub fn camera_only() -> Self {
        Self::new()
            .ifd0(0x010F, FixtureValue::Ascii("Canon".into()))
            .ifd0(0x0110, FixtureValue::Ascii("EOS 5D Mark IV".into()))
            .ifd0(0x0131, FixtureValue::Ascii("Firmware 1.2.0".into()))
            .exif(0x829A, FixtureValue::Rational(vec![(1, 125)]))
            .exif(0x829D, FixtureValue::Rational(vec![(28, 10)]))
            .exif(0x8827, FixtureValue::Short(400))
            .exif(0x9003, FixtureValue::Ascii("2023:06:14 10:22:31".into()))
            .exif(0x9004, FixtureValue::Ascii("2023:06:14 10:22:31".into()))
            .exif(0x920A, FixtureValue::Rational(vec![(50, 1)]))
    }

    /// Camera tags plus a GPS fix at 40°26'46.302"N 79°56'55.903"W.
    pub fn pittsburgh() -> Self {
        Self::camera_only()
            .gps(1, FixtureValue::Ascii("N".into()))
            .gps(2, FixtureValue::dms(40, 26, 46_302))
            .gps(3, FixtureValue::Ascii("W".into()))
            .gps(4, FixtureValue::dms(79, 56, 55_903))
    }

    /// Raw little-endian TIFF stream.
    pub fn to_tiff(&self) -> Vec<u8> {
        let mut ifd0 = self.ifd0.clone();
        if !self.exif.is_empty() {
            ifd0.push((EXIF_POINTER, FixtureValue::Long(0)));
        }
        if !self.gps.is_empty() {
            ifd0.push((GPS_POINTER, FixtureValue::Long(0)));
        }
        let mut exif = self.exif.clone();
        let mut gps = self.gps.clone();
        ifd0.sort_by_key(|(tag, _)| *tag);
        exif.sort_by_key(|(tag, _)| *tag);
        gps.sort_by_key(|(tag, _)| *tag);

        let ifd0_start = 8u32;
        let exif_start = ifd0_start + ifd_len(&ifd0);
        let gps_start = exif_start + if exif.is_empty() { 0 } else { ifd_len(&exif) };

        for (tag, value) in ifd0.iter_mut() {
            match *tag {
                EXIF_POINTER => *value = FixtureValue::Long(exif_start),
                GPS_POINTER => *value = FixtureValue::Long(gps_start),
                _ => {}
            }
        }

        let mut out = b"II*\0".to_vec();
        out.extend_from_slice(&ifd0_start.to_le_bytes());
        out.extend(encode_ifd(&ifd0, ifd0_start));
        if !exif.is_empty() {
            out.extend(encode_ifd(&exif, exif_start));
        }
        if !gps.is_empty() {
            out.extend(encode_ifd(&gps, gps_start));
        }
        out
    }

    /// TIFF stream wrapped in a JPEG APP1 segment.
    pub fn to_jpeg(&self) -> Vec<u8> {
        let tiff = self.to_tiff();
        let seg_len = (2 + 6 + tiff.len()) as u16;

        let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
        out.extend_from_slice(&seg_len.to_be_bytes());
        out.extend_from_slice(b"Exif\0\0");
        out.extend(tiff);
        out.extend_from_slice(&[0xFF, 0xD9]);
        out
    }
}

fn padded(len: usize) -> u32 {
    (len + len % 2) as u32
}

fn ifd_len(entries: &Entries) -> u32 {
    let data: u32 = entries
        .iter()
        .map(|(_, v)| v.encode().2.len())
        .filter(|&len| len > 4)
        .map(padded)
        .sum();
    2 + 12 * entries.len() as u32 + 4 + data
}

fn encode_ifd(entries: &Entries, start: u32) -> Vec<u8> {
    let data_start = start + 2 + 12 * entries.len() as u32 + 4;
    let mut head = Vec::new();
    let mut data = Vec::new();

    head.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for (tag, value) in entries {
        let (typ, count, mut bytes) = value.encode();
        head.extend_from_slice(&tag.to_le_bytes());
        head.extend_from_slice(&typ.to_le_bytes());
        head.extend_from_slice(&count.to_le_bytes());
        if bytes.len() <= 4 {
            bytes.resize(4, 0);
            head.extend(bytes);
        } else {
            let offset = data_start + data.len() as u32;
            head.extend_from_slice(&offset.to_le_bytes());
            data.extend(bytes);
            if data.len() % 2 == 1 {
                data.push(0);
            }
        }
    }
    head.extend_from_slice(&0u32.to_le_bytes());
    head.extend(data);
    head
}
