//! Integrity digests over evidence file content.
//!
//! MD5, SHA-1 and SHA-256 are fed from the same read pass, so all three
//! describe identical bytes and can be cross-checked against other tools.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::defaults;
use crate::models::FileDigestSet;
use crate::{Error, Result};

/// Incremental digest state for all three algorithms.
pub struct MultiHasher {
    md5: md5::Context,
    sha1: Sha1,
    sha256: Sha256,
    bytes: u64,
}

impl MultiHasher {
    pub fn new() -> Self {
        Self {
            md5: md5::Context::new(),
            sha1: Sha1::new(),
            sha256: Sha256::new(),
            bytes: 0,
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.md5.consume(chunk);
        self.sha1.update(chunk);
        self.sha256.update(chunk);
        self.bytes += chunk.len() as u64;
    }

    /// Number of bytes fed so far.
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes
    }

    pub fn finalize(self) -> FileDigestSet {
        FileDigestSet {
            md5: format!("{:x}", self.md5.compute()),
            sha1: hex::encode(self.sha1.finalize()),
            sha256: hex::encode(self.sha256.finalize()),
        }
    }
}

impl Default for MultiHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Digest an in-memory buffer.
pub fn hash_bytes(data: &[u8]) -> FileDigestSet {
    let mut hasher = MultiHasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Digest the full content of the file at `path`.
///
/// Any I/O failure is a [`Error::HashComputation`]; integrity hashes are a
/// required part of every report.
pub fn hash_file(path: &Path) -> Result<FileDigestSet> {
    let to_err = |source| Error::HashComputation {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(to_err)?;
    let mut hasher = MultiHasher::new();
    let mut buf = vec![0u8; defaults::HASH_BUFFER_SIZE];

    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(to_err(e)),
        };
        hasher.update(&buf[..n]);
    }

    debug!(
        file_path = %path.display(),
        file_size = hasher.bytes_hashed(),
        "Computed integrity digests"
    );
    Ok(hasher.finalize())
}

/// Re-hash `path` and compare with a previously recorded digest set.
pub fn verify_file(path: &Path, expected: &FileDigestSet) -> Result<bool> {
    Ok(hash_file(path)?.matches(expected))
}
