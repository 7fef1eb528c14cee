//! Error types for geotrace.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using geotrace's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for geotrace operations.
///
/// Every variant returned from a report build is fatal to that build.
/// `Extraction` failures and [`GeocodeError`]s are recovered by the report
/// builder and folded into the report's diagnostics instead.
///
/// Variants wrapping an I/O error expose it through `source()` only, so a
/// chained print (`{:#}` on `anyhow::Error`) names the cause once.
#[derive(Error, Debug)]
pub enum Error {
    /// Evidence file missing, unreadable, or stat failed
    #[error("File access error for {path}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Metadata block malformed or container unsupported
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// I/O failure while reading content for hashing
    #[error("Hash computation error for {path}")]
    HashComputation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis was cancelled between stages
    #[error("Analysis cancelled before stage: {0}")]
    Cancelled(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Reverse geocoding failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    /// Network failure, timeout, or non-success HTTP status
    #[error("geocoding service unavailable: {0}")]
    Unavailable(String),

    /// Service answered but returned no display name
    #[error("no address found for coordinates")]
    NotFound,

    /// Response body was not the expected JSON shape
    #[error("invalid geocoding response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(e: reqwest::Error) -> Self {
        GeocodeError::Unavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_access() {
        let err = Error::FileAccess {
            path: PathBuf::from("/evidence/missing.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            err.to_string(),
            "File access error for /evidence/missing.jpg"
        );
    }

    #[test]
    fn test_error_display_extraction() {
        let err = Error::Extraction("truncated IFD".to_string());
        assert_eq!(err.to_string(), "Extraction error: truncated IFD");
    }

    #[test]
    fn test_error_display_geocode() {
        assert_eq!(
            GeocodeError::NotFound.to_string(),
            "no address found for coordinates"
        );
    }

    #[test]
    fn test_error_display_cancelled() {
        let err = Error::Cancelled("hashing".to_string());
        assert_eq!(err.to_string(), "Analysis cancelled before stage: hashing");
    }

    #[test]
    fn test_hash_error_keeps_source() {
        use std::error::Error as _;
        let err = Error::HashComputation {
            path: PathBuf::from("a.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.source().unwrap().to_string(), "denied");
        assert!(!err.to_string().contains("denied"));
    }

    #[test]
    fn test_chained_display_names_cause_once() {
        let err = anyhow::Error::from(Error::FileAccess {
            path: PathBuf::from("reports/one.jpg.json"),
            source: std::io::Error::other("Is a directory"),
        });
        let chained = format!("{:#}", err);
        assert_eq!(
            chained,
            "File access error for reports/one.jpg.json: Is a directory"
        );
        assert_eq!(chained.matches("Is a directory").count(), 1);
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
