//! # geotrace-report
//!
//! Forensic report pipeline for geotrace.
//!
//! This crate provides:
//! - [`ReportBuilder`]: drives extraction, coordinate resolution, reverse
//!   geocoding and hashing into one immutable [`ForensicReport`]
//! - [`CancelFlag`]: cooperative cancellation checked between stages
//! - [`export`]: JSON export and parsing
//! - [`text`]: flat-text rendering
//!
//! # Example
//!
//! ```rust,no_run
//! use geotrace_geocode::GeocodeConfig;
//! use geotrace_report::{export, ReportBuilder};
//!
//! # async fn example() -> geotrace_core::Result<()> {
//! let builder = ReportBuilder::from_config(&GeocodeConfig::default())?;
//! let report = builder.build("IMG_0001.jpg").await?;
//! println!("{}", export::to_json_pretty(&report)?);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod cancel;
pub mod export;
pub mod text;

pub use builder::ReportBuilder;
pub use cancel::CancelFlag;
pub use export::ExportFormat;

pub use geotrace_core::ForensicReport;
