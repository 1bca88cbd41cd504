//! Concurrent archive creation and magic-number driven extraction.
//!
//! `carch-core` walks one or more source trees in parallel, filters the
//! entries, and streams them through a single writer into a tar (plain,
//! gzip or lz4) or zip archive. Extraction identifies the archive from its
//! leading bytes, never from its name, and runs the matching decoder.
//!
//! # Examples
//!
//! ```no_run
//! use carch_core::creation::{CreationConfig, FilterRules};
//! use carch_core::{ExtractionConfig, create_archive, extract_archive};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CreationConfig::default()
//!     .with_exclude(FilterRules::default().with_extensions(["log", "tmp"]));
//! let report = create_archive("project.tar.gz", &["src", "docs"], &config)?;
//! println!("{}", report.summary());
//!
//! let extracted = extract_archive("project.tar.gz", "restore", &ExtractionConfig::default())?;
//! println!("Extracted {} files", extracted.files_extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod creation;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod io;
pub mod report;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::archiver_for;
pub use api::create_archive;
pub use api::extract_archive;
pub use config::ExtractionConfig;
pub use error::ArchiveError;
pub use error::Result;
pub use formats::Archiver;
pub use formats::Format;
pub use report::ExtractionReport;
