#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the io module.
pub mod error;

/// Image file reading and writing.
pub mod functional;

/// Typed records for calibration, label session and meta files.
pub mod records;

/// Structured file persistence under a root directory.
pub mod saver;

/// Frame sources and sinks.
pub mod stream;

pub use crate::error::IoError;
pub use crate::saver::{FileFormat, FileSaver};
