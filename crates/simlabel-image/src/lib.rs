#![deny(missing_docs)]
//! Image types for frame buffers used by the simlabel overlay pipeline.

/// image representation for frame buffers.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
