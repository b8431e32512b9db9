#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Run configuration read from `conf.yaml`.
pub mod config;

/// Camera pose estimation from a fiducial marker.
pub mod detector;

/// The per-frame overlay loop.
pub mod driver;

/// Drawing projected boxes onto frames.
pub mod render;

pub use config::RunConfig;
pub use detector::{MarkerPoseEstimator, QrMarkerEstimator};
pub use driver::{OverlayDriver, OverlayStats};
pub use render::{draw_box, LineStyle};

/// An error type for the overlay pipeline.
#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    /// Reading or writing a file or frame failed.
    #[error(transparent)]
    Io(#[from] simlabel_io::IoError),

    /// A calibration or label record is malformed.
    #[error(transparent)]
    Geometry(#[from] simlabel_geometry::GeometryError),

    /// The run configuration is not usable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
