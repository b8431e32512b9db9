#![deny(missing_docs)]
//! Pose estimation of a planar square marker from its four image corners.

/// Homography estimation between planar point sets.
pub mod homography;

/// Square marker pose from a planar homography.
pub mod planar;

pub use planar::{solve_square_marker, square_object_points, PlanarPnPResult};

/// Error types for the pose solvers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PnPError {
    /// The correspondences do not determine a unique homography.
    #[error("Degenerate correspondences: {0}")]
    Degenerate(&'static str),

    /// Singular value decomposition failed
    #[error("SVD computation failed: {0}")]
    SvdFailed(String),

    /// The recovered pose puts the marker on or behind the camera plane.
    #[error("Invalid pose: {0}")]
    InvalidPose(&'static str),
}
