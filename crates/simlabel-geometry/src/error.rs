/// Errors raised when the geometry inputs are malformed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// Too few scalar components were supplied.
    #[error("Invalid input: expected at least {expected} components, got {actual}")]
    InsufficientComponents {
        /// Number of components required.
        expected: usize,
        /// Number of components supplied.
        actual: usize,
    },

    /// The input has the wrong shape or holds unusable values.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised while projecting camera-relative points into the image.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    /// The point lies on or behind the camera plane.
    #[error("Point {index} has non-positive depth {depth} in the camera frame")]
    BehindCamera {
        /// Index of the offending point.
        index: usize,
        /// Camera-frame depth of the point.
        depth: f64,
    },

    /// The projection produced NaN or infinite pixel coordinates.
    #[error("Point {index} projects to a non-finite pixel")]
    NonFinite {
        /// Index of the offending point.
        index: usize,
    },
}
