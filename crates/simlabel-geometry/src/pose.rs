use glam::{DMat3, DQuat, DVec3};

/// Camera pose relative to a fiducial marker for a single frame.
///
/// Maps marker-frame points into the camera frame: `p_cam = R(rvec) * p + t`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Rodrigues axis-angle rotation vector.
    pub rotation_vector: [f64; 3],
    /// Translation vector.
    pub translation_vector: [f64; 3],
}

impl Pose {
    /// Create a pose from a rotation vector and a translation.
    pub fn new(rotation_vector: [f64; 3], translation_vector: [f64; 3]) -> Self {
        Self {
            rotation_vector,
            translation_vector,
        }
    }

    /// The pose with zero rotation and zero translation.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Rotation matrix of the axis-angle vector; a zero vector gives the identity.
    pub fn rotation_matrix(&self) -> DMat3 {
        DMat3::from_quat(DQuat::from_scaled_axis(DVec3::from_array(
            self.rotation_vector,
        )))
    }

    /// Transform a marker-frame point into the camera frame.
    pub fn transform_point(&self, point: [f64; 3]) -> [f64; 3] {
        let p = self.rotation_matrix() * DVec3::from_array(point)
            + DVec3::from_array(self.translation_vector);
        p.to_array()
    }
}
