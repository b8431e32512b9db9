use crate::error::GeometryError;

/// Number of scalar components in a flattened label: position (3), rotation (4), scale (3).
pub const LABEL_COMPONENTS: usize = 10;

/// A fixed index permutation over the flattened label components.
///
/// Output component `i` is taken from input component `self.0[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRemap(pub [usize; LABEL_COMPONENTS]);

/// Engine (left-handed, Y up) to robot (right-handed, Z up) convention.
///
/// The two frames differ by a Y/Z swap, so the permutation swaps Y and Z of
/// the position, the matching quaternion components and Y and Z of the scale.
pub const ENGINE_TO_ROBOT: AxisRemap = AxisRemap([0, 2, 1, 3, 5, 4, 6, 7, 9, 8]);

impl AxisRemap {
    /// Apply the permutation to a flattened `position ‖ rotation ‖ scale` label.
    ///
    /// Components past the tenth are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InsufficientComponents`] when fewer than ten
    /// values are given.
    ///
    /// # Example
    ///
    /// ```
    /// use simlabel_geometry::ENGINE_TO_ROBOT;
    ///
    /// let out = ENGINE_TO_ROBOT
    ///     .apply(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0])
    ///     .unwrap();
    /// assert_eq!(out, [1.0, 3.0, 2.0, 4.0, 6.0, 5.0, 7.0, 8.0, 10.0, 9.0]);
    /// ```
    pub fn apply(&self, values: &[f64]) -> Result<[f64; LABEL_COMPONENTS], GeometryError> {
        if values.len() < LABEL_COMPONENTS {
            return Err(GeometryError::InsufficientComponents {
                expected: LABEL_COMPONENTS,
                actual: values.len(),
            });
        }

        let mut out = [0.0; LABEL_COMPONENTS];
        for (dst, &src) in out.iter_mut().zip(self.0.iter()) {
            *dst = values[src];
        }
        Ok(out)
    }
}

/// Remap a flattened label from the engine convention to the robot convention.
pub fn engine_to_robot(values: &[f64]) -> Result<[f64; LABEL_COMPONENTS], GeometryError> {
    ENGINE_TO_ROBOT.apply(values)
}
