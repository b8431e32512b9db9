use crate::{error::GeometryError, remap::ENGINE_TO_ROBOT};

/// An oriented box attached to a named object.
///
/// Once constructed through [`LabeledBox::from_engine`] the box is expressed in
/// the robot (camera marker) convention.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledBox {
    /// Object name as authored in the simulation.
    pub name: String,
    /// Box center.
    pub position: [f64; 3],
    /// Box orientation as a quaternion in `(x, y, z, w)` order.
    pub rotation: [f64; 4],
    /// Full box extents along the local axes.
    pub scale: [f64; 3],
}

impl LabeledBox {
    /// Build a box from a flattened `position ‖ rotation ‖ scale` vector, taken as is.
    pub fn from_components(name: impl Into<String>, c: &[f64; 10]) -> Self {
        Self {
            name: name.into(),
            position: [c[0], c[1], c[2]],
            rotation: [c[3], c[4], c[5], c[6]],
            scale: [c[7], c[8], c[9]],
        }
    }

    /// Build a box from a flattened label in the engine convention, remapping it to the robot convention.
    ///
    /// # Errors
    ///
    /// Fails when fewer than ten components are given or the rotation has
    /// zero or non-finite norm.
    pub fn from_engine(name: impl Into<String>, values: &[f64]) -> Result<Self, GeometryError> {
        let remapped = ENGINE_TO_ROBOT.apply(values)?;
        let label = Self::from_components(name, &remapped);

        let norm = label.rotation.iter().map(|q| q * q).sum::<f64>().sqrt();
        if !norm.is_finite() || norm == 0.0 {
            return Err(GeometryError::InvalidInput(format!(
                "label '{}' has a rotation with norm {norm}",
                label.name
            )));
        }
        Ok(label)
    }

    /// Build a box from the separate `pos`, `rot` and `scale` fields of an engine label.
    ///
    /// # Errors
    ///
    /// Fails when a field does not hold exactly 3, 4 and 3 values respectively.
    pub fn from_engine_parts(
        name: impl Into<String>,
        pos: &[f64],
        rot: &[f64],
        scale: &[f64],
    ) -> Result<Self, GeometryError> {
        let name = name.into();
        for (field, values, expected) in [("pos", pos, 3), ("rot", rot, 4), ("scale", scale, 3)] {
            if values.len() != expected {
                return Err(GeometryError::InvalidInput(format!(
                    "label '{name}' field '{field}' has {} values, expected {expected}",
                    values.len()
                )));
            }
        }

        let flat = [pos, rot, scale].concat();
        Self::from_engine(name, &flat)
    }

    /// Flatten back into `position ‖ rotation ‖ scale`.
    pub fn components(&self) -> [f64; 10] {
        let [px, py, pz] = self.position;
        let [qx, qy, qz, qw] = self.rotation;
        let [sx, sy, sz] = self.scale;
        [px, py, pz, qx, qy, qz, qw, sx, sy, sz]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_engine_swaps_axes() -> Result<(), GeometryError> {
        let b = LabeledBox::from_engine(
            "cube",
            &[1.0, 2.0, 3.0, 0.1, 0.2, 0.3, 0.9, 4.0, 5.0, 6.0],
        )?;
        assert_eq!(b.name, "cube");
        assert_eq!(b.position, [1.0, 3.0, 2.0]);
        assert_eq!(b.rotation, [0.1, 0.3, 0.2, 0.9]);
        assert_eq!(b.scale, [4.0, 6.0, 5.0]);
        Ok(())
    }

    #[test]
    fn from_engine_parts_matches_flat() -> Result<(), GeometryError> {
        let parts = LabeledBox::from_engine_parts(
            "a",
            &[1.0, 2.0, 3.0],
            &[0.0, 0.0, 0.0, 1.0],
            &[1.0, 2.0, 3.0],
        )?;
        let flat = LabeledBox::from_engine(
            "a",
            &[1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 3.0],
        )?;
        assert_eq!(parts, flat);
        Ok(())
    }

    #[test]
    fn from_engine_parts_rejects_bad_field() {
        let res = LabeledBox::from_engine_parts("a", &[1.0, 2.0], &[0.0, 0.0, 0.0, 1.0, 0.0], &[1.0; 3]);
        assert!(matches!(res, Err(GeometryError::InvalidInput(_))));
    }

    #[test]
    fn from_engine_rejects_zero_rotation() {
        let res = LabeledBox::from_engine("a", &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        assert!(matches!(res, Err(GeometryError::InvalidInput(_))));
    }

    #[test]
    fn components_roundtrip() {
        let c = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert_eq!(LabeledBox::from_components("x", &c).components(), c);
    }
}
