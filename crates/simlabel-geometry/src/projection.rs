use crate::{
    bbox::{BoxVertices2D, BoxVertices3D},
    calibration::IntrinsicCalibration,
    error::ProjectionError,
    pose::Pose,
};

/// Depth below which a camera-frame point is treated as not projectable.
pub const MIN_DEPTH: f64 = 1e-9;

/// Project marker-frame points into distorted pixel coordinates.
///
/// # Arguments
///
/// * `points` - Points in the marker frame.
/// * `pose` - Camera pose relative to the marker.
/// * `calib` - Camera intrinsics and distortion.
///
/// # Errors
///
/// Fails on the first point whose camera-frame depth is not positive or whose
/// projection is not finite.
pub fn project_points(
    points: &[[f64; 3]],
    pose: &Pose,
    calib: &IntrinsicCalibration,
) -> Result<Vec<[f64; 2]>, ProjectionError> {
    let rotation = pose.rotation_matrix();
    let translation = glam::DVec3::from_array(pose.translation_vector);

    points
        .iter()
        .enumerate()
        .map(|(index, &p)| {
            let pc = rotation * glam::DVec3::from_array(p) + translation;
            if !(pc.z > MIN_DEPTH) {
                return Err(ProjectionError::BehindCamera {
                    index,
                    depth: pc.z,
                });
            }

            let [u, v] = calib.normalized_to_pixel(pc.x / pc.z, pc.y / pc.z);
            if !u.is_finite() || !v.is_finite() {
                return Err(ProjectionError::NonFinite { index });
            }
            Ok([u, v])
        })
        .collect()
}

/// Round pixel coordinates to the nearest integer, ties to even.
pub fn round_to_pixel(p: [f64; 2]) -> [i64; 2] {
    [p[0].round_ties_even() as i64, p[1].round_ties_even() as i64]
}

/// Project the eight corners of a box and round them to integer pixels.
///
/// The corner order is preserved so the result can be fed to [`crate::bbox::box_edges`].
pub fn project_box(
    vertices: &BoxVertices3D,
    pose: &Pose,
    calib: &IntrinsicCalibration,
) -> Result<BoxVertices2D, ProjectionError> {
    let projected = project_points(vertices, pose, calib)?;

    let mut out = [[0i64; 2]; 8];
    for (dst, p) in out.iter_mut().zip(projected) {
        *dst = round_to_pixel(p);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bbox::box_vertices, label::LabeledBox};
    use approx::assert_relative_eq;

    fn unit_camera() -> IntrinsicCalibration {
        IntrinsicCalibration::new([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]], vec![])
            .unwrap()
    }

    #[test]
    fn identity_projection_keeps_xy() -> Result<(), ProjectionError> {
        // a flat 2x2 box one unit in front of the camera, corners at (±1, ±1, 1)
        let label =
            LabeledBox::from_components("card", &[0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 0.0]);
        let vertices = box_vertices(&label);
        let pixels = project_box(&vertices, &Pose::identity(), &unit_camera())?;
        for (p3, p2) in vertices.iter().zip(pixels.iter()) {
            assert_eq!(p2[0], p3[0].round() as i64);
            assert_eq!(p2[1], p3[1].round() as i64);
        }
        Ok(())
    }

    #[test]
    fn pinhole_projection() -> Result<(), ProjectionError> {
        let calib = IntrinsicCalibration::new(
            [[100.0, 0.0, 50.0], [0.0, 200.0, 40.0], [0.0, 0.0, 1.0]],
            vec![],
        )
        .unwrap();
        let pts = project_points(&[[0.5, -0.25, 2.0]], &Pose::identity(), &calib)?;
        assert_relative_eq!(pts[0][0], 75.0);
        assert_relative_eq!(pts[0][1], 15.0);
        Ok(())
    }

    #[test]
    fn translation_moves_points_in_front() -> Result<(), ProjectionError> {
        let pose = Pose::new([0.0; 3], [0.0, 0.0, 4.0]);
        let pts = project_points(&[[2.0, 0.0, 0.0]], &pose, &unit_camera())?;
        assert_relative_eq!(pts[0][0], 0.5);
        assert_relative_eq!(pts[0][1], 0.0);
        Ok(())
    }

    #[test]
    fn behind_camera_fails() {
        let res = project_points(&[[0.0, 0.0, 1.0], [0.0, 0.0, -1.0]], &Pose::identity(), &unit_camera());
        assert_eq!(
            res,
            Err(ProjectionError::BehindCamera {
                index: 1,
                depth: -1.0
            })
        );
    }

    #[test]
    fn box_straddling_camera_plane_fails() {
        let label =
            LabeledBox::from_components("big", &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
        let res = project_box(&box_vertices(&label), &Pose::identity(), &unit_camera());
        assert!(matches!(res, Err(ProjectionError::BehindCamera { .. })));
    }

    #[test]
    fn rounding_ties_to_even() {
        assert_eq!(round_to_pixel([0.5, 1.5]), [0, 2]);
        assert_eq!(round_to_pixel([-0.5, 2.4999]), [0, 2]);
        assert_eq!(round_to_pixel([-1.6, 3.51]), [-2, 4]);
    }
}
