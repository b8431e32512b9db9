use nalgebra::{Matrix3, Rotation3, Vector3};
use simlabel_geometry::Pose;

use crate::{homography::homography_4pt2d, PnPError};

/// Result of the planar square-marker solver.
///
/// The rotation matrix maps coordinates from the **marker** frame to the
/// **camera** frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarPnPResult {
    /// Estimated rotation matrix, row-major.
    pub rotation: [[f64; 3]; 3],
    /// Estimated translation vector.
    pub translation: [f64; 3],
    /// Rodrigues axis-angle representation of the rotation.
    pub rvec: [f64; 3],
    /// Root-mean-square reprojection error in normalized image coordinates.
    pub reproj_rmse: f64,
}

impl PlanarPnPResult {
    /// The estimated camera pose relative to the marker.
    pub fn to_pose(&self) -> Pose {
        Pose::new(self.rvec, self.translation)
    }
}

/// The four marker corners on the plane z=0.
///
/// The order matches the corner order reported by the QR detector:
///  - p0 = [0, 0, 0]
///  - p1 = [0, L, 0]
///  - p2 = [L, L, 0]
///  - p3 = [L, 0, 0]
pub fn square_object_points(marker_size: f64) -> [[f64; 3]; 4] {
    [
        [0.0, 0.0, 0.0],
        [0.0, marker_size, 0.0],
        [marker_size, marker_size, 0.0],
        [marker_size, 0.0, 0.0],
    ]
}

/// Estimate the pose of a square marker of side `marker_size` from its four image corners.
///
/// The `image_points_norm` are undistorted, normalized image coordinates
/// (pixel coordinates premultiplied by K^{-1}), in the order of
/// [`square_object_points`].
///
/// # Errors
///
/// Fails when the corners are degenerate or the recovered pose places the
/// marker behind the camera.
pub fn solve_square_marker(
    image_points_norm: &[[f64; 2]; 4],
    marker_size: f64,
) -> Result<PlanarPnPResult, PnPError> {
    if !(marker_size > 0.0) {
        return Err(PnPError::Degenerate("marker size must be positive"));
    }

    let obj = square_object_points(marker_size);
    let src = obj.map(|p| [p[0], p[1]]);

    let hmat = homography_4pt2d(&src, image_points_norm)?;
    let (rotation, translation) = decompose_h_normalized(&hmat)?;

    let rvec = Rotation3::from_matrix_unchecked(rotation).scaled_axis();
    let reproj_rmse = rmse_normalized(&obj, image_points_norm, &rotation, &translation)?;

    log::trace!("square marker pose t={translation:?} rmse={reproj_rmse:e}");

    Ok(PlanarPnPResult {
        rotation: [
            [rotation[(0, 0)], rotation[(0, 1)], rotation[(0, 2)]],
            [rotation[(1, 0)], rotation[(1, 1)], rotation[(1, 2)]],
            [rotation[(2, 0)], rotation[(2, 1)], rotation[(2, 2)]],
        ],
        translation: [translation.x, translation.y, translation.z],
        rvec: [rvec.x, rvec.y, rvec.z],
        reproj_rmse,
    })
}

/// Compute the homography-based pose decomposition assuming normalized image coordinates (K = I).
fn decompose_h_normalized(h: &[[f64; 3]; 3]) -> Result<(Matrix3<f64>, Vector3<f64>), PnPError> {
    let h1 = Vector3::new(h[0][0], h[1][0], h[2][0]);
    let h2 = Vector3::new(h[0][1], h[1][1], h[2][1]);
    let h3 = Vector3::new(h[0][2], h[1][2], h[2][2]);

    let norms = h1.norm() * h2.norm();
    if !(norms > f64::EPSILON) {
        return Err(PnPError::Degenerate("homography has a null column"));
    }

    // scale so that ||r1|| ≈ ||r2|| ≈ 1
    let mut s = 1.0 / norms.sqrt();

    // the marker must lie in front of the camera
    if h3.z * s < 0.0 {
        s = -s;
    }

    let r1 = h1 * s;
    let r2 = h2 * s;
    let r3 = r1.cross(&r2);
    let t = h3 * s;

    // project onto SO(3)
    let approx = Matrix3::from_columns(&[r1, r2, r3]);
    let svd = approx.svd(true, true);
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return Err(PnPError::SvdFailed("rotation projection".to_string())),
    };

    let mut r = u * v_t;
    if r.determinant() < 0.0 {
        let flipped = -u.column(2).into_owned();
        let mut u_fixed = u;
        u_fixed.set_column(2, &flipped);
        r = u_fixed * v_t;
    }

    if !(t.z > 0.0) {
        return Err(PnPError::InvalidPose("marker is not in front of the camera"));
    }

    Ok((r, t))
}

/// Root-mean-square reprojection error for normalized image coordinates (K = I).
fn rmse_normalized(
    points_marker: &[[f64; 3]; 4],
    points_norm: &[[f64; 2]; 4],
    r: &Matrix3<f64>,
    t: &Vector3<f64>,
) -> Result<f64, PnPError> {
    let mut sum_sq = 0.0;
    for (pw, uv) in points_marker.iter().zip(points_norm.iter()) {
        let pc = r * Vector3::new(pw[0], pw[1], pw[2]) + t;
        if pc.z.abs() < 1e-9 {
            return Err(PnPError::InvalidPose(
                "projection has near-zero depth along z axis",
            ));
        }
        let du = pc.x / pc.z - uv[0];
        let dv = pc.y / pc.z - uv[1];
        sum_sq += du.mul_add(du, dv * dv);
    }
    Ok((sum_sq / points_marker.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_square_object_points() {
        let pts = square_object_points(0.05);
        assert_eq!(pts[0], [0.0, 0.0, 0.0]);
        assert_eq!(pts[1], [0.0, 0.05, 0.0]);
        assert_eq!(pts[2], [0.05, 0.05, 0.0]);
        assert_eq!(pts[3], [0.05, 0.0, 0.0]);
    }

    #[test]
    fn test_fronto_parallel_marker() -> Result<(), PnPError> {
        // marker 2 units straight ahead
        let img = [[0.0, 0.0], [0.0, 0.025], [0.025, 0.025], [0.025, 0.0]];
        let res = solve_square_marker(&img, 0.05)?;

        assert_relative_eq!(res.translation[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(res.translation[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(res.translation[2], 2.0, epsilon = 1e-9);
        for v in res.rvec {
            assert_relative_eq!(v, 0.0, epsilon = 1e-9);
        }
        assert!(res.reproj_rmse < 1e-9);

        let pose = res.to_pose();
        assert_eq!(pose.translation_vector, res.translation);
        Ok(())
    }

    #[test]
    fn test_rejects_non_positive_size() {
        let img = [[0.0, 0.0], [0.0, 0.025], [0.025, 0.025], [0.025, 0.0]];
        assert!(solve_square_marker(&img, 0.0).is_err());
        assert!(solve_square_marker(&img, -1.0).is_err());
    }
}
