use nalgebra::{SMatrix, SVector};

use crate::PnPError;

/// Determinant of a 3x3 matrix stored row-major.
pub(crate) fn det_mat33(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// True when some three of the four points lie on a common line.
fn has_collinear_triple(pts: &[[f64; 2]; 4]) -> bool {
    const TRIPLES: [(usize, usize, usize); 4] = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];
    TRIPLES.iter().any(|&(a, b, c)| {
        let (pa, pb, pc) = (pts[a], pts[b], pts[c]);
        let cross = (pb[0] - pa[0]) * (pc[1] - pa[1]) - (pb[1] - pa[1]) * (pc[0] - pa[0]);
        cross.abs() < 1e-12
    })
}

/// Compute the homography matrix from four 2d point correspondences.
///
/// The last entry of the homography is fixed to one, which leaves an 8x8
/// linear system with a unique solution for points in general position.
///
/// # Arguments
///
/// * `x1` - The source 2d points with shape (4, 2).
/// * `x2` - The destination 2d points with shape (4, 2).
///
/// # Returns
///
/// The row-major homography mapping `x1` to `x2`.
pub fn homography_4pt2d(
    x1: &[[f64; 2]; 4],
    x2: &[[f64; 2]; 4],
) -> Result<[[f64; 3]; 3], PnPError> {
    if has_collinear_triple(x1) || has_collinear_triple(x2) {
        return Err(PnPError::Degenerate("three points are collinear"));
    }

    let mut mat_a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for (i, (p, q)) in x1.iter().zip(x2.iter()).enumerate() {
        let (r0, r1) = (2 * i, 2 * i + 1);

        mat_a[(r0, 0)] = p[0];
        mat_a[(r0, 1)] = p[1];
        mat_a[(r0, 2)] = 1.0;
        mat_a[(r0, 6)] = -q[0] * p[0];
        mat_a[(r0, 7)] = -q[0] * p[1];
        b[r0] = q[0];

        mat_a[(r1, 3)] = p[0];
        mat_a[(r1, 4)] = p[1];
        mat_a[(r1, 5)] = 1.0;
        mat_a[(r1, 6)] = -q[1] * p[0];
        mat_a[(r1, 7)] = -q[1] * p[1];
        b[r1] = q[1];
    }

    let h = mat_a
        .lu()
        .solve(&b)
        .ok_or(PnPError::Degenerate("homography system is singular"))?;

    let homo = [[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]];

    if homo.iter().flatten().any(|v| !v.is_finite()) {
        return Err(PnPError::Degenerate("homography is not finite"));
    }
    if det_mat33(&homo).abs() < 1e-12 {
        return Err(PnPError::Degenerate("homography determinant is too small"));
    }

    Ok(homo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn apply(h: &[[f64; 3]; 3], p: [f64; 2]) -> [f64; 2] {
        let w = h[2][0] * p[0] + h[2][1] * p[1] + h[2][2];
        [
            (h[0][0] * p[0] + h[0][1] * p[1] + h[0][2]) / w,
            (h[1][0] * p[0] + h[1][1] * p[1] + h[1][2]) / w,
        ]
    }

    #[test]
    fn test_homography_4pt2d_identity() -> Result<(), PnPError> {
        let x1 = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let homo = homography_4pt2d(&x1, &x1)?;
        let expected = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        for (row, exp) in homo.iter().zip(expected.iter()) {
            for (v, e) in row.iter().zip(exp.iter()) {
                assert_relative_eq!(v, e, epsilon = 1e-9);
            }
        }
        Ok(())
    }

    #[test]
    fn test_homography_4pt2d_perspective() -> Result<(), PnPError> {
        let truth = [[1.2, 0.1, 3.0], [-0.2, 0.9, -1.0], [0.01, 0.02, 1.0]];
        let x1 = [[0.0, 0.0], [10.0, 0.0], [10.0, 8.0], [0.0, 8.0]];
        let x2 = x1.map(|p| apply(&truth, p));

        let homo = homography_4pt2d(&x1, &x2)?;
        for (row, exp) in homo.iter().zip(truth.iter()) {
            for (v, e) in row.iter().zip(exp.iter()) {
                assert_relative_eq!(v, e, epsilon = 1e-8);
            }
        }
        Ok(())
    }

    #[test]
    fn test_homography_collinear_source() {
        let x1 = [[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let x2 = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        assert!(homography_4pt2d(&x1, &x2).is_err());
    }
}
