use approx::assert_relative_eq;
use nalgebra::{Rotation3, Vector3};
use simlabel_pnp::{solve_square_marker, square_object_points, PnPError};

fn project(rvec: [f64; 3], t: [f64; 3], size: f64) -> [[f64; 2]; 4] {
    let r = Rotation3::from_scaled_axis(Vector3::from(rvec));
    let t = Vector3::from(t);
    square_object_points(size).map(|p| {
        let pc = r * Vector3::from(p) + t;
        [pc.x / pc.z, pc.y / pc.z]
    })
}

#[test]
fn recovers_tilted_pose() -> Result<(), PnPError> {
    let rvec = [0.3, -0.2, 0.1];
    let t = [0.02, -0.01, 0.6];
    let img = project(rvec, t, 0.05);

    let res = solve_square_marker(&img, 0.05)?;
    for k in 0..3 {
        assert_relative_eq!(res.rvec[k], rvec[k], epsilon = 1e-6);
        assert_relative_eq!(res.translation[k], t[k], epsilon = 1e-6);
    }
    assert!(res.reproj_rmse < 1e-9);
    Ok(())
}

#[test]
fn rotation_is_orthonormal() -> Result<(), PnPError> {
    let img = project([0.1, 0.4, -0.3], [0.0, 0.05, 1.5], 0.1);
    let res = solve_square_marker(&img, 0.1)?;

    let r = res.rotation;
    for i in 0..3 {
        for j in 0..3 {
            let dot: f64 = (0..3).map(|k| r[k][i] * r[k][j]).sum();
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_relative_eq!(dot, expected, epsilon = 1e-9);
        }
    }
    Ok(())
}

#[test]
fn degenerate_corners_fail() {
    let img = [[0.1, 0.1]; 4];
    assert!(matches!(
        solve_square_marker(&img, 0.05),
        Err(PnPError::Degenerate(_))
    ));
}

#[test]
fn collinear_corners_fail() {
    let img = [[0.0, 0.0], [0.1, 0.1], [0.2, 0.2], [0.3, 0.3]];
    assert!(solve_square_marker(&img, 0.05).is_err());
}
