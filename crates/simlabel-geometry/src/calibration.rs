use crate::error::GeometryError;

/// Represents the intrinsic parameters of a pinhole camera
///
/// # Fields
///
/// * `fx` - The focal length in the x direction
/// * `fy` - The focal length in the y direction
/// * `cx` - The x coordinate of the principal point
/// * `cy` - The y coordinate of the principal point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsic {
    /// The focal length in the x direction
    pub fx: f64,
    /// The focal length in the y direction
    pub fy: f64,
    /// The x coordinate of the principal point
    pub cx: f64,
    /// The y coordinate of the principal point
    pub cy: f64,
}

/// Represents the polynomial distortion parameters of a camera (rational Brown-Conrady model).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolynomialDistortion {
    /// The first radial distortion coefficient
    pub k1: f64,
    /// The second radial distortion coefficient
    pub k2: f64,
    /// The third radial distortion coefficient
    pub k3: f64,
    /// The fourth radial distortion coefficient
    pub k4: f64,
    /// The fifth radial distortion coefficient
    pub k5: f64,
    /// The sixth radial distortion coefficient
    pub k6: f64,
    /// The first tangential distortion coefficient
    pub p1: f64,
    /// The second tangential distortion coefficient
    pub p2: f64,
}

impl PolynomialDistortion {
    /// Distortion parameters with all coefficients set to zero.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build the model from a coefficient vector in OpenCV order
    /// `k1, k2, p1, p2[, k3[, k4, k5, k6]]`.
    ///
    /// An empty vector means no distortion. Accepted lengths are 0, 4, 5 and 8.
    pub fn from_coefficients(coeffs: &[f64]) -> Result<Self, GeometryError> {
        let get = |i: usize| coeffs.get(i).copied().unwrap_or(0.0);
        match coeffs.len() {
            0 | 4 | 5 | 8 => Ok(Self {
                k1: get(0),
                k2: get(1),
                p1: get(2),
                p2: get(3),
                k3: get(4),
                k4: get(5),
                k5: get(6),
                k6: get(7),
            }),
            n => Err(GeometryError::InvalidInput(format!(
                "distortion must have 0, 4, 5 or 8 coefficients, got {n}"
            ))),
        }
    }

    /// Check if there is any distortion.
    pub fn has_distortion(&self) -> bool {
        [
            self.k1, self.k2, self.k3, self.k4, self.k5, self.k6, self.p1, self.p2,
        ]
        .iter()
        .any(|&k| k != 0.0)
    }

    /// Apply the distortion to a point in normalized image coordinates.
    pub fn distort_normalized(&self, x: f64, y: f64) -> (f64, f64) {
        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let r6 = r4 * r2;

        let kr = (1.0 + self.k1 * r2 + self.k2 * r4 + self.k3 * r6)
            / (1.0 + self.k4 * r2 + self.k5 * r4 + self.k6 * r6);

        let xd = x * kr + 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
        let yd = y * kr + self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;

        (xd, yd)
    }

    /// Invert [`Self::distort_normalized`] by fixed-point iteration.
    pub fn undistort_normalized(&self, xd: f64, yd: f64) -> (f64, f64) {
        const MAX_ITERATIONS: usize = 20;
        const EPSILON: f64 = 1e-12;

        let (mut x, mut y) = (xd, yd);
        for _ in 0..MAX_ITERATIONS {
            let (px, py) = self.distort_normalized(x, y);
            let (dx, dy) = (xd - px, yd - py);
            x += dx;
            y += dy;
            if dx.abs() < EPSILON && dy.abs() < EPSILON {
                break;
            }
        }
        (x, y)
    }
}

/// Intrinsic calibration of one physical camera: camera matrix plus distortion coefficients.
///
/// Immutable once built; the coefficient vector is kept in its original order
/// so it can be written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct IntrinsicCalibration {
    matrix: [[f64; 3]; 3],
    coefficients: Vec<f64>,
    intrinsic: CameraIntrinsic,
    distortion: PolynomialDistortion,
}

impl IntrinsicCalibration {
    /// Create a calibration from a row-major 3x3 camera matrix and OpenCV-ordered distortion coefficients.
    ///
    /// # Errors
    ///
    /// Fails when a value is not finite, a focal length is zero or the
    /// coefficient count is not supported.
    pub fn new(matrix: [[f64; 3]; 3], distortion: Vec<f64>) -> Result<Self, GeometryError> {
        if matrix.iter().flatten().chain(distortion.iter()).any(|v| !v.is_finite()) {
            return Err(GeometryError::InvalidInput(
                "calibration holds non-finite values".to_string(),
            ));
        }

        let intrinsic = CameraIntrinsic {
            fx: matrix[0][0],
            fy: matrix[1][1],
            cx: matrix[0][2],
            cy: matrix[1][2],
        };
        if intrinsic.fx == 0.0 || intrinsic.fy == 0.0 {
            return Err(GeometryError::InvalidInput(
                "camera matrix has a zero focal length".to_string(),
            ));
        }

        let model = PolynomialDistortion::from_coefficients(&distortion)?;

        Ok(Self {
            matrix,
            coefficients: distortion,
            intrinsic,
            distortion: model,
        })
    }

    /// Create a calibration from 9 row-major values.
    pub fn from_flat(matrix: &[f64], distortion: Vec<f64>) -> Result<Self, GeometryError> {
        if matrix.len() != 9 {
            return Err(GeometryError::InvalidInput(format!(
                "camera matrix must have 9 values, got {}",
                matrix.len()
            )));
        }
        let m = [
            [matrix[0], matrix[1], matrix[2]],
            [matrix[3], matrix[4], matrix[5]],
            [matrix[6], matrix[7], matrix[8]],
        ];
        Self::new(m, distortion)
    }

    /// The row-major camera matrix.
    pub fn matrix(&self) -> &[[f64; 3]; 3] {
        &self.matrix
    }

    /// The distortion coefficients as supplied.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// The pinhole parameters.
    pub fn intrinsic(&self) -> &CameraIntrinsic {
        &self.intrinsic
    }

    /// The distortion model.
    pub fn distortion(&self) -> &PolynomialDistortion {
        &self.distortion
    }

    /// Map a point in normalized camera coordinates to distorted pixel coordinates.
    pub fn normalized_to_pixel(&self, x: f64, y: f64) -> [f64; 2] {
        let (xd, yd) = self.distortion.distort_normalized(x, y);
        let k = &self.intrinsic;
        [k.fx * xd + k.cx, k.fy * yd + k.cy]
    }

    /// Map a distorted pixel to undistorted normalized camera coordinates.
    pub fn pixel_to_normalized(&self, u: f64, v: f64) -> [f64; 2] {
        let k = &self.intrinsic;
        let xd = (u - k.cx) / k.fx;
        let yd = (v - k.cy) / k.fy;
        if !self.distortion.has_distortion() {
            return [xd, yd];
        }
        let (x, y) = self.distortion.undistort_normalized(xd, yd);
        [x, y]
    }
}
