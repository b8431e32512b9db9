use simlabel_geometry::{IntrinsicCalibration, Pose};
use simlabel_image::Image;
use simlabel_imgproc::color::gray_from_rgb_u8;
use simlabel_pnp::solve_square_marker;
use simlabel_qr::QrDetector;

/// Estimates the camera pose relative to a fiducial marker visible in a frame.
pub trait MarkerPoseEstimator {
    /// The pose for this frame, or `None` when the marker is not found.
    fn estimate(&mut self, frame: &Image<u8, 3>) -> Option<Pose>;
}

impl<F> MarkerPoseEstimator for F
where
    F: FnMut(&Image<u8, 3>) -> Option<Pose>,
{
    fn estimate(&mut self, frame: &Image<u8, 3>) -> Option<Pose> {
        self(frame)
    }
}

/// Pose from the four corners of the first QR code in the frame.
pub struct QrMarkerEstimator {
    calib: IntrinsicCalibration,
    marker_size: f64,
    gray: Option<Image<u8, 1>>,
}

impl QrMarkerEstimator {
    /// Create an estimator for a QR marker with side `marker_size` metres.
    pub fn new(calib: IntrinsicCalibration, marker_size: f64) -> Self {
        Self {
            calib,
            marker_size,
            gray: None,
        }
    }

    fn to_gray(&mut self, frame: &Image<u8, 3>) -> Option<&Image<u8, 1>> {
        let reuse = matches!(&self.gray, Some(g) if g.size() == frame.size());
        if !reuse {
            self.gray = Image::from_size_val(frame.size(), 0).ok();
        }
        let gray = self.gray.as_mut()?;
        if let Err(e) = gray_from_rgb_u8(frame, gray) {
            log::debug!("gray conversion failed: {e}");
            return None;
        }
        Some(gray)
    }
}

impl MarkerPoseEstimator for QrMarkerEstimator {
    fn estimate(&mut self, frame: &Image<u8, 3>) -> Option<Pose> {
        let gray = self.to_gray(frame)?;

        let detection = match QrDetector::detect_first(gray) {
            Ok(d) => d,
            Err(e) => {
                log::debug!("{e}");
                return None;
            }
        };

        let corners = detection
            .corners
            .map(|[u, v]| self.calib.pixel_to_normalized(u, v));

        match solve_square_marker(&corners, self.marker_size) {
            Ok(res) => {
                log::debug!(
                    "marker pose rvec={:?} t={:?} rmse={:e}",
                    res.rvec,
                    res.translation,
                    res.reproj_rmse
                );
                Some(res.to_pose())
            }
            Err(e) => {
                log::debug!("marker pose failed: {e}");
                None
            }
        }
    }
}
