//! QR code detection for simlabel.
//!
//! This crate locates QR codes in grayscale frames and reports their corner
//! points. It uses the `rqrr` crate for the actual detection and decoding.

use rqrr::PreparedImage;
use simlabel_image::Image;
use thiserror::Error;

/// Error type for QR code detection and decoding operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QrError {
    /// No QR codes found in the image.
    #[error("No QR codes found in the image")]
    NoQrCodesFound,
}

/// The four corners of a detected QR code in pixel coordinates.
///
/// Ordered top-left, top-right, bottom-right, bottom-left with respect to the
/// code's own orientation.
pub type QrCorners = [[f64; 2]; 4];

/// Information about a detected QR code.
#[derive(Debug, Clone, PartialEq)]
pub struct QrDetection {
    /// The corner points of the QR code in the image.
    pub corners: QrCorners,
    /// The decoded content, if the payload could be read.
    pub content: Option<String>,
}

/// QR code detector.
///
/// Provides methods to detect QR codes in grayscale images.
pub struct QrDetector;

impl QrDetector {
    /// Detects QR codes in a grayscale image.
    ///
    /// Codes whose position is found but whose payload fails to decode are
    /// still reported, with `content` set to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::NoQrCodesFound`] when no code is located.
    pub fn detect(image: &Image<u8, 1>) -> Result<Vec<QrDetection>, QrError> {
        let (width, height) = (image.width(), image.height());
        let data = image.as_slice();

        let mut prepared =
            PreparedImage::prepare_from_greyscale(width, height, |x, y| data[y * width + x]);

        let grids = prepared.detect_grids();
        if grids.is_empty() {
            return Err(QrError::NoQrCodesFound);
        }

        let detections = grids
            .into_iter()
            .map(|grid| {
                let b = grid.bounds;
                let corners = [
                    [b[0].x as f64, b[0].y as f64],
                    [b[1].x as f64, b[1].y as f64],
                    [b[2].x as f64, b[2].y as f64],
                    [b[3].x as f64, b[3].y as f64],
                ];

                let content = match grid.decode() {
                    Ok((_meta, content)) => Some(content),
                    Err(e) => {
                        log::debug!("QR code located but not decoded: {e}");
                        None
                    }
                };

                QrDetection { corners, content }
            })
            .collect();

        Ok(detections)
    }

    /// Detects the first QR code in a grayscale image.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::NoQrCodesFound`] when no code is located.
    pub fn detect_first(image: &Image<u8, 1>) -> Result<QrDetection, QrError> {
        Self::detect(image)?
            .into_iter()
            .next()
            .ok_or(QrError::NoQrCodesFound)
    }
}
