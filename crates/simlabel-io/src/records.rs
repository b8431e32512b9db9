use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};
use simlabel_geometry::{GeometryError, IntrinsicCalibration, LabeledBox};

use crate::{error::IoError, saver::FileSaver};

/// File name, without extension, of a saved calibration record.
pub const CALIBRATION_FILE_NAME: &str = "calibration";

/// File name, without extension, of the meta record written by the relay.
pub const META_FILE_NAME: &str = "meta";

/// A camera matrix stored either as 9 row-major values or as nested rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatrixField {
    /// Nine row-major values.
    Flat(Vec<f64>),
    /// A list of rows.
    Nested(Vec<Vec<f64>>),
}

/// Distortion coefficients stored flat or as a nested list such as OpenCV's `1xN` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DistortionField {
    /// The coefficients in OpenCV order.
    Flat(Vec<f64>),
    /// A nested list, flattened row by row.
    Nested(Vec<Vec<f64>>),
}

impl Default for DistortionField {
    fn default() -> Self {
        DistortionField::Flat(Vec::new())
    }
}

/// The persisted form of an [`IntrinsicCalibration`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    /// The 3x3 camera matrix.
    pub matrix: MatrixField,
    /// The distortion coefficients.
    #[serde(default)]
    pub distortion: DistortionField,
}

impl CalibrationRecord {
    /// Build the validated calibration.
    ///
    /// # Errors
    ///
    /// Fails when the matrix is not 3x3 or the coefficients are not usable.
    pub fn to_calibration(&self) -> Result<IntrinsicCalibration, GeometryError> {
        let distortion = match &self.distortion {
            DistortionField::Flat(v) => v.clone(),
            DistortionField::Nested(rows) => rows.concat(),
        };

        match &self.matrix {
            MatrixField::Flat(v) => IntrinsicCalibration::from_flat(v, distortion),
            MatrixField::Nested(rows) => {
                if rows.len() != 3 || rows.iter().any(|r| r.len() != 3) {
                    return Err(GeometryError::InvalidInput(format!(
                        "camera matrix must be 3x3, got {} rows",
                        rows.len()
                    )));
                }
                IntrinsicCalibration::from_flat(&rows.concat(), distortion)
            }
        }
    }
}

impl From<&IntrinsicCalibration> for CalibrationRecord {
    fn from(calib: &IntrinsicCalibration) -> Self {
        Self {
            matrix: MatrixField::Nested(calib.matrix().iter().map(|r| r.to_vec()).collect()),
            distortion: DistortionField::Nested(vec![calib.coefficients().to_vec()]),
        }
    }
}

impl TryFrom<CalibrationRecord> for IntrinsicCalibration {
    type Error = GeometryError;

    fn try_from(record: CalibrationRecord) -> Result<Self, Self::Error> {
        record.to_calibration()
    }
}

/// Load a calibration record from a YAML or JSON file.
pub fn load_calibration(path: impl AsRef<std::path::Path>) -> Result<IntrinsicCalibration, IoError> {
    let record: CalibrationRecord = crate::saver::read_document(path)?;
    Ok(record.to_calibration()?)
}

/// Save a calibration through `saver` under [`CALIBRATION_FILE_NAME`].
pub fn save_calibration(saver: &FileSaver, calib: &IntrinsicCalibration) -> Result<PathBuf, IoError> {
    saver.save(CALIBRATION_FILE_NAME, &CalibrationRecord::from(calib))
}

/// One labeled object as sent by the simulation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRecord {
    /// Box center, engine convention.
    pub pos: Vec<f64>,
    /// Box orientation quaternion `(x, y, z, w)`, engine convention.
    pub rot: Vec<f64>,
    /// Box extents, engine convention.
    pub scale: Vec<f64>,
}

/// A captured label session: object name to label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSession {
    /// The labels, ordered by object name.
    pub labels: BTreeMap<String, LabelRecord>,
}

impl LabelSession {
    /// Remap every label to the robot convention.
    ///
    /// # Errors
    ///
    /// Fails on the first label with a field of the wrong length; no partial
    /// result is returned.
    pub fn to_boxes(&self) -> Result<Vec<LabeledBox>, GeometryError> {
        self.labels
            .iter()
            .map(|(name, l)| LabeledBox::from_engine_parts(name.as_str(), &l.pos, &l.rot, &l.scale))
            .collect()
    }
}

/// Load a label session from a YAML or JSON file and remap it to the robot convention.
pub fn load_session(path: impl AsRef<std::path::Path>) -> Result<Vec<LabeledBox>, IoError> {
    let session: LabelSession = crate::saver::read_document(path)?;
    Ok(session.to_boxes()?)
}

/// Pointer to the most recently saved label session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRecord {
    /// Path of the latest saved session file.
    pub latest_file: PathBuf,
}
