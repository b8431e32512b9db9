#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Pipeline
//!
//! A label authored in the simulation engine is a flat 10-vector
//! `position ‖ rotation (x, y, z, w) ‖ scale`. It is remapped to the robot
//! convention with [`remap::ENGINE_TO_ROBOT`], expanded into the eight box
//! corners with [`bbox::box_vertices`], projected into the image with
//! [`projection::project_box`] and finally wired up with [`bbox::box_edges`].
//!
//! ```rust
//! use simlabel_geometry::{
//!     bbox::{box_edges, box_vertices},
//!     projection::project_box,
//!     IntrinsicCalibration, LabeledBox, Pose,
//! };
//!
//! let label = LabeledBox::from_engine(
//!     "crate",
//!     &[0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
//! )?;
//! let calib = IntrinsicCalibration::new(
//!     [[100.0, 0.0, 64.0], [0.0, 100.0, 48.0], [0.0, 0.0, 1.0]],
//!     vec![],
//! )?;
//!
//! let vertices = box_vertices(&label);
//! let pixels = project_box(&vertices, &Pose::identity(), &calib)?;
//! assert_eq!(box_edges(&pixels).len(), 12);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Box corner generation and wireframe topology.
pub mod bbox;

/// Camera intrinsics and lens distortion.
pub mod calibration;

/// Error types for the geometry crate.
pub mod error;

/// Labeled boxes as authored by the simulation engine.
pub mod label;

/// Camera pose relative to a fiducial marker.
pub mod pose;

/// Projection of camera-relative points into pixel coordinates.
pub mod projection;

/// Axis-convention remapping between the engine and the robot frame.
pub mod remap;

pub use bbox::{BoxVertices2D, BoxVertices3D, BOX_EDGES, VERTEX_SIGNS};
pub use calibration::{CameraIntrinsic, IntrinsicCalibration, PolynomialDistortion};
pub use error::{GeometryError, ProjectionError};
pub use label::LabeledBox;
pub use pose::Pose;
pub use remap::{AxisRemap, ENGINE_TO_ROBOT};
