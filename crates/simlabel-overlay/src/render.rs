use simlabel_geometry::{
    bbox::box_edges, projection::project_box, BoxVertices3D, IntrinsicCalibration, Pose,
    ProjectionError,
};
use simlabel_image::Image;
use simlabel_imgproc::draw::draw_segments;

/// Color and width of the wireframe lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle<const C: usize> {
    /// Line color.
    pub color: [u8; C],
    /// Line width in pixels.
    pub thickness: usize,
}

impl Default for LineStyle<3> {
    fn default() -> Self {
        Self {
            color: [0, 0, 0],
            thickness: 4,
        }
    }
}

/// Project a box into the frame and draw its 12-edge wireframe in place.
///
/// Nothing is drawn when the projection fails.
///
/// # Arguments
///
/// * `img` - The frame to draw on.
/// * `vertices` - The box corners in the marker frame.
/// * `pose` - Camera pose relative to the marker.
/// * `calib` - Camera intrinsics and distortion.
/// * `style` - Line color and width.
pub fn draw_box<const C: usize>(
    img: &mut Image<u8, C>,
    vertices: &BoxVertices3D,
    pose: &Pose,
    calib: &IntrinsicCalibration,
    style: &LineStyle<C>,
) -> Result<(), ProjectionError> {
    let pixels = project_box(vertices, pose, calib)?;
    let edges = box_edges(&pixels);
    draw_segments(img, &edges, style.color, style.thickness);
    Ok(())
}
