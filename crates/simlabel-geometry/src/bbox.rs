use glam::{DQuat, DVec3, DVec4};

use crate::label::LabeledBox;

/// The eight box corners in camera-relative 3D space, ordered by [`VERTEX_SIGNS`].
pub type BoxVertices3D = [[f64; 3]; 8];

/// The eight box corners in integer pixel coordinates, ordered by [`VERTEX_SIGNS`].
pub type BoxVertices2D = [[i64; 2]; 8];

// The two tables below are positional contracts: BOX_EDGES indexes into the
// order of VERTEX_SIGNS. Corners 0..4 form the +x face and 4..8 the -x face,
// each walked as a ring where consecutive corners differ in a single sign.

/// Sign of the half-extent along (x, y, z) for each corner.
pub const VERTEX_SIGNS: [[f64; 3]; 8] = [
    [1.0, 1.0, 1.0],
    [1.0, 1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
];

/// Corner index pairs forming the box wireframe.
///
/// Ring edges of both faces come first, then the closing edge of each ring,
/// then the four edges joining corner `i` to `i + 4`.
pub const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (4, 5),
    (1, 2),
    (5, 6),
    (2, 3),
    (6, 7),
    (0, 3),
    (4, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Compute the eight corners of a labeled box.
///
/// Each half-extent combination is rotated by the box quaternion and offset by
/// the box position. The quaternion is normalized first; a zero quaternion
/// yields NaN corners, which projection rejects.
///
/// # Example
///
/// ```
/// use simlabel_geometry::{bbox::box_vertices, LabeledBox};
///
/// let label = LabeledBox::from_components(
///     "unit",
///     &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0],
/// );
/// let vertices = box_vertices(&label);
/// assert_eq!(vertices[0], [1.0, 1.0, 1.0]);
/// assert_eq!(vertices[6], [-1.0, -1.0, -1.0]);
/// ```
pub fn box_vertices(label: &LabeledBox) -> BoxVertices3D {
    let rotation = DVec4::from_array(label.rotation)
        .try_normalize()
        .map_or(DQuat::NAN, DQuat::from_vec4);
    let position = DVec3::from_array(label.position);
    let half = DVec3::from_array(label.scale) * 0.5;

    VERTEX_SIGNS.map(|sign| {
        let corner = DVec3::from_array(sign) * half;
        (position + rotation.mul_vec3(corner)).to_array()
    })
}

/// Build the 12 wireframe edges of a box from its eight ordered corners.
///
/// Works on any corner representation; the output pairs follow [`BOX_EDGES`].
///
/// # Example
///
/// ```
/// use simlabel_geometry::bbox::box_edges;
///
/// let corners = [0u8, 1, 2, 3, 4, 5, 6, 7];
/// let edges = box_edges(&corners);
/// assert_eq!(edges[0], (0, 1));
/// assert_eq!(edges[11], (3, 7));
/// ```
pub fn box_edges<P: Copy>(vertices: &[P; 8]) -> [(P, P); 12] {
    BOX_EDGES.map(|(a, b)| (vertices[a], vertices[b]))
}
