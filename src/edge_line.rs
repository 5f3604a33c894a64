//! Edge construction line: the skewed row of nodes at one transverse
//! boundary (start or end) of the deck.

use crate::errors::MeshError;
use crate::float_types::{Real, tolerance};
use crate::geometry::linspace;
use nalgebra::Point3;

/// One transverse boundary line of the deck.
///
/// The transverse offsets place the two edge-adjacent longitudinal lines a
/// beam-offset in from either edge and spread the interior lines evenly
/// between them; the skew angle shears the whole line in x. Immutable after
/// construction; each end of the deck owns its own instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeConstructionLine {
    /// Reference point the line is anchored at.
    pub edge_ref_point: Point3<Real>,
    /// Ordered transverse offsets of the longitudinal lines, from 0 to the
    /// full deck width.
    pub noz: Vec<Real>,
    /// 3D coordinates of the edge line's nodes, one per offset in `noz`.
    pub node_list: Vec<Point3<Real>>,
    /// Skew angle of the edge, degrees.
    pub angle: Real,
    /// Plan slope of the edge line, `None` when unskewed.
    pub slope: Option<Real>,
    /// Plan intercept of the edge line, `None` when unskewed.
    pub intercept: Option<Real>,
}

impl EdgeConstructionLine {
    /// Build the edge line.
    ///
    /// `width` is the full transverse deck width, `edge_width` the setback
    /// of the first interior longitudinal line from each edge, `angle` the
    /// skew in degrees, `num_long_beam` the total count of longitudinal
    /// lines (edges included), `model_plane_y` the constant elevation of
    /// the model plane.
    pub fn new(
        edge_ref_point: Point3<Real>,
        width: Real,
        edge_width: Real,
        angle: Real,
        num_long_beam: usize,
        model_plane_y: Real,
    ) -> Result<Self, MeshError> {
        if num_long_beam < 3 {
            return Err(MeshError::InvalidParameter(format!(
                "num_long_beam must be at least 3, got {num_long_beam}"
            )));
        }
        if !(edge_width > 0.0 && 2.0 * edge_width < width) {
            return Err(MeshError::InvalidParameter(format!(
                "edge_width {edge_width} must be positive and less than half the width {width}"
            )));
        }

        // [0, edge_width ..= width - edge_width, width]
        let last_girder = width - edge_width;
        let mut noz = Vec::with_capacity(num_long_beam);
        noz.push(0.0);
        noz.extend(linspace(edge_width, last_girder, num_long_beam - 2));
        noz.push(width);

        let tan_angle = (angle.to_radians()).tan();
        let node_list = noz
            .iter()
            .map(|&z| {
                Point3::new(
                    edge_ref_point.x - z * tan_angle,
                    edge_ref_point.y + model_plane_y,
                    edge_ref_point.z + z,
                )
            })
            .collect();

        let (slope, intercept) = if angle != 0.0 {
            let m = -1.0 / tan_angle;
            (Some(m), Some(edge_ref_point.z - m * edge_ref_point.x))
        } else {
            (None, None)
        };

        Ok(Self {
            edge_ref_point,
            noz,
            node_list,
            angle,
            slope,
            intercept,
        })
    }

    /// Row (z-group) index of `coordinate` on this edge line.
    ///
    /// Coordinates are produced by floating-point generation upstream, so
    /// matching is componentwise within the crate tolerance rather than
    /// exact; no match within tolerance is a
    /// [`MeshError::CoordinateNotFound`].
    pub fn node_group_z(&self, coordinate: &Point3<Real>) -> Result<usize, MeshError> {
        let tol = tolerance();
        self.node_list
            .iter()
            .position(|p| {
                (p.x - coordinate.x).abs() <= tol
                    && (p.y - coordinate.y).abs() <= tol
                    && (p.z - coordinate.z).abs() <= tol
            })
            .ok_or(MeshError::CoordinateNotFound(*coordinate))
    }
}
