//! Sweep path: the longitudinal reference curve of the deck.

use crate::errors::MeshError;
use crate::float_types::Real;
use crate::geometry::{circle_from_three_points, least_squares_line, line_eval, round_to};
use nalgebra::Point3;

/// Decimal places kept on the fitted line slope.
const SLOPE_DECIMALS: u32 = 4;

#[derive(Debug, Clone, PartialEq)]
enum PathKind {
    /// Straight reference line `z = m·x + c` in plan.
    Line { m: Real, c: Real },
    /// Circular arc through the origin in plan.
    Arc {
        center_x: Real,
        center_z: Real,
        radius: Real,
    },
}

/// The longitudinal reference curve the deck centerline follows, derived
/// from two control points (straight line) or three (circular arc through
/// the origin). Immutable after construction; queried for the transverse
/// position of the curve at a longitudinal station.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPath {
    kind: PathKind,
    /// Inclination of the path tangent at the origin, degrees.
    zeta: Real,
}

impl SweepPath {
    /// Fit a sweep path through the control points.
    ///
    /// With `pt3` absent the path is a straight line through `pt1` and
    /// `pt2` (least-squares, kept general for future >2-point use) forced
    /// through the origin. With `pt3` present the path is the circle
    /// through the origin, `pt2`, and `pt3`; collinear control points fail
    /// with [`MeshError::DegenerateArc`].
    pub fn new(
        pt1: Point3<Real>,
        pt2: Point3<Real>,
        pt3: Option<Point3<Real>>,
    ) -> Result<Self, MeshError> {
        match pt3 {
            Some(p3) => {
                let (center_x, center_z, radius) =
                    circle_from_three_points((0.0, 0.0), (pt2.x, pt2.z), (p3.x, p3.z))?;
                // tangent of the circle at the origin
                let zeta = (-center_x / center_z).atan().to_degrees();
                Ok(Self {
                    kind: PathKind::Arc {
                        center_x,
                        center_z,
                        radius,
                    },
                    zeta,
                })
            },
            None => {
                let (m, _c) = least_squares_line(&[(pt1.x, pt1.z), (pt2.x, pt2.z)])?;
                let m = round_to(m, SLOPE_DECIMALS);
                // intercept forced through the origin
                let c = 0.0;
                let zeta = m.atan().to_degrees();
                Ok(Self {
                    kind: PathKind::Line { m, c },
                    zeta,
                })
            },
        }
    }

    /// Transverse (z) position of the reference curve at longitudinal
    /// position `x`.
    ///
    /// For an arc this is the circle branch passing through the origin; the
    /// square-root argument is clamped at zero so the curve stays defined
    /// (and continuous) at the arc's extreme abscissa.
    pub fn elevation_at(&self, x: Real) -> Real {
        match self.kind {
            PathKind::Line { m, c } => line_eval(m, c, x),
            PathKind::Arc {
                center_x,
                center_z,
                radius,
            } => {
                let half_chord = (radius * radius - (x - center_x).powi(2)).max(0.0).sqrt();
                if center_z <= 0.0 {
                    center_z + half_chord
                } else {
                    center_z - half_chord
                }
            },
        }
    }

    /// Inclination of the path tangent at the origin, in degrees.
    pub const fn zeta(&self) -> Real {
        self.zeta
    }

    /// Slope of the straight path, `None` for an arc.
    pub const fn slope(&self) -> Option<Real> {
        match self.kind {
            PathKind::Line { m, .. } => Some(m),
            PathKind::Arc { .. } => None,
        }
    }

    /// Intercept of the straight path, `None` for an arc.
    pub const fn intercept(&self) -> Option<Real> {
        match self.kind {
            PathKind::Line { c, .. } => Some(c),
            PathKind::Arc { .. } => None,
        }
    }

    /// Arc parameters `(center_x, center_z, radius)`, `None` for a line.
    pub const fn arc_parameters(&self) -> Option<(Real, Real, Real)> {
        match self.kind {
            PathKind::Line { .. } => None,
            PathKind::Arc {
                center_x,
                center_z,
                radius,
            } => Some((center_x, center_z, radius)),
        }
    }

    /// Whether the path is a circular arc.
    pub const fn is_arc(&self) -> bool {
        matches!(self.kind, PathKind::Arc { .. })
    }
}
