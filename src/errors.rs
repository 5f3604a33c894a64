//! Mesh construction errors

use crate::float_types::Real;
use nalgebra::Point3;

/// All the ways mesh construction can fail.
///
/// Every variant is a construction-time failure: none of them are
/// recoverable mid-mesh, and a failed construction leaves no partially
/// usable [`Mesh`](crate::mesh::Mesh) behind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// The three sweep-path control points are collinear; no circle
    /// passes through them.
    #[error("invalid arc geometry: sweep path control points are collinear")]
    DegenerateArc,

    /// Skew angle too shallow relative to the sweep inclination for an
    /// orthogonal mesh.
    #[error(
        "skew angle {angle}° too small for an orthogonal mesh (threshold {threshold}°); \
         use an oblique mesh or set skip_skew_check"
    )]
    SkewTooSmallForOrthogonal { angle: Real, threshold: Real },

    /// Skew angle too steep relative to the sweep inclination for an
    /// oblique (skewed) mesh.
    #[error(
        "skew angle {angle}° too large for an oblique mesh (threshold {threshold}°); \
         use an orthogonal mesh or set skip_skew_check"
    )]
    SkewTooLargeForOblique { angle: Real, threshold: Real },

    /// The normal-projection search hit its iteration cap before the
    /// perpendicular-distance minimum was bracketed.
    #[error("normal-projection search did not converge after {iterations} iterations")]
    SearchDidNotConverge { iterations: usize },

    /// A coordinate was not found on an edge construction line within the
    /// crate tolerance.
    #[error("coordinate ({}, {}, {}) not found on edge construction line", .0.x, .0.y, .0.z)]
    CoordinateNotFound(Point3<Real>),

    /// A construction parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
