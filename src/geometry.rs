//! Numeric and planar-geometry utilities shared by the mesh generators.
//!
//! All deck geometry lives in the global x (longitudinal) / z (transverse)
//! plane; y is the out-of-plane (elevation) axis. The helpers here operate
//! on that plane unless stated otherwise.

use crate::errors::MeshError;
use crate::float_types::{FRAC_PI_2, Real, tolerance};
use nalgebra::{Point3, Vector3};
use std::collections::BTreeMap;

/// In-plane (x,z) slope between two 3D points and its inclination angle.
///
/// Returns `(slope, phi)` where `phi = atan(slope)` in radians. A vertical
/// segment (no finite slope) yields `(None, π/2)`.
pub fn slope(a: &Point3<Real>, b: &Point3<Real>) -> (Option<Real>, Real) {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    if dx == 0.0 {
        (None, FRAC_PI_2)
    } else {
        let m = dz / dx;
        (Some(m), m.atan())
    }
}

/// Evaluate the straight line `z = m·x + c`.
#[inline]
pub fn line_eval(m: Real, c: Real, x: Real) -> Real {
    m * x + c
}

/// Least-squares straight-line fit `z = m·x + c` through `points` in the
/// (x,z) plane, via the normal equations.
///
/// Degenerate (two points) but kept general for future >2-point use.
pub fn least_squares_line(points: &[(Real, Real)]) -> Result<(Real, Real), MeshError> {
    let n = points.len() as Real;
    if points.len() < 2 {
        return Err(MeshError::InvalidParameter(
            "line fit needs at least two points".into(),
        ));
    }
    let sum_x: Real = points.iter().map(|p| p.0).sum();
    let sum_z: Real = points.iter().map(|p| p.1).sum();
    let sum_xx: Real = points.iter().map(|p| p.0 * p.0).sum();
    let sum_xz: Real = points.iter().map(|p| p.0 * p.1).sum();
    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < Real::EPSILON {
        return Err(MeshError::InvalidParameter(
            "line fit is vertical: all points share one x".into(),
        ));
    }
    let m = (n * sum_xz - sum_x * sum_z) / denom;
    let c = (sum_z - m * sum_x) / n;
    Ok((m, c))
}

/// Circle through three (x,z) points: returns `(center_x, center_z, radius)`.
///
/// Collinear input has a degenerate determinant and fails with
/// [`MeshError::DegenerateArc`]; a center is never fabricated.
pub fn circle_from_three_points(
    p1: (Real, Real),
    p2: (Real, Real),
    p3: (Real, Real),
) -> Result<(Real, Real, Real), MeshError> {
    let (x1, z1) = p1;
    let (x2, z2) = p2;
    let (x3, z3) = p3;
    // 2x2 system from equating squared distances to the unknown center
    let a11 = x2 - x1;
    let a12 = z2 - z1;
    let a21 = x3 - x1;
    let a22 = z3 - z1;
    let det = a11 * a22 - a12 * a21;
    if det.abs() < Real::EPSILON {
        return Err(MeshError::DegenerateArc);
    }
    let b1 = 0.5 * (x2 * x2 - x1 * x1 + z2 * z2 - z1 * z1);
    let b2 = 0.5 * (x3 * x3 - x1 * x1 + z3 * z3 - z1 * z1);
    let cx = (b1 * a22 - b2 * a12) / det;
    let cz = (b2 * a11 - b1 * a21) / det;
    let r = ((x1 - cx).powi(2) + (z1 - cz).powi(2)).sqrt();
    Ok((cx, cz, r))
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
pub fn linspace(start: Real, stop: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as Real;
            (0..n).map(|i| start + step * i as Real).collect()
        },
    }
}

/// Round `value` to `decimals` decimal places.
#[inline]
pub fn round_to(value: Real, decimals: u32) -> Real {
    let scale = (10.0 as Real).powi(decimals as i32);
    (value * scale).round() / scale
}

/// Distance between two points projected onto the (x,z) plane.
#[inline]
pub fn plan_distance(a: &Point3<Real>, b: &Point3<Real>) -> Real {
    ((a.x - b.x).powi(2) + (a.z - b.z).powi(2)).sqrt()
}

/// Unit vector parallel to the local x–z plane of the element spanning
/// `node_i` → `node_j`, i.e. the in-plane chord rotated 90° clockwise and
/// normalized. This is the out-of-plane direction the downstream solver's
/// geometric transform expects; y stays normal to the model plane.
pub fn vector_xz(node_i: &Point3<Real>, node_j: &Point3<Real>) -> Vector3<Real> {
    let xi = node_j.x - node_i.x;
    let zi = node_j.z - node_i.z;
    // (x, z) -> (z, -x)
    let v = Vector3::new(zi, 0.0, -xi);
    v / v.norm()
}

/// Characterization of the spacings along one axis of node positions.
///
/// Consecutive spacings that agree within the crate tolerance share a group
/// id; ids are monotonic starting at 1. Tributary widths are the half-sum
/// of the spacings either side of each node (a single half-spacing at the
/// two ends), the quantity member-assignment layers use to size slab strips.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacingProfile {
    /// Group id per interval between consecutive positions.
    pub interval_groups: Vec<usize>,
    /// Representative spacing for each group id.
    pub spacing_by_group: BTreeMap<usize, Real>,
    /// Tributary width per node position.
    pub tributary_widths: Vec<Real>,
}

/// Group consecutive node spacings that are numerically equal within the
/// crate tolerance.
pub fn characterize_spacings(positions: &[Real]) -> SpacingProfile {
    let tol = tolerance();
    let diffs: Vec<Real> = positions.windows(2).map(|w| w[1] - w[0]).collect();

    let mut interval_groups = Vec::with_capacity(diffs.len());
    let mut spacing_by_group = BTreeMap::new();
    let mut group = 0usize;
    for (i, d) in diffs.iter().enumerate() {
        if i == 0 || (d - diffs[i - 1]).abs() > tol {
            group += 1;
            spacing_by_group.insert(group, *d);
        }
        interval_groups.push(group);
    }

    let mut tributary_widths = Vec::with_capacity(positions.len());
    for i in 0..positions.len() {
        let left = if i > 0 { diffs[i - 1] } else { 0.0 };
        let right = if i < diffs.len() { diffs[i] } else { 0.0 };
        tributary_widths.push(0.5 * (left + right));
    }

    SpacingProfile {
        interval_groups,
        spacing_by_group,
        tributary_widths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_fit_symmetric() {
        let (cx, cz, r) = circle_from_three_points((0.0, 0.0), (10.0, 0.5), (20.0, 0.0)).unwrap();
        assert!((cx - 10.0).abs() < 1e-9);
        assert!(cz < 0.0);
        assert!((((0.0 - cx).powi(2) + (0.0 - cz).powi(2)).sqrt() - r).abs() < 1e-9);
    }

    #[test]
    fn circle_fit_collinear_fails() {
        let err = circle_from_three_points((0.0, 0.0), (1.0, 1.0), (2.0, 2.0)).unwrap_err();
        assert_eq!(err, MeshError::DegenerateArc);
    }

    #[test]
    fn linspace_endpoints() {
        let v = linspace(0.0, 10.0, 5);
        assert_eq!(v.len(), 5);
        assert_eq!(v[0], 0.0);
        assert_eq!(v[4], 10.0);
        assert!((v[1] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn vector_xz_is_unit_and_perpendicular() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 0.0, 4.0);
        let v = vector_xz(&a, &b);
        assert!((v.norm() - 1.0).abs() < 1e-12);
        // perpendicular to the chord in plan
        assert!((v.x * 3.0 + v.z * 4.0).abs() < 1e-12);
    }

    #[test]
    fn spacing_groups_and_tributaries() {
        // [0, 1, 2, 2.5, 3.0]: two groups (1.0 spacing then 0.5 spacing)
        let profile = characterize_spacings(&[0.0, 1.0, 2.0, 2.5, 3.0]);
        assert_eq!(profile.interval_groups, vec![1, 1, 2, 2]);
        assert_eq!(profile.spacing_by_group.len(), 2);
        assert!((profile.tributary_widths[0] - 0.5).abs() < 1e-12);
        assert!((profile.tributary_widths[2] - 0.75).abs() < 1e-12);
        assert!((profile.tributary_widths[4] - 0.25).abs() < 1e-12);
    }
}
