//! Mesh generation: node/element synthesis and derived groupings.
//!
//! [`Mesh::new`] consumes a [`MeshConfig`], runs one of the two meshing
//! algorithms (oblique fixed-sweep or orthogonal), then the grouping
//! post-pass, and returns a finished read-only snapshot. All tag-keyed
//! lookups are `BTreeMap`s so iteration — and therefore generation — is
//! fully deterministic.

mod builder;
mod grouping;
mod transform;

pub use grouping::{GridCell, GridNeighbours, MemberZones};
pub use transform::TransformRegistry;

use crate::edge_line::EdgeConstructionLine;
use crate::errors::MeshError;
use crate::float_types::Real;
use crate::geometry::SpacingProfile;
use crate::sweep::SweepPath;
use nalgebra::{Point3, Vector3};
use std::collections::BTreeMap;

/// Allowed skew band, degrees: below the first bound an orthogonal mesh
/// degenerates; above the second an oblique mesh shears too far.
pub const SKEW_THRESHOLD: [Real; 2] = [11.0, 30.0];

/// One mesh node: a tag, a 3D coordinate, and its logical column/row
/// indices in the generated grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSpec {
    /// Unique tag, monotonically assigned from 1.
    pub tag: usize,
    pub coordinate: Point3<Real>,
    /// Longitudinal station (column) index.
    pub x_group: usize,
    /// Transverse line (row) index.
    pub z_group: usize,
}

/// One beam element between two nodes.
///
/// `group` means different things per element kind: the z-group (row) for
/// longitudinal elements, the x-group (station) for transverse elements,
/// and a monotonically assigned edge-segment id for edge-span elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub tag: usize,
    pub node_i: usize,
    pub node_j: usize,
    pub group: usize,
    /// Geometric transform tag shared by all parallel elements.
    pub transform: usize,
}

/// Geometric and meshing parameters for one grillage deck.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshConfig {
    /// Longitudinal span of the deck.
    pub long_dim: Real,
    /// Transverse width of the deck.
    pub width: Real,
    /// Transverse dimension measured along the skewed edge.
    pub trans_dim: Real,
    /// Setback of the first interior longitudinal line from each edge.
    pub edge_width: Real,
    /// Number of transverse stations along the span.
    pub num_trans_beam: usize,
    /// Number of longitudinal lines across the width (edges included).
    pub num_long_beam: usize,
    /// Skew angle at the start edge, degrees.
    pub skew_1: Real,
    /// Skew angle at the end edge, degrees.
    pub skew_2: Real,
    /// Orthogonal meshing (interior columns perpendicular to the sweep
    /// path) instead of oblique fixed-sweep meshing.
    pub orthogonal: bool,
    /// Sweep path control points; `pt3` switches the path to a circular arc.
    pub pt1: Point3<Real>,
    pub pt2: Point3<Real>,
    pub pt3: Option<Point3<Real>>,
    /// Origin offset of the whole mesh.
    pub mesh_origin: Point3<Real>,
    /// Accepted for interface parity with quad-element callers; currently
    /// inert downstream.
    pub quad_ele: bool,
    /// Explicit opt-out of the skew-threshold validation. The check is on
    /// by default.
    pub skip_skew_check: bool,
}

impl MeshConfig {
    /// Config with the given core dimensions and neutral defaults for the
    /// rest: straight sweep path along x, origin at zero, oblique meshing,
    /// skew validation on.
    pub fn new(
        long_dim: Real,
        width: Real,
        trans_dim: Real,
        edge_width: Real,
        num_trans_beam: usize,
        num_long_beam: usize,
        skew_1: Real,
        skew_2: Real,
    ) -> Self {
        Self {
            long_dim,
            width,
            trans_dim,
            edge_width,
            num_trans_beam,
            num_long_beam,
            skew_1,
            skew_2,
            orthogonal: false,
            pt1: Point3::origin(),
            pt2: Point3::new(long_dim, 0.0, 0.0),
            pt3: None,
            mesh_origin: Point3::origin(),
            quad_ele: false,
            skip_skew_check: false,
        }
    }
}

/// A finished grillage mesh.
///
/// Built once, eagerly, inside [`Mesh::new`]; afterwards the value is a
/// queryable snapshot with no mutation API. Element sequences are in
/// assignment order; tags are contiguous from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// The parameters the mesh was generated from.
    pub config: MeshConfig,
    /// The longitudinal reference curve.
    pub sweep_path: SweepPath,
    pub start_edge_line: EdgeConstructionLine,
    pub end_edge_line: EdgeConstructionLine,
    /// Transverse offsets of the longitudinal lines (from the start edge).
    pub noz: Vec<Real>,
    /// Node tag → node record.
    pub node_spec: BTreeMap<usize, NodeSpec>,
    /// Longitudinal elements, grouped by z-group.
    pub long_ele: Vec<Element>,
    /// Transverse elements, grouped by x-group.
    pub trans_ele: Vec<Element>,
    /// Skewed edge-span elements, grouped by edge-segment id.
    pub edge_span_ele: Vec<Element>,
    /// Direction-keyed transform registry.
    pub transforms: TransformRegistry,
    /// Node tag → edge group, for nodes on a model edge (used downstream
    /// for boundary-condition detection).
    pub edge_node_recorder: BTreeMap<usize, usize>,
    /// Node tag → per-adjacent-transverse-element absolute coordinate
    /// spans (tributary-width bookkeeping across the z axis).
    pub node_width_z: BTreeMap<usize, Vec<Vector3<Real>>>,
    /// Node tag → per-adjacent-longitudinal-element absolute coordinate
    /// spans (tributary-width bookkeeping across the x axis).
    pub node_width_x: BTreeMap<usize, Vec<Vector3<Real>>>,
    /// Node tag → neighbour node tags along the z axis.
    pub node_connect_z: BTreeMap<usize, Vec<usize>>,
    /// Node tag → neighbour node tags along the x axis.
    pub node_connect_x: BTreeMap<usize, Vec<usize>>,
    /// Row index → longitudinal elements on that row.
    pub z_group_to_ele: BTreeMap<usize, Vec<Element>>,
    /// Station index → transverse elements at that station.
    pub x_group_to_ele: BTreeMap<usize, Vec<Element>>,
    /// Synthetic grid-cell id → cell (3 or 4 corner node tags).
    pub grid_cells: BTreeMap<usize, GridCell>,
    /// Grid-cell id → directional neighbours.
    pub grid_vicinity: BTreeMap<usize, GridNeighbours>,
    /// Spacing characterization of the transverse offsets.
    pub noz_profile: SpacingProfile,
    /// Spacing characterization of the longitudinal stations.
    pub nox_profile: SpacingProfile,
    /// Final value of the node counter (next unused tag).
    pub node_counter: usize,
    /// Final value of the element counter (next unused tag).
    pub element_counter: usize,
    /// Number of x-grid columns generated.
    pub x_grid_count: usize,
    /// Number of edge groups recorded.
    pub edge_count: usize,
}

impl Mesh {
    /// Build the whole mesh eagerly. On error no partially-usable mesh is
    /// left behind.
    pub fn new(config: MeshConfig) -> Result<Self, MeshError> {
        builder::MeshBuilder::build(config)
    }

    /// Classification of the z-groups (longitudinal lines) into the
    /// structural zones downstream section assignment works with.
    pub fn member_zones(&self) -> MemberZones {
        MemberZones::from_line_count(self.noz.len())
    }

    /// Tags of the nodes recorded against `edge_group`, ascending.
    pub fn nodes_on_edge(&self, edge_group: usize) -> Vec<usize> {
        self.edge_node_recorder
            .iter()
            .filter(|&(_, &group)| group == edge_group)
            .map(|(&tag, _)| tag)
            .collect()
    }
}
