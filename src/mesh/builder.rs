//! The mesh builder: owns every counter and intermediate structure during
//! generation, then freezes into a [`Mesh`] snapshot.
//!
//! Two mutually exclusive algorithms walk the longitudinal direction:
//!
//! - **fixed-sweep (oblique)**: every transverse column is a copy of the
//!   start edge line, offset along the sweep path;
//! - **orthogonal**: the start and end edge regions are resolved column by
//!   column with a normal-projection search against the sweep path, and
//!   the interior is filled with evenly spaced columns perpendicular to
//!   the path.

use log::{debug, info};
use nalgebra::Point3;
use std::collections::BTreeMap;

use super::transform::TransformRegistry;
use super::{Element, Mesh, MeshConfig, NodeSpec, SKEW_THRESHOLD, grouping};
use crate::edge_line::EdgeConstructionLine;
use crate::errors::MeshError;
use crate::float_types::Real;
use crate::geometry::{characterize_spacings, linspace, plan_distance, round_to, slope, vector_xz};
use crate::sweep::SweepPath;

/// Step of the 1D normal-projection coordinate descent.
const SEARCH_X_INC: Real = 0.001;
/// Iteration cap of the normal-projection search.
const MAX_SEARCH_ITERATIONS: usize = 10_000;
/// Decimal places kept on generated elevations.
const ELEVATION_DECIMALS: u32 = 3;

pub(super) struct MeshBuilder {
    cfg: MeshConfig,
    sweep_path: SweepPath,
    /// Sweep-path inclination at the origin, degrees.
    zeta: Real,
    start_edge: EdgeConstructionLine,
    end_edge: EdgeConstructionLine,
    /// Transverse offsets shared by every sweep-node template.
    noz: Vec<Real>,
    /// Node template swept along the path: the start edge line for oblique
    /// meshing, the rotated offset fan for orthogonal meshing.
    sweeping_nodes: Vec<Point3<Real>>,
    /// Longitudinal stations of the oblique mesh.
    nox: Vec<Real>,
    /// Constant elevation of the model plane.
    y_elevation: Real,

    node_counter: usize,
    element_counter: usize,
    x_grid_count: usize,
    edge_count: usize,

    node_spec: BTreeMap<usize, NodeSpec>,
    long_ele: Vec<Element>,
    trans_ele: Vec<Element>,
    edge_span_ele: Vec<Element>,
    transforms: TransformRegistry,
    edge_node_recorder: BTreeMap<usize, usize>,

    first_connecting_region_nodes: Vec<usize>,
    end_connecting_region_nodes: Vec<usize>,
}

impl MeshBuilder {
    pub(super) fn build(cfg: MeshConfig) -> Result<Mesh, MeshError> {
        validate(&cfg)?;

        let sweep_path = SweepPath::new(cfg.pt1, cfg.pt2, cfg.pt3)?;
        let zeta = sweep_path.zeta();
        if !cfg.skip_skew_check {
            check_skew(&cfg, zeta)?;
        }

        let y_elevation = 0.0;
        let start_edge = EdgeConstructionLine::new(
            cfg.mesh_origin,
            cfg.width,
            cfg.edge_width,
            cfg.skew_1,
            cfg.num_long_beam,
            y_elevation,
        )?;
        let end_point_z = sweep_path.elevation_at(cfg.long_dim);
        let end_edge = EdgeConstructionLine::new(
            Point3::new(cfg.long_dim, 0.0, end_point_z),
            cfg.width,
            cfg.edge_width,
            cfg.skew_2,
            cfg.num_long_beam,
            y_elevation,
        )?;

        let noz = start_edge.noz.clone();
        let nox = linspace(0.0, cfg.long_dim, cfg.num_trans_beam);

        let mut builder = Self {
            cfg,
            sweep_path,
            zeta,
            start_edge,
            end_edge,
            noz,
            sweeping_nodes: Vec::new(),
            nox,
            y_elevation,
            node_counter: 1,
            element_counter: 1,
            x_grid_count: 0,
            edge_count: 0,
            node_spec: BTreeMap::new(),
            long_ele: Vec::new(),
            trans_ele: Vec::new(),
            edge_span_ele: Vec::new(),
            transforms: TransformRegistry::new(),
            edge_node_recorder: BTreeMap::new(),
            first_connecting_region_nodes: Vec::new(),
            end_connecting_region_nodes: Vec::new(),
        };

        // the sweep-node template's slope is always orthogonal to the
        // sweep path tangent at the reference point
        builder.sweeping_nodes = if builder.cfg.orthogonal {
            builder.rotate_sweep_nodes(builder.zeta.to_radians())
        } else {
            builder.start_edge.node_list.clone()
        };

        if builder.cfg.orthogonal {
            builder.orthogonal_meshing()?;
        } else {
            builder.fixed_sweep_meshing();
        }

        builder.finish()
    }

    fn finish(self) -> Result<Mesh, MeshError> {
        let groupings = grouping::identify_member_groups(
            &self.node_spec,
            &self.long_ele,
            &self.trans_ele,
            &self.edge_span_ele,
            self.noz.len(),
            self.x_grid_count,
        );
        let noz_profile = characterize_spacings(&self.noz);
        let nox_profile = characterize_spacings(&self.nox);

        info!(
            "grillage mesh complete: {} nodes, {} elements ({} longitudinal, {} transverse, {} edge-span), {} transforms",
            self.node_spec.len(),
            self.element_counter - 1,
            self.long_ele.len(),
            self.trans_ele.len(),
            self.edge_span_ele.len(),
            self.transforms.len(),
        );

        Ok(Mesh {
            config: self.cfg,
            sweep_path: self.sweep_path,
            start_edge_line: self.start_edge,
            end_edge_line: self.end_edge,
            noz: self.noz,
            node_spec: self.node_spec,
            long_ele: self.long_ele,
            trans_ele: self.trans_ele,
            edge_span_ele: self.edge_span_ele,
            transforms: self.transforms,
            edge_node_recorder: self.edge_node_recorder,
            node_width_z: groupings.node_width_z,
            node_width_x: groupings.node_width_x,
            node_connect_z: groupings.node_connect_z,
            node_connect_x: groupings.node_connect_x,
            z_group_to_ele: groupings.z_group_to_ele,
            x_group_to_ele: groupings.x_group_to_ele,
            grid_cells: groupings.grid_cells,
            grid_vicinity: groupings.grid_vicinity,
            noz_profile,
            nox_profile,
            node_counter: self.node_counter,
            element_counter: self.element_counter,
            x_grid_count: self.x_grid_count,
            edge_count: self.edge_count,
        })
    }

    // -------------------------------------------------------------------
    // oblique (fixed-sweep) meshing
    // -------------------------------------------------------------------

    fn fixed_sweep_meshing(&mut self) {
        let stations = self.nox.clone();
        let template = self.sweeping_nodes.clone();
        let mut previous: Vec<usize> = Vec::new();

        for (x_count, &x_inc) in stations.iter().enumerate() {
            let z_inc = round_to(self.sweep_path.elevation_at(x_inc), ELEVATION_DECIMALS);
            let mut assigned: Vec<usize> = Vec::with_capacity(template.len());

            for (z_count, ref_point) in template.iter().enumerate() {
                let coordinate =
                    Point3::new(ref_point.x + x_inc, ref_point.y, ref_point.z + z_inc);
                let tag = self.add_node(coordinate, x_count, z_count);
                assigned.push(tag);
                if z_count > 0 {
                    self.assign_transverse_member(assigned[z_count - 1], assigned[z_count], x_count);
                }
            }

            if x_count == 0 {
                self.record_edge_nodes(&assigned);
            } else {
                self.link_longitudinal(&previous, &assigned);
                if x_count == stations.len() - 1 {
                    self.record_edge_nodes(&assigned);
                }
            }
            previous = assigned;
            self.x_grid_count += 1;
        }
        debug!("oblique meshing complete: {} stations", stations.len());
    }

    // -------------------------------------------------------------------
    // orthogonal meshing
    // -------------------------------------------------------------------

    fn orthogonal_meshing(&mut self) -> Result<(), MeshError> {
        self.mesh_start_edge_region()?;
        debug!("edge mesh at start span complete");
        self.mesh_end_edge_region()?;
        debug!("edge mesh at end span complete");
        self.mesh_uniform_region()?;
        debug!("orthogonal meshing complete");
        Ok(())
    }

    /// Start-edge region: either the edge line is near-orthogonal and used
    /// directly, or every edge node is resolved with the normal-projection
    /// search and a shrinking fan of rotated sweep nodes.
    fn mesh_start_edge_region(&mut self) -> Result<(), MeshError> {
        if (self.cfg.skew_1 + self.zeta).abs() < SKEW_THRESHOLD[0] {
            let column = self.place_edge_column(&self.start_edge.node_list.clone());
            self.first_connecting_region_nodes = column;
            self.x_grid_count += 1;
            self.edge_count += 1;
            return Ok(());
        }

        let int_points = self.start_edge.node_list.clone();
        let mut previous: Vec<usize> = Vec::new();
        for (z_count, int_point) in int_points.iter().enumerate() {
            let (ref_x, ref_z) = self.search_x_point(int_point)?;
            let ref_point = Point3::new(ref_x, self.y_elevation, ref_z);
            let (_m_prime, phi) = slope(&ref_point, int_point);
            // a positive skew can make the first point look orthogonal
            // already; seed the rotation from zeta instead
            let angle = if self.cfg.skew_1 > 0.0 {
                self.zeta.to_radians()
            } else {
                crate::float_types::FRAC_PI_2 - phi.abs()
            };
            let rotated = self.rotate_sweep_nodes(angle);
            let z_group = self.start_edge.node_group_z(int_point)?;

            // the sign of the combined skew decides which end of the
            // rotated template is new at this column
            let (sweep_nodes, z_groups) = if self.cfg.skew_1 + self.zeta > 0.0 {
                (
                    rotated[z_count..].to_vec(),
                    (z_group..rotated.len()).collect::<Vec<_>>(),
                )
            } else {
                (
                    rotated[..=z_count].to_vec(),
                    if z_group != 0 {
                        (0..=z_group).collect::<Vec<_>>()
                    } else {
                        vec![0]
                    },
                )
            };

            let assigned = self.place_column(&sweep_nodes, &z_groups, ref_x, ref_z);

            if z_count > 0 {
                self.link_longitudinal(&previous, &assigned);
                if !assigned.is_empty() {
                    if self.cfg.skew_1 + self.zeta > 0.0 {
                        self.link_edge_span(previous[0], assigned[0]);
                    } else {
                        self.link_edge_span(previous[previous.len() - 1], assigned[assigned.len() - 1]);
                    }
                }
            }
            previous = assigned.clone();
            self.x_grid_count += 1;
            if assigned.len() == self.noz.len() {
                self.first_connecting_region_nodes = assigned;
            }
        }
        self.edge_count += 1;
        Ok(())
    }

    /// End-edge region, symmetric to the start with mirrored slicing.
    fn mesh_end_edge_region(&mut self) -> Result<(), MeshError> {
        if (self.cfg.skew_2 + self.zeta).abs() < SKEW_THRESHOLD[0] {
            let column = self.place_edge_column(&self.end_edge.node_list.clone());
            self.end_connecting_region_nodes = column;
            self.x_grid_count += 1;
            self.edge_count += 1;
            return Ok(());
        }

        let int_points = self.end_edge.node_list.clone();
        let mut previous: Vec<usize> = Vec::new();
        for (z_count, int_point) in int_points.iter().enumerate() {
            let (ref_x, ref_z) = self.search_x_point(int_point)?;
            let ref_point = Point3::new(ref_x, self.y_elevation, ref_z);
            let (_m_prime, phi) = slope(&ref_point, int_point);
            let rotated = self.rotate_sweep_nodes(crate::float_types::FRAC_PI_2 - phi.abs());
            let z_group = self.end_edge.node_group_z(int_point)?;

            let (sweep_nodes, z_groups) = if self.cfg.skew_2 + self.zeta > 0.0 {
                (
                    rotated[..=z_count].to_vec(),
                    if z_group != 0 {
                        (0..=z_group).collect::<Vec<_>>()
                    } else {
                        vec![0]
                    },
                )
            } else {
                (
                    rotated[z_count..].to_vec(),
                    (z_group..rotated.len()).collect::<Vec<_>>(),
                )
            };

            let assigned = self.place_column(&sweep_nodes, &z_groups, ref_x, ref_z);

            if z_count > 0 {
                self.link_longitudinal(&previous, &assigned);
                if !assigned.is_empty() {
                    if self.cfg.skew_2 + self.zeta > 0.0 {
                        self.link_edge_span(previous[previous.len() - 1], assigned[assigned.len() - 1]);
                    } else {
                        self.link_edge_span(previous[0], assigned[0]);
                    }
                }
            }
            previous = assigned.clone();
            self.x_grid_count += 1;
            if assigned.len() == self.noz.len() {
                self.end_connecting_region_nodes = assigned;
            }
        }
        self.edge_count += 1;
        Ok(())
    }

    /// Interior region: evenly spaced full columns between the connecting
    /// columns captured by the two edge regions.
    fn mesh_uniform_region(&mut self) -> Result<(), MeshError> {
        if self.first_connecting_region_nodes.is_empty()
            || self.end_connecting_region_nodes.is_empty()
        {
            return Err(MeshError::InvalidParameter(
                "edge regions produced no full connecting column; \
                 increase num_long_beam or reduce the skew"
                    .into(),
            ));
        }
        let cor_fir = self.node_spec[&self.first_connecting_region_nodes[0]].coordinate;
        let cor_sec = self.node_spec[&self.end_connecting_region_nodes[0]].coordinate;
        let uniform_region_x = linspace(cor_fir.x, cor_sec.x, self.cfg.num_trans_beam);

        let mut previous = self.first_connecting_region_nodes.clone();
        if uniform_region_x.len() > 2 {
            for &x in &uniform_region_x[1..uniform_region_x.len() - 1] {
                let z = self.sweep_path.elevation_at(x);
                let rotated = self.rotate_sweep_nodes(self.zeta.to_radians());
                let z_groups: Vec<usize> = (0..rotated.len()).collect();
                let assigned = self.place_column(&rotated, &z_groups, x, z);
                self.link_longitudinal(&previous, &assigned);
                self.x_grid_count += 1;
                previous = assigned;
            }
        }
        // connect the last interior column (or the start edge itself) to
        // the end edge region
        let end_nodes = self.end_connecting_region_nodes.clone();
        self.link_longitudinal(&previous, &end_nodes);
        Ok(())
    }

    // -------------------------------------------------------------------
    // node/element helpers
    // -------------------------------------------------------------------

    fn add_node(&mut self, coordinate: Point3<Real>, x_group: usize, z_group: usize) -> usize {
        let tag = self.node_counter;
        self.node_spec.insert(
            tag,
            NodeSpec {
                tag,
                coordinate,
                x_group,
                z_group,
            },
        );
        self.node_counter += 1;
        tag
    }

    /// Place one column of nodes at `(ref_x, ref_z)` with explicit
    /// z-groups, linking consecutive nodes as transverse members.
    fn place_column(
        &mut self,
        sweep_nodes: &[Point3<Real>],
        z_groups: &[usize],
        ref_x: Real,
        ref_z: Real,
    ) -> Vec<usize> {
        let mut assigned = Vec::with_capacity(sweep_nodes.len());
        for (i, p) in sweep_nodes.iter().enumerate() {
            let coordinate = Point3::new(p.x + ref_x, p.y, p.z + ref_z);
            let tag = self.add_node(coordinate, self.x_grid_count, z_groups[i]);
            assigned.push(tag);
            if i > 0 {
                self.assign_transverse_member(assigned[i - 1], assigned[i], self.x_grid_count);
            }
        }
        assigned
    }

    /// Place a near-orthogonal edge line verbatim as one column, linking
    /// its nodes as edge-span members.
    fn place_edge_column(&mut self, nodes: &[Point3<Real>]) -> Vec<usize> {
        let mut assigned = Vec::with_capacity(nodes.len());
        for (z_count, p) in nodes.iter().enumerate() {
            let tag = self.add_node(*p, self.x_grid_count, z_count);
            assigned.push(tag);
            if z_count > 0 {
                self.link_edge_span(assigned[z_count - 1], assigned[z_count]);
            }
        }
        assigned
    }

    fn assign_transverse_member(&mut self, pre_node: usize, cur_node: usize, x_group: usize) {
        let transform = self.geo_transform_tag(pre_node, cur_node);
        self.trans_ele.push(Element {
            tag: self.element_counter,
            node_i: pre_node,
            node_j: cur_node,
            group: x_group,
            transform,
        });
        self.element_counter += 1;
    }

    fn assign_longitudinal_member(&mut self, pre_node: usize, cur_node: usize, z_group: usize) {
        let transform = self.geo_transform_tag(pre_node, cur_node);
        self.long_ele.push(Element {
            tag: self.element_counter,
            node_i: pre_node,
            node_j: cur_node,
            group: z_group,
            transform,
        });
        self.element_counter += 1;
    }

    /// Edge-span member between two nodes, recorded against the current
    /// edge group.
    fn link_edge_span(&mut self, pre_node: usize, cur_node: usize) {
        let transform = self.geo_transform_tag(pre_node, cur_node);
        self.edge_span_ele.push(Element {
            tag: self.element_counter,
            node_i: pre_node,
            node_j: cur_node,
            group: self.edge_count,
            transform,
        });
        self.element_counter += 1;
        self.edge_node_recorder.entry(pre_node).or_insert(self.edge_count);
        self.edge_node_recorder.entry(cur_node).or_insert(self.edge_count);
    }

    /// Link every node of `previous` to the node of `assigned` sharing its
    /// z-group, as a longitudinal member.
    fn link_longitudinal(&mut self, previous: &[usize], assigned: &[usize]) {
        for &pre_node in previous {
            let pre_z_group = self.node_spec[&pre_node].z_group;
            for &cur_node in assigned {
                if self.node_spec[&cur_node].z_group == pre_z_group {
                    self.assign_longitudinal_member(pre_node, cur_node, pre_z_group);
                    break;
                }
            }
        }
    }

    /// Record a whole station column as one edge group (boundary-condition
    /// detection reads these later).
    fn record_edge_nodes(&mut self, nodes: &[usize]) {
        for &tag in nodes {
            self.edge_node_recorder.entry(tag).or_insert(self.edge_count);
        }
        self.edge_count += 1;
    }

    fn geo_transform_tag(&mut self, node_i: usize, node_j: usize) -> usize {
        let a = self.node_spec[&node_i].coordinate;
        let b = self.node_spec[&node_j].coordinate;
        self.transforms.tag_for(&vector_xz(&a, &b))
    }

    // -------------------------------------------------------------------
    // geometry helpers
    // -------------------------------------------------------------------

    /// The sweep-node template rotated by `zeta` radians about the mesh
    /// origin: offsets `(0, z)` map to `(−z·sin ζ, z·cos ζ)`.
    fn rotate_sweep_nodes(&self, zeta: Real) -> Vec<Point3<Real>> {
        let origin = self.cfg.mesh_origin;
        self.noz
            .iter()
            .map(|&z| {
                Point3::new(
                    -z * zeta.sin() + origin.x,
                    self.y_elevation + origin.y,
                    z * zeta.cos() + origin.z,
                )
            })
            .collect()
    }

    /// 1D coordinate descent along the sweep path for the position whose
    /// local normal passes through `int_point`.
    ///
    /// Compares the perpendicular distance at `x`, `x ± inc` and steps
    /// toward the smaller neighbour; converged when both neighbours are
    /// farther. Hitting the iteration cap is a hard error rather than an
    /// unvalidated estimate.
    fn search_x_point(&self, int_point: &Point3<Real>) -> Result<(Real, Real), MeshError> {
        let mut x = int_point.x;
        let inc = SEARCH_X_INC;
        for _ in 0..MAX_SEARCH_ITERATIONS {
            let z0 = self.sweep_path.elevation_at(x);
            let z_ub = self.sweep_path.elevation_at(x + inc);
            let z_lb = self.sweep_path.elevation_at(x - inc);
            let d0 = plan_distance(int_point, &Point3::new(x, self.y_elevation, z0));
            let d_ub = plan_distance(int_point, &Point3::new(x + inc, self.y_elevation, z_ub));
            let d_lb = plan_distance(int_point, &Point3::new(x - inc, self.y_elevation, z_lb));
            if d_lb > d0 && d_ub > d0 {
                return Ok((x, z0));
            }
            if d_lb < d0 {
                x -= inc;
            } else {
                x += inc;
            }
        }
        Err(MeshError::SearchDidNotConverge {
            iterations: MAX_SEARCH_ITERATIONS,
        })
    }
}

fn validate(cfg: &MeshConfig) -> Result<(), MeshError> {
    if !(cfg.long_dim > 0.0) {
        return Err(MeshError::InvalidParameter(format!(
            "long_dim must be positive, got {}",
            cfg.long_dim
        )));
    }
    if !(cfg.width > 0.0) {
        return Err(MeshError::InvalidParameter(format!(
            "width must be positive, got {}",
            cfg.width
        )));
    }
    if cfg.num_trans_beam < 2 {
        return Err(MeshError::InvalidParameter(format!(
            "num_trans_beam must be at least 2, got {}",
            cfg.num_trans_beam
        )));
    }
    for angle in [cfg.skew_1, cfg.skew_2] {
        if angle.abs() >= 90.0 {
            return Err(MeshError::InvalidParameter(format!(
                "skew angle {angle}° must lie strictly between -90° and 90°"
            )));
        }
    }
    Ok(())
}

/// Skew-threshold validation against the sweep inclination, applied to
/// both end angles.
fn check_skew(cfg: &MeshConfig, zeta: Real) -> Result<(), MeshError> {
    for angle in [cfg.skew_1, cfg.skew_2] {
        let relative = (angle - zeta).abs();
        if cfg.orthogonal && relative <= SKEW_THRESHOLD[0] {
            return Err(MeshError::SkewTooSmallForOrthogonal {
                angle,
                threshold: SKEW_THRESHOLD[0],
            });
        }
        if !cfg.orthogonal && relative >= SKEW_THRESHOLD[1] {
            return Err(MeshError::SkewTooLargeForOblique {
                angle,
                threshold: SKEW_THRESHOLD[1],
            });
        }
    }
    Ok(())
}
