//! Member-grouping post-pass: tributary-width and neighbour bookkeeping,
//! row/column element maps, logical grid cells, and the planar adjacency
//! between cells.

use super::{Element, NodeSpec};
use crate::float_types::Real;
use nalgebra::Vector3;
use std::collections::{BTreeMap, BTreeSet};

/// A logical grid cell: the 4 corner node tags bounded by a node, its
/// x-neighbour, its z-neighbour, and the diagonal node sharing both
/// groups — or 3 tags when the diagonal partner is absent (triangular
/// cells at a skewed region).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub nodes: Vec<usize>,
}

impl GridCell {
    pub fn contains(&self, node_tag: usize) -> bool {
        self.nodes.contains(&node_tag)
    }
}

/// Directional neighbours of a grid cell. Top/bottom run along the z axis,
/// left/right along the x axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridNeighbours {
    pub top: Option<usize>,
    pub bottom: Option<usize>,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

/// Classification of z-groups (longitudinal lines) into structural zones:
/// the two physical edge beams, the exterior main beams just inside them,
/// and the interior main beams between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberZones {
    pub edge_beam: Vec<usize>,
    pub exterior_main_beam_1: Vec<usize>,
    pub interior_main_beam: Vec<usize>,
    pub exterior_main_beam_2: Vec<usize>,
}

impl MemberZones {
    /// Zones for a deck with `line_count` longitudinal lines.
    pub fn from_line_count(line_count: usize) -> Self {
        Self {
            edge_beam: vec![0, line_count - 1],
            exterior_main_beam_1: vec![1],
            interior_main_beam: (2..line_count.saturating_sub(2)).collect(),
            exterior_main_beam_2: vec![line_count - 2],
        }
    }
}

pub(super) struct Groupings {
    pub node_width_z: BTreeMap<usize, Vec<Vector3<Real>>>,
    pub node_width_x: BTreeMap<usize, Vec<Vector3<Real>>>,
    pub node_connect_z: BTreeMap<usize, Vec<usize>>,
    pub node_connect_x: BTreeMap<usize, Vec<usize>>,
    pub z_group_to_ele: BTreeMap<usize, Vec<Element>>,
    pub x_group_to_ele: BTreeMap<usize, Vec<Element>>,
    pub grid_cells: BTreeMap<usize, GridCell>,
    pub grid_vicinity: BTreeMap<usize, GridNeighbours>,
}

/// Absolute componentwise span of an element's two endpoints.
fn element_span(node_spec: &BTreeMap<usize, NodeSpec>, ele: &Element) -> Vector3<Real> {
    let a = node_spec[&ele.node_i].coordinate;
    let b = node_spec[&ele.node_j].coordinate;
    Vector3::new((a.x - b.x).abs(), (a.y - b.y).abs(), (a.z - b.z).abs())
}

/// For one endpoint of `ele`, collect the spans of the crossing elements
/// touching it and the tags of the neighbour nodes they lead to.
fn endpoint_vicinity(
    node_spec: &BTreeMap<usize, NodeSpec>,
    ele: &Element,
    endpoint: usize,
    crossing: &[Element],
) -> (Vec<Vector3<Real>>, Vec<usize>) {
    let mut spans = Vec::new();
    let mut neighbours = Vec::new();
    for item in crossing
        .iter()
        .filter(|c| c.node_i == endpoint || c.node_j == endpoint)
    {
        spans.push(element_span(node_spec, item));
        if item.node_i != ele.node_i && item.node_i != ele.node_j {
            neighbours.push(item.node_i);
        }
        if item.node_j != ele.node_i && item.node_j != ele.node_j {
            neighbours.push(item.node_j);
        }
    }
    (spans, neighbours)
}

/// Derive every grouping structure from the generated nodes and elements.
pub(super) fn identify_member_groups(
    node_spec: &BTreeMap<usize, NodeSpec>,
    long_ele: &[Element],
    trans_ele: &[Element],
    edge_span_ele: &[Element],
    noz_len: usize,
    x_grid_count: usize,
) -> Groupings {
    // node tag → z-axis widths and neighbours, from the transverse
    // elements touching each longitudinal element's endpoints
    let mut node_width_z: BTreeMap<usize, Vec<Vector3<Real>>> = BTreeMap::new();
    let mut node_connect_z: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for ele in long_ele {
        for endpoint in [ele.node_i, ele.node_j] {
            let (spans, neighbours) = endpoint_vicinity(node_spec, ele, endpoint, trans_ele);
            node_width_z.entry(endpoint).or_insert(spans);
            node_connect_z.entry(endpoint).or_insert(neighbours);
        }
    }

    // node tag → x-axis widths and neighbours, from the longitudinal
    // elements touching each transverse/edge-span element's endpoints
    let mut node_width_x: BTreeMap<usize, Vec<Vector3<Real>>> = BTreeMap::new();
    let mut node_connect_x: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for ele in trans_ele.iter().chain(edge_span_ele.iter()) {
        for endpoint in [ele.node_i, ele.node_j] {
            let (spans, neighbours) = endpoint_vicinity(node_spec, ele, endpoint, long_ele);
            node_width_x.entry(endpoint).or_insert(spans);
            node_connect_x.entry(endpoint).or_insert(neighbours);
        }
    }

    let mut z_group_to_ele: BTreeMap<usize, Vec<Element>> = BTreeMap::new();
    for z_group in 0..noz_len {
        z_group_to_ele.insert(
            z_group,
            long_ele.iter().filter(|e| e.group == z_group).copied().collect(),
        );
    }
    let mut x_group_to_ele: BTreeMap<usize, Vec<Element>> = BTreeMap::new();
    for x_group in 0..x_grid_count {
        x_group_to_ele.insert(
            x_group,
            trans_ele.iter().filter(|e| e.group == x_group).copied().collect(),
        );
    }

    let grid_cells = synthesize_grid_cells(node_spec, &node_connect_x, &node_connect_z);
    let grid_vicinity = classify_grid_vicinity(node_spec, &grid_cells);

    Groupings {
        node_width_z,
        node_width_x,
        node_connect_z,
        node_connect_x,
        z_group_to_ele,
        x_group_to_ele,
        grid_cells,
        grid_vicinity,
    }
}

/// Cross every node's x-neighbours with its z-neighbours to form 4-node
/// logical cells (3-node when the diagonal partner is missing),
/// deduplicating cells that contain the same node set.
fn synthesize_grid_cells(
    node_spec: &BTreeMap<usize, NodeSpec>,
    node_connect_x: &BTreeMap<usize, Vec<usize>>,
    node_connect_z: &BTreeMap<usize, Vec<usize>>,
) -> BTreeMap<usize, GridCell> {
    // (x_group, z_group) → lowest node tag, the join key for the diagonal
    // corner
    let mut group_index: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for (&tag, node) in node_spec {
        group_index.entry((node.x_group, node.z_group)).or_insert(tag);
    }

    let mut cells: BTreeMap<usize, GridCell> = BTreeMap::new();
    let mut counter = 0usize;
    let empty: Vec<usize> = Vec::new();
    for &node_tag in node_spec.keys() {
        let x_vicinity = node_connect_x.get(&node_tag).unwrap_or(&empty);
        let z_vicinity = node_connect_z.get(&node_tag).unwrap_or(&empty);
        for &x_node in x_vicinity {
            let x_group = node_spec[&x_node].x_group;
            for &z_node in z_vicinity {
                let z_group = node_spec[&z_node].z_group;
                let diagonal = group_index.get(&(x_group, z_group)).copied();

                let mut nodes = vec![node_tag, x_node];
                if let Some(diagonal) = diagonal {
                    nodes.push(diagonal);
                }
                nodes.push(z_node);

                let already_present = cells
                    .values()
                    .any(|cell| nodes.iter().all(|&n| cell.contains(n)));
                if !already_present {
                    cells.insert(counter, GridCell { nodes });
                    counter += 1;
                }
            }
        }
    }
    cells
}

fn unique_sorted<T: Copy + PartialOrd>(values: &mut Vec<T>) {
    values.sort_by(|a, b| a.partial_cmp(b).expect("grid values are finite"));
    values.dedup_by(|a, b| a == b);
}

fn max_of(values: &[Real]) -> Real {
    values.iter().copied().fold(Real::MIN, Real::max)
}

/// Classify, for every cell, each cell sharing at least one node as its
/// top/bottom/left/right neighbour: matching x-group sets mean the
/// neighbour lies along z (top/bottom by z coordinate), matching z-group
/// sets mean it lies along x (left/right by x coordinate).
fn classify_grid_vicinity(
    node_spec: &BTreeMap<usize, NodeSpec>,
    grid_cells: &BTreeMap<usize, GridCell>,
) -> BTreeMap<usize, GridNeighbours> {
    // node tag → cells touching it, to avoid a full cell × cell scan
    let mut cells_of_node: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (&id, cell) in grid_cells {
        for &node in &cell.nodes {
            cells_of_node.entry(node).or_default().push(id);
        }
    }

    let mut vicinity = BTreeMap::new();
    for (&id, cell) in grid_cells {
        let mut current_x_groups = Vec::new();
        let mut current_z_groups = Vec::new();
        let mut current_x = Vec::new();
        let mut current_z = Vec::new();
        let mut touching: BTreeSet<usize> = BTreeSet::new();
        for &node in &cell.nodes {
            let spec = &node_spec[&node];
            current_x_groups.push(spec.x_group);
            current_z_groups.push(spec.z_group);
            current_x.push(spec.coordinate.x);
            current_z.push(spec.coordinate.z);
            if let Some(ids) = cells_of_node.get(&node) {
                touching.extend(ids.iter().copied());
            }
        }
        unique_sorted(&mut current_x_groups);
        unique_sorted(&mut current_z_groups);
        unique_sorted(&mut current_x);
        unique_sorted(&mut current_z);

        let mut neighbours = GridNeighbours::default();
        for &other_id in &touching {
            if other_id == id {
                continue;
            }
            let other = &grid_cells[&other_id];
            let mut x_groups = Vec::new();
            let mut z_groups = Vec::new();
            let mut x_coords = Vec::new();
            let mut z_coords = Vec::new();
            for &node in &other.nodes {
                let spec = &node_spec[&node];
                x_groups.push(spec.x_group);
                z_groups.push(spec.z_group);
                x_coords.push(spec.coordinate.x);
                z_coords.push(spec.coordinate.z);
            }
            unique_sorted(&mut x_groups);
            unique_sorted(&mut z_groups);

            // identical x-group set: the neighbour sits above or below
            if x_groups.iter().all(|g| current_x_groups.contains(g)) {
                if max_of(&z_coords) > max_of(&current_z) {
                    neighbours.top = Some(other_id);
                } else {
                    neighbours.bottom = Some(other_id);
                }
            }
            // identical z-group set: the neighbour sits left or right
            if z_groups.iter().all(|g| current_z_groups.contains(g)) {
                if max_of(&x_coords) > max_of(&current_x) {
                    neighbours.right = Some(other_id);
                } else {
                    neighbours.left = Some(other_id);
                }
            }
        }
        vicinity.insert(id, neighbours);
    }
    vicinity
}
