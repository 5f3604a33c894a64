mod support;

use grillage::mesh::{Mesh, MeshConfig};
use support::{approx_eq, rectangular_config};

#[test]
fn rectangular_grid_cells() {
    let mesh = Mesh::new(rectangular_config()).unwrap();
    // (5-1) x (7-1) quad cells
    assert_eq!(mesh.grid_cells.len(), 24);
    for cell in mesh.grid_cells.values() {
        assert_eq!(cell.nodes.len(), 4);
        let mut sorted = cell.nodes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 4, "cell repeats a corner");
    }
}

#[test]
fn grid_vicinity_is_symmetric() {
    let mesh = Mesh::new(rectangular_config()).unwrap();
    for (&id, neighbours) in &mesh.grid_vicinity {
        if let Some(right) = neighbours.right {
            assert_eq!(mesh.grid_vicinity[&right].left, Some(id));
        }
        if let Some(left) = neighbours.left {
            assert_eq!(mesh.grid_vicinity[&left].right, Some(id));
        }
        if let Some(top) = neighbours.top {
            assert_eq!(mesh.grid_vicinity[&top].bottom, Some(id));
        }
        if let Some(bottom) = neighbours.bottom {
            assert_eq!(mesh.grid_vicinity[&bottom].top, Some(id));
        }
    }
    // at least one interior cell has all four neighbours
    assert!(mesh.grid_vicinity.values().any(|n| {
        n.top.is_some() && n.bottom.is_some() && n.left.is_some() && n.right.is_some()
    }));
}

#[test]
fn row_and_column_element_maps() {
    let mesh = Mesh::new(rectangular_config()).unwrap();
    assert_eq!(mesh.z_group_to_ele.len(), 7);
    for elements in mesh.z_group_to_ele.values() {
        // each longitudinal line spans 4 gaps
        assert_eq!(elements.len(), 4);
    }
    assert_eq!(mesh.x_group_to_ele.len(), 5);
    for elements in mesh.x_group_to_ele.values() {
        // each station crosses 6 gaps
        assert_eq!(elements.len(), 6);
    }
}

#[test]
fn interior_nodes_have_two_neighbours_per_axis() {
    let mesh = Mesh::new(rectangular_config()).unwrap();
    let interior = mesh
        .node_spec
        .values()
        .find(|n| n.x_group == 2 && n.z_group == 3)
        .unwrap();
    assert_eq!(mesh.node_connect_x[&interior.tag].len(), 2);
    assert_eq!(mesh.node_connect_z[&interior.tag].len(), 2);
    // neighbours really are one grid step away on the right axis
    for &neighbour in &mesh.node_connect_x[&interior.tag] {
        let spec = mesh.node_spec[&neighbour];
        assert_eq!(spec.z_group, 3);
        assert_eq!(spec.x_group.abs_diff(2), 1);
    }
    for &neighbour in &mesh.node_connect_z[&interior.tag] {
        let spec = mesh.node_spec[&neighbour];
        assert_eq!(spec.x_group, 2);
        assert_eq!(spec.z_group.abs_diff(3), 1);
    }
}

#[test]
fn node_widths_record_adjacent_spans() {
    let mesh = Mesh::new(rectangular_config()).unwrap();
    let interior = mesh
        .node_spec
        .values()
        .find(|n| n.x_group == 2 && n.z_group == 3)
        .unwrap();
    // interior rows are spaced 1.25 apart transversely, 2.5 longitudinally
    for span in &mesh.node_width_z[&interior.tag] {
        assert!(approx_eq(span.z, 1.25, 1e-9));
        assert_eq!(span.x, 0.0);
    }
    for span in &mesh.node_width_x[&interior.tag] {
        assert!(approx_eq(span.x, 2.5, 1e-9));
        assert_eq!(span.z, 0.0);
    }
}

#[test]
fn member_zones_partition_the_lines() {
    let mesh = Mesh::new(rectangular_config()).unwrap();
    let zones = mesh.member_zones();
    assert_eq!(zones.edge_beam, vec![0, 6]);
    assert_eq!(zones.exterior_main_beam_1, vec![1]);
    assert_eq!(zones.interior_main_beam, vec![2, 3, 4]);
    assert_eq!(zones.exterior_main_beam_2, vec![5]);
}

#[test]
fn spacing_profiles_characterize_the_deck() {
    let mesh = Mesh::new(rectangular_config()).unwrap();
    // noz = [0, 1, 2.25, 3.5, 4.75, 6, 7]: edge gap, four even interior
    // gaps, edge gap
    assert_eq!(mesh.noz_profile.interval_groups, vec![1, 2, 2, 2, 2, 3]);
    assert!(approx_eq(mesh.noz_profile.spacing_by_group[&2], 1.25, 1e-9));
    // uniform stations collapse to one group
    assert_eq!(mesh.nox_profile.spacing_by_group.len(), 1);
    // tributary widths: half a gap at the edges
    assert!(approx_eq(mesh.noz_profile.tributary_widths[0], 0.5, 1e-9));
    assert!(approx_eq(mesh.noz_profile.tributary_widths[3], 1.25, 1e-9));
}

#[test]
fn skewed_orthogonal_mesh_has_triangular_cells() {
    let mut config = MeshConfig::new(10.0, 7.0, 7.0, 1.0, 5, 7, 20.0, 20.0);
    config.orthogonal = true;
    let mesh = Mesh::new(config).unwrap();
    assert!(!mesh.grid_cells.is_empty());
    let (mut quads, mut tris) = (0usize, 0usize);
    for cell in mesh.grid_cells.values() {
        match cell.nodes.len() {
            4 => quads += 1,
            3 => tris += 1,
            n => panic!("cell with {n} corners"),
        }
    }
    assert!(quads > 0);
    assert_eq!(quads + tris, mesh.grid_cells.len());
}
