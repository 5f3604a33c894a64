mod support;

use grillage::errors::MeshError;
use grillage::geometry::vector_xz;
use grillage::mesh::{Mesh, MeshConfig};
use nalgebra::Point3;
use support::{approx_eq, assert_contiguous_node_tags, assert_elements_valid, rectangular_config};

#[test]
fn oblique_rectangular_counters() {
    let mesh = Mesh::new(rectangular_config()).unwrap();
    // 5 stations x 7 lines
    assert_eq!(mesh.node_spec.len(), 35);
    assert_eq!(mesh.node_counter, 36);
    // (7-1)*5 transverse + (5-1)*7 longitudinal
    assert_eq!(mesh.trans_ele.len(), 30);
    assert_eq!(mesh.long_ele.len(), 28);
    assert!(mesh.edge_span_ele.is_empty());
    assert_eq!(mesh.element_counter, 59);
    assert_contiguous_node_tags(&mesh);
    assert_elements_valid(&mesh);
}

#[test]
fn oblique_zero_skew_is_rectangular() {
    let mesh = Mesh::new(rectangular_config()).unwrap();
    // complete rectangular index set: every (x_group, z_group) pair once
    let mut seen = std::collections::BTreeSet::new();
    for node in mesh.node_spec.values() {
        assert!(node.x_group < 5);
        assert!(node.z_group < 7);
        assert!(seen.insert((node.x_group, node.z_group)));
    }
    assert_eq!(seen.len(), 35);
    // all rows carry identical z offsets
    for node in mesh.node_spec.values() {
        assert!(approx_eq(node.coordinate.z, mesh.noz[node.z_group], 1e-9));
        assert_eq!(node.coordinate.y, 0.0);
    }
}

#[test]
fn construction_is_deterministic() {
    let a = Mesh::new(rectangular_config()).unwrap();
    let b = Mesh::new(rectangular_config()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn transform_tags_follow_direction() {
    let mesh = Mesh::new(rectangular_config()).unwrap();
    // a rectangular deck has exactly two element directions
    assert_eq!(mesh.transforms.len(), 2);
    for ele in mesh.long_ele.iter().chain(mesh.trans_ele.iter()) {
        let a = mesh.node_spec[&ele.node_i].coordinate;
        let b = mesh.node_spec[&ele.node_j].coordinate;
        let direction = vector_xz(&a, &b);
        assert_eq!(mesh.transforms.tag_of(&direction), Some(ele.transform));
    }
}

#[test]
fn orthogonal_skewed_mesh_has_edge_span_elements() {
    let mut config = MeshConfig::new(10.0, 7.0, 7.0, 1.0, 5, 7, 20.0, 20.0);
    config.orthogonal = true;
    let mesh = Mesh::new(config).unwrap();
    assert!(!mesh.edge_span_ele.is_empty());
    for ele in &mesh.edge_span_ele {
        let xi = mesh.node_spec[&ele.node_i].x_group;
        let xj = mesh.node_spec[&ele.node_j].x_group;
        assert_ne!(xi, xj, "edge-span element {} stays inside one column", ele.tag);
    }
    assert_contiguous_node_tags(&mesh);
    assert_elements_valid(&mesh);
    assert_eq!(mesh.edge_count, 2);
}

#[test]
fn orthogonal_zero_skew_matches_oblique_counts() {
    let mut config = rectangular_config();
    config.orthogonal = true;
    // zero skew is below the orthogonal threshold; opt out explicitly
    config.skip_skew_check = true;
    let mesh = Mesh::new(config).unwrap();
    assert_eq!(mesh.node_spec.len(), 35);
    // near-orthogonal edge columns become edge-span members
    assert_eq!(mesh.edge_span_ele.len(), 12);
    assert_eq!(mesh.trans_ele.len(), 18);
    assert_eq!(mesh.long_ele.len(), 28);
    assert_eq!(mesh.element_counter, 59);
    assert_eq!(mesh.x_grid_count, 5);
    assert_elements_valid(&mesh);
}

#[test]
fn arc_sweep_oblique_mesh_follows_the_curve() {
    let mut config = rectangular_config();
    config.pt2 = Point3::new(5.0, 0.0, 0.2);
    config.pt3 = Some(Point3::new(10.0, 0.0, 0.0));
    let mesh = Mesh::new(config).unwrap();
    assert!(mesh.sweep_path.is_arc());
    // mid-span row 0 node sits on the arc (within elevation rounding)
    let mid = mesh
        .node_spec
        .values()
        .find(|n| n.x_group == 2 && n.z_group == 0)
        .unwrap();
    assert!(approx_eq(mid.coordinate.z, 0.2, 1e-3));
    assert_elements_valid(&mesh);
}

#[test]
fn skew_too_small_for_orthogonal_is_rejected() {
    let mut config = MeshConfig::new(10.0, 7.0, 7.0, 1.0, 5, 7, 5.0, 5.0);
    config.orthogonal = true;
    let err = Mesh::new(config).unwrap_err();
    assert!(matches!(
        err,
        MeshError::SkewTooSmallForOrthogonal { angle, .. } if angle == 5.0
    ));
}

#[test]
fn skew_too_large_for_oblique_is_rejected() {
    let config = MeshConfig::new(10.0, 7.0, 7.0, 1.0, 5, 7, 40.0, 40.0);
    let err = Mesh::new(config).unwrap_err();
    assert!(matches!(
        err,
        MeshError::SkewTooLargeForOblique { angle, .. } if angle == 40.0
    ));
}

#[test]
fn skew_check_has_an_explicit_opt_out() {
    let mut config = MeshConfig::new(10.0, 7.0, 7.0, 1.0, 5, 7, 40.0, 40.0);
    config.skip_skew_check = true;
    assert!(Mesh::new(config).is_ok());
}

#[test]
fn unconverged_search_is_surfaced() {
    // steep sweep path (45°) and a wide, strongly skewed deck: the foot of
    // the normal from the far edge node is more than 10 length units from
    // the search start, beyond the iteration budget
    let mut config = MeshConfig::new(10.0, 30.0, 30.0, 1.0, 5, 3, -60.0, -60.0);
    config.orthogonal = true;
    config.pt2 = Point3::new(10.0, 0.0, 10.0);
    let err = Mesh::new(config).unwrap_err();
    assert!(matches!(err, MeshError::SearchDidNotConverge { .. }));
}

#[test]
fn invalid_parameters_are_rejected() {
    assert!(matches!(
        Mesh::new(MeshConfig::new(0.0, 7.0, 7.0, 1.0, 5, 7, 0.0, 0.0)),
        Err(MeshError::InvalidParameter(_))
    ));
    assert!(matches!(
        Mesh::new(MeshConfig::new(10.0, 7.0, 7.0, 1.0, 1, 7, 0.0, 0.0)),
        Err(MeshError::InvalidParameter(_))
    ));
    assert!(matches!(
        Mesh::new(MeshConfig::new(10.0, 7.0, 7.0, 1.0, 5, 2, 0.0, 0.0)),
        Err(MeshError::InvalidParameter(_))
    ));
    // edge width must leave room for interior lines
    assert!(matches!(
        Mesh::new(MeshConfig::new(10.0, 7.0, 7.0, 4.0, 5, 7, 0.0, 0.0)),
        Err(MeshError::InvalidParameter(_))
    ));
}

#[test]
fn edge_groups_cover_both_ends() {
    let mesh = Mesh::new(rectangular_config()).unwrap();
    assert_eq!(mesh.edge_count, 2);
    let start = mesh.nodes_on_edge(0);
    let end = mesh.nodes_on_edge(1);
    assert_eq!(start.len(), 7);
    assert_eq!(end.len(), 7);
    for tag in &start {
        assert_eq!(mesh.node_spec[tag].x_group, 0);
    }
    for tag in &end {
        assert_eq!(mesh.node_spec[tag].x_group, 4);
    }
}
