//! Test support library
//! Provides shared helper functions for the integration tests.

use grillage::float_types::Real;
use grillage::mesh::{Mesh, MeshConfig};

/// Approximate float equality.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// The reference oblique deck used across the tests: 10 long, 7 wide,
/// 5 stations by 7 longitudinal lines, no skew.
pub fn rectangular_config() -> MeshConfig {
    MeshConfig::new(10.0, 7.0, 7.0, 1.0, 5, 7, 0.0, 0.0)
}

/// Every element's endpoints must exist in `node_spec` and be distinct.
pub fn assert_elements_valid(mesh: &Mesh) {
    for ele in mesh
        .long_ele
        .iter()
        .chain(mesh.trans_ele.iter())
        .chain(mesh.edge_span_ele.iter())
    {
        assert_ne!(ele.node_i, ele.node_j, "element {} is degenerate", ele.tag);
        assert!(mesh.node_spec.contains_key(&ele.node_i));
        assert!(mesh.node_spec.contains_key(&ele.node_j));
    }
}

/// Node tags must form a contiguous range starting at 1.
pub fn assert_contiguous_node_tags(mesh: &Mesh) {
    for (expected, (&tag, node)) in (1..).zip(mesh.node_spec.iter()) {
        assert_eq!(tag, expected);
        assert_eq!(node.tag, expected);
    }
    assert_eq!(mesh.node_counter, mesh.node_spec.len() + 1);
}
