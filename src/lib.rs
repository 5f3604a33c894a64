//! Structured **grillage** mesh generation for bridge deck models.
//!
//! A grillage model approximates a bridge deck as a grid of intersecting
//! longitudinal and transverse beam elements. This crate builds that grid:
//! it constructs a longitudinal [`SweepPath`](sweep::SweepPath) (straight
//! line or circular arc), two skewed [`EdgeConstructionLine`](edge_line::EdgeConstructionLine)s,
//! and walks the deck placing nodes and linking them into longitudinal,
//! transverse, and edge-span elements. A post-pass derives the structural
//! groupings (tributary widths, row/column element maps, logical grid cells
//! and their planar adjacency) that downstream member-assignment and
//! boundary-condition layers consume.
//!
//! Two meshing algorithms are provided, selected by
//! [`MeshConfig::orthogonal`](mesh::MeshConfig):
//! - **oblique (skewed)**: transverse node columns follow the skewed edge
//!   line across the whole span;
//! - **orthogonal**: interior columns stay perpendicular to the sweep path,
//!   with skewed transition regions at either end resolved by a
//!   normal-projection search.
//!
//! The entire mesh is built eagerly inside [`Mesh::new`](mesh::Mesh::new);
//! on success the returned value is a finished, read-only snapshot that is
//! safe to share by reference.
//!
//! # Features
//! - **f64** (default): use f64 as Real
//! - **f32**: use f32 as Real, conflicts with f64

#![forbid(unsafe_code)]
#![deny(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod float_types;
pub mod geometry;
pub mod sweep;
pub mod edge_line;
pub mod mesh;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use edge_line::EdgeConstructionLine;
pub use errors::MeshError;
pub use mesh::{Element, Mesh, MeshConfig, NodeSpec};
pub use sweep::SweepPath;
