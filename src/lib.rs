//! Incremental **plane cutting** of solids given as a convex decomposition.
//!
//! A [`Body`](world::Body) owns one or more convex
//! [`Fragment`](world::Fragment)s linked by an adjacency graph. Cutting a body
//! with a [`CuttingPlane`](mesh::plane::CuttingPlane) splits the fragments the
//! plane passes through, rewires the graph around the halves and regroups each
//! side into connected components, every one of which becomes a new body with
//! the same total volume.
//!
//! ```
//! use cutrs::{cut::Cutter, mesh::{ConvexMesh, plane::CuttingPlane}, world::World};
//! use nalgebra::{Isometry3, Point3, Vector3};
//!
//! let cube = |x: f64| ConvexMesh::cuboid(Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 1.0), None);
//! let mut world: World<()> = World::new();
//! let bar = world
//!     .add_concave_body("bar", vec![cube(0.0), cube(1.0), cube(2.0)], &[(0, 1), (1, 2)], Isometry3::identity())
//!     .unwrap();
//!
//! let plane = CuttingPlane::new(Point3::new(1.5, 0.0, 0.0), Vector3::x());
//! let outcome = Cutter::new().cut_body(&mut world, bar, &plane, false, Vector3::zeros()).unwrap();
//! assert_eq!((outcome.upper.len(), outcome.lower.len()), (1, 1));
//! assert!((world.active_volume() - 3.0).abs() < 1e-9);
//! ```
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - [**stl-io**](https://en.wikipedia.org/wiki/STL_(file_format)): `.stl` import/export
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon for multithreading

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod cut;
pub mod errors;
pub mod float_types;
pub mod io;
pub mod mesh;
pub mod physics;
pub mod world;

#[cfg(any(
    all(feature = "f64", feature = "f32"),
    not(any(feature = "f64", feature = "f32"))
))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use cut::{CutOutcome, Cutter, CutterConfig};
pub use errors::{CutError, ValidationError};
pub use mesh::{ConvexMesh, plane::CuttingPlane};
pub use world::{BodyId, FragmentId, World};
