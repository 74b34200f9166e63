//! Test support library
//! Builders for the bodies the cut tests work on, plus float helpers.
#![allow(dead_code)]

use cutrs::{
    float_types::Real,
    mesh::ConvexMesh,
    world::{BodyId, FragmentId, World},
};
use nalgebra::{Isometry3, Point3};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Axis-aligned box without metadata
pub fn cuboid(mins: [Real; 3], maxs: [Real; 3]) -> ConvexMesh<()> {
    ConvexMesh::cuboid(Point3::from(mins), Point3::from(maxs), None)
}

/// Unit-sized box with its minimum corner at `origin`
pub fn unit_box(origin: [Real; 3]) -> ConvexMesh<()> {
    cuboid(origin, [origin[0] + 1.0, origin[1] + 1.0, origin[2] + 1.0])
}

/// World with one convex cube of edge `2 * half` centred at the origin
pub fn cube_world(half: Real) -> (World<()>, BodyId) {
    let mut world = World::new();
    let id = world.add_convex_body(
        "cube",
        cuboid([-half, -half, -half], [half, half, half]),
        Isometry3::identity(),
    );
    (world, id)
}

/// Two stacked fragments: `A` = [0,1]×[0,3]×[0,1] (volume 3) below
/// `B` = [0,1]×[3,5]×[0,1] (volume 2), adjacent.
pub fn tower_world() -> (World<()>, BodyId, FragmentId, FragmentId) {
    let mut world = World::new();
    let id = world
        .add_concave_body(
            "tower",
            vec![
                cuboid([0.0, 0.0, 0.0], [1.0, 3.0, 1.0]),
                cuboid([0.0, 3.0, 0.0], [1.0, 5.0, 1.0]),
            ],
            &[(0, 1)],
            Isometry3::identity(),
        )
        .unwrap();
    let parts = world.body(id).unwrap().fragments().to_vec();
    (world, id, parts[0], parts[1])
}

/// A row of `n` unit boxes along +x, each adjacent to the next
pub fn bar_world(n: usize) -> (World<()>, BodyId) {
    let mut world = World::new();
    let parts = (0..n).map(|i| unit_box([i as Real, 0.0, 0.0])).collect();
    let adjacency: Vec<(usize, usize)> = (1..n).map(|i| (i - 1, i)).collect();
    let id = world
        .add_concave_body("bar", parts, &adjacency, Isometry3::identity())
        .unwrap();
    (world, id)
}

/// Sum of the volumes of all fragments in the arena
pub fn fragment_volume(world: &World<()>) -> Real {
    world.fragments().map(|f| f.volume()).sum()
}
