//! Connected components of a same-side fragment set.

use crate::world::{FragmentId, World};
use hashbrown::HashSet;
use std::collections::VecDeque;
use std::fmt::Debug;

/// Partition `fragments` into maximal connected groups.
///
/// Only edges whose two endpoints are both in `fragments` count. Groups come
/// out in traversal order, each in breadth-first discovery order; neither
/// order carries meaning. A fragment with no neighbor in the list forms a
/// singleton group, an empty list yields no groups and repeated ids are
/// collapsed.
///
/// ## Example
/// ```
/// use cutrs::{cut::neighborhood::neighborhoods, mesh::ConvexMesh, world::World};
/// use nalgebra::{Isometry3, Point3};
/// let mut world: World<()> = World::new();
/// let cube = |x: f64| ConvexMesh::cuboid(Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 1.0), None);
/// let id = world
///     .add_concave_body("row", vec![cube(0.0), cube(1.0), cube(5.0)], &[(0, 1)], Isometry3::identity())
///     .unwrap();
/// let parts = world.body(id).unwrap().fragments().to_vec();
/// assert_eq!(neighborhoods(&world, &parts).len(), 2);
/// ```
pub fn neighborhoods<S: Clone + Send + Sync + Debug>(
    world: &World<S>,
    fragments: &[FragmentId],
) -> Vec<Vec<FragmentId>> {
    let members: HashSet<FragmentId> = fragments.iter().copied().collect();
    let mut visited: HashSet<FragmentId> = HashSet::with_capacity(members.len());
    let mut groups = Vec::new();
    let mut queue = VecDeque::new();

    for &start in fragments {
        if !visited.insert(start) {
            continue;
        }
        let mut group = vec![start];
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let Some(fragment) = world.fragment(current) else {
                continue;
            };
            for &n in fragment.neighbors() {
                if members.contains(&n) && visited.insert(n) {
                    group.push(n);
                    queue.push_back(n);
                }
            }
        }
        groups.push(group);
    }

    groups
}
