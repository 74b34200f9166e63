mod support;

use cutrs::{
    cut::{CutOutcome, Cutter, CutterConfig},
    errors::CutError,
    float_types::Real,
    mesh::plane::{CuttingPlane, Side},
    physics::ImpulseApplicator,
    world::{Body, BodyId, World},
};
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use rand::{Rng, SeedableRng, rngs::StdRng};
use support::*;

const EPS: Real = 1e-9;

fn cut(world: &mut World<()>, body: BodyId, plane: &CuttingPlane) -> Result<CutOutcome, CutError> {
    Cutter::new().cut_body(world, body, plane, false, Vector3::zeros())
}

fn body_volume(world: &World<()>, id: BodyId) -> Real {
    world.body(id).unwrap().volume()
}

#[test]
fn cube_cut_through_center_gives_two_convex_halves() {
    let (mut world, cube) = cube_world(1.0);
    let plane = CuttingPlane::new(Point3::origin(), Vector3::x());

    let outcome = cut(&mut world, cube, &plane).unwrap();

    assert_eq!(outcome.upper.len(), 1);
    assert_eq!(outcome.lower.len(), 1);
    for id in outcome.bodies() {
        let body = world.body(id).unwrap();
        assert!(body.is_convex());
        assert!(approx_eq(body.volume(), 4.0, EPS), "volume {}", body.volume());
        let fragment = world.fragment(body.fragments()[0]).unwrap();
        assert!(fragment.neighbors().is_empty());
    }
    assert!(world.body(cube).is_none());
    assert!(!world.active().contains(cube));
    assert_eq!(world.body_count(), 2);
    assert_eq!(world.fragment_count(), 2);
    world.validate(1e-9).unwrap();
}

#[test]
fn convex_halves_lie_on_their_side_of_the_plane() {
    let (mut world, cube) = cube_world(1.0);
    let plane = CuttingPlane::new(Point3::new(0.0, 0.25, 0.0), Vector3::y());

    let outcome = cut(&mut world, cube, &plane).unwrap();

    let upper = world.body(outcome.upper[0]).unwrap();
    let lower = world.body(outcome.lower[0]).unwrap();
    assert!(upper.mesh().vertices.iter().all(|p| p.y >= 0.25 - EPS));
    assert!(lower.mesh().vertices.iter().all(|p| p.y <= 0.25 + EPS));
    assert!(approx_eq(upper.volume(), 8.0 * 0.75 / 2.0, EPS));
    assert!(approx_eq(lower.volume(), 8.0 * 1.25 / 2.0, EPS));
    assert_eq!(
        world.fragment(upper.fragments()[0]).unwrap().side(),
        Side::Upper
    );
}

#[test]
fn split_fragment_joins_upper_neighbor() {
    let (mut world, tower, a, b) = tower_world();
    let plane = CuttingPlane::new(Point3::new(0.0, 2.0, 0.0), Vector3::y());

    let outcome = cut(&mut world, tower, &plane).unwrap();

    assert_eq!(outcome.upper.len(), 1);
    assert_eq!(outcome.lower.len(), 1);

    let upper = world.body(outcome.upper[0]).unwrap();
    assert!(approx_eq(upper.volume(), 3.0, EPS));
    assert_eq!(upper.fragments().len(), 2);
    assert!(upper.fragments().contains(&b));

    let a1 = *upper.fragments().iter().find(|&&f| f != b).unwrap();
    assert!(approx_eq(world.fragment(a1).unwrap().volume(), 1.0, EPS));
    assert!(world.fragment(a1).unwrap().is_adjacent_to(b));
    assert!(world.fragment(b).unwrap().is_adjacent_to(a1));

    let lower = world.body(outcome.lower[0]).unwrap();
    assert!(approx_eq(lower.volume(), 2.0, EPS));
    assert_eq!(lower.fragments().len(), 1);
    let a2 = world.fragment(lower.fragments()[0]).unwrap();
    assert!(a2.neighbors().is_empty());

    assert!(world.fragment(a).is_none());
    world.validate(1e-9).unwrap();
}

#[test]
fn every_fragment_split_keeps_each_side_connected() {
    let (mut world, bar) = bar_world(3);
    let plane = CuttingPlane::new(Point3::new(0.0, 0.5, 0.0), Vector3::y());

    let outcome = cut(&mut world, bar, &plane).unwrap();

    assert_eq!(outcome.upper.len(), 1);
    assert_eq!(outcome.lower.len(), 1);
    for id in outcome.bodies() {
        let body = world.body(id).unwrap();
        assert_eq!(body.fragments().len(), 3);
        assert!(approx_eq(body.volume(), 1.5, EPS));
        // chain: 2 edges on 3 fragments
        let degree: usize = body
            .fragments()
            .iter()
            .map(|&f| world.fragment(f).unwrap().neighbors().len())
            .sum();
        assert_eq!(degree, 4);
    }
    assert_eq!(world.fragment_count(), 6);
    world.validate(1e-9).unwrap();
}

#[test]
fn cut_through_middle_fragment_separates_the_ends() {
    let (mut world, bar) = bar_world(3);
    let plane = CuttingPlane::new(Point3::new(1.5, 0.0, 0.0), Vector3::x());

    let outcome = cut(&mut world, bar, &plane).unwrap();

    assert_eq!(outcome.len(), 2);
    for id in outcome.bodies() {
        let body = world.body(id).unwrap();
        assert_eq!(body.fragments().len(), 2);
        assert!(approx_eq(body.volume(), 1.5, EPS));
    }
    world.validate(1e-9).unwrap();
}

#[test]
fn side_that_falls_apart_becomes_several_bodies() {
    // U shape: bottom bar with two columns
    let mut world: World<()> = World::new();
    let u = world
        .add_concave_body(
            "U",
            vec![
                cuboid([0.0, 0.0, 0.0], [3.0, 1.0, 1.0]),
                cuboid([0.0, 1.0, 0.0], [1.0, 3.0, 1.0]),
                cuboid([2.0, 1.0, 0.0], [3.0, 3.0, 1.0]),
            ],
            &[(0, 1), (0, 2)],
            Isometry3::identity(),
        )
        .unwrap();
    let plane = CuttingPlane::new(Point3::new(0.0, 2.0, 0.0), Vector3::y());

    let outcome = cut(&mut world, u, &plane).unwrap();

    assert_eq!(outcome.upper.len(), 2);
    assert_eq!(outcome.lower.len(), 1);
    for &id in &outcome.upper {
        assert!(approx_eq(body_volume(&world, id), 1.0, EPS));
    }
    let lower = world.body(outcome.lower[0]).unwrap();
    assert_eq!(lower.fragments().len(), 3);
    assert!(approx_eq(lower.volume(), 5.0, EPS));
    world.validate(1e-9).unwrap();
}

#[test]
fn whole_fragments_touching_across_the_plane_are_disconnected() {
    // f0 and f1 meet at x = 1, f2 lies on top of both and spans the plane
    let mut world: World<()> = World::new();
    let slab = world
        .add_concave_body(
            "slab",
            vec![
                cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
                cuboid([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]),
                cuboid([0.0, 1.0, 0.0], [2.0, 2.0, 1.0]),
            ],
            &[(0, 1), (0, 2), (1, 2)],
            Isometry3::identity(),
        )
        .unwrap();
    let parts = world.body(slab).unwrap().fragments().to_vec();
    let plane = CuttingPlane::new(Point3::new(1.0, 0.0, 0.0), Vector3::x());

    let outcome = cut(&mut world, slab, &plane).unwrap();

    assert!(!world.fragment(parts[0]).unwrap().is_adjacent_to(parts[1]));
    assert_eq!(world.fragment(parts[0]).unwrap().side(), Side::Lower);
    assert_eq!(world.fragment(parts[1]).unwrap().side(), Side::Upper);
    for id in outcome.bodies() {
        assert!(approx_eq(body_volume(&world, id), 2.0, EPS));
    }
    world.validate(1e-9).unwrap();
}

#[test]
fn missing_plane_changes_nothing() {
    let (mut world, tower, a, b) = tower_world();
    let before_volume = world.active_volume();

    for plane in [
        CuttingPlane::new(Point3::new(0.0, 10.0, 0.0), Vector3::y()),
        // resting exactly on the shared face
        CuttingPlane::new(Point3::new(0.0, 3.0, 0.0), Vector3::y()),
        // resting on an outer face
        CuttingPlane::new(Point3::new(1.0, 0.0, 0.0), Vector3::x()),
    ] {
        assert_eq!(cut(&mut world, tower, &plane), Err(CutError::NoIntersection(tower)));
    }

    assert_eq!(world.body_count(), 1);
    assert_eq!(world.fragment_count(), 2);
    assert!(world.active().contains(tower));
    assert!(world.fragment(a).unwrap().is_adjacent_to(b));
    assert_eq!(world.fragment(a).unwrap().side(), Side::Unassigned);
    assert!(approx_eq(world.active_volume(), before_volume, EPS));
}

#[test]
fn body_without_fragments_is_refused() {
    let mut world: World<()> = World::new();
    let empty = world
        .add_concave_body("empty", Vec::new(), &[], Isometry3::identity())
        .unwrap();
    let plane = CuttingPlane::new(Point3::origin(), Vector3::y());

    assert_eq!(cut(&mut world, empty, &plane), Err(CutError::EmptyDecomposition(empty)));
    assert!(world.body(empty).is_some());
    assert!(world.active().contains(empty));
}

#[test]
fn inactive_body_is_refused() {
    let (mut world, cube) = cube_world(1.0);
    assert!(world.deactivate(cube));
    let plane = CuttingPlane::new(Point3::origin(), Vector3::y());

    assert_eq!(cut(&mut world, cube, &plane), Err(CutError::MissingRegistry(cube)));
    assert_eq!(world.fragment_count(), 1);

    assert!(world.activate(cube));
    assert!(cut(&mut world, cube, &plane).is_ok());
}

#[test]
fn consumed_body_cannot_be_cut_again() {
    let (mut world, cube) = cube_world(1.0);
    let plane = CuttingPlane::new(Point3::origin(), Vector3::y());
    cut(&mut world, cube, &plane).unwrap();

    assert_eq!(cut(&mut world, cube, &plane), Err(CutError::UnknownBody(cube)));
}

#[test]
fn generation_limit_stops_further_cuts() {
    let (mut world, cube) = cube_world(1.0);
    let mut cutter = Cutter::new().with_config(CutterConfig::default().with_max_generation(1));

    let first = cutter
        .cut_body(&mut world, cube, &CuttingPlane::new(Point3::origin(), Vector3::x()), false, Vector3::zeros())
        .unwrap();
    let child = first.upper[0];
    assert_eq!(world.body(child).unwrap().generation(), 1);

    let err = cutter
        .cut_body(&mut world, child, &CuttingPlane::new(Point3::origin(), Vector3::y()), false, Vector3::zeros())
        .unwrap_err();
    assert_eq!(err, CutError::DepthLimit { body: child, generation: 1 });
    assert!(world.body(child).is_some());
}

#[test]
fn labels_generations_and_depths_follow_the_ancestry() {
    let (mut world, tower, _, b) = tower_world();
    let mut cutter = Cutter::new();

    let first = cutter
        .cut_body(&mut world, tower, &CuttingPlane::new(Point3::new(0.0, 2.0, 0.0), Vector3::y()), false, Vector3::zeros())
        .unwrap();
    let upper = world.body(first.upper[0]).unwrap();
    assert_eq!(upper.label(), "tower 1");
    assert_eq!(upper.generation(), 1);
    assert_eq!(world.fragment(b).unwrap().depth(), 1);
    for &f in upper.fragments() {
        assert_eq!(world.fragment(f).unwrap().depth(), 1);
    }

    let second = cutter
        .cut_body(&mut world, first.upper[0], &CuttingPlane::new(Point3::new(0.0, 4.0, 0.0), Vector3::y()), false, Vector3::zeros())
        .unwrap();
    let top = world.body(second.upper[0]).unwrap();
    assert_eq!(top.label(), "tower 1 2");
    assert_eq!(top.generation(), 2);
    assert!(approx_eq(top.volume(), 1.0, EPS));
    for &f in top.fragments() {
        assert_eq!(world.fragment(f).unwrap().depth(), 2);
    }
    // B was split by the second cut
    assert!(world.fragment(b).is_none());
}

#[test]
fn displacement_moves_the_plane_before_cutting() {
    let (mut world, cube) = cube_world(1.0);
    let far = CuttingPlane::new(Point3::new(5.0, 0.0, 0.0), Vector3::x());

    let outcome = Cutter::new()
        .cut_body(&mut world, cube, &far, false, Vector3::new(-4.5, 0.0, 0.0))
        .unwrap();

    assert!(approx_eq(body_volume(&world, outcome.upper[0]), 2.0, EPS));
    assert!(approx_eq(body_volume(&world, outcome.lower[0]), 6.0, EPS));
}

#[test]
fn plane_is_applied_in_the_body_frame() {
    let mut world: World<()> = World::new();
    let placement = Isometry3::from_parts(
        Translation3::new(10.0, 0.0, 0.0),
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2),
    );
    // 4 x 1 x 1 box along local x, i.e. along world y
    let id = world.add_convex_body("beam", cuboid([0.0, 0.0, 0.0], [4.0, 1.0, 1.0]), placement);

    let miss = CuttingPlane::new(Point3::new(0.0, 1.0, 0.0), Vector3::x());
    assert_eq!(cut(&mut world, id, &miss), Err(CutError::NoIntersection(id)));

    let plane = CuttingPlane::new(Point3::new(0.0, 1.0, 0.0), Vector3::y());
    let outcome = cut(&mut world, id, &plane).unwrap();

    let upper = world.body(outcome.upper[0]).unwrap();
    assert!(approx_eq(upper.volume(), 3.0, 1e-9));
    assert_eq!(upper.placement(), &placement);
    assert!(approx_eq(body_volume(&world, outcome.lower[0]), 1.0, 1e-9));
}

#[test]
fn flipped_plane_swaps_the_sides() {
    let plane = CuttingPlane::new(Point3::new(0.0, 2.0, 0.0), Vector3::y());

    let (mut world, tower, _, _) = tower_world();
    let straight = cut(&mut world, tower, &plane).unwrap();
    let (mut flipped_world, flipped_tower, _, _) = tower_world();
    let flipped = cut(&mut flipped_world, flipped_tower, &plane.flipped()).unwrap();

    assert!(approx_eq(
        body_volume(&world, straight.upper[0]),
        body_volume(&flipped_world, flipped.lower[0]),
        EPS
    ));
    assert!(approx_eq(
        body_volume(&world, straight.lower[0]),
        body_volume(&flipped_world, flipped.upper[0]),
        EPS
    ));
}

#[test]
fn cut_active_cuts_only_bodies_under_the_plane() {
    let (mut world, left) = cube_world(1.0);
    let right = world.add_convex_body(
        "right",
        cuboid([5.0, -1.0, -1.0], [7.0, 1.0, 1.0]),
        Isometry3::identity(),
    );
    let plane = CuttingPlane::new(Point3::origin(), Vector3::x());

    let results = Cutter::new().cut_active(&mut world, &plane, false);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, left);
    assert_eq!(results[0].1.as_ref().map(CutOutcome::len), Ok(2));
    assert_eq!(results[1], (right, Err(CutError::NoIntersection(right))));
    assert_eq!(world.active().len(), 3);
    assert!(approx_eq(world.active_volume(), 16.0, EPS));
}

#[derive(Default)]
struct Recorder {
    pushes: Vec<(BodyId, Vector3<Real>, Real)>,
    removed: Vec<BodyId>,
}

impl ImpulseApplicator<()> for Recorder {
    fn apply_impulse(&mut self, body: &Body<()>, direction: Vector3<Real>, magnitude: Real) {
        self.pushes.push((body.id(), direction, magnitude));
    }

    fn body_removed(&mut self, body: BodyId) {
        self.removed.push(body);
    }
}

#[test]
fn forces_push_the_sides_apart() {
    let (mut world, cube) = cube_world(1.0);
    let mut cutter = Cutter::new()
        .with_config(CutterConfig::default().with_separation_force(2.5))
        .with_impulses(Recorder::default());
    let plane = CuttingPlane::new(Point3::origin(), Vector3::new(0.0, 0.0, 2.0));

    let outcome = cutter.cut_body(&mut world, cube, &plane, true, Vector3::zeros()).unwrap();

    let pushes = &cutter.impulses.pushes;
    assert_eq!(pushes.len(), 2);
    assert_eq!(pushes[0], (outcome.upper[0], Vector3::z(), 2.5));
    assert_eq!(pushes[1], (outcome.lower[0], -Vector3::z(), 2.5));
    assert_eq!(cutter.impulses.removed, vec![cube]);
}

#[test]
fn no_forces_unless_requested() {
    let (mut world, cube) = cube_world(1.0);
    let mut cutter = Cutter::new().with_impulses(Recorder::default());

    cutter
        .cut_body(&mut world, cube, &CuttingPlane::new(Point3::origin(), Vector3::z()), false, Vector3::zeros())
        .unwrap();

    assert!(cutter.impulses.pushes.is_empty());
    assert_eq!(cutter.impulses.removed, vec![cube]);
}

#[test]
fn cap_triangles_carry_the_cut_surface_metadata() {
    use cutrs::mesh::{ConvexMesh, slice::PlaneSlicer};

    let mut world: World<&'static str> = World::new();
    let cube = ConvexMesh::cuboid(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0), Some("skin"));
    let id = world.add_convex_body("cube", cube, Isometry3::identity());
    let mut cutter = Cutter::new();
    cutter.slicer = PlaneSlicer::new().with_cap_metadata("cut");

    let outcome = cutter
        .cut_body(&mut world, id, &CuttingPlane::new(Point3::origin(), Vector3::x()), false, Vector3::zeros())
        .unwrap();

    let upper = world.body(outcome.upper[0]).unwrap();
    let cut_faces = upper
        .mesh()
        .triangles
        .iter()
        .filter(|t| t.metadata == Some("cut"))
        .count();
    assert!(cut_faces >= 2);
    assert!(upper.mesh().triangles.iter().any(|t| t.metadata == Some("skin")));
}

#[test]
fn random_cuts_conserve_volume_and_keep_the_graph_consistent() {
    let mut rng = StdRng::seed_from_u64(7);
    let (mut world, _) = bar_world(4);
    let total = world.active_volume();
    let mut cutter = Cutter::new();

    for _ in 0..12 {
        let point = Point3::new(rng.gen_range(0.2..3.8), rng.gen_range(0.2..0.8), rng.gen_range(0.2..0.8));
        let normal = Vector3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let plane = CuttingPlane::new(point, normal);

        for (_, result) in cutter.cut_active(&mut world, &plane, false) {
            match result {
                Ok(_) | Err(CutError::NoIntersection(_)) => {},
                Err(err) => panic!("unexpected cut error: {err}"),
            }
        }

        assert!(
            approx_eq(world.active_volume(), total, 1e-6),
            "volume drifted to {}",
            world.active_volume()
        );
        assert!(approx_eq(fragment_volume(&world), total, 1e-6));
        world.validate(1e-9).unwrap();
    }
    assert!(world.body_count() > 1);
}
