// main.rs
//
// Cuts an L-shaped solid made of three boxes and writes the pieces to STL.
// No per-triangle data is needed here, so S is bound to ().

use cutrs::{
    cut::Cutter,
    float_types::Real,
    mesh::{ConvexMesh, plane::CuttingPlane},
    world::World,
};
use nalgebra::{Isometry3, Point3, Vector3};
#[cfg(feature = "stl-io")]
use std::fs;

fn cuboid(mins: [Real; 3], maxs: [Real; 3]) -> ConvexMesh<()> {
    ConvexMesh::cuboid(Point3::from(mins), Point3::from(maxs), None)
}

fn main() {
    let mut world: World<()> = World::new();

    // Foot along +x, column along +y
    let parts = vec![
        cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
        cuboid([1.0, 0.0, 0.0], [3.0, 1.0, 1.0]),
        cuboid([0.0, 1.0, 0.0], [1.0, 4.0, 1.0]),
    ];
    let l_shape = match world.add_concave_body("L", parts, &[(0, 1), (0, 2)], Isometry3::identity()) {
        Ok(id) => id,
        Err(err) => {
            eprintln!("invalid decomposition: {err}");
            return;
        },
    };
    println!("before: {} bodies, volume {:.3}", world.body_count(), world.active_volume());

    // A diagonal cut through the corner box separates the foot from the column
    let plane = CuttingPlane::new(Point3::new(0.5, 0.5, 0.0), Vector3::new(1.0, -1.0, 0.0));
    let mut cutter = Cutter::new();
    match cutter.cut_body(&mut world, l_shape, &plane, false, Vector3::zeros()) {
        Ok(outcome) => {
            for id in outcome.bodies() {
                let Some(body) = world.body(id) else { continue };
                println!(
                    "{id} '{}': {} fragments, volume {:.3}",
                    body.label(),
                    body.fragments().len(),
                    body.volume()
                );
                #[cfg(feature = "stl-io")]
                {
                    let _ = fs::create_dir_all("stl");
                    let name = format!("piece_{id}");
                    let _ = fs::write(format!("stl/{name}.stl"), body.mesh().to_stl_ascii(&name));
                }
            }
        },
        Err(err) => eprintln!("cut failed: {err}"),
    }
    println!("after: {} bodies, volume {:.3}", world.body_count(), world.active_volume());
}
