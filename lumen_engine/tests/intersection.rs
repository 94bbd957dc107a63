use approx::assert_relative_eq;
use rand::seq::SliceRandom;
use rand::{Rng as _, SeedableRng};
use lumen_engine::core::types::*;
use lumen_engine::mesh::UvMesh;
use lumen_engine::object::Object;
use lumen_engine::shared::aabb::{AabbMode, BoundingBox};
use lumen_engine::shared::intersect::Hit;
use lumen_engine::shared::ray::Ray;

mod common;

fn random_points(rng: &mut common::Rng, count: usize) -> Vec<Vector3> {
    std::iter::repeat_with(|| Vector3::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)))
        .take(count)
        .collect()
}

// region Bounding box

/// The box built from any set of points contains all of them, whatever order they arrive in
#[test]
fn bbox_contains_all_points_in_any_order() {
    let mut rng = common::Rng::seed_from_u64(0x5eed);

    for _ in 0..20 {
        let mut points = random_points(&mut rng, 50);
        let bbox = BoundingBox::encompass_points(&points);
        assert!(points.iter().all(|&p| bbox.contains(p)));

        points.shuffle(&mut rng);
        assert_eq!(bbox, BoundingBox::encompass_points(&points));

        // Updating with points already inside changes nothing
        let mut again = bbox;
        points.iter().for_each(|&p| again.update(p));
        assert_eq!(bbox, again);
    }
}

#[test]
fn bbox_empty_until_updated() {
    let mut bbox = BoundingBox::EMPTY;
    assert!(bbox.is_empty());

    bbox.update(Vector3::new(1., 2., 3.));
    assert!(!bbox.is_empty());
    assert_eq!(bbox.min(), Vector3::new(1., 2., 3.));
    assert_eq!(bbox.max(), Vector3::new(1., 2., 3.));
}

// endregion Bounding box

// region Triangle

const V1: Vector3 = Vector3::new(0., 0., 0.);
const V2: Vector3 = Vector3::new(1., 0., 0.);
const V3: Vector3 = Vector3::new(0., 1., 0.);

#[test]
fn triangle_front_face_hits() {
    let ray = Ray::new(Vector3::new(0.25, 0.25, 2.), -Vector3::Z);
    let hit = ray.intersect_triangle(V1, V2, V3);

    assert!(hit.did_hit());
    assert_relative_eq!(hit.dist, 2.);
    assert_relative_eq!(hit.pos, Vector3::new(0.25, 0.25, 0.));
    assert_relative_eq!(hit.normal, Vector3::Z);
}

#[test]
fn triangle_back_face_misses() {
    let ray = Ray::new(Vector3::new(0.25, 0.25, -2.), Vector3::Z);
    assert_eq!(ray.intersect_triangle(V1, V2, V3), Hit::NONE);

    // Same ray, flipped winding
    assert!(ray.intersect_triangle(V1, V3, V2).did_hit());
}

#[test]
fn triangle_parallel_or_degenerate_ray_misses() {
    let parallel = Ray::new(Vector3::new(-1., 0.25, 0.), Vector3::X);
    assert!(!parallel.intersect_triangle(V1, V2, V3).did_hit());

    let degenerate = Ray::new(Vector3::new(0.25, 0.25, 2.), Vector3::ZERO);
    assert!(degenerate.is_degenerate());
    assert!(!degenerate.intersect_triangle(V1, V2, V3).did_hit());
}

/// Points exactly on an edge are outside the triangle
#[test]
fn triangle_edge_collinear_misses() {
    // On the edge V1 -> V2
    let on_edge = Ray::new(Vector3::new(0.5, 0., 1.), -Vector3::Z);
    assert!(!on_edge.intersect_triangle(V1, V2, V3).did_hit());

    // Exactly on a vertex
    let on_vertex = Ray::new(Vector3::new(0., 0., 1.), -Vector3::Z);
    assert!(!on_vertex.intersect_triangle(V1, V2, V3).did_hit());

    // Just inside is fine
    let inside = Ray::new(Vector3::new(0.5, 0.001, 1.), -Vector3::Z);
    assert!(inside.intersect_triangle(V1, V2, V3).did_hit());
}

#[test]
fn triangle_behind_origin_is_not_a_hit() {
    let ray = Ray::new(Vector3::new(0.25, 0.25, -1.), -Vector3::Z);
    let hit = ray.intersect_triangle(V1, V2, V3);
    assert!(!hit.did_hit());
}

// endregion Triangle

// region AABB

fn unit_box() -> BoundingBox { BoundingBox::new(Vector3::splat(-1.), Vector3::splat(1.)) }

#[test]
fn aabb_outside_ray_enters_near_face() {
    let ray = Ray::new(Vector3::new(0.2, 0.3, 5.), -Vector3::Z);

    let hit = unit_box().intersect_ray(&ray, AabbMode::Standard);
    assert_relative_eq!(hit.dist, 4.);
    assert_relative_eq!(hit.normal, Vector3::Z);

    let exit = unit_box().intersect_ray(&ray, AabbMode::Inverted);
    assert_relative_eq!(exit.dist, 6.);
    assert_relative_eq!(exit.normal, Vector3::Z);
}

#[test]
fn aabb_inside_ray_only_hits_inverted() {
    let mut rng = common::Rng::seed_from_u64(0xb0c5);
    for _ in 0..50 {
        let origin = Vector3::new(rng.gen_range(-0.9..0.9), rng.gen_range(-0.9..0.9), rng.gen_range(-0.9..0.9));
        let dir = random_points(&mut rng, 1)[0];
        let ray = Ray::new(origin, dir);
        if ray.is_degenerate() {
            continue;
        }

        assert!(!unit_box().intersect_ray(&ray, AabbMode::Standard).did_hit());

        let exit = unit_box().intersect_ray(&ray, AabbMode::Inverted);
        assert!(exit.did_hit());
        assert!(unit_box().contains(exit.pos + ray.dir() * -1e-3));
    }
}

#[test]
fn aabb_pointing_away_misses() {
    let ray = Ray::new(Vector3::new(0., 0., 5.), Vector3::Z);
    assert!(!unit_box().intersect_ray(&ray, AabbMode::Standard).did_hit());
    assert!(!unit_box().intersect_ray(&ray, AabbMode::Inverted).did_hit());

    let beside = Ray::new(Vector3::new(3., 0., 5.), -Vector3::Z);
    assert!(!unit_box().intersect_ray(&beside, AabbMode::Standard).did_hit());
}

/// Hitting a corner exactly ties all three axes; `x` wins
#[test]
fn aabb_tie_break_prefers_first_axis() {
    let ray = Ray::new(Vector3::splat(3.), Vector3::splat(-1.));
    let hit = unit_box().intersect_ray(&ray, AabbMode::Standard);

    assert!(hit.did_hit());
    assert_relative_eq!(hit.normal, Vector3::X);
    assert_relative_eq!(hit.pos, Vector3::ONE, epsilon = 1e-5);
}

#[test]
fn aabb_empty_never_hits() {
    let ray = Ray::new(Vector3::new(0., 0., 5.), -Vector3::Z);
    assert!(!BoundingBox::EMPTY.intersect_ray(&ray, AabbMode::Standard).did_hit());
    assert!(!BoundingBox::EMPTY.intersect_ray(&ray, AabbMode::Inverted).did_hit());
}

// endregion AABB

// region Mesh & object

#[test]
fn mesh_nearest_face_wins() {
    let cube = common::unit_cube();
    assert_eq!(cube.faces().len(), common::CUBE_FACES);

    // The back face of the cube faces away, and the far face is further; only the near one counts
    let ray = Ray::new(Vector3::new(0.1, -0.2, 5.), -Vector3::Z);
    let hit = cube.intersect_ray(&ray);
    assert_relative_eq!(hit.pos.z, 0.5);
    assert_relative_eq!(hit.dist, 4.5);

    // From inside, the face in front is seen from behind
    let inside = Ray::new(Vector3::new(0.1, -0.2, 0.), -Vector3::Z);
    let hit = cube.intersect_ray(&inside);
    assert!(!hit.did_hit(), "faces are single-sided, so none are visible from inside");
}

#[test]
fn mesh_empty_or_failed_never_hits() {
    let ray = Ray::new(Vector3::new(0., 0., 5.), -Vector3::Z);
    assert!(!UvMesh::new().intersect_ray(&ray).did_hit());
}

#[test]
fn object_transform_round_trip() {
    let mut rng = common::Rng::seed_from_u64(42);
    let mut object = Object::new(common::unit_cube(), None);
    object
        .set_position(Vector3::new(1., -2., 3.))
        .set_scale(Vector3::new(2., 0.5, 3.))
        .set_rotation(Vector3::new(0.3, -0.7, 1.1));

    let model = object.model_matrix();
    let inverse = object.inverse_model_matrix();
    assert_relative_eq!(model * inverse, Matrix4::IDENTITY, epsilon = 1e-5);
    assert_relative_eq!(inverse, model.inverse(), epsilon = 1e-5);

    for p in random_points(&mut rng, 20) {
        assert_relative_eq!(inverse.transform_point(model.transform_point(p)), p, epsilon = 1e-4);
    }
}

/// Intersecting in world-space matches doing it by hand: ray into mesh-space, intersect, hit back out
#[test]
fn object_intersection_matches_local_space() {
    let mut rng = common::Rng::seed_from_u64(7);
    let mut object = Object::new(common::unit_cube(), None);
    object
        .set_position(Vector3::new(1., -2., 3.))
        .set_scale(Vector3::new(2., 0.5, 3.))
        .set_rotation(Vector3::new(0.3, -0.7, 1.1));
    let model = object.model_matrix();
    let inverse = object.inverse_model_matrix();

    let mut hits = 0;
    for _ in 0..200 {
        // Aim through a point inside the cube, from well outside it
        let local_target = Vector3::new(rng.gen_range(-0.4..0.4), rng.gen_range(-0.4..0.4), rng.gen_range(-0.4..0.4));
        let target = model.transform_point(local_target);
        let dir = random_points(&mut rng, 1)[0].normalize_or_zero();
        if dir == Vector3::ZERO {
            continue;
        }
        let ray = Ray::new(target - dir * 30., dir);

        let world = object.intersect_ray(&ray);
        let local_ray = Ray::new(inverse.transform_point(ray.pos()), inverse.transform_vector(ray.dir()));
        let local = object.mesh().intersect_ray(&local_ray);

        assert_eq!(world.did_hit(), local.did_hit(), "{ray:?}");
        if !world.did_hit() {
            continue;
        }
        hits += 1;
        assert_relative_eq!(world.pos, model.transform_point(local.pos), epsilon = 1e-4);
        assert_relative_eq!(world.dist, (world.pos - ray.pos()).length(), epsilon = 1e-4);
        assert_relative_eq!(ray.at(world.dist), world.pos, epsilon = 1e-3);
        let normal = inverse.transpose().transform_vector(local.normal).normalize();
        assert_relative_eq!(world.normal, normal, epsilon = 1e-4);
    }
    assert!(hits > 150, "only {hits} of the rays through the cube hit it");
}

#[test]
fn object_unit_cube_end_to_end() {
    let object = Object::new(common::unit_cube(), None);

    let ray = Ray::new(Vector3::new(0.1, -0.2, 5.), Vector3::new(0., 0., -1.));
    let hit = object.intersect_ray(&ray);

    assert!(hit.did_hit());
    assert_relative_eq!(hit.pos.z, 0.5, epsilon = 1e-5);
    assert_relative_eq!(hit.dist, 4.5, epsilon = 1e-5);
    assert_relative_eq!(hit.normal, Vector3::Z, epsilon = 1e-5);
}

/// A ray straight down the middle lands on the diagonal shared by the two triangles of the face,
/// which counts as an edge for both
#[test]
fn object_unit_cube_diagonal_is_an_edge() {
    let object = Object::new(common::unit_cube(), None);
    let ray = Ray::new(Vector3::new(0., 0., 5.), Vector3::new(0., 0., -1.));
    assert!(!object.intersect_ray(&ray).did_hit());
}

#[test]
fn object_transformed_hits_in_world_space() {
    let mut object = Object::new(common::unit_cube(), None);
    object.set_position(Vector3::new(0., 0., -1.));
    object.set_scale(Vector3::new(1., 1., 3.));

    // Front face is now at z = -1 + 1.5
    let ray = Ray::new(Vector3::new(0.1, -0.2, 5.), -Vector3::Z);
    let hit = object.intersect_ray(&ray);
    assert_relative_eq!(hit.pos, Vector3::new(0.1, -0.2, 0.5), epsilon = 1e-5);
    assert_relative_eq!(hit.dist, 4.5, epsilon = 1e-5);
    assert_relative_eq!(hit.normal, Vector3::Z, epsilon = 1e-5);

    // A quarter turn of yaw leaves the front face where it was
    object.tilt(std::f32::consts::FRAC_PI_2, 0., 0.);
    let hit = object.intersect_ray(&ray);
    assert_relative_eq!(hit.dist, 4.5, epsilon = 1e-4);
    assert_relative_eq!(hit.normal, Vector3::Z, epsilon = 1e-4);
}

#[test]
fn object_normal_survives_non_uniform_scale() {
    let mut object = Object::new(common::unit_cube(), None);
    object.set_scale(Vector3::new(4., 1., 1.));

    // Hits the +y face from above, off-centre in x so the scale matters
    let ray = Ray::new(Vector3::new(1.3, 5., 0.1), -Vector3::Y);
    let hit = object.intersect_ray(&ray);
    assert!(hit.did_hit());
    assert_relative_eq!(hit.normal.length(), 1., epsilon = 1e-6);
    assert_relative_eq!(hit.normal, Vector3::Y, epsilon = 1e-5);
    assert_relative_eq!(hit.dist, 4.5, epsilon = 1e-5);
}

#[test]
fn object_zero_scale_never_hits() {
    let mut object = Object::new(common::unit_cube(), None);
    object.set_scale(Vector3::new(0., 1., 1.));
    let ray = Ray::new(Vector3::new(0.1, -0.2, 5.), -Vector3::Z);
    assert_eq!(object.intersect_ray(&ray), Hit::NONE);
}

#[test]
fn object_bbox_follows_transform() {
    let mut object = Object::new(common::unit_cube(), None);
    object.set_position(Vector3::new(10., 0., 0.));
    object.set_scale(Vector3::splat(2.));

    let bbox = object.bbox();
    assert_relative_eq!(bbox.min(), Vector3::new(9., -1., -1.), epsilon = 1e-5);
    assert_relative_eq!(bbox.max(), Vector3::new(11., 1., 1.), epsilon = 1e-5);
}

// endregion Mesh & object
