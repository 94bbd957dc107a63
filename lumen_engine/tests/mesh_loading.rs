use std::fs::File;
use std::io::BufWriter;

use approx::assert_relative_eq;
use lumen_engine::core::types::*;
use lumen_engine::mesh::cache::{self, CacheMiss, Timestamp, CACHE_VERSION};
use lumen_engine::mesh::face::{CornerIndices, FaceIndices};
use lumen_engine::mesh::generic::IndexArray;
use lumen_engine::mesh::obj::{parse_obj, ObjError};
use lumen_engine::mesh::{Mesh, MeshError, MeshStatus, UvMesh};
use lumen_engine::shared::aabb::BoundingBox;

mod common;

// region Construction

#[test]
fn construct_faces_gathers_attributes_in_order() {
    let positions = [Vector3::ZERO, Vector3::X, Vector3::Y, Vector3::splat(7.)];
    let colours = [ColourRgba::RED, ColourRgba::GREEN];
    let ids = [10_u32, 20, 30];
    let indices = [FaceIndices::new([
        CornerIndices::new(0, [1, 2]),
        CornerIndices::new(1, [0, 1]),
        CornerIndices::new(2, [1, 0]),
    ])];

    let mut mesh = Mesh::<(ColourRgba, u32)>::new();
    mesh.construct_faces(&positions, &indices, (&colours[..], &ids[..]))
        .expect("indices are in range");

    assert_eq!(mesh.status(), MeshStatus::Ok);
    let [a, b, c] = mesh.faces()[0].vertices;
    assert_eq!(a.position, Vector3::ZERO);
    assert_eq!(a.attrs, (ColourRgba::GREEN, 30));
    assert_eq!(b.attrs, (ColourRgba::RED, 20));
    assert_eq!(c.attrs, (ColourRgba::GREEN, 10));

    // Unreferenced positions still count towards the bounds
    assert_eq!(mesh.bbox().max(), Vector3::splat(7.));
    assert!(mesh.is_dirty());
}

#[test]
fn construct_faces_rejects_out_of_range_index() {
    let positions = [Vector3::ZERO, Vector3::X, Vector3::Y];
    let uvs = [Vector2::ZERO];
    let normals = [Vector3::Z];
    let indices = [FaceIndices::new([
        CornerIndices::new(0, [0, 0]),
        CornerIndices::new(1, [0, 5]),
        CornerIndices::new(2, [0, 0]),
    ])];

    let mut mesh = common::unit_cube_mesh();
    let err = mesh
        .construct_faces(&positions, &indices, (&uvs[..], &normals[..]))
        .expect_err("normal index 5 is out of range");

    assert_eq!(
        err,
        MeshError::IndexOutOfRange {
            array: IndexArray::Attribute(1),
            index: 5,
            len: 1
        }
    );
    assert!(mesh.is_empty(), "previous faces should have been cleared");
    assert_eq!(mesh.status(), MeshStatus::Failed);
}

#[test]
fn construct_faces_rejects_out_of_range_position() {
    let indices = [FaceIndices::<()>::new([CornerIndices::new(0, []), CornerIndices::new(1, []), CornerIndices::new(3, [])])];
    let mut mesh = Mesh::<()>::new();
    let err = mesh
        .construct_faces(&[Vector3::ZERO, Vector3::X, Vector3::Y], &indices, ())
        .expect_err("position index 3 is out of range");
    assert!(matches!(err, MeshError::IndexOutOfRange { array: IndexArray::Position, index: 3, len: 3 }));
}

// endregion Construction

// region OBJ

#[test]
fn obj_parses_cube() {
    let data = parse_obj(common::CUBE_OBJ, usize::MAX).expect("cube should parse");
    assert_eq!(data.positions.len(), 8);
    assert_eq!(data.uvs.len(), 4);
    assert_eq!(data.normals.len(), 6);
    assert_eq!(data.faces.len(), common::CUBE_FACES);

    // One-based in the file
    assert_eq!(data.faces[0].corners[0].position, 4);
    assert_eq!(data.faces[0].corners[0].attrs, [0, 4]);

    let cube = common::unit_cube();
    assert_relative_eq!(cube.bbox().min(), Vector3::splat(-0.5));
    assert_relative_eq!(cube.bbox().max(), Vector3::splat(0.5));
}

#[test]
fn obj_ignores_unknown_lines_and_extra_components() {
    let text = "mtllib cube.mtl\no thing\nv 1 2 3 1.0\nvt 0.5 0.5 0\nvn 0 0 1\ns off\n\nf 1/1/1 1/1/1 1/1/1\n";
    let data = parse_obj(text, usize::MAX).expect("should parse");
    assert_eq!(data.positions, vec![Vector3::new(1., 2., 3.)]);
    assert_eq!(data.uvs, vec![Vector2::new(0.5, 0.5)]);
    assert_eq!(data.faces.len(), 1);
}

#[test]
fn obj_parse_failures() {
    let parse = |text: &str| parse_obj(text, usize::MAX).expect_err("should fail");

    assert!(matches!(parse("v 1 2"), ObjError::MissingComponent { line: 1, prefix: "v", expected: 3 }));
    assert!(matches!(parse("\nvt 1 nope"), ObjError::InvalidNumber { line: 2, .. }));
    assert!(matches!(parse("f 1/1/1 2/2/2 3/3/3 4/4/4"), ObjError::NonTriangularFace { count: 4, .. }));
    assert!(matches!(parse("f 1/1 2/2 3/3"), ObjError::InvalidCorner { .. }));
    assert!(matches!(parse("f 0/1/1 1/1/1 1/1/1"), ObjError::InvalidIndex { index: 0, .. }));
    assert!(matches!(parse("f -1/1/1 1/1/1 1/1/1"), ObjError::InvalidIndex { index: -1, .. }));
}

/// Errors point at the line in the file, counting the lines that were skipped
#[test]
fn obj_errors_keep_source_lines() {
    let bad_number = "# exported\nmtllib a.mtl\nv 0 0 0\n\nv 1 x 2\nvt 0 0\n";
    match parse_obj(bad_number, usize::MAX) {
        Err(ObjError::InvalidNumber { line, found }) => {
            assert_eq!(line, 5);
            assert!(found.contains('x'), "{found:?}");
        }
        other => panic!("expected an invalid number, got {other:?}"),
    }

    let quad = "v 0 0 0\nvt 0 0\nvn 0 0 1\ng side\nf 1/1/1 1/1/1 1/1/1\nf 1/1/1 1/1/1 1/1/1 1/1/1\n";
    assert_eq!(
        parse_obj(quad, usize::MAX),
        Err(ObjError::NonTriangularFace { line: 6, count: 4 })
    );

    let no_normal = "v 0 0 0\nvt 0 0\n\nf 1/1 1/1/1 1/1/1\n";
    assert_eq!(
        parse_obj(no_normal, usize::MAX),
        Err(ObjError::InvalidCorner {
            line: 4,
            found: "1/1".to_string()
        })
    );
}

#[test]
fn obj_missing_file() {
    let dir = tempfile::tempdir().expect("couldn't create temp dir");
    let mesh = UvMesh::load_obj(dir.path().join("nope.obj"), &common::cache_opts());

    assert_eq!(mesh.status(), MeshStatus::FileNotFound);
    assert!(mesh.is_empty());
}

#[test]
fn obj_malformed_file_fails_empty() {
    let dir = tempfile::tempdir().expect("couldn't create temp dir");
    let quads = common::write_file(dir.path(), "quads.obj", "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 1/1/1 1/1/1 1/1/1\n");
    let out_of_range = common::write_file(dir.path(), "range.obj", "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 1/1/1 1/1/2\n");

    for path in [quads, out_of_range] {
        let mesh = UvMesh::load_obj(&path, &common::cache_opts());
        assert_eq!(mesh.status(), MeshStatus::Failed, "{path:?}");
        assert!(mesh.is_empty());
        assert!(!cache::cache_path(&path, ".cache").expect("has a file name").exists(), "failed loads aren't cached");
    }
}

// endregion OBJ

// region Cache

#[test]
fn cache_written_and_identical_to_cold_parse() {
    let dir = tempfile::tempdir().expect("couldn't create temp dir");
    let path = common::write_file(dir.path(), "cube.obj", common::CUBE_OBJ);

    let cold = UvMesh::load_obj(&path, &common::no_cache_opts());
    let first = UvMesh::load_obj(&path, &common::cache_opts());
    let cache_file = cache::cache_path(&path, ".cache").expect("has a file name");
    assert!(cache_file.is_file());
    let warm = UvMesh::load_obj(&path, &common::cache_opts());

    for mesh in [&first, &warm] {
        assert_eq!(mesh.status(), MeshStatus::Ok);
        assert_eq!(mesh.faces(), cold.faces());
        assert_eq!(mesh.bbox(), cold.bbox());
        assert_eq!(mesh.vertex_bytes(), cold.vertex_bytes());
    }
}

#[test]
fn cache_is_preferred_when_valid() {
    let dir = tempfile::tempdir().expect("couldn't create temp dir");
    let path = common::write_file(dir.path(), "cube.obj", common::CUBE_OBJ);

    // A cache holding a single face, stamped with the source's real mtime
    let face = common::unit_cube().faces()[0];
    let bbox = BoundingBox::new(Vector3::splat(-3.), Vector3::splat(3.));
    let mtime = Timestamp::of_file(&path).expect("couldn't read mtime");
    cache::save(&path, ".cache", mtime, &bbox, &[face]).expect("couldn't save cache");

    let mesh = UvMesh::load_obj(&path, &common::cache_opts());
    assert_eq!(mesh.faces(), &vec![face]);
    assert_eq!(mesh.bbox(), bbox);
}

/// A cache one second older than its source is stale, even with a matching version
#[test]
fn cache_stale_by_one_second() {
    let dir = tempfile::tempdir().expect("couldn't create temp dir");
    let path = common::write_file(dir.path(), "cube.obj", common::CUBE_OBJ);
    let cube = common::unit_cube();

    let current = Timestamp::of_file(&path).expect("couldn't read mtime");
    let earlier = Timestamp {
        secs: current.secs - 1,
        ..current
    };
    let cache_file = cache::cache_path(&path, ".cache").expect("has a file name");
    std::fs::create_dir_all(cache_file.parent().expect("has a parent")).expect("couldn't create cache dir");
    let mut out = BufWriter::new(File::create(&cache_file).expect("couldn't create cache file"));
    cache::write_record(&mut out, earlier, &cube.bbox(), cube.faces()).expect("couldn't write cache");
    drop(out);

    let bytes = std::fs::read(&cache_file).expect("couldn't read cache");
    let record = cache::read_record::<(Vector2, Vector3)>(&bytes).expect("cache is well formed");
    assert_eq!(record.version, CACHE_VERSION);
    assert_eq!(record.source_mtime, earlier);

    match cache::try_load::<(Vector2, Vector3)>(&path, ".cache") {
        Err(CacheMiss::Stale { cached, current: now }) => {
            assert_eq!(cached, earlier);
            assert_eq!(now, current);
        }
        other => panic!("expected a stale cache, got {other:?}"),
    }

    // The loader falls back to parsing, and rewrites the cache
    let mesh = UvMesh::load_obj(&path, &common::cache_opts());
    assert_eq!(mesh.faces().len(), common::CUBE_FACES);
    assert!(cache::try_load::<(Vector2, Vector3)>(&path, ".cache").is_ok());
}

/// The cache carries the mtime the source had when it was read, so an edit landing between the read and
/// the save still leaves it stale
#[test]
fn cache_stamped_with_mtime_seen_at_read() {
    let dir = tempfile::tempdir().expect("couldn't create temp dir");
    let path = common::write_file(dir.path(), "cube.obj", common::CUBE_OBJ);
    let cube = common::unit_cube();

    let seen_at_read = Timestamp::of_file(&path).expect("couldn't read mtime");
    // The source is edited after it was read
    let edited = seen_at_read.to_system_time() + std::time::Duration::from_secs(5);
    File::options()
        .write(true)
        .open(&path)
        .and_then(|file| file.set_modified(edited))
        .expect("couldn't set mtime");

    let cache_file = cache::save(&path, ".cache", seen_at_read, &cube.bbox(), cube.faces()).expect("couldn't save cache");
    let bytes = std::fs::read(&cache_file).expect("couldn't read cache");
    let record = cache::read_record::<(Vector2, Vector3)>(&bytes).expect("cache is well formed");
    assert_eq!(record.source_mtime, seen_at_read);

    match cache::try_load::<(Vector2, Vector3)>(&path, ".cache") {
        Err(CacheMiss::Stale { cached, current }) => {
            assert_eq!(cached, seen_at_read);
            assert_eq!(current, Timestamp::from_system_time(edited));
        }
        other => panic!("expected a stale cache, got {other:?}"),
    }

    // Loading again reparses and stamps the cache with the edited mtime
    let mesh = UvMesh::load_obj(&path, &common::cache_opts());
    assert_eq!(mesh.faces().len(), common::CUBE_FACES);
    let record = cache::try_load::<(Vector2, Vector3)>(&path, ".cache").expect("cache is fresh again");
    assert_eq!(record.source_mtime, Timestamp::from_system_time(edited));
}

#[test]
fn cache_rejects_wrong_version_layout_or_length() {
    let cube = common::unit_cube();
    let mtime = Timestamp { secs: 1_700_000_000, nanos: 5 };
    let mut bytes = Vec::new();
    cache::write_record(&mut bytes, mtime, &cube.bbox(), cube.faces()).expect("writing to a vec can't fail");

    let record = cache::read_record::<(Vector2, Vector3)>(&bytes).expect("round trips");
    assert_eq!(record.faces, *cube.faces());
    assert_eq!(record.bbox, cube.bbox());
    assert_eq!(record.stride, 32);

    // Same bytes, read as a mesh with a different vertex shape
    assert!(matches!(
        cache::read_record::<(Vector2,)>(&bytes),
        Err(CacheMiss::LayoutMismatch { found: 32, expected: 20 })
    ));

    let mut old = bytes.clone();
    old[..4].copy_from_slice(&(CACHE_VERSION - 1).to_le_bytes());
    assert!(matches!(
        cache::read_record::<(Vector2, Vector3)>(&old),
        Err(CacheMiss::VersionMismatch { .. })
    ));

    let truncated = &bytes[..bytes.len() - 1];
    assert!(matches!(cache::read_record::<(Vector2, Vector3)>(truncated), Err(CacheMiss::Truncated)));
    assert!(matches!(cache::read_record::<(Vector2, Vector3)>(&bytes[..10]), Err(CacheMiss::Truncated)));
}

#[test]
fn cache_of_empty_mesh_keeps_empty_bbox() {
    let mut bytes = Vec::new();
    cache::write_record::<(Vector2, Vector3)>(&mut bytes, Timestamp { secs: 0, nanos: 0 }, &BoundingBox::EMPTY, &[])
        .expect("writing to a vec can't fail");
    let record = cache::read_record::<(Vector2, Vector3)>(&bytes).expect("round trips");
    assert!(record.faces.is_empty());
    assert!(record.bbox.is_empty());
}

#[test]
fn timestamp_round_trips_before_epoch() {
    let time = std::time::UNIX_EPOCH - std::time::Duration::from_millis(1500);
    let stamp = Timestamp::from_system_time(time);
    assert_eq!(stamp, Timestamp { secs: -2, nanos: 500_000_000 });
    assert_eq!(stamp.to_system_time(), time);
}

// endregion Cache
