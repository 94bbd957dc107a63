#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::rc::Rc;

use lumen_engine::core::config::LoadOpts;
use lumen_engine::mesh::obj::parse_obj;
use lumen_engine::mesh::UvMesh;
use lumen_engine::render::context::RenderContext;
use lumen_engine::render::headless::{CallLog, GpuCall, HeadlessBackend};

pub type Rng = rand::rngs::SmallRng;

/// Axis-aligned cube from `-0.5` to `0.5`, wound so that every face is visible from outside
pub const CUBE_OBJ: &str = "\
# unit cube
v -0.5 -0.5 -0.5
v 0.5 -0.5 -0.5
v 0.5 0.5 -0.5
v -0.5 0.5 -0.5
v -0.5 -0.5 0.5
v 0.5 -0.5 0.5
v 0.5 0.5 0.5
v -0.5 0.5 0.5
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 1 0 0
vn -1 0 0
vn 0 1 0
vn 0 -1 0
vn 0 0 1
vn 0 0 -1
f 5/1/5 6/2/5 7/3/5
f 5/1/5 7/3/5 8/4/5
f 1/1/6 3/3/6 2/2/6
f 1/1/6 4/4/6 3/3/6
f 2/1/1 3/2/1 7/3/1
f 2/1/1 7/3/1 6/4/1
f 1/1/2 5/2/2 8/3/2
f 1/1/2 8/3/2 4/4/2
f 4/1/3 8/2/3 7/3/3
f 4/1/3 7/3/3 3/4/3
f 1/1/4 2/2/4 6/3/4
f 1/1/4 6/3/4 5/4/4
";

pub const CUBE_FACES: usize = 12;

/// The unit cube, built directly without touching the filesystem
pub fn unit_cube_mesh() -> UvMesh {
    let data = parse_obj(CUBE_OBJ, usize::MAX).expect("cube should parse");
    let mut mesh = UvMesh::new();
    mesh.construct_faces(&data.positions, &data.faces, (data.uvs.as_slice(), data.normals.as_slice()))
        .expect("cube indices should be in range");
    mesh
}

pub fn unit_cube() -> Rc<UvMesh> { Rc::new(unit_cube_mesh()) }

/// Writes `text` to a file called `name` inside `dir`
pub fn write_file(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("failed writing test file");
    path
}

pub fn cache_opts() -> LoadOpts { LoadOpts::default() }

pub fn no_cache_opts() -> LoadOpts {
    LoadOpts {
        use_cache: false,
        ..LoadOpts::default()
    }
}

/// A context over a fresh headless backend, with a handle to the calls it receives
pub fn headless_context() -> (RenderContext, CallLog) {
    let backend = HeadlessBackend::new();
    let log = backend.log();
    (RenderContext::new(backend), log)
}

/// How many of the logged calls match `pred`
pub fn count_calls(log: &CallLog, pred: impl Fn(&GpuCall) -> bool) -> usize { log.borrow().iter().filter(|c| pred(c)).count() }
