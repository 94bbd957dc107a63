//! Headless mesh inspector.
//!
//! Usage:
//!   cargo run -p lumen_inspect -- [--config engine.json] [--no-cache] [--ndc X Y] [--distance D]
//!                                 [--texture image.png] <mesh.obj>
//!
//! Loads the mesh (through the geometry cache unless `--no-cache` is given), places an orbit camera
//! looking at its centre, casts a pick ray through the given point on the screen, and reports what it hit.
//! Finally the object is drawn once through a headless backend, to check that it uploads cleanly.

use std::env;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context};
use lumen_engine::core::config::EngineConfig;
use lumen_engine::core::types::{Vector2, Vector3};
use lumen_engine::mesh::{MeshStatus, UvMesh};
use lumen_engine::object::{shaders, Object};
use lumen_engine::render::backend::Viewport;
use lumen_engine::render::context::RenderContext;
use lumen_engine::render::headless::HeadlessBackend;
use lumen_engine::render::texture::{Texture, TextureFilter};
use lumen_engine::scene::camera::Camera;
use lumen_engine::scene::controller::OrbitController;
use tracing::{debug, info, warn};

mod targets;

use targets::{MAIN, PICK};

const VIEWPORT: Viewport = Viewport {
    x: 0,
    y: 0,
    width: 1280,
    height: 720,
};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    mesh: Option<PathBuf>,
    texture: Option<PathBuf>,
    no_cache: bool,
    ndc: Vector2,
    distance: Option<f32>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args::default();
    let argv: Vec<String> = env::args().collect();
    let number = |i: usize| -> anyhow::Result<f32> {
        let arg = argv.get(i).with_context(|| format!("missing value for {}", argv[i - 1]))?;
        arg.parse().with_context(|| format!("{arg:?} is not a number"))
    };

    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str() {
            "--config" if i + 1 < argv.len() => {
                args.config = Some(PathBuf::from(&argv[i + 1]));
                i += 2;
            }
            "--texture" if i + 1 < argv.len() => {
                args.texture = Some(PathBuf::from(&argv[i + 1]));
                i += 2;
            }
            "--no-cache" => {
                args.no_cache = true;
                i += 1;
            }
            "--ndc" => {
                args.ndc = Vector2::new(number(i + 1)?, number(i + 2)?);
                i += 3;
            }
            "--distance" => {
                args.distance = Some(number(i + 1)?);
                i += 2;
            }
            flag if flag.starts_with("--") => {
                warn!(target: MAIN, flag, "ignoring unknown flag");
                i += 1;
            }
            path => {
                args.mesh = Some(PathBuf::from(path));
                i += 1;
            }
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = parse_args()?;
    let Some(mesh_path) = args.mesh.as_deref() else {
        bail!("usage: lumen_inspect [--config FILE] [--no-cache] [--ndc X Y] [--distance D] [--texture FILE] <mesh.obj>");
    };

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path).with_context(|| format!("loading config {path:?}"))?,
        None => EngineConfig::default(),
    };
    if args.no_cache {
        config.mesh.use_cache = false;
    }
    info!(target: MAIN, ?config, "starting inspector");

    // region Load

    let mesh = UvMesh::load_obj(mesh_path, &config.mesh);
    if mesh.status() != MeshStatus::Ok {
        bail!("couldn't load mesh {mesh_path:?}: {}", mesh.status());
    }
    let bbox = mesh.bbox();
    info!(
        target: MAIN,
        faces = mesh.faces().len(),
        min = ?bbox.min(),
        max = ?bbox.max(),
        stride = mesh.layout().stride(),
        "mesh loaded"
    );

    let backend = HeadlessBackend::new();
    let calls = backend.log();
    let mut ctx = RenderContext::new(backend);
    ctx.bind_viewport(VIEWPORT);

    let texture = args
        .texture
        .as_ref()
        .map(|path| Texture::load_from_file(&mut ctx, path, TextureFilter::Linear, TextureFilter::Linear));
    let object = Object::new(Rc::clone(&mesh), texture.clone());

    // endregion Load

    // region Pick

    let mut camera = Camera::from_config(&config.camera);
    camera.set_aspect_ratio(VIEWPORT.width as f32, VIEWPORT.height as f32);
    let mut controller = OrbitController::new(&mut camera);
    let centre = bbox.centre();
    let distance = args.distance.unwrap_or(2. * bbox.size().length()).max(1e-3);
    controller.set_pivot(&mut camera, centre);
    controller.set_position(&mut camera, centre + Vector3::Z * distance);
    camera.validate().context("camera can't see the mesh")?;

    let ray = camera.cast_ray(args.ndc).context("casting pick ray")?;
    debug!(target: PICK, ndc = ?args.ndc, ?ray, "cast pick ray");

    let hit = object.intersect_ray(&ray);
    if hit.did_hit() {
        info!(target: PICK, pos = ?hit.pos, normal = ?hit.normal, dist = hit.dist, "picked mesh");
        println!("hit at {:?}, normal {:?}, distance {}", hit.pos, hit.normal, hit.dist);
    } else {
        info!(target: PICK, ndc = ?args.ndc, "pick ray missed");
        println!("miss");
    }

    // endregion Pick

    // region Draw

    let mut shader = match texture {
        Some(tex) if !tex.is_empty() => shaders::textured(),
        _ => shaders::normal(),
    };
    shader.set_camera(&camera);
    object.draw(&mut ctx, &mut shader).context("drawing mesh")?;

    drop(object);
    drop(shader);
    drop(mesh);
    let released = ctx.collect_garbage();
    info!(target: MAIN, calls = calls.borrow().len(), released, "headless draw finished");

    // endregion Draw

    Ok(())
}
