use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::{Rc, Weak};

use tracing::{debug, error, trace};

use crate::core::targets::RENDER;
use crate::core::types::GpuId;
use crate::render::backend::{GpuError, GpuResource, ShaderSources, UniformValue};
use crate::render::context::RenderContext;
use crate::render::handle::GpuHandle;
use crate::render::texture::Texture;
use crate::scene::camera::Camera;

/// Name of the view-projection uniform set by [Shader::set_camera]
pub const VIEW_PROJECTION_UNIFORM: &str = "VP";

/// Where the value of a uniform comes from, each time the shader is used
#[derive(Clone, Debug)]
enum UniformSource {
    Static(UniformValue),
    Texture(Rc<Texture>),
    /// Re-read from the camera on every use, for as long as the camera is alive
    Camera(Weak<RefCell<Camera>>),
}

/// A shader program and the uniforms bound to it.
///
/// The program is compiled the first time it is used. Uniforms are stored by name and
/// (re)applied every time [Shader::use_program] is called.
#[derive(Debug)]
pub struct Shader {
    sources: ShaderSources,
    program: Option<Rc<GpuHandle>>,
    uniforms: BTreeMap<String, UniformSource>,
}

impl Shader {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::from_sources(ShaderSources {
            vertex: vertex.into(),
            fragment: fragment.into(),
            geometry: None,
        })
    }

    pub fn from_sources(sources: ShaderSources) -> Self {
        Self {
            sources,
            program: None,
            uniforms: BTreeMap::new(),
        }
    }

    /// Reads the stage sources from text files
    pub fn load_from_files(
        vertex: impl AsRef<Path>,
        fragment: impl AsRef<Path>,
        geometry: Option<&Path>,
    ) -> std::io::Result<Self> {
        Ok(Self::from_sources(ShaderSources {
            vertex: std::fs::read_to_string(vertex)?,
            fragment: std::fs::read_to_string(fragment)?,
            geometry: geometry.map(std::fs::read_to_string).transpose()?,
        }))
    }

    pub fn sources(&self) -> &ShaderSources { &self.sources }

    /// The program id, if the shader has been compiled yet
    pub fn id(&self) -> Option<GpuId> { self.program.as_ref().map(|p| p.id()) }

    pub fn is_compiled(&self) -> bool { self.program.is_some() }

    /// Makes this the current program, compiling it first if needed, and applies all uniforms
    ///
    /// # Errors
    /// A program that fails to compile or link is a fatal [GpuError]
    pub fn use_program(&mut self, ctx: &mut RenderContext) -> Result<(), GpuError> {
        let program = match self.id() {
            Some(id) => id,
            None => {
                let id = ctx.backend().compile_program(&self.sources).map_err(|err| {
                    error!(target: RENDER, %err, "shader program failed to build");
                    err
                })?;
                debug!(target: RENDER, id, "compiled shader program");
                self.program = Some(ctx.adopt(GpuResource::Program(id)));
                id
            }
        };

        ctx.use_program(program);
        self.uniforms.retain(|name, source| {
            let value = match source {
                UniformSource::Static(value) => Some(*value),
                UniformSource::Texture(texture) => texture.id().map(|id| UniformValue::Texture { unit: 0, texture: id }),
                UniformSource::Camera(camera) => match camera.upgrade() {
                    Some(camera) => Some(camera.borrow().view_projection().into()),
                    // The camera is gone, so the binding never resolves again
                    None => {
                        trace!(target: RENDER, name = %name, "dropping uniform bound to dead camera");
                        return false;
                    }
                },
            };
            if let Some(value) = value {
                ctx.backend().set_uniform(program, name, &value);
            }
            true
        });
        Ok(())
    }

    pub fn set_uniform(&mut self, name: impl Into<String>, value: impl Into<UniformValue>) {
        self.uniforms
            .insert(name.into(), UniformSource::Static(value.into()));
    }

    /// Binds a texture. Empty textures are kept but never applied
    pub fn set_texture(&mut self, name: impl Into<String>, texture: Rc<Texture>) {
        self.uniforms
            .insert(name.into(), UniformSource::Texture(texture));
    }

    /// Sets the [view-projection](VIEW_PROJECTION_UNIFORM) uniform from the camera's current state
    pub fn set_camera(&mut self, camera: &Camera) { self.set_camera_as(VIEW_PROJECTION_UNIFORM, camera) }

    /// Sets a named uniform to the camera's current view-projection matrix
    pub fn set_camera_as(&mut self, name: impl Into<String>, camera: &Camera) {
        self.set_uniform(name, camera.view_projection())
    }

    /// Binds a uniform to the camera, so that it follows the camera on every use.
    ///
    /// Only a weak reference is kept; once the camera is dropped the binding is removed.
    pub fn bind_camera(&mut self, name: impl Into<String>, camera: &Rc<RefCell<Camera>>) {
        self.uniforms
            .insert(name.into(), UniformSource::Camera(Rc::downgrade(camera)));
    }

    /// The statically set value of a uniform, if any
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        match self.uniforms.get(name)? {
            UniformSource::Static(value) => Some(*value),
            _ => None,
        }
    }
}
