//! # Module [crate::object]
//!
//! Placed instances of a shared mesh.
//!
//! # Terminology
//!
//! ## Model matrix
//! The transform from mesh-space to world-space: scale first, then rotation (yaw, pitch, roll),
//! then translation. See [Object::model_matrix].
//!
//! ## Inverse model matrix
//! The transform from world-space back to mesh-space, used to bring rays into the mesh's frame
//! for picking. See [Object::inverse_model_matrix].

use std::rc::Rc;

use derivative::Derivative;
use getset::{CopyGetters, Getters, Setters};
use puffin::profile_function;
use tracing::trace;

use crate::core::matrix::Matrix4;
use crate::core::targets::OBJECT;
use crate::core::types::{Vector2, Vector3};
use crate::mesh::attribute::AttributeSet;
use crate::mesh::Mesh;
use crate::render::backend::GpuError;
use crate::render::context::RenderContext;
use crate::render::shader::Shader;
use crate::render::texture::Texture;
use crate::shared::aabb::BoundingBox;
use crate::shared::intersect::Hit;
use crate::shared::ray::Ray;
use crate::shared::validate;

pub mod shaders;

/// Name of the model matrix uniform set by [Object::draw]
pub const MODEL_UNIFORM: &str = "M";
/// Name of the texture uniform set by [Object::draw], when the object has a texture
pub const TEXTURE_UNIFORM: &str = "tex2D";

/// A mesh placed in the world with its own position, scale and rotation.
///
/// Many objects can share one mesh (and one texture).
#[derive(Derivative, Getters, CopyGetters, Setters)]
#[derivative(Debug, Clone(bound = ""))]
pub struct Object<A: AttributeSet = (Vector2, Vector3)> {
    #[getset(get_copy = "pub", set = "pub")]
    position: Vector3,
    #[getset(get_copy = "pub", set = "pub")]
    scale: Vector3,
    /// Yaw, pitch and roll, in radians
    #[getset(get_copy = "pub", set = "pub")]
    rotation: Vector3,
    #[getset(get = "pub")]
    mesh: Rc<Mesh<A>>,
    #[getset(get = "pub")]
    texture: Option<Rc<Texture>>,
}

impl<A: AttributeSet> Object<A> {
    /// An object at the origin, unscaled and unrotated
    pub fn new(mesh: Rc<Mesh<A>>, texture: Option<Rc<Texture>>) -> Self {
        Self {
            position: Vector3::ZERO,
            scale: Vector3::ONE,
            rotation: Vector3::ZERO,
            mesh,
            texture,
        }
    }

    /// Moves the object by `offset`
    pub fn translate(&mut self, offset: Vector3) { self.position += offset; }

    /// Adds to the current yaw, pitch and roll
    pub fn tilt(&mut self, yaw: f32, pitch: f32, roll: f32) { self.rotation += Vector3::new(yaw, pitch, roll); }

    pub fn model_matrix(&self) -> Matrix4 {
        Matrix4::scale(self.scale) * Matrix4::rotation(self.rotation) * Matrix4::translation(self.position)
    }

    /// The exact inverse of [Self::model_matrix], undoing translation, then rotation, then scale
    pub fn inverse_model_matrix(&self) -> Matrix4 {
        Matrix4::inverse_translation(self.position)
            * Matrix4::inverse_rotation(self.rotation)
            * Matrix4::inverse_scale(self.scale)
    }

    /// The world-space box around the mesh's box, once transformed
    pub fn bbox(&self) -> BoundingBox { self.mesh.bbox().transformed(&self.model_matrix()) }

    /// Intersects a world-space ray with the object's mesh.
    ///
    /// The hit is returned in world-space, with its distance measured from the ray's origin.
    /// Objects scaled to zero along any axis can't be hit.
    pub fn intersect_ray(&self, ray: &Ray) -> Hit {
        profile_function!();

        if self.scale.cmpeq(Vector3::ZERO).any() {
            return Hit::NONE;
        }

        let inverse = self.inverse_model_matrix();
        let local = Ray::new(inverse.transform_point(ray.pos()), inverse.transform_vector(ray.dir()));
        let hit = self.mesh.intersect_ray(&local);
        if !hit.did_hit() {
            return Hit::NONE;
        }

        // Distances aren't preserved under non-uniform scale, so measure again in world-space
        let pos = self.model_matrix().transform_point(hit.pos);
        let hit = Hit {
            pos,
            normal: inverse.transpose().transform_vector(hit.normal).normalize_or_zero(),
            dist: (pos - ray.pos()).length(),
        };
        validate::hit(ray, hit);
        hit
    }

    /// Sets the model matrix (and texture, if any) on the shader, then draws the mesh with it
    ///
    /// # Errors
    /// See [Mesh::draw]
    pub fn draw(&self, ctx: &mut RenderContext, shader: &mut Shader) -> Result<(), GpuError> {
        trace!(target: OBJECT, position = ?self.position, faces = self.mesh.faces().len(), "drawing object");
        shader.set_uniform(MODEL_UNIFORM, self.model_matrix());
        if let Some(texture) = &self.texture {
            shader.set_texture(TEXTURE_UNIFORM, Rc::clone(texture));
        }
        self.mesh.draw(ctx, shader)
    }
}
