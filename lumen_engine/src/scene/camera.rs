use getset::CopyGetters;
use puffin::profile_function;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;
use tracing::trace;
use valuable::Valuable;

use crate::core::config::CameraConfig;
use crate::core::matrix::Matrix4;
use crate::core::targets::CAMERA;
use crate::core::types::{Number, Vector2, Vector3};
use crate::shared::ray::Ray;
use crate::shared::validate;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Display, Serialize, Deserialize, Valuable)]
pub enum Projection {
    #[default]
    Perspective,
    /// Parallel projection, sized so that the look-at target keeps roughly the same size on screen
    Orthographic,
}

impl Projection {
    /// The other kind of projection
    pub fn swapped(self) -> Self {
        match self {
            Self::Perspective => Self::Orthographic,
            Self::Orthographic => Self::Perspective,
        }
    }
}

#[derive(Error, Copy, Clone, Debug, PartialEq, Eq, Valuable)]
pub enum CamInvalidError {
    /// The provided `up` vector was too close to zero, or parallel to the view direction
    #[error("the `up` vector couldn't be normalised (too small, or parallel to the view direction)")]
    UpVectorInvalid,
    /// The eye and target are at the same position, so there is no view direction
    #[error("the view direction couldn't be normalised (eye and target coincide)")]
    ForwardVectorInvalid,
    /// The field-of-view must be in `(0, pi)`
    #[error("the provided FOV was not valid")]
    FovInvalid,
    /// The aspect ratio must be finite and `> 0`
    #[error("the provided aspect ratio was not valid")]
    AspectInvalid,
    /// The clip planes must satisfy `0 < near < far`
    #[error("the provided clip planes were not valid")]
    ClipPlanesInvalid,
}

/// A look-at camera.
///
/// Matrices follow the row-vector convention of [Matrix4], so a world-space point is projected with
/// `p * view * projection`, which is the same as `p * view_projection`.
#[derive(Copy, Clone, Debug, PartialEq, CopyGetters, Serialize, Deserialize)]
#[getset(get_copy = "pub")]
pub struct Camera {
    /// Position the camera is located at
    eye: Vector3,
    /// Point the camera looks at
    target: Vector3,
    /// Normalised up direction
    up: Vector3,
    /// Vertical FOV, in radians
    fov: Number,
    /// Width over height
    aspect: Number,
    near: Number,
    far: Number,
    projection: Projection,
    /// Set by anything that changes the view or projection; see [Camera::take_updated]
    #[getset(skip)]
    #[serde(skip)]
    updated: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vector3::ZERO,
            target: Vector3::Z,
            up: Vector3::Y,
            fov: Number::to_radians(75.),
            aspect: 1.,
            near: 0.01,
            far: 1000.,
            projection: Projection::Perspective,
            updated: true,
        }
    }
}

// region Constructors

impl Camera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            fov: config.fov_degrees.to_radians(),
            near: config.near_plane,
            far: config.far_plane,
            ..Self::default()
        }
    }
}

// endregion Constructors

// region Setters

impl Camera {
    /// Sets the aspect ratio from the size of the viewport
    pub fn set_aspect_ratio(&mut self, width: Number, height: Number) {
        self.aspect = width / height;
        self.updated = true;
    }

    /// Sets the vertical field of view, in radians
    pub fn set_fov(&mut self, fov: Number) {
        self.fov = fov;
        self.updated = true;
    }

    pub fn set_fov_degrees(&mut self, fov: Number) { self.set_fov(fov.to_radians()) }

    pub fn set_clip_planes(&mut self, near: Number, far: Number) {
        self.near = near;
        self.far = far;
        self.updated = true;
    }

    /// Moves the camera to `eye`, looking at `target`
    pub fn look_at_from(&mut self, eye: Vector3, target: Vector3) {
        self.eye = eye;
        self.target = target;
        self.updated = true;
    }

    /// Moves the camera without changing what it looks at
    pub fn set_position(&mut self, eye: Vector3) {
        self.eye = eye;
        self.updated = true;
    }

    /// Sets the up direction, normalising it.
    ///
    /// # Errors
    /// If `up` can't be normalised the camera is unchanged and [CamInvalidError::UpVectorInvalid] is returned
    pub fn set_up(&mut self, up: Vector3) -> Result<(), CamInvalidError> {
        self.up = up.try_normalize().ok_or(CamInvalidError::UpVectorInvalid)?;
        self.updated = true;
        Ok(())
    }

    /// Sets an up direction that is already known to be normalised
    pub(crate) fn set_unit_up(&mut self, up: Vector3) {
        validate::normal3(up);
        self.up = up;
        self.updated = true;
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        self.updated = true;
    }

    /// Switches between perspective and orthographic projection
    pub fn swap_projection(&mut self) { self.set_projection(self.projection.swapped()) }

    /// Whether the camera changed since this was last called, clearing the flag
    pub fn take_updated(&mut self) -> bool { std::mem::take(&mut self.updated) }
}

// endregion Setters

// region Impl

impl Camera {
    /// Checks that every setting of the camera is usable
    pub fn validate(&self) -> Result<(), CamInvalidError> {
        if !(self.fov > 0. && self.fov < std::f32::consts::PI) {
            return Err(CamInvalidError::FovInvalid);
        }
        if !(self.aspect > 0. && self.aspect.is_finite()) {
            return Err(CamInvalidError::AspectInvalid);
        }
        if !(self.near > 0. && self.far > self.near) {
            return Err(CamInvalidError::ClipPlanesInvalid);
        }
        self.basis().map(|_| ())
    }

    /// The camera's orthonormal basis `[u, v, w]`: right, up, and *backwards* (from the target to the eye)
    pub fn basis(&self) -> Result<[Vector3; 3], CamInvalidError> {
        let w = (self.eye - self.target)
            .try_normalize()
            .ok_or(CamInvalidError::ForwardVectorInvalid)?;
        let u = Vector3::cross(self.up, w)
            .try_normalize()
            .ok_or(CamInvalidError::UpVectorInvalid)?;
        let v = Vector3::cross(w, u);
        Ok([u, v, w])
    }

    /// World-space to camera-space; the camera looks down its `-z`
    pub fn view_matrix(&self) -> Matrix4 {
        let w = (self.eye - self.target).normalize_or_zero();
        let u = Vector3::cross(self.up, w).normalize_or_zero();
        let v = Vector3::cross(w, u);
        Matrix4::translation(-self.eye)
            * Matrix4::from_rows([
                [u.x, v.x, w.x, 0.],
                [u.y, v.y, w.y, 0.],
                [u.z, v.z, w.z, 0.],
                [0., 0., 0., 1.],
            ])
    }

    /// Camera-space to clip-space, with depth mapped to `[-1, 1]`
    pub fn projection_matrix(&self) -> Matrix4 {
        let (n, f) = (self.near, self.far);
        match self.projection {
            Projection::Perspective => {
                let tan = Number::tan(self.fov / 2.);
                Matrix4::from_rows([
                    [1. / (tan * self.aspect), 0., 0., 0.],
                    [0., 1. / tan, 0., 0.],
                    [0., 0., -(n + f) / (f - n), -1.],
                    [0., 0., -2. * n * f / (f - n), 0.],
                ])
            }
            Projection::Orthographic => {
                let size = (self.target - self.eye).length();
                let half_width = self.aspect * size;
                Matrix4::from_rows([
                    [1. / half_width, 0., 0., 0.],
                    [0., 1. / size, 0., 0.],
                    [0., 0., -2. / (f - n), 0.],
                    [0., 0., -(f + n) / (f - n), 1.],
                ])
            }
        }
    }

    pub fn view_projection(&self) -> Matrix4 { self.view_matrix() * self.projection_matrix() }

    /// A ray from the eye through a point on the screen.
    ///
    /// `ndc` is in normalised device coordinates: `(0, 0)` is the centre of the screen, `(1, 1)` the top right.
    ///
    /// # Errors
    /// If the camera's basis can't be computed, see [Camera::basis]
    pub fn cast_ray(&self, ndc: Vector2) -> Result<Ray, CamInvalidError> {
        profile_function!();

        let [u, v, w] = self.basis()?;
        let tan = Number::tan(self.fov / 2.);
        let x = ndc.x * tan * self.aspect;
        let y = ndc.y * tan;

        let ray = Ray::new(self.eye, u * x + v * y - w);
        validate::ray(ray);
        trace!(target: CAMERA, ?ndc, ?ray, "cast camera ray");
        Ok(ray)
    }
}

// endregion Impl
