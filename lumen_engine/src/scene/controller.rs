//! Controllers turn user input (drags and scrolls) into camera movement.
//!
//! Controllers don't own their camera; each call takes the camera to update, so one controller can be
//! pointed at whichever camera is active.

use std::f32::consts::FRAC_PI_2;

use getset::CopyGetters;
use tracing::trace;

use crate::core::targets::CAMERA;
use crate::core::types::{Number, Vector2, Vector3};
use crate::scene::camera::Camera;

/// Orbits the camera around a pivot, the way Blender's viewport does.
///
/// The camera sits at `distance` from the `target`, at the given `pitch` (elevation) and `yaw`
/// (azimuth, measured from `+x` towards `+z`).
#[derive(Copy, Clone, Debug, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct OrbitController {
    target: Vector3,
    distance: Number,
    pitch: Number,
    yaw: Number,
    /// Whether the camera was upside down when the current drag started; `None` between drags
    #[getset(skip)]
    tilt_latch: Option<bool>,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            target: Vector3::ZERO,
            distance: 1.,
            pitch: 0.,
            yaw: FRAC_PI_2,
            tilt_latch: None,
        }
    }
}

impl OrbitController {
    /// A controller orbiting the origin from `(0, 0, 1)`, moving the camera there
    pub fn new(camera: &mut Camera) -> Self {
        let controller = Self::default();
        controller.apply(camera);
        controller
    }

    fn upside_down(&self) -> bool { self.pitch.cos() < 0. }

    /// Where the camera is placed
    pub fn position(&self) -> Vector3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + Vector3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch) * self.distance
    }

    /// Places the camera at `position`, keeping the target
    pub fn set_position(&mut self, camera: &mut Camera, position: Vector3) {
        let offset = position - self.target;
        self.distance = offset.length();
        // Directly on the target the angles are meaningless, so keep the old ones
        if let Some(dir) = offset.try_normalize() {
            self.pitch = dir.y.clamp(-1., 1.).asin();
            self.yaw = Number::atan2(dir.z, dir.x);
        }
        self.apply(camera);
    }

    /// Moves the target to `pivot`, keeping the camera's angles and distance
    pub fn set_pivot(&mut self, camera: &mut Camera, pivot: Vector3) {
        self.target = pivot;
        self.apply(camera);
    }

    /// Slides the camera and its target across the view plane
    pub fn pan(&mut self, camera: &mut Camera, displacement: Vector2) {
        let w = (self.position() - self.target).normalize_or_zero();
        let u = Vector3::cross(Vector3::Y, w).normalize_or_zero();
        let v = Vector3::cross(w, u);
        let flip = if self.upside_down() { -1. } else { 1. };

        self.target -= (u * displacement.x + v * displacement.y) * flip;
        self.apply(camera);
    }

    /// Orbits around the target: `x` turns the yaw and `y` the pitch.
    ///
    /// The direction of yaw is fixed for the whole drag, from whether the camera was upside down when
    /// it started, so that dragging past the poles doesn't reverse the motion. Call [Self::end_tilt] when
    /// the drag ends.
    pub fn tilt(&mut self, camera: &mut Camera, delta: Vector2) {
        let latched = self.upside_down();
        let upside_down = *self.tilt_latch.get_or_insert(latched);

        self.yaw += if upside_down { -delta.x } else { delta.x };
        self.pitch -= delta.y;
        self.apply(camera);
    }

    /// Releases the yaw direction latched by [Self::tilt]
    pub fn end_tilt(&mut self) { self.tilt_latch = None; }

    /// Moves towards the target for `direction > 0`, away from it for `direction < 0`.
    ///
    /// Each step scales the distance by `1 + speed`.
    pub fn zoom(&mut self, camera: &mut Camera, direction: Number, speed: Number) {
        if direction == 0. {
            return;
        }
        if direction > 0. {
            self.distance /= 1. + speed;
        } else {
            self.distance *= 1. + speed;
        }
        self.apply(camera);
    }

    /// Switches the camera between perspective and orthographic projection
    pub fn swap_projection(&self, camera: &mut Camera) { camera.swap_projection() }

    /// Writes the controller's state into the camera
    pub fn apply(&self, camera: &mut Camera) {
        let up = if self.upside_down() { Vector3::NEG_Y } else { Vector3::Y };
        camera.look_at_from(self.position(), self.target);
        camera.set_unit_up(up);
        trace!(target: CAMERA, eye = ?camera.eye(), target = ?self.target, ?up, "orbit camera moved");
    }
}
