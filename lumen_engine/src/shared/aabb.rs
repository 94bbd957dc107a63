use std::borrow::Borrow;

use bytemuck::{Pod, Zeroable};
use getset::*;
use strum_macros::Display;
use valuable::Valuable;

use crate::core::types::{Matrix4, Number, Vector3};
use crate::shared::intersect::Hit;
use crate::shared::ray::Ray;

/// An **Axis-Aligned Bounding Box** (AABB)
///
/// The box spans between the two corners `min` and `max`.
/// A box is grown one point at a time with [BoundingBox::update], starting from [BoundingBox::EMPTY]
#[derive(CopyGetters, Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[getset(get_copy = "pub")]
#[repr(C)]
pub struct BoundingBox {
    /// The lower corner of the [BoundingBox]; the corner with the smallest coordinates
    min: Vector3,
    /// The upper corner of the [BoundingBox]; the corner with the largest coordinates
    max: Vector3,
}

/// Which face of the box [BoundingBox::intersect_ray] reports
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Display, Valuable)]
pub enum AabbMode {
    /// The entry point of the ray. Rays starting inside the box miss
    #[default]
    Standard,
    /// The exit point of the ray, which exists for rays starting inside the box as well
    Inverted,
}

// region Constructors

impl BoundingBox {
    /// A box containing nothing: `min` is as large as possible and `max` as small as possible,
    /// so the first [Self::update] sets both corners to that point
    pub const EMPTY: Self = Self {
        min: Vector3::splat(Number::MAX),
        max: Vector3::splat(-Number::MAX),
    };

    /// Creates a new [BoundingBox] from two points, which do *not* have to be sorted by min/max
    pub fn new(a: impl Into<Vector3>, b: impl Into<Vector3>) -> Self {
        let (a, b) = (a.into(), b.into());
        Self {
            min: Vector3::min(a, b),
            max: Vector3::max(a, b),
        }
    }

    /// The smallest box holding all the given points. [Self::EMPTY] if there are none
    pub fn encompass_points<B: Borrow<Vector3>>(iter: impl IntoIterator<Item = B>) -> Self {
        iter.into_iter().fold(Self::EMPTY, |mut bbox, p| {
            bbox.update(*p.borrow());
            bbox
        })
    }
}

impl Default for BoundingBox {
    fn default() -> Self { Self::EMPTY }
}

// endregion Constructors

// region Helper

impl BoundingBox {
    /// Grows the box so that it contains `vertex`
    pub fn update(&mut self, vertex: Vector3) {
        self.min = self.min.min(vertex);
        self.max = self.max.max(vertex);
    }

    /// Whether no point has been added yet (any axis has `min > max`)
    pub fn is_empty(&self) -> bool { self.min.cmpgt(self.max).any() }

    pub fn size(&self) -> Vector3 { self.max - self.min }

    pub fn centre(&self) -> Vector3 { (self.min + self.max) / 2. }

    /// Whether the point lies inside the box or on its surface
    pub fn contains(&self, p: Vector3) -> bool { p.cmpge(self.min).all() && p.cmple(self.max).all() }

    /// Whether the point lies inside the box, excluding its surface
    pub fn contains_strict(&self, p: Vector3) -> bool { p.cmpgt(self.min).all() && p.cmplt(self.max).all() }

    /// Returns the corners of the box.
    ///
    /// Bit 0 of the index selects `max.z`, bit 1 selects `max.x` and bit 2 selects `max.y`
    pub fn corners(&self) -> [Vector3; 8] {
        let (l, h) = (self.min, self.max);
        [
            Vector3::new(l.x, l.y, l.z),
            Vector3::new(l.x, l.y, h.z),
            Vector3::new(h.x, l.y, l.z),
            Vector3::new(h.x, l.y, h.z),
            Vector3::new(l.x, h.y, l.z),
            Vector3::new(l.x, h.y, h.z),
            Vector3::new(h.x, h.y, l.z),
            Vector3::new(h.x, h.y, h.z),
        ]
    }

    /// The box surrounding all eight corners of this box once transformed by `matrix`
    pub fn transformed(&self, matrix: &Matrix4) -> Self {
        if self.is_empty() {
            return Self::EMPTY;
        }
        Self::encompass_points(self.corners().map(|c| matrix.transform_point(c)))
    }
}

// endregion Helper

// region Impl

impl BoundingBox {
    /// Intersects a ray with the box, using the slab method.
    ///
    /// In [AabbMode::Standard] the entry point is returned, and rays starting strictly inside the box miss.
    /// In [AabbMode::Inverted] the exit point is returned, whether or not the ray started inside.
    /// The returned normal is the unit axis of the face that was hit, pointing against the ray.
    ///
    /// When several axes tie for the hit distance, the first of `x, y, z` wins.
    /// Degenerate rays and empty boxes never hit.
    pub fn intersect_ray(&self, ray: &Ray, mode: AabbMode) -> Hit {
        if self.is_empty() || ray.is_degenerate() {
            return Hit::NONE;
        }

        let inside = self.contains_strict(ray.pos());
        if inside && mode == AabbMode::Standard {
            return Hit::NONE;
        }

        let (pos, dir) = (ray.pos().to_array(), ray.dir().to_array());
        let (min, max) = (self.min.to_array(), self.max.to_array());
        let mut near = [Number::NEG_INFINITY; 3];
        let mut far = [Number::INFINITY; 3];

        for axis in 0..3 {
            // Parallel to this slab, so it either never enters it, or is never bounded by it.
            // Handled separately as `0 * inf` would give NaN
            if dir[axis] == 0. {
                if pos[axis] < min[axis] || pos[axis] > max[axis] {
                    return Hit::NONE;
                }
                continue;
            }
            let t1 = (min[axis] - pos[axis]) / dir[axis];
            let t2 = (max[axis] - pos[axis]) / dir[axis];
            near[axis] = Number::min(t1, t2);
            far[axis] = Number::max(t1, t2);
        }

        // Strict comparisons so that the earliest axis wins ties
        let near_axis = (1..3).fold(0, |best, a| if near[a] > near[best] { a } else { best });
        let far_axis = (1..3).fold(0, |best, a| if far[a] < far[best] { a } else { best });
        let (t_near, t_far) = (near[near_axis], far[far_axis]);

        if t_near > t_far {
            return Hit::NONE;
        }

        let (t, axis) = match mode {
            AabbMode::Standard => (t_near, near_axis),
            AabbMode::Inverted => (t_far, far_axis),
        };
        if !(t > 0.) || !t.is_finite() {
            return Hit::NONE;
        }

        let mut normal = [0.; 3];
        normal[axis] = -dir[axis].signum();

        Hit {
            pos: ray.at(t),
            normal: normal.into(),
            dist: t,
        }
    }
}

// endregion Impl
