use crate::core::types::{Number, Vector3};
use crate::shared::intersect::Hit;

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Ray {
    pos: Vector3,
    dir: Vector3,
}

impl Ray {
    /// World-space coordinate of the ray
    #[inline(always)]
    pub fn pos(&self) -> Vector3 { self.pos }

    /// Direction vector of the ray.
    ///
    /// # Requirements
    /// Normalised, or zero for a degenerate ray
    #[inline(always)]
    pub fn dir(&self) -> Vector3 { self.dir }

    /// Creates a new ray, normalising the direction.
    ///
    /// A direction that can't be normalised becomes zero, giving a degenerate ray that never hits anything
    pub fn new(pos: Vector3, dir: Vector3) -> Self {
        Self {
            pos,
            dir: dir.normalize_or_zero(),
        }
    }

    /// A ray starting at `from` and passing through `to`
    pub fn towards(from: Vector3, to: Vector3) -> Self { Self::new(from, to - from) }

    /// Gets the position at a given distance along the ray
    ///
    /// `pos + (t * dir)`
    pub fn at(&self, t: Number) -> Vector3 { self.pos + (self.dir * t) }

    pub fn is_degenerate(&self) -> bool { self.dir == Vector3::ZERO }
}

impl Ray {
    /// Intersects the ray with a single-sided triangle.
    ///
    /// The front face is the one whose normal `(v2 - v1) x (v3 - v1)` points back towards the ray;
    /// rays hitting the back face, running parallel to the plane, or with a zero direction all miss.
    /// Points lying exactly on an edge are treated as outside.
    ///
    /// Triangles behind the origin are still returned, but with `dist <= 0` so that
    /// [Hit::did_hit] is false.
    pub fn intersect_triangle(&self, v1: Vector3, v2: Vector3, v3: Vector3) -> Hit {
        let normal = Vector3::cross(v2 - v1, v3 - v1);
        let denom = normal.dot(self.dir);

        // Also rejects NaN, as the comparison is false
        if !(denom < 0.) {
            return Hit::NONE;
        }

        let t = (v1 - self.pos).dot(normal) / denom;
        let p = self.at(t);

        let inside = |a: Vector3, b: Vector3| Vector3::cross(b - a, p - a).dot(normal) > 0.;
        if !(inside(v1, v2) && inside(v2, v3) && inside(v3, v1)) {
            return Hit::NONE;
        }

        Hit {
            pos: p,
            normal: normal.normalize(),
            dist: t,
        }
    }
}
