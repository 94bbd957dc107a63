use crate::core::types::{Number, Vector3};
use std::cmp::Ordering;

/// A struct representing a ray-surface intersection
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit {
    /// The position of the intersection, in the same space as the ray that was cast
    pub pos: Vector3,
    /// Surface normal at the intersection
    ///
    /// # Invariants
    ///  - Must be normalised, unless this is [Hit::NONE]
    pub normal: Vector3,
    /// Distance along the ray that the intersection occurred.
    ///
    /// May be zero or negative for surfaces behind the ray origin, see [Hit::did_hit]
    pub dist: Number,
}

impl Hit {
    /// The "no intersection" value; infinitely far away
    pub const NONE: Self = Self {
        pos: Vector3::ZERO,
        normal: Vector3::ZERO,
        dist: Number::INFINITY,
    };

    /// Whether this is a real intersection in front of the ray origin.
    ///
    /// Intersections exactly at the origin (`dist == 0`) do not count.
    pub fn did_hit(&self) -> bool { self.dist > 0. && self.dist.is_finite() }

    /// Returns whichever of the two hits is valid and closest, preferring `self` on a tie
    pub fn nearest(self, other: Self) -> Self {
        match (self.did_hit(), other.did_hit()) {
            (true, true) if other.dist < self.dist => other,
            (true, _) => self,
            (false, true) => other,
            (false, false) => Self::NONE,
        }
    }
}

impl Default for Hit {
    fn default() -> Self { Self::NONE }
}

impl PartialOrd<Self> for Hit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Number::partial_cmp(&self.dist, &other.dist) }
}
