use crate::core::types::{Number, Vector3};
use crate::shared::intersect::Hit;
use crate::shared::ray::Ray;
use approx::*;
use std::borrow::Borrow;

macro_rules! debug_assert_only {
    () => {
        if cfg!(not(debug_assertions)) {
            return;
        }
    };
}

pub const EPSILON: Number = 1e-4;
pub const RELATIVE: Number = 1e-3;

#[inline(always)]
#[track_caller]
pub fn number(val: impl Borrow<Number>) {
    debug_assert_only!();

    let val = val.borrow();
    assert!(!val.is_nan(), "should not be nan; val: {val}");
}

#[inline(always)]
#[track_caller]
pub fn normal3(n: impl Borrow<Vector3>) {
    debug_assert_only!();
    let n = n.borrow();
    vector3(n);
    assert!(
        n.is_normalized(),
        "should be normalised; vec: {n:?}, len: {:?}",
        n.length()
    );
}

#[inline(always)]
#[track_caller]
pub fn vector3(v: impl Borrow<Vector3>) {
    debug_assert_only!();
    let v = v.borrow();
    assert!(!v.is_nan(), "should not be nan; vec: {v:?}");
}

#[inline(always)]
#[track_caller]
pub fn ray(r: impl Borrow<Ray>) {
    debug_assert_only!();
    let r = r.borrow();
    vector3(r.pos());
    if !r.is_degenerate() {
        normal3(r.dir());
    }
}

/// Asserts that a hit returned for `ray` is consistent with it
#[inline(always)]
#[track_caller]
pub fn hit(ray: impl Borrow<Ray>, hit: impl Borrow<Hit>) {
    debug_assert_only!();

    let hit = hit.borrow();
    let ray = ray.borrow();
    if !hit.did_hit() {
        return;
    }

    vector3(hit.pos);
    number(hit.dist);
    normal3(hit.normal);

    // Dist between start and end should match `.dist` field
    let ray_len = (ray.pos() - hit.pos).length();
    assert_relative_eq!(ray_len, hit.dist, epsilon = EPSILON, max_relative = RELATIVE);
}
