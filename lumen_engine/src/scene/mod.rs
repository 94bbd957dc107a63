//! # Module [crate::scene]
//!
//! The camera, and the controllers that move it around.

pub mod camera;
pub mod controller;
