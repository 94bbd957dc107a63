pub mod aabb;
pub mod intersect;
pub mod ray;
pub mod validate;
