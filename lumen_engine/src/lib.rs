pub mod core;
pub mod mesh;
pub mod object;
pub mod render;
pub mod scene;
pub mod shared;
