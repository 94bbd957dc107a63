pub mod colour;
pub mod config;
pub mod macros;
pub mod matrix;
pub mod targets;
pub mod types;
