//! Declares log target names for the [`tracing`] macros, as in `info!(target: MESH, ...)`.
//!
//! Every target is prefixed with the name of the crate that declares it, so that filters such as
//! `RUST_LOG=lumen_engine::cache=trace` select a single subsystem.

#[macro_export]
macro_rules! tracing_targets {
    {$( $(#[$meta:meta])* $name:ident $(= $val:expr)? ),* $(,)?} => {
        $( $crate::tracing_targets!(@value $(#[$meta])* $name $(= $val)?); )*
    };

    (@value $(#[$meta:meta])* $name:ident = $val:expr) => {
        $(#[$meta])*
        pub const $name: &str = concat!(env!("CARGO_PKG_NAME"), "::", $val);
    };
    (@value $(#[$meta:meta])* $name:ident) => {
        $crate::tracing_targets!(@value $(#[$meta])* $name = stringify!($name));
    };
}
