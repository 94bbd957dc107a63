//! Internal module containing targets for the [tracing] crate

lumen_engine::tracing_targets! {
    MAIN = "main",
    PICK = "pick",
}
