pub mod compile_ctx;
pub mod compile_flow;

pub use compile_ctx::CompileCtx;
pub use compile_flow::{reconcile_durations, CompileFlow};
