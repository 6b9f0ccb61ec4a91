//! Optimizer and code generator drivers
//!
//! Both stages shell out to LLVM tools whose paths come from [`ToolPaths`].

mod codegen;
mod optimizer;
mod tool;

pub use codegen::{generate_artifact, target_triple, OutputFormat, TargetArch, TargetOs};
pub use optimizer::{optimize, MAX_OPT_LEVEL};
pub use tool::ToolPaths;
