//! External tool invocation
//!
//! The optimizer and code generator are LLVM command-line tools run as
//! blocking subprocesses.

use crate::error::BackendError;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::process::{Command, Output};

/// Paths (or `PATH` names) of the external tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub opt: String,
    pub llc: String,
    pub clang: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            opt: "opt".to_string(),
            llc: "llc".to_string(),
            clang: "clang".to_string(),
        }
    }
}

/// Run `tool` with `args` and return its output if it exits successfully.
pub(crate) fn run(tool: &str, args: &[String]) -> Result<Output, BackendError> {
    tracing::debug!(tool, args = ?args, "running tool");

    let output = Command::new(tool).args(args).output().map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            tracing::warn!(tool, "tool not found");
            BackendError::ToolNotFound(tool.to_string())
        } else {
            BackendError::Io(e)
        }
    })?;

    if !output.status.success() {
        return Err(BackendError::ToolFailed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}
