//! Optimizer driver (`opt`)

use super::tool::{self, ToolPaths};
use crate::error::BackendError;
use std::io::Write;

/// Highest accepted optimization level
pub const MAX_OPT_LEVEL: u8 = 3;

/// Optimize IR text at `level`.
///
/// Level 0 returns the input unchanged; levels 1 to 3 run
/// `opt -O<level> -S` on a scratch copy and return its output.
pub fn optimize(ir: &str, level: u8, tools: &ToolPaths) -> Result<String, BackendError> {
    if level > MAX_OPT_LEVEL {
        return Err(BackendError::InvalidOptLevel(level));
    }
    if level == 0 {
        return Ok(ir.to_string());
    }

    let mut input = tempfile::Builder::new().prefix("gominus-").suffix(".ll").tempfile()?;
    input.write_all(ir.as_bytes()).map_err(|source| BackendError::Write {
        path: input.path().to_path_buf(),
        source,
    })?;
    input.flush()?;

    let args = vec![
        format!("-O{}", level),
        "-S".to_string(),
        input.path().display().to_string(),
        "-o".to_string(),
        "-".to_string(),
    ];
    let output = tool::run(&tools.opt, &args)?;
    let text = String::from_utf8(output.stdout).map_err(|_| BackendError::InvalidOutput {
        tool: tools.opt.clone(),
    })?;

    tracing::debug!(level, bytes = text.len(), "optimized");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_zero_passthrough() {
        let ir = "define i32 @main() {\nbb0:\n  ret i32 0\n}\n";
        let out = optimize(ir, 0, &ToolPaths::default()).unwrap();
        assert_eq!(out.as_bytes(), ir.as_bytes());
    }

    #[test]
    fn test_invalid_level() {
        let err = optimize("", 4, &ToolPaths::default()).unwrap_err();
        assert!(matches!(err, BackendError::InvalidOptLevel(4)));
    }

    #[test]
    fn test_missing_opt() {
        let tools = ToolPaths {
            opt: "gominus-missing-opt".to_string(),
            ..ToolPaths::default()
        };
        let err = optimize("", 2, &tools).unwrap_err();
        assert_eq!(err.to_string(), "tool not found: gominus-missing-opt");
    }
}
