//! Code generator driver (`llc` and `clang`)

use super::tool::{self, ToolPaths};
use crate::error::BackendError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// What to produce from IR
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The IR text itself
    #[default]
    Ll,
    Asm,
    Obj,
    Exe,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetArch {
    #[default]
    X86_64,
    Aarch64,
    Riscv64,
}

impl TargetArch {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetArch::X86_64 => "x86_64",
            TargetArch::Aarch64 => "aarch64",
            TargetArch::Riscv64 => "riscv64",
        }
    }

    /// Name `llc -march` expects
    fn llc_name(&self) -> &'static str {
        match self {
            TargetArch::X86_64 => "x86-64",
            TargetArch::Aarch64 => "aarch64",
            TargetArch::Riscv64 => "riscv64",
        }
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    #[default]
    Linux,
    Windows,
    Darwin,
}

impl TargetOs {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetOs::Linux => "linux",
            TargetOs::Windows => "windows",
            TargetOs::Darwin => "darwin",
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<arch>-<os>`
pub fn target_triple(arch: TargetArch, os: TargetOs) -> String {
    format!("{}-{}", arch, os)
}

/// Turn IR text into the requested artifact at `output`.
///
/// Returns the path actually written; executables for Windows get an
/// `.exe` extension.
pub fn generate_artifact(
    ir: &str,
    output: &Path,
    arch: TargetArch,
    os: TargetOs,
    format: OutputFormat,
    tools: &ToolPaths,
) -> Result<PathBuf, BackendError> {
    tracing::debug!(output = %output.display(), ?format, triple = %target_triple(arch, os), "generating artifact");

    if format == OutputFormat::Ll {
        std::fs::write(output, ir).map_err(|source| BackendError::Write {
            path: output.to_path_buf(),
            source,
        })?;
        return Ok(output.to_path_buf());
    }

    let mut input = tempfile::Builder::new().prefix("gominus-").suffix(".ll").tempfile()?;
    input.write_all(ir.as_bytes()).map_err(|source| BackendError::Write {
        path: input.path().to_path_buf(),
        source,
    })?;
    input.flush()?;
    let input_path = input.path().display().to_string();

    match format {
        OutputFormat::Asm | OutputFormat::Obj => {
            let filetype = if format == OutputFormat::Asm { "asm" } else { "obj" };
            let args = vec![
                format!("-march={}", arch.llc_name()),
                format!("-mtriple={}", target_triple(arch, os)),
                format!("-filetype={}", filetype),
                input_path,
                "-o".to_string(),
                output.display().to_string(),
            ];
            tool::run(&tools.llc, &args)?;
            Ok(output.to_path_buf())
        }
        _ => {
            let output = executable_path(output, os);
            let args = vec![
                format!("--target={}", target_triple(arch, os)),
                input_path,
                "-o".to_string(),
                output.display().to_string(),
            ];
            tool::run(&tools.clang, &args)?;
            Ok(output)
        }
    }
}

fn executable_path(output: &Path, os: TargetOs) -> PathBuf {
    if os == TargetOs::Windows && output.extension().map_or(true, |ext| ext != "exe") {
        let mut name = output.as_os_str().to_owned();
        name.push(".exe");
        PathBuf::from(name)
    } else {
        output.to_path_buf()
    }
}
