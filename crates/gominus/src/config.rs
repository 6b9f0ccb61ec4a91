//! Compile options (gominus.toml)

use gominus_compiler::backend::MAX_OPT_LEVEL;
use gominus_compiler::{OutputFormat, TargetArch, TargetOs, ToolPaths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name
pub const CONFIG_FILE: &str = "gominus.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Everything a single compilation can be told
///
/// ```toml
/// opt_level = 2
/// output_format = "obj"
/// target_arch = "aarch64"
///
/// [tools]
/// llc = "/usr/lib/llvm-17/bin/llc"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    #[serde(default)]
    pub opt_level: u8,

    #[serde(default)]
    pub output_format: OutputFormat,

    #[serde(default)]
    pub target_arch: TargetArch,

    #[serde(default)]
    pub target_os: TargetOs,

    /// Where the artifact goes; no artifact is written when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,

    /// Emit `; line L, col C` markers into the IR
    #[serde(default)]
    pub debug_info: bool,

    #[serde(default = "default_type_inference")]
    pub type_inference: bool,

    #[serde(default)]
    pub tools: ToolPaths,
}

fn default_type_inference() -> bool {
    true
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            opt_level: 0,
            output_format: OutputFormat::default(),
            target_arch: TargetArch::default(),
            target_os: TargetOs::default(),
            output_file: None,
            debug_info: false,
            type_inference: default_type_inference(),
            tools: ToolPaths::default(),
        }
    }
}

impl CompileOptions {
    /// Parse options from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse options from TOML text
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let options: CompileOptions = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Like [`CompileOptions::from_file`], but a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.opt_level > MAX_OPT_LEVEL {
            return Err(ConfigError::Invalid(format!(
                "opt_level must be between 0 and {}, got {}",
                MAX_OPT_LEVEL, self.opt_level
            )));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompileOptions::from_str("").unwrap();
        assert_eq!(options, CompileOptions::default());
        assert_eq!(options.opt_level, 0);
        assert_eq!(options.output_format, OutputFormat::Ll);
        assert!(options.type_inference);
        assert!(!options.debug_info);
        assert_eq!(options.tools.clang, "clang");
    }

    #[test]
    fn test_parse_full() {
        let options = CompileOptions::from_str(
            r#"
opt_level = 2
output_format = "exe"
target_arch = "riscv64"
target_os = "windows"
output_file = "build/app"
debug_info = true
type_inference = false

[tools]
opt = "/opt/llvm/bin/opt"
"#,
        )
        .unwrap();
        assert_eq!(options.opt_level, 2);
        assert_eq!(options.output_format, OutputFormat::Exe);
        assert_eq!(options.target_arch, TargetArch::Riscv64);
        assert_eq!(options.target_os, TargetOs::Windows);
        assert_eq!(options.output_file, Some(PathBuf::from("build/app")));
        assert!(options.debug_info);
        assert!(!options.type_inference);
        assert_eq!(options.tools.opt, "/opt/llvm/bin/opt");
        assert_eq!(options.tools.llc, "llc");
    }

    #[test]
    fn test_invalid_opt_level() {
        let result = CompileOptions::from_str("opt_level = 7");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_format() {
        let result = CompileOptions::from_str("output_format = \"wasm\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(CompileOptions::load_or_default(&path).unwrap(), CompileOptions::default());

        std::fs::write(&path, "opt_level = 1\ndebug_info = true\n").unwrap();
        let options = CompileOptions::load_or_default(&path).unwrap();
        assert_eq!(options.opt_level, 1);
        assert!(options.debug_info);
    }

    #[test]
    fn test_toml_round_trip() {
        let options = CompileOptions {
            opt_level: 3,
            target_arch: TargetArch::Aarch64,
            ..CompileOptions::default()
        };
        let text = options.to_toml().unwrap();
        assert_eq!(CompileOptions::from_str(&text).unwrap(), options);
    }
}
