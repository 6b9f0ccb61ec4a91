//! Source position markers
//!
//! With debug info on, each function names its source file and every lowered
//! statement is preceded by a `; line L, col C` comment.

use crate::ir::IrInstr;
use gominus_parser::Span;

#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    file: Option<String>,
}

impl DebugInfo {
    pub fn enabled(file: impl Into<String>) -> Self {
        Self { file: Some(file.into()) }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Marker for a statement, when enabled and the span is real.
    pub fn marker(&self, span: &Span) -> Option<IrInstr> {
        if self.file.is_none() || span.line == 0 {
            return None;
        }
        Some(IrInstr::Comment(format!("line {}, col {}", span.line, span.column)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker() {
        let debug = DebugInfo::enabled("main.gom");
        let marker = debug.marker(&Span::new(10, 14, 3, 5)).unwrap();
        assert_eq!(marker.to_string(), "; line 3, col 5");
        assert!(debug.marker(&Span::default()).is_none());
        assert!(DebugInfo::disabled().marker(&Span::new(0, 1, 1, 1)).is_none());
    }
}
