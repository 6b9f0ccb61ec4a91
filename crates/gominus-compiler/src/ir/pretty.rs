//! Textual output
//!
//! Modules print as LLVM-flavoured IR that can be written to disk and handed
//! to `opt`/`llc` as is.

use super::block::BasicBlock;
use super::function::IrFunction;
use super::module::{IrDeclaration, IrGlobal, IrModule};
use std::fmt::{self, Display, Formatter, Write};

impl Display for IrModule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        if let Some(source) = &self.source_file {
            writeln!(f, "source_filename = \"{}\"", source)?;
        }

        if !self.structs.is_empty() {
            writeln!(f)?;
            for st in &self.structs {
                let fields: Vec<String> = st.fields.iter().map(|t| t.to_string()).collect();
                writeln!(f, "%{} = type {{ {} }}", st.name, fields.join(", "))?;
            }
        }

        if !self.globals.is_empty() {
            writeln!(f)?;
            for global in &self.globals {
                writeln!(f, "{}", global)?;
            }
        }

        let declarations: Vec<&IrDeclaration> = self
            .declarations
            .iter()
            .filter(|d| !self.has_function(&d.name))
            .collect();
        if !declarations.is_empty() {
            writeln!(f)?;
            for decl in declarations {
                writeln!(f, "{}", decl)?;
            }
        }

        for func in &self.functions {
            writeln!(f)?;
            write!(f, "{}", func)?;
        }
        Ok(())
    }
}

impl Display for IrGlobal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IrGlobal::String { name, bytes } => write!(
                f,
                "@{} = private unnamed_addr constant [{} x i8] c\"{}\\00\"",
                name,
                bytes.len() + 1,
                escape_bytes(bytes)
            ),
            IrGlobal::Vtable { name, entries } if entries.is_empty() => {
                write!(f, "@{} = global [0 x ptr] zeroinitializer", name)
            }
            IrGlobal::Vtable { name, entries } => {
                let entries: Vec<String> = entries.iter().map(|e| format!("ptr @{}", e)).collect();
                write!(f, "@{} = global [{} x ptr] [{}]", name, entries.len(), entries.join(", "))
            }
            IrGlobal::Variable { name, ty, init } => write!(f, "@{} = global {} {}", name, ty, init),
        }
    }
}

impl Display for IrDeclaration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut params: Vec<String> = self.params.iter().map(|t| t.to_string()).collect();
        if self.variadic {
            params.push("...".to_string());
        }
        write!(f, "declare {} @{}({})", self.ret, self.name, params.join(", "))
    }
}

impl Display for IrFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source_file {
            writeln!(
                f,
                "; {} defined at {}:{}:{}",
                self.name, source, self.source_span.line, self.source_span.column
            )?;
        }

        let params: Vec<String> = self.params.iter().map(|p| format!("{} {}", p.ty, p)).collect();
        write!(f, "define {} @{}({})", self.return_ty, self.name, params.join(", "))?;
        if let Some(personality) = &self.personality {
            write!(f, " personality ptr @{}", personality)?;
        }
        writeln!(f, " {{")?;

        for block in &self.blocks {
            write!(f, "{}", block)?;
        }

        writeln!(f, "}}")
    }
}

impl Display for BasicBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => writeln!(f, "{}:  ; {}", self.id, label)?,
            None => writeln!(f, "{}:", self.id)?,
        }
        for instr in &self.instructions {
            writeln!(f, "  {}", instr)?;
        }
        writeln!(f, "  {}", self.terminator)
    }
}

/// Escape bytes for a `c"..."` constant.
fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if (0x20..0x7f).contains(&b) && b != b'"' && b != b'\\' {
            out.push(b as char);
        } else {
            let _ = write!(out, "\\{:02X}", b);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::block::{BasicBlockId, Terminator};
    use crate::ir::types::IrType;
    use crate::ir::value::{IrValue, Register, RegisterId};

    #[test]
    fn test_escape_bytes() {
        assert_eq!(escape_bytes(b"hi\n"), "hi\\0A");
        assert_eq!(escape_bytes(b"a\"b\\"), "a\\22b\\5C");
    }

    #[test]
    fn test_globals() {
        let s = IrGlobal::String {
            name: ".str.0".into(),
            bytes: b"%d\n".to_vec(),
        };
        assert_eq!(s.to_string(), "@.str.0 = private unnamed_addr constant [4 x i8] c\"%d\\0A\\00\"");

        let vtable = IrGlobal::Vtable {
            name: "B_vtable".into(),
            entries: vec!["B_f".into(), "B_g".into()],
        };
        assert_eq!(vtable.to_string(), "@B_vtable = global [2 x ptr] [ptr @B_f, ptr @B_g]");

        let var = IrGlobal::Variable {
            name: "count".into(),
            ty: IrType::I32,
            init: IrValue::i32(5),
        };
        assert_eq!(var.to_string(), "@count = global i32 5");
    }

    #[test]
    fn test_module_output() {
        let mut module = IrModule::new("main");
        module.add_struct("Point", vec![IrType::Ptr, IrType::I32]);
        module.declare("printf", IrType::I32, vec![IrType::Ptr], true);

        let a = Register::new(RegisterId::new(0), IrType::I32);
        let mut func = IrFunction::new("id", vec![a.clone()], IrType::I32);
        let mut entry = BasicBlock::new(BasicBlockId(0));
        entry.set_terminator(Terminator::Return(Some(a.into())));
        func.add_block(entry);
        module.add_function(func);

        let text = module.to_string();
        assert!(text.contains("%Point = type { ptr, i32 }"), "got: {}", text);
        assert!(text.contains("declare i32 @printf(ptr, ...)"), "got: {}", text);
        assert!(text.contains("define i32 @id(i32 %r0) {\nbb0:\n  ret i32 %r0\n}"), "got: {}", text);
    }
}
