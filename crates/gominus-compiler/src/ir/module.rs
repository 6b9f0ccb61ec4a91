//! Module: one compilation unit's worth of IR
//!
//! Printed in a fixed order: struct types, globals, external declarations,
//! then definitions.

use super::function::IrFunction;
use super::types::IrType;
use super::value::IrValue;
use rustc_hash::FxHashSet;

/// A named aggregate type (`%Name = type { ... }`)
#[derive(Debug, Clone, PartialEq)]
pub struct IrStruct {
    pub name: String,
    pub fields: Vec<IrType>,
}

/// A module-level global
#[derive(Debug, Clone, PartialEq)]
pub enum IrGlobal {
    /// NUL-terminated string constant
    String { name: String, bytes: Vec<u8> },
    /// Table of function pointers
    Vtable { name: String, entries: Vec<String> },
    /// Mutable global variable
    Variable { name: String, ty: IrType, init: IrValue },
}

/// An external function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct IrDeclaration {
    pub name: String,
    pub ret: IrType,
    pub params: Vec<IrType>,
    pub variadic: bool,
}

#[derive(Debug, Clone)]
pub struct IrModule {
    pub name: String,
    pub source_file: Option<String>,
    pub structs: Vec<IrStruct>,
    pub globals: Vec<IrGlobal>,
    pub declarations: Vec<IrDeclaration>,
    pub functions: Vec<IrFunction>,
    defined: FxHashSet<String>,
    string_count: usize,
}

impl IrModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_file: None,
            structs: Vec::new(),
            globals: Vec::new(),
            declarations: Vec::new(),
            functions: Vec::new(),
            defined: FxHashSet::default(),
            string_count: 0,
        }
    }

    pub fn add_function(&mut self, func: IrFunction) {
        self.defined.insert(func.name.clone());
        self.functions.push(func);
    }

    /// Whether a body for `name` exists; such names are never printed as `declare`
    pub fn has_function(&self, name: &str) -> bool {
        self.defined.contains(name)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn add_struct(&mut self, name: impl Into<String>, fields: Vec<IrType>) {
        self.structs.push(IrStruct {
            name: name.into(),
            fields,
        });
    }

    pub fn add_global(&mut self, global: IrGlobal) {
        self.globals.push(global);
    }

    /// Intern a string constant and return its global name.
    pub fn add_string(&mut self, text: &[u8]) -> String {
        if let Some(existing) = self.globals.iter().find_map(|g| match g {
            IrGlobal::String { name, bytes } if bytes == text => Some(name.clone()),
            _ => None,
        }) {
            return existing;
        }

        let name = format!(".str.{}", self.string_count);
        self.string_count += 1;
        self.globals.push(IrGlobal::String {
            name: name.clone(),
            bytes: text.to_vec(),
        });
        name
    }

    /// Declare an external function once; later declarations are ignored.
    pub fn declare(&mut self, name: &str, ret: IrType, params: Vec<IrType>, variadic: bool) {
        if self.is_declared(name) {
            return;
        }
        self.declarations.push(IrDeclaration {
            name: name.to_string(),
            ret,
            params,
            variadic,
        });
    }

    fn is_declared(&self, name: &str) -> bool {
        self.declarations.iter().any(|d| d.name == name)
    }

    /// Structural problems of every definition, as `@name: problem`
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let problems: Vec<String> = self
            .functions
            .iter()
            .filter_map(|func| func.validate().err().map(|e| format!("@{}: {}", func.name, e)))
            .collect();
        match problems.is_empty() {
            true => Ok(()),
            false => Err(problems),
        }
    }

    pub fn total_instruction_count(&self) -> usize {
        self.functions.iter().map(|f| f.instruction_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_are_interned() {
        let mut module = IrModule::new("main");
        let a = module.add_string(b"hi\n");
        let b = module.add_string(b"bye");
        let c = module.add_string(b"hi\n");
        assert_eq!(a, ".str.0");
        assert_eq!(b, ".str.1");
        assert_eq!(a, c);
        assert_eq!(module.globals.len(), 2);
    }

    #[test]
    fn test_declare_once() {
        let mut module = IrModule::new("main");
        module.declare("printf", IrType::I32, vec![IrType::Ptr], true);
        module.declare("printf", IrType::Void, vec![], false);
        assert_eq!(module.declarations.len(), 1);
        assert!(module.declarations[0].variadic);
    }

    #[test]
    fn test_defined_functions() {
        let mut module = IrModule::new("main");
        module.add_function(IrFunction::new("add", vec![], IrType::I32));
        assert!(module.has_function("add"));
        assert!(!module.has_function("sub"));
        assert_eq!(module.function_count(), 1);
    }
}
