//! Predeclared functions and packages

use crate::symbols::{FunctionSignature, ScopeTree, Symbol, SymbolKind};
use crate::types::Type;
use gominus_parser::Span;

/// Packages known to the analyzer.
pub const BUILTIN_PACKAGES: &[&str] = &["fmt", "os", "math", "io", "strings"];

/// Define builtin functions and packages in the global scope.
pub fn register_builtins(scopes: &mut ScopeTree) {
    let unknown = Type::unknown;
    let functions = [
        ("println", FunctionSignature::variadic(vec![], Type::void())),
        ("print", FunctionSignature::variadic(vec![], Type::void())),
        ("panic", FunctionSignature::new(vec![unknown()], Type::void())),
        ("recover", FunctionSignature::new(vec![], unknown())),
        ("len", FunctionSignature::new(vec![unknown()], Type::int())),
        ("cap", FunctionSignature::new(vec![unknown()], Type::int())),
        ("make", FunctionSignature::variadic(vec![unknown()], unknown())),
        ("new", FunctionSignature::new(vec![unknown()], unknown())),
    ];

    for (name, signature) in functions {
        let symbol = Symbol::new(name, SymbolKind::Function, Type::unknown(), Span::default()).with_signature(signature);
        // The global scope is empty at this point, so definitions cannot collide
        let _ = scopes.define(symbol);
    }

    for package in BUILTIN_PACKAGES {
        let _ = scopes.define(package_symbol(package));
    }
}

/// Symbol for a package name.
pub fn package_symbol(name: &str) -> Symbol {
    Symbol::new(name, SymbolKind::Package, Type::unknown(), Span::default())
}

/// Whether `name` is one of the builtin packages.
pub fn is_builtin_package(name: &str) -> bool {
    BUILTIN_PACKAGES.contains(&name)
}

/// Signature of a builtin package member.
pub fn package_member(package: &str, member: &str) -> Option<FunctionSignature> {
    let sig = match (package, member) {
        ("fmt", "Println" | "Printf" | "Print") => FunctionSignature::variadic(vec![], Type::void()),
        ("fmt", "Sprintf") => FunctionSignature::variadic(vec![], Type::string()),
        ("os", "Exit") => FunctionSignature::new(vec![Type::int()], Type::void()),
        ("os", "Getenv") => FunctionSignature::new(vec![Type::string()], Type::string()),
        ("os", "Setenv") => FunctionSignature::new(vec![Type::string(), Type::string()], Type::void()),
        ("math", "Max" | "Min") => FunctionSignature::new(vec![Type::float(), Type::float()], Type::float()),
        ("math", "Abs") => FunctionSignature::new(vec![Type::float()], Type::float()),
        _ => return None,
    };
    Some(sig)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let mut scopes = ScopeTree::new();
        register_builtins(&mut scopes);

        let println = scopes.resolve("println").unwrap();
        assert_eq!(println.kind, SymbolKind::Function);
        assert!(println.signature.as_ref().unwrap().variadic);
        assert_eq!(scopes.resolve("fmt").unwrap().kind, SymbolKind::Package);
    }

    #[test]
    fn test_package_members() {
        assert!(package_member("fmt", "Printf").unwrap().variadic);
        assert_eq!(package_member("os", "Getenv").unwrap().ret.to_string(), "string");
        assert!(package_member("io", "Read").is_none());
        assert!(package_member("strings", "Split").is_none());
    }
}
