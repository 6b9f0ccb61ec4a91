//! Semantic types used by the analyzer
//!
//! Classes and interfaces are nominal: the type carries only the name, and
//! the member tables live on the declaring symbol (see [`crate::symbols`]).

use std::fmt;

/// Kind of a basic type. Basic types compare by kind, so `int32` and `int`
/// are the same type to the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Int,
    Float,
    String,
    Bool,
    Char,
    Null,
    Void,
    /// Wildcard for anything unresolved
    Unknown,
}

/// Analyzer type
#[derive(Debug, Clone)]
pub enum Type {
    Basic {
        name: String,
        kind: BasicKind,
    },
    Array(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Function {
        params: Vec<Type>,
        ret: Box<Type>,
        variadic: bool,
    },
    /// Nominal class reference
    Class(String),
    /// Nominal interface reference
    Interface(String),
    /// Template declaration or a bound type parameter (`base` is `None`)
    Template {
        name: String,
        params: Vec<String>,
        base: Option<Box<Type>>,
    },
}

impl Type {
    pub fn basic(name: &str, kind: BasicKind) -> Self {
        Type::Basic {
            name: name.to_string(),
            kind,
        }
    }

    pub fn int() -> Self {
        Self::basic("int", BasicKind::Int)
    }

    pub fn float() -> Self {
        Self::basic("float", BasicKind::Float)
    }

    pub fn string() -> Self {
        Self::basic("string", BasicKind::String)
    }

    pub fn bool() -> Self {
        Self::basic("bool", BasicKind::Bool)
    }

    pub fn char() -> Self {
        Self::basic("char", BasicKind::Char)
    }

    pub fn null() -> Self {
        Self::basic("nil", BasicKind::Null)
    }

    pub fn void() -> Self {
        Self::basic("void", BasicKind::Void)
    }

    pub fn unknown() -> Self {
        Self::basic("unknown", BasicKind::Unknown)
    }

    /// Type parameter `T` inside a template body.
    pub fn type_param(name: &str) -> Self {
        Type::Template {
            name: name.to_string(),
            params: Vec::new(),
            base: None,
        }
    }

    /// Map a written basic type name to its type.
    pub fn from_basic_name(name: &str) -> Option<Self> {
        let kind = match name {
            "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32" | "uint64"
            | "byte" => BasicKind::Int,
            "float" | "float32" | "float64" => BasicKind::Float,
            "string" => BasicKind::String,
            "bool" => BasicKind::Bool,
            "rune" | "char" => BasicKind::Char,
            "void" => BasicKind::Void,
            "any" | "error" => BasicKind::Unknown,
            _ => return None,
        };
        Some(Self::basic(name, kind))
    }

    pub fn kind(&self) -> Option<BasicKind> {
        match self {
            Type::Basic { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    fn is_kind(&self, expected: BasicKind) -> bool {
        self.kind() == Some(expected)
    }

    pub fn is_unknown(&self) -> bool {
        self.is_kind(BasicKind::Unknown)
    }

    pub fn is_int(&self) -> bool {
        self.is_kind(BasicKind::Int)
    }

    pub fn is_float(&self) -> bool {
        self.is_kind(BasicKind::Float)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_int() || self.is_float()
    }

    pub fn is_string(&self) -> bool {
        self.is_kind(BasicKind::String)
    }

    pub fn is_bool(&self) -> bool {
        self.is_kind(BasicKind::Bool)
    }

    pub fn is_void(&self) -> bool {
        self.is_kind(BasicKind::Void)
    }

    /// Unknown or an unconstrained type parameter.
    pub fn is_wildcard(&self) -> bool {
        self.is_unknown() || matches!(self, Type::Template { base: None, .. })
    }

    /// Types that can hold `nil`.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Array(_) | Type::Map(..) | Type::Function { .. } | Type::Class(_) | Type::Interface(_)
        ) || self.is_string()
    }

    /// Structural equality; basic types compare by kind.
    pub fn equals(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Basic { kind: a, .. }, Type::Basic { kind: b, .. }) => a == b,
            (Type::Array(a), Type::Array(b)) => a.equals(b),
            (Type::Map(ka, va), Type::Map(kb, vb)) => ka.equals(kb) && va.equals(vb),
            (
                Type::Function {
                    params: pa,
                    ret: ra,
                    variadic: va,
                },
                Type::Function {
                    params: pb,
                    ret: rb,
                    variadic: vb,
                },
            ) => va == vb && ra.equals(rb) && pa.len() == pb.len() && pa.iter().zip(pb).all(|(a, b)| a.equals(b)),
            (Type::Class(a), Type::Class(b)) => a == b,
            (Type::Interface(a), Type::Interface(b)) => a == b,
            (Type::Template { name: a, .. }, Type::Template { name: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Whether a value of type `value` can be stored in `self`, ignoring
    /// class hierarchy (the analyzer layers subclassing on top).
    pub fn is_assignable(&self, value: &Type) -> bool {
        if self.is_wildcard() || value.is_wildcard() {
            return true;
        }
        if value.is_kind(BasicKind::Null) && self.is_reference() {
            return true;
        }
        match (self, value) {
            (Type::Array(a), Type::Array(b)) => a.is_assignable(b),
            (Type::Map(ka, va), Type::Map(kb, vb)) => ka.is_assignable(kb) && va.is_assignable(vb),
            _ => self.equals(value),
        }
    }

    /// Substitute type parameters by name.
    pub fn substitute(&self, bindings: &[(String, Type)]) -> Type {
        match self {
            Type::Template { name, base: None, .. } => bindings
                .iter()
                .find(|(param, _)| param == name)
                .map(|(_, ty)| ty.clone())
                .unwrap_or_else(|| self.clone()),
            Type::Array(elem) => Type::Array(Box::new(elem.substitute(bindings))),
            Type::Map(k, v) => Type::Map(Box::new(k.substitute(bindings)), Box::new(v.substitute(bindings))),
            Type::Function { params, ret, variadic } => Type::Function {
                params: params.iter().map(|p| p.substitute(bindings)).collect(),
                ret: Box::new(ret.substitute(bindings)),
                variadic: *variadic,
            },
            other => other.clone(),
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Basic { name, .. } => f.write_str(name),
            Type::Array(elem) => write!(f, "[]{}", elem),
            Type::Map(k, v) => write!(f, "map[{}]{}", k, v),
            Type::Function { params, ret, variadic } => {
                f.write_str("func(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                if *variadic {
                    f.write_str(if params.is_empty() { "..." } else { ", ..." })?;
                }
                f.write_str(")")?;
                if !ret.is_void() {
                    write!(f, " {}", ret)?;
                }
                Ok(())
            }
            Type::Class(name) | Type::Interface(name) => f.write_str(name),
            Type::Template { name, params, .. } => {
                f.write_str(name)?;
                if !params.is_empty() {
                    write!(f, "<{}>", params.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_equal_by_kind() {
        let int32 = Type::from_basic_name("int32").unwrap();
        assert!(int32.equals(&Type::int()));
        assert!(!Type::int().equals(&Type::float()));
        assert_eq!(int32.to_string(), "int32");
    }

    #[test]
    fn test_nominal_classes() {
        assert!(Type::Class("A".into()).equals(&Type::Class("A".into())));
        assert!(!Type::Class("A".into()).equals(&Type::Interface("A".into())));
    }

    #[test]
    fn test_unknown_is_wildcard() {
        assert!(Type::int().is_assignable(&Type::unknown()));
        assert!(Type::unknown().is_assignable(&Type::string()));
        assert!(!Type::int().is_assignable(&Type::string()));
    }

    #[test]
    fn test_nil_assignable_to_references() {
        assert!(Type::Class("Node".into()).is_assignable(&Type::null()));
        assert!(Type::Array(Box::new(Type::int())).is_assignable(&Type::null()));
        assert!(!Type::int().is_assignable(&Type::null()));
    }

    #[test]
    fn test_substitute_type_params() {
        let sig = Type::Function {
            params: vec![Type::type_param("T"), Type::Array(Box::new(Type::type_param("T")))],
            ret: Box::new(Type::type_param("T")),
            variadic: false,
        };
        let bound = sig.substitute(&[("T".to_string(), Type::int())]);
        assert_eq!(bound.to_string(), "func(int, []int) int");
    }
}
