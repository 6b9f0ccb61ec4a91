//! IR types
//!
//! The IR is LLVM-flavoured with opaque pointers: strings, objects, arrays,
//! maps and function values are all `ptr`.

use gominus_checker::Type;
use std::fmt;

/// Type of an IR value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrType {
    Void,
    I1,
    I8,
    I16,
    I32,
    I64,
    Float,
    Double,
    Ptr,
    /// Named aggregate (`%Class`)
    Struct(String),
}

impl IrType {
    /// Map a basic type name from source.
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "int" | "int32" | "uint" | "uint32" | "rune" | "char" => IrType::I32,
            "int8" | "uint8" | "byte" => IrType::I8,
            "int16" | "uint16" => IrType::I16,
            "int64" | "uint64" => IrType::I64,
            "float32" => IrType::Float,
            "float" | "float64" => IrType::Double,
            "bool" => IrType::I1,
            "string" | "nil" | "any" | "error" => IrType::Ptr,
            "void" => IrType::Void,
            _ => return None,
        };
        Some(ty)
    }

    /// Lower an analyzer type. Unresolved types default to `i32`.
    pub fn from_type(ty: &Type) -> Self {
        match ty {
            Type::Basic { name, .. } => Self::from_name(name).unwrap_or(IrType::I32),
            Type::Array(_) | Type::Map(..) | Type::Function { .. } | Type::Class(_) | Type::Interface(_) => {
                IrType::Ptr
            }
            Type::Template { base: Some(_), .. } => IrType::Ptr,
            Type::Template { base: None, .. } => IrType::I32,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, IrType::I1 | IrType::I8 | IrType::I16 | IrType::I32 | IrType::I64)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, IrType::Float | IrType::Double)
    }

    pub fn is_void(&self) -> bool {
        *self == IrType::Void
    }

    /// Width in bits for scalars, 0 otherwise.
    pub fn bits(&self) -> u32 {
        match self {
            IrType::I1 => 1,
            IrType::I8 => 8,
            IrType::I16 => 16,
            IrType::I32 | IrType::Float => 32,
            IrType::I64 | IrType::Double | IrType::Ptr => 64,
            IrType::Void | IrType::Struct(_) => 0,
        }
    }

    /// Literal zero of this type.
    pub fn zero(&self) -> &'static str {
        match self {
            IrType::I1 => "false",
            IrType::Float | IrType::Double => "0.0",
            IrType::Ptr => "null",
            IrType::Struct(_) => "zeroinitializer",
            _ => "0",
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Void => f.write_str("void"),
            IrType::I1 => f.write_str("i1"),
            IrType::I8 => f.write_str("i8"),
            IrType::I16 => f.write_str("i16"),
            IrType::I32 => f.write_str("i32"),
            IrType::I64 => f.write_str("i64"),
            IrType::Float => f.write_str("float"),
            IrType::Double => f.write_str("double"),
            IrType::Ptr => f.write_str("ptr"),
            IrType::Struct(name) => write!(f, "%{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_table() {
        let expected = [
            ("int", "i32"),
            ("uint32", "i32"),
            ("rune", "i32"),
            ("byte", "i8"),
            ("int16", "i16"),
            ("uint64", "i64"),
            ("float32", "float"),
            ("float64", "double"),
            ("float", "double"),
            ("bool", "i1"),
            ("string", "ptr"),
        ];
        for (name, ir) in expected {
            assert_eq!(IrType::from_name(name).unwrap().to_string(), ir, "{}", name);
        }
        assert!(IrType::from_name("Point").is_none());
    }

    #[test]
    fn test_from_analyzer_type() {
        assert_eq!(IrType::from_type(&Type::Class("A".into())), IrType::Ptr);
        assert_eq!(IrType::from_type(&Type::Array(Box::new(Type::int()))), IrType::Ptr);
        assert_eq!(IrType::from_type(&Type::unknown()), IrType::I32);
        assert_eq!(IrType::from_type(&Type::void()), IrType::Void);
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(IrType::I1.zero(), "false");
        assert_eq!(IrType::Double.zero(), "0.0");
        assert_eq!(IrType::Ptr.zero(), "null");
        assert_eq!(IrType::I64.zero(), "0");
    }
}
