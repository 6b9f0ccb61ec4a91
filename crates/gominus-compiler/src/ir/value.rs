//! IR values: virtual registers, constants and globals

use super::types::IrType;
use std::fmt;

/// Virtual register identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterId(pub u32);

impl RegisterId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// A typed virtual register
#[derive(Debug, Clone, PartialEq)]
pub struct Register {
    pub id: RegisterId,
    pub ty: IrType,
}

impl Register {
    pub fn new(id: RegisterId, ty: IrType) -> Self {
        Self { id, ty }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%r{}", self.id.0)
    }
}

/// An instruction operand
#[derive(Debug, Clone, PartialEq)]
pub enum IrValue {
    Register(Register),
    Int { value: i64, ty: IrType },
    Float { value: f64, ty: IrType },
    Bool(bool),
    Null,
    /// Address of a global or function (`@name`)
    Global(String),
    Undef(IrType),
}

impl IrValue {
    pub fn i32(value: i64) -> Self {
        IrValue::Int { value, ty: IrType::I32 }
    }

    pub fn i64(value: i64) -> Self {
        IrValue::Int { value, ty: IrType::I64 }
    }

    /// Zero value of a type.
    pub fn zero(ty: &IrType) -> Self {
        match ty {
            IrType::I1 => IrValue::Bool(false),
            IrType::I8 | IrType::I16 | IrType::I32 | IrType::I64 => IrValue::Int { value: 0, ty: ty.clone() },
            IrType::Float | IrType::Double => IrValue::Float { value: 0.0, ty: ty.clone() },
            IrType::Ptr => IrValue::Null,
            IrType::Void | IrType::Struct(_) => IrValue::Undef(ty.clone()),
        }
    }

    pub fn is_constant(&self) -> bool {
        !matches!(self, IrValue::Register(_))
    }

    pub fn ty(&self) -> IrType {
        match self {
            IrValue::Register(reg) => reg.ty.clone(),
            IrValue::Int { ty, .. } | IrValue::Float { ty, .. } | IrValue::Undef(ty) => ty.clone(),
            IrValue::Bool(_) => IrType::I1,
            IrValue::Null | IrValue::Global(_) => IrType::Ptr,
        }
    }

    /// `type value`, as written in operand position.
    pub fn typed(&self) -> String {
        format!("{} {}", self.ty(), self)
    }
}

impl From<Register> for IrValue {
    fn from(reg: Register) -> Self {
        IrValue::Register(reg)
    }
}

impl fmt::Display for IrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrValue::Register(reg) => write!(f, "{}", reg),
            IrValue::Int { value, .. } => write!(f, "{}", value),
            IrValue::Float { value, ty } => {
                // Hex form is exact; float constants are written as the
                // double with the same value
                let bits = match ty {
                    IrType::Float => (*value as f32 as f64).to_bits(),
                    _ => value.to_bits(),
                };
                write!(f, "0x{:016X}", bits)
            }
            IrValue::Bool(b) => write!(f, "{}", b),
            IrValue::Null => f.write_str("null"),
            IrValue::Global(name) => write!(f, "@{}", name),
            IrValue::Undef(_) => f.write_str("undef"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_display() {
        let reg = Register::new(RegisterId::new(3), IrType::I32);
        assert_eq!(reg.to_string(), "%r3");
        assert_eq!(IrValue::from(reg).typed(), "i32 %r3");
    }

    #[test]
    fn test_constant_display() {
        assert_eq!(IrValue::i32(5).typed(), "i32 5");
        assert_eq!(IrValue::Bool(true).typed(), "i1 true");
        assert_eq!(IrValue::Global("main".into()).typed(), "ptr @main");
        assert_eq!(IrValue::Null.typed(), "ptr null");
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(IrValue::zero(&IrType::I1).typed(), "i1 false");
        assert_eq!(IrValue::zero(&IrType::I64).typed(), "i64 0");
        assert_eq!(IrValue::zero(&IrType::Ptr).typed(), "ptr null");
        assert!(IrValue::zero(&IrType::Double).is_constant());
    }

    #[test]
    fn test_float_hex() {
        let one = IrValue::Float { value: 1.0, ty: IrType::Double };
        assert_eq!(one.to_string(), "0x3FF0000000000000");
        let tenth = IrValue::Float { value: 0.1, ty: IrType::Float };
        assert_eq!(tenth.to_string(), "0x3FB99999A0000000");
    }
}
