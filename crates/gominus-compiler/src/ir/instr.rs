//! IR instructions
//!
//! Each instruction prints as one line of LLVM-flavoured text.

use super::block::BasicBlockId;
use super::types::IrType;
use super::value::{IrValue, Register};
use std::fmt;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

impl BinaryOp {
    /// Opcode for operands of type `ty`.
    pub fn opcode(&self, ty: &IrType) -> &'static str {
        let float = ty.is_float();
        match self {
            BinaryOp::Add if float => "fadd",
            BinaryOp::Sub if float => "fsub",
            BinaryOp::Mul if float => "fmul",
            BinaryOp::Div if float => "fdiv",
            BinaryOp::Rem if float => "frem",
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "sdiv",
            BinaryOp::Rem => "srem",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Shl => "shl",
            BinaryOp::Shr => "ashr",
        }
    }
}

/// Comparison predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparePred {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl ComparePred {
    /// `icmp`/`fcmp` with its predicate for operands of type `ty`.
    pub fn instruction(&self, ty: &IrType) -> (&'static str, &'static str) {
        if ty.is_float() {
            let pred = match self {
                ComparePred::Eq => "oeq",
                ComparePred::Ne => "one",
                ComparePred::Lt => "olt",
                ComparePred::Gt => "ogt",
                ComparePred::Le => "ole",
                ComparePred::Ge => "oge",
            };
            ("fcmp", pred)
        } else {
            let pred = match self {
                ComparePred::Eq => "eq",
                ComparePred::Ne => "ne",
                ComparePred::Lt => "slt",
                ComparePred::Gt => "sgt",
                ComparePred::Le => "sle",
                ComparePred::Ge => "sge",
            };
            ("icmp", pred)
        }
    }
}

/// Conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOp {
    SExt,
    ZExt,
    Trunc,
    SIToFP,
    FPToSI,
    FPExt,
    FPTrunc,
    PtrToInt,
}

impl fmt::Display for CastOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CastOp::SExt => "sext",
            CastOp::ZExt => "zext",
            CastOp::Trunc => "trunc",
            CastOp::SIToFP => "sitofp",
            CastOp::FPToSI => "fptosi",
            CastOp::FPExt => "fpext",
            CastOp::FPTrunc => "fptrunc",
            CastOp::PtrToInt => "ptrtoint",
        };
        f.write_str(name)
    }
}

/// Call target
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    /// A named function (`@name`)
    Direct(String),
    /// A function pointer in a register
    Indirect(IrValue),
}

impl fmt::Display for Callee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callee::Direct(name) => write!(f, "@{}", name),
            Callee::Indirect(value) => write!(f, "{}", value),
        }
    }
}

/// IR instruction
#[derive(Debug, Clone, PartialEq)]
pub enum IrInstr {
    /// `dest = alloca ty`
    Alloca { dest: Register, ty: IrType },

    /// `dest = load ty, ptr src`
    Load { dest: Register, ptr: IrValue },

    /// `store ty value, ptr dest`
    Store { value: IrValue, ptr: IrValue },

    /// `dest = op ty left, right`
    Binary {
        dest: Register,
        op: BinaryOp,
        left: IrValue,
        right: IrValue,
    },

    /// `dest = icmp|fcmp pred ty left, right`
    Compare {
        dest: Register,
        pred: ComparePred,
        left: IrValue,
        right: IrValue,
    },

    /// `dest = op ty value to dest.ty`
    Cast { dest: Register, op: CastOp, value: IrValue },

    /// `dest = getelementptr base, ptr ptr, indices...`
    GetElementPtr {
        dest: Register,
        base: IrType,
        ptr: IrValue,
        indices: Vec<IrValue>,
    },

    /// Function call. `varargs` holds the fixed parameter types of a
    /// variadic callee, which must be spelled out at the call site.
    Call {
        dest: Option<Register>,
        ret: IrType,
        callee: Callee,
        args: Vec<IrValue>,
        varargs: Option<Vec<IrType>>,
    },

    /// `dest = phi ty [value, %block], ...`
    Phi {
        dest: Register,
        incoming: Vec<(IrValue, BasicBlockId)>,
    },

    /// Source position marker
    Comment(String),
}

impl fmt::Display for IrInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrInstr::Alloca { dest, ty } => write!(f, "{} = alloca {}", dest, ty),
            IrInstr::Load { dest, ptr } => write!(f, "{} = load {}, {}", dest, dest.ty, ptr.typed()),
            IrInstr::Store { value, ptr } => write!(f, "store {}, {}", value.typed(), ptr.typed()),
            IrInstr::Binary { dest, op, left, right } => {
                let ty = left.ty();
                write!(f, "{} = {} {} {}, {}", dest, op.opcode(&ty), ty, left, right)
            }
            IrInstr::Compare { dest, pred, left, right } => {
                let ty = left.ty();
                let (instr, pred) = pred.instruction(&ty);
                write!(f, "{} = {} {} {} {}, {}", dest, instr, pred, ty, left, right)
            }
            IrInstr::Cast { dest, op, value } => write!(f, "{} = {} {} to {}", dest, op, value.typed(), dest.ty),
            IrInstr::GetElementPtr { dest, base, ptr, indices } => {
                write!(f, "{} = getelementptr {}, {}", dest, base, ptr.typed())?;
                for index in indices {
                    write!(f, ", {}", index.typed())?;
                }
                Ok(())
            }
            IrInstr::Call {
                dest,
                ret,
                callee,
                args,
                varargs,
            } => {
                if let Some(dest) = dest {
                    write!(f, "{} = ", dest)?;
                }
                write!(f, "call {}", ret)?;
                if let Some(fixed) = varargs {
                    let mut params: Vec<String> = fixed.iter().map(|t| t.to_string()).collect();
                    params.push("...".to_string());
                    write!(f, " ({})", params.join(", "))?;
                }
                let args: Vec<String> = args.iter().map(IrValue::typed).collect();
                write!(f, " {}({})", callee, args.join(", "))
            }
            IrInstr::Phi { dest, incoming } => {
                write!(f, "{} = phi {} ", dest, dest.ty)?;
                let arms: Vec<String> = incoming
                    .iter()
                    .map(|(value, block)| format!("[ {}, %{} ]", value, block))
                    .collect();
                f.write_str(&arms.join(", "))
            }
            IrInstr::Comment(text) => write!(f, "; {}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::value::RegisterId;

    fn reg(id: u32, ty: IrType) -> Register {
        Register::new(RegisterId::new(id), ty)
    }

    #[test]
    fn test_binary_opcodes() {
        let add = IrInstr::Binary {
            dest: reg(2, IrType::I32),
            op: BinaryOp::Add,
            left: reg(0, IrType::I32).into(),
            right: IrValue::i32(1),
        };
        assert_eq!(add.to_string(), "%r2 = add i32 %r0, 1");

        let fdiv = IrInstr::Binary {
            dest: reg(3, IrType::Double),
            op: BinaryOp::Div,
            left: reg(1, IrType::Double).into(),
            right: reg(2, IrType::Double).into(),
        };
        assert_eq!(fdiv.to_string(), "%r3 = fdiv double %r1, %r2");
    }

    #[test]
    fn test_memory_instructions() {
        let slot = reg(0, IrType::Ptr);
        let alloca = IrInstr::Alloca { dest: slot.clone(), ty: IrType::I32 };
        assert_eq!(alloca.to_string(), "%r0 = alloca i32");

        let store = IrInstr::Store { value: IrValue::i32(7), ptr: slot.clone().into() };
        assert_eq!(store.to_string(), "store i32 7, ptr %r0");

        let load = IrInstr::Load { dest: reg(1, IrType::I32), ptr: slot.into() };
        assert_eq!(load.to_string(), "%r1 = load i32, ptr %r0");
    }

    #[test]
    fn test_variadic_call() {
        let call = IrInstr::Call {
            dest: Some(reg(4, IrType::I32)),
            ret: IrType::I32,
            callee: Callee::Direct("printf".into()),
            args: vec![IrValue::Global(".str.0".into()), IrValue::i32(5)],
            varargs: Some(vec![IrType::Ptr]),
        };
        assert_eq!(call.to_string(), "%r4 = call i32 (ptr, ...) @printf(ptr @.str.0, i32 5)");
    }

    #[test]
    fn test_compare_and_phi() {
        let cmp = IrInstr::Compare {
            dest: reg(5, IrType::I1),
            pred: ComparePred::Lt,
            left: reg(1, IrType::Double).into(),
            right: IrValue::Float { value: 0.0, ty: IrType::Double },
        };
        assert_eq!(cmp.to_string(), "%r5 = fcmp olt double %r1, 0x0000000000000000");

        let phi = IrInstr::Phi {
            dest: reg(6, IrType::I1),
            incoming: vec![(IrValue::Bool(false), BasicBlockId(1)), (reg(5, IrType::I1).into(), BasicBlockId(2))],
        };
        assert_eq!(phi.to_string(), "%r6 = phi i1 [ false, %bb1 ], [ %r5, %bb2 ]");
    }
}
