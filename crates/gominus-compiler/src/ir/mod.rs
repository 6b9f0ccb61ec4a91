//! Intermediate Representation (IR) for Gominus
//!
//! The IR sits between the analyzed AST and the external LLVM tools. It is
//! built from basic blocks of three-address instructions and prints as
//! LLVM-flavoured text.
//!
//! # Structure
//!
//! - `IrModule` - aggregate types, globals, declarations and functions
//! - `IrFunction` - parameters and basic blocks
//! - `BasicBlock` - instructions with a single terminator
//! - `IrInstr` - one instruction per line of output
//! - `IrValue` - registers, constants and global addresses

pub mod block;
pub mod function;
pub mod instr;
pub mod module;
pub mod pretty;
pub mod types;
pub mod value;

pub use block::{BasicBlock, BasicBlockId, Terminator};
pub use function::IrFunction;
pub use instr::{BinaryOp, Callee, CastOp, ComparePred, IrInstr};
pub use module::{IrDeclaration, IrGlobal, IrModule, IrStruct};
pub use types::IrType;
pub use value::{IrValue, Register, RegisterId};
