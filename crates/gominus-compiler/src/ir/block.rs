//! Blocks and terminators
//!
//! A block is a straight run of instructions closed by exactly one
//! terminator. Blocks start out [`Terminator::Open`] while being filled.

use super::instr::IrInstr;
use super::value::IrValue;
use std::fmt;

/// Block handle, printed as `bbN`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BasicBlockId(pub u32);

impl BasicBlockId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for BasicBlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub id: BasicBlockId,
    /// Region name printed as a comment after the label (`try.body`, `for.cond`)
    pub label: Option<String>,
    pub instructions: Vec<IrInstr>,
    pub terminator: Terminator,
}

impl BasicBlock {
    pub fn new(id: BasicBlockId) -> Self {
        Self {
            id,
            label: None,
            instructions: Vec::new(),
            terminator: Terminator::Open,
        }
    }

    pub fn with_label(id: BasicBlockId, label: impl Into<String>) -> Self {
        let mut block = Self::new(id);
        block.label = Some(label.into());
        block
    }

    pub fn add_instr(&mut self, instr: IrInstr) {
        self.instructions.push(instr);
    }

    pub fn set_terminator(&mut self, term: Terminator) {
        self.terminator = term;
    }

    pub fn is_terminated(&self) -> bool {
        self.terminator != Terminator::Open
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    /// Still being filled; never printed for a finished function
    Open,

    Jump(BasicBlockId),

    /// Conditional branch on an `i1`
    Branch {
        cond: IrValue,
        then_block: BasicBlockId,
        else_block: BasicBlockId,
    },

    Return(Option<IrValue>),

    Unreachable,
}

impl Terminator {
    /// Blocks control may continue in
    pub fn targets(&self) -> Vec<BasicBlockId> {
        match self {
            Terminator::Jump(target) => vec![*target],
            Terminator::Branch {
                then_block, else_block, ..
            } => vec![*then_block, *else_block],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminator::Open => f.write_str("; open"),
            Terminator::Jump(target) => write!(f, "br label %{}", target),
            Terminator::Branch {
                cond,
                then_block,
                else_block,
            } => write!(f, "br {}, label %{}, label %{}", cond.typed(), then_block, else_block),
            Terminator::Return(None) => f.write_str("ret void"),
            Terminator::Return(Some(value)) => write!(f, "ret {}", value.typed()),
            Terminator::Unreachable => f.write_str("unreachable"),
        }
    }
}
