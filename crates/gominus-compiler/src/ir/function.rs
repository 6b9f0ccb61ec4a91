//! Function definitions

use super::block::{BasicBlock, BasicBlockId};
use super::instr::IrInstr;
use super::types::IrType;
use super::value::Register;
use gominus_parser::Span;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct IrFunction {
    pub name: String,
    pub params: Vec<Register>,
    pub return_ty: IrType,
    /// Blocks in print order, which is the order they were started
    pub blocks: Vec<BasicBlock>,
    pub entry_block: BasicBlockId,
    /// Block ids are handed out before their blocks are started
    positions: FxHashMap<BasicBlockId, usize>,
    /// Set when the body contains a try
    pub personality: Option<String>,
    pub source_file: Option<String>,
    pub source_span: Span,
    hoisted_allocas: usize,
}

impl IrFunction {
    pub fn new(name: impl Into<String>, params: Vec<Register>, return_ty: IrType) -> Self {
        Self {
            name: name.into(),
            params,
            return_ty,
            blocks: Vec::new(),
            entry_block: BasicBlockId(0),
            positions: FxHashMap::default(),
            personality: None,
            source_file: None,
            source_span: Span::default(),
            hoisted_allocas: 0,
        }
    }

    pub fn add_block(&mut self, block: BasicBlock) -> BasicBlockId {
        let id = block.id;
        self.positions.insert(id, self.blocks.len());
        self.blocks.push(block);
        id
    }

    pub fn get_block(&self, id: BasicBlockId) -> Option<&BasicBlock> {
        let position = *self.positions.get(&id)?;
        self.blocks.get(position)
    }

    pub fn get_block_mut(&mut self, id: BasicBlockId) -> Option<&mut BasicBlock> {
        let position = *self.positions.get(&id)?;
        self.blocks.get_mut(position)
    }

    /// Put an alloca in the entry block, below the ones already hoisted.
    ///
    /// Keeping every alloca in the entry block means a slot created inside
    /// a loop body is allocated once.
    pub fn insert_alloca(&mut self, instr: IrInstr) {
        let at = self.hoisted_allocas;
        let entry = self.entry_block;
        if let Some(block) = self.get_block_mut(entry) {
            let at = at.min(block.instructions.len());
            block.instructions.insert(at, instr);
            self.hoisted_allocas += 1;
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.instructions.len()).sum()
    }

    /// Every block closed, every branch target present.
    pub fn validate(&self) -> Result<(), String> {
        if self.get_block(self.entry_block).is_none() {
            return Err(format!("missing entry block {}", self.entry_block));
        }

        for block in &self.blocks {
            if !block.is_terminated() {
                return Err(format!("{} has no terminator", block.id));
            }
            if let Some(target) = block.terminator.targets().into_iter().find(|t| self.get_block(*t).is_none()) {
                return Err(format!("{} branches to unknown {}", block.id, target));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::block::Terminator;
    use crate::ir::value::{IrValue, RegisterId};

    fn reg(id: u32, ty: IrType) -> Register {
        Register::new(RegisterId::new(id), ty)
    }

    #[test]
    fn test_blocks_found_by_id_not_position() {
        let mut func = IrFunction::new("f", vec![], IrType::Void);
        func.add_block(BasicBlock::new(BasicBlockId(0)));
        func.add_block(BasicBlock::with_label(BasicBlockId(5), "if.end"));
        func.add_block(BasicBlock::with_label(BasicBlockId(2), "if.then"));

        assert_eq!(func.block_count(), 3);
        assert_eq!(func.get_block(BasicBlockId(2)).and_then(|b| b.label.as_deref()), Some("if.then"));
        assert!(func.get_block(BasicBlockId(1)).is_none());
    }

    #[test]
    fn test_allocas_stay_at_entry_top() {
        let mut func = IrFunction::new("f", vec![], IrType::Void);
        func.add_block(BasicBlock::new(BasicBlockId(0)));
        if let Some(entry) = func.get_block_mut(BasicBlockId(0)) {
            entry.add_instr(IrInstr::Comment("body".into()));
        }

        func.insert_alloca(IrInstr::Alloca { dest: reg(1, IrType::Ptr), ty: IrType::I32 });
        func.insert_alloca(IrInstr::Alloca { dest: reg(2, IrType::Ptr), ty: IrType::I1 });

        let text: Vec<String> = func.blocks[0].instructions.iter().map(|i| i.to_string()).collect();
        assert_eq!(text, vec!["%r1 = alloca i32", "%r2 = alloca i1", "; body"]);
        assert_eq!(func.instruction_count(), 3);
    }

    #[test]
    fn test_validate() {
        let mut func = IrFunction::new("answer", vec![], IrType::I32);
        assert_eq!(func.validate().unwrap_err(), "missing entry block bb0");

        func.add_block(BasicBlock::new(BasicBlockId(0)));
        assert_eq!(func.validate().unwrap_err(), "bb0 has no terminator");

        if let Some(entry) = func.get_block_mut(BasicBlockId(0)) {
            entry.set_terminator(Terminator::Jump(BasicBlockId(8)));
        }
        assert_eq!(func.validate().unwrap_err(), "bb0 branches to unknown bb8");

        if let Some(entry) = func.get_block_mut(BasicBlockId(0)) {
            entry.set_terminator(Terminator::Return(Some(IrValue::i32(42))));
        }
        assert!(func.validate().is_ok());
    }
}
