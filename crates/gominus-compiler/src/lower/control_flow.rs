//! Jump targets for `break`/`continue` and the enclosing try statements

use crate::ir::BasicBlockId;
use gominus_parser::ast::BlockStatement;

/// Targets for `break` and `continue` inside a loop or switch
#[derive(Debug, Clone)]
pub struct LoopContext {
    /// Block to jump to for `break`
    pub break_block: BasicBlockId,
    /// Block to jump to for `continue`; `None` for a switch
    pub continue_block: Option<BasicBlockId>,
    /// Number of enclosing try statements when the loop was entered
    pub try_depth: usize,
}

impl LoopContext {
    pub fn new(break_block: BasicBlockId, continue_block: BasicBlockId, try_depth: usize) -> Self {
        Self {
            break_block,
            continue_block: Some(continue_block),
            try_depth,
        }
    }

    /// A switch only takes `break`.
    pub fn switch(exit_block: BasicBlockId, try_depth: usize) -> Self {
        Self {
            break_block: exit_block,
            continue_block: None,
            try_depth,
        }
    }
}

/// Enclosing loops and switches, innermost last
#[derive(Debug, Default, Clone)]
pub struct LoopStack {
    stack: Vec<LoopContext>,
}

impl LoopStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ctx: LoopContext) {
        self.stack.push(ctx);
    }

    pub fn pop(&mut self) -> Option<LoopContext> {
        self.stack.pop()
    }

    /// Innermost loop or switch
    pub fn break_target(&self) -> Option<&LoopContext> {
        self.stack.last()
    }

    /// Innermost loop, skipping switches
    pub fn continue_target(&self) -> Option<&LoopContext> {
        self.stack.iter().rev().find(|ctx| ctx.continue_block.is_some())
    }
}

/// One catch clause of an active try
#[derive(Debug, Clone)]
pub struct CatchTarget {
    /// Declared exception type, if written
    pub ty: Option<String>,
    pub block: BasicBlockId,
    pub var: Option<String>,
}

/// An active try statement, innermost last on the stack
#[derive(Debug, Clone)]
pub struct ExceptionContext<'a> {
    pub landing_pad: BasicBlockId,
    pub catches: Vec<CatchTarget>,
    /// Run on every exit from the protected body
    pub finally: Option<&'a BlockStatement>,
    pub resume: BasicBlockId,
    pub end: BasicBlockId,
}

impl ExceptionContext<'_> {
    /// Where the landing pad dispatches to.
    pub fn first_handler(&self) -> BasicBlockId {
        self.catches.first().map(|c| c.block).unwrap_or(self.resume)
    }
}
