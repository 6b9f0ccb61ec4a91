//! Statement Lowering
//!
//! Converts AST statements to IR instructions and control flow.

use super::control_flow::LoopContext;
use super::{is_unresolved, storage_type, Binding, FunctionSource, IrGenerator, Operand};
use crate::error::IrGenError;
use crate::ir::{IrType, IrValue, Terminator};
use gominus_checker::Type;
use gominus_parser::ast::{
    BlockStatement, ConstStatement, ForStatement, IfStatement, ReturnStatement, Statement, SwitchStatement,
    VarStatement, WhileStatement,
};
use gominus_parser::Span;

impl<'a> IrGenerator<'a> {
    /// Lower a block in its own scope.
    pub(super) fn lower_block(&mut self, block: &'a BlockStatement) {
        self.push_scope();
        self.lower_statements(&block.statements);
        self.pop_scope();
    }

    /// Statements after a terminator are unreachable and skipped.
    fn lower_statements(&mut self, stmts: &'a [Statement]) {
        for stmt in stmts {
            if self.current_block_is_terminated() {
                break;
            }
            self.lower_stmt(stmt);
        }
    }

    pub(super) fn lower_stmt(&mut self, stmt: &'a Statement) {
        self.emit_marker(stmt.span());

        match stmt {
            Statement::Package(_)
            | Statement::Import(_)
            | Statement::Interface(_)
            | Statement::Class(_)
            | Statement::Template(_)
            | Statement::Method(_) => {}
            Statement::Var(var) => self.lower_var(var),
            Statement::Const(c) => self.lower_const(c),
            Statement::Return(ret) => self.lower_return(ret),
            Statement::Expression(stmt) => {
                self.lower_expr(&stmt.expression);
            }
            Statement::Block(block) => self.lower_block(block),
            Statement::If(if_stmt) => self.lower_if(if_stmt),
            Statement::For(for_stmt) => self.lower_for(for_stmt),
            Statement::While(while_stmt) => self.lower_while(while_stmt),
            Statement::Switch(switch) => self.lower_switch(switch),
            Statement::Break(span) => self.lower_break(*span),
            Statement::Continue(span) => self.lower_continue(*span),
            Statement::Function(func) => {
                // Nested declaration: a separate function with no captures
                let info = self.function_info(&func.params, func.return_type.as_ref());
                self.functions.insert(func.name.name.clone(), info.clone());
                let bindings = self.type_bindings.clone();
                self.with_nested(bindings, |gen| {
                    gen.lower_function(FunctionSource {
                        symbol: func.name.name.clone(),
                        params: &func.params,
                        info,
                        body: &func.body,
                        span: func.span,
                        this_class: None,
                        receiver: None,
                    })
                });
            }
            Statement::TryCatch(try_stmt) => self.lower_try(try_stmt),
            Statement::Throw(throw) => self.lower_throw(throw),
            Statement::Scope(scope) => self.lower_block(&scope.body),
        }
    }

    fn lower_var(&mut self, var: &'a VarStatement) {
        let declared = var.ty.as_ref().map(|ty| self.resolve_type(ty));
        let value = var.value.as_ref().map(|value| self.lower_expr(value));
        self.define_local(&var.name.name, declared, value);
    }

    fn lower_const(&mut self, c: &'a ConstStatement) {
        let declared = c.ty.as_ref().map(|ty| self.resolve_type(ty));
        let value = self.lower_expr(&c.value);
        self.define_local(&c.name.name, declared, Some(value));
    }

    /// Allocate a local, store its initial value and bind the name.
    pub(super) fn define_local(&mut self, name: &str, declared: Option<Type>, value: Option<Operand>) -> Binding {
        let (ty, ir) = match (declared, &value) {
            (Some(ty), Some(op)) if is_unresolved(&ty) => (ty, non_void(op.ir())),
            (Some(ty), _) => {
                let ir = storage_type(&ty);
                (ty, ir)
            }
            (None, Some(op)) => (op.ty.clone(), non_void(op.ir())),
            (None, None) => (Type::unknown(), IrType::I32),
        };

        let slot = self.alloca(ir.clone());
        let init = match value {
            Some(op) => self.convert(op.value, &ir),
            None => IrValue::zero(&ir),
        };
        self.store(init, slot.clone());

        let binding = Binding { ptr: slot, ty, ir };
        self.bind(name, binding.clone());
        binding
    }

    fn lower_return(&mut self, ret: &'a ReturnStatement) {
        let value = ret.value.as_ref().map(|value| self.lower_expr(value));
        let ret_ty = self.state.return_ty.clone();

        let result = if self.state.is_main {
            Some(IrValue::i32(0))
        } else if ret_ty.is_void() {
            None
        } else {
            Some(match value {
                Some(op) => self.convert(op.value, &ret_ty),
                None => IrValue::zero(&ret_ty),
            })
        };

        self.run_finally_blocks(0);
        self.set_terminator(Terminator::Return(result));
    }

    fn lower_if(&mut self, if_stmt: &'a IfStatement) {
        let cond = self.lower_condition(&if_stmt.condition);

        let then_block = self.alloc_block();
        let merge_block = self.alloc_block();
        let else_block = match if_stmt.alternative {
            Some(_) => self.alloc_block(),
            None => merge_block,
        };

        self.set_terminator(Terminator::Branch {
            cond,
            then_block,
            else_block,
        });

        self.start_block(then_block, "if.then");
        self.lower_block(&if_stmt.consequence);
        self.jump_if_open(merge_block);

        if let Some(alternative) = &if_stmt.alternative {
            self.start_block(else_block, "if.else");
            self.lower_stmt(alternative);
            self.jump_if_open(merge_block);
        }

        self.start_block(merge_block, "if.merge");
    }

    fn lower_while(&mut self, while_stmt: &'a WhileStatement) {
        let header_block = self.alloc_block();
        let body_block = self.alloc_block();
        let exit_block = self.alloc_block();

        self.set_terminator(Terminator::Jump(header_block));

        // Header block: evaluate condition
        self.start_block(header_block, "while.header");
        let cond = self.lower_condition(&while_stmt.condition);
        self.set_terminator(Terminator::Branch {
            cond,
            then_block: body_block,
            else_block: exit_block,
        });

        let depth = self.state.exceptions.len();
        self.state.loops.push(LoopContext::new(exit_block, header_block, depth));

        self.start_block(body_block, "while.body");
        self.lower_block(&while_stmt.body);
        self.jump_if_open(header_block);

        self.state.loops.pop();

        self.start_block(exit_block, "while.exit");
    }

    fn lower_for(&mut self, for_stmt: &'a ForStatement) {
        // The init statement's variables live for the whole loop
        self.push_scope();
        if let Some(init) = &for_stmt.init {
            self.lower_stmt(init);
        }

        let cond_block = self.alloc_block();
        let body_block = self.alloc_block();
        let post_block = self.alloc_block();
        let exit_block = self.alloc_block();

        self.set_terminator(Terminator::Jump(cond_block));

        self.start_block(cond_block, "for.cond");
        match &for_stmt.condition {
            Some(condition) => {
                let cond = self.lower_condition(condition);
                self.set_terminator(Terminator::Branch {
                    cond,
                    then_block: body_block,
                    else_block: exit_block,
                });
            }
            None => self.set_terminator(Terminator::Jump(body_block)),
        }

        let depth = self.state.exceptions.len();
        self.state.loops.push(LoopContext::new(exit_block, post_block, depth));

        self.start_block(body_block, "for.body");
        self.lower_block(&for_stmt.body);
        self.jump_if_open(post_block);

        self.state.loops.pop();

        self.start_block(post_block, "for.post");
        if let Some(post) = &for_stmt.post {
            self.lower_stmt(post);
        }
        self.jump_if_open(cond_block);

        self.start_block(exit_block, "for.exit");
        self.pop_scope();
    }

    /// Compare chain into one block per case. Cases do not fall through.
    fn lower_switch(&mut self, switch: &'a SwitchStatement) {
        let tag = switch.tag.as_ref().map(|tag| self.lower_expr(tag));

        let exit_block = self.alloc_block();
        let case_blocks: Vec<_> = switch.cases.iter().map(|_| self.alloc_block()).collect();
        let default_block = match switch.default {
            Some(_) => self.alloc_block(),
            None => exit_block,
        };

        for (case, &case_block) in switch.cases.iter().zip(&case_blocks) {
            for value in &case.values {
                let matched = match &tag {
                    Some(tag) => {
                        let value = self.lower_expr(value);
                        self.compare(gominus_parser::ast::InfixOperator::Equal, tag.clone(), value)
                    }
                    None => self.lower_condition(value),
                };
                let next = self.alloc_block();
                self.set_terminator(Terminator::Branch {
                    cond: matched,
                    then_block: case_block,
                    else_block: next,
                });
                self.start_block(next, "switch.test");
            }
        }
        self.set_terminator(Terminator::Jump(default_block));

        let depth = self.state.exceptions.len();
        self.state.loops.push(LoopContext::switch(exit_block, depth));

        for (case, &case_block) in switch.cases.iter().zip(&case_blocks) {
            self.start_block(case_block, "switch.case");
            self.lower_block(&case.body);
            self.jump_if_open(exit_block);
        }
        if let Some(default) = &switch.default {
            self.start_block(default_block, "switch.default");
            self.lower_block(default);
            self.jump_if_open(exit_block);
        }

        self.state.loops.pop();

        self.start_block(exit_block, "switch.exit");
    }

    fn lower_break(&mut self, span: Span) {
        let Some(target) = self.state.loops.break_target().cloned() else {
            self.error(IrGenError::OutsideLoop { keyword: "break", span });
            return;
        };
        self.run_finally_blocks(target.try_depth);
        self.jump_if_open(target.break_block);
    }

    fn lower_continue(&mut self, span: Span) {
        let target = self
            .state
            .loops
            .continue_target()
            .and_then(|ctx| ctx.continue_block.map(|block| (block, ctx.try_depth)));
        let Some((block, depth)) = target else {
            self.error(IrGenError::OutsideLoop {
                keyword: "continue",
                span,
            });
            return;
        };
        self.run_finally_blocks(depth);
        self.jump_if_open(block);
    }
}

fn non_void(ir: IrType) -> IrType {
    if ir.is_void() {
        IrType::I32
    } else {
        ir
    }
}

#[cfg(test)]
mod tests {
    use crate::lower::IrGenerator;
    use gominus_parser::parse;

    fn generate(source: &str) -> String {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        let analysis = gominus_checker::analyze_with(&program, true);
        assert!(analysis.errors().is_empty(), "check errors: {:?}", analysis.errors());
        let mut generator = IrGenerator::new(&analysis.scopes);
        match generator.generate_program(&program) {
            Ok(ir) => ir,
            Err(errors) => panic!("ir errors: {:?}", errors),
        }
    }

    #[test]
    fn test_if_else_blocks() {
        let ir = generate("func f(x int) int { if x > 0 { return 1 } else { return 2 } }");
        assert!(ir.contains("icmp sgt i32"), "got: {}", ir);
        assert!(ir.contains("; if.then"), "got: {}", ir);
        assert!(ir.contains("; if.else"), "got: {}", ir);
        assert!(ir.contains("; if.merge"), "got: {}", ir);
        assert!(ir.contains("ret i32 1"), "got: {}", ir);
        assert!(ir.contains("ret i32 2"), "got: {}", ir);
    }

    #[test]
    fn test_while_loop() {
        let ir = generate("func f() { var i = 0; while i < 10 { i = i + 1 } }");
        assert!(ir.contains("; while.header"), "got: {}", ir);
        assert!(ir.contains("; while.body"), "got: {}", ir);
        assert!(ir.contains("; while.exit"), "got: {}", ir);
        assert!(ir.contains("icmp slt i32"), "got: {}", ir);
        assert!(ir.contains("ret void"), "got: {}", ir);
    }

    #[test]
    fn test_for_with_break_and_continue() {
        let ir = generate(
            "func f() { for i := 0; i < 10; i++ { if i == 3 { continue } if i == 5 { break } } }",
        );
        assert!(ir.contains("; for.cond"), "got: {}", ir);
        assert!(ir.contains("; for.post"), "got: {}", ir);
        assert!(ir.contains("; for.exit"), "got: {}", ir);
    }

    #[test]
    fn test_switch_compare_chain() {
        let ir = generate("func f(x int) int { switch x { case 1: return 10 case 2, 3: return 20 default: return 0 } return 1 }");
        assert_eq!(ir.matches("icmp eq i32").count(), 3, "got: {}", ir);
        assert!(ir.contains("; switch.case"), "got: {}", ir);
        assert!(ir.contains("; switch.default"), "got: {}", ir);
    }

    #[test]
    fn test_break_outside_loop_is_an_error() {
        // Rejected by the checker as well; lowered anyway for the generator's report
        let (program, _) = parse("func f() { break }");
        let analysis = gominus_checker::analyze_with(&program, true);
        assert_eq!(analysis.errors().len(), 1, "got: {:?}", analysis.errors());
        let mut generator = IrGenerator::new(&analysis.scopes);
        let errors = generator.generate_program(&program).unwrap_err();
        assert_eq!(errors.len(), 1, "got: {:?}", errors);
        assert!(errors[0].to_string().contains("break outside loop"), "got: {:?}", errors);
    }

    #[test]
    fn test_default_return_value() {
        let ir = generate("func f() float64 { }");
        assert!(ir.contains("define double @f()"), "got: {}", ir);
        assert!(ir.contains("ret double 0x0000000000000000"), "got: {}", ir);
    }
}
