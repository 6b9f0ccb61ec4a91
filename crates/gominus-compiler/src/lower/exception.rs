//! Exception Lowering
//!
//! Each try gets a body region, a landing pad, one block per catch, an
//! optional finally block, a resume block and an end block. `throw` hands
//! the value to the C++ runtime through `__cxa_throw`.
//!
//! Type-based dispatch in the landing pad is not implemented: it branches
//! to the first catch, or to resume when there is none.

use super::control_flow::{CatchTarget, ExceptionContext};
use super::{Binding, IrGenerator, Operand};
use crate::ir::{Callee, IrInstr, IrType, IrValue, Terminator};
use gominus_checker::Type;
use gominus_parser::ast::{ThrowStatement, TryCatchStatement, TypeExpr};

/// Personality routine for functions that contain a try
pub(crate) const PERSONALITY: &str = "__gxx_personality_v0";

const CXA_THROW: &str = "__cxa_throw";

impl<'a> IrGenerator<'a> {
    pub(super) fn lower_try(&mut self, try_stmt: &'a TryCatchStatement) {
        self.use_personality();

        let body_block = self.alloc_block();
        let landing_pad = self.alloc_block();
        let catches: Vec<CatchTarget> = try_stmt
            .catches
            .iter()
            .map(|clause| CatchTarget {
                ty: clause.ty.as_ref().map(TypeExpr::to_string),
                block: self.alloc_block(),
                var: clause.param.as_ref().map(|p| p.name.clone()),
            })
            .collect();
        let finally_block = try_stmt.finally.as_ref().map(|_| self.alloc_block());
        let resume = self.alloc_block();
        let end = self.alloc_block();
        let exit = finally_block.unwrap_or(end);

        let ctx = ExceptionContext {
            landing_pad,
            catches: catches.clone(),
            finally: try_stmt.finally.as_ref(),
            resume,
            end,
        };
        let first_handler = ctx.first_handler();
        tracing::trace!(catches = catches.len(), finally = finally_block.is_some(), "lowering try");

        self.set_terminator(Terminator::Jump(body_block));
        self.state.exceptions.push(ctx);

        self.start_block(body_block, "try.body");
        self.lower_block(&try_stmt.body);
        self.jump_if_open(exit);

        self.start_block(landing_pad, "try.landing");
        self.emit(IrInstr::Comment("exception type dispatch not implemented".to_string()));
        self.set_terminator(Terminator::Jump(first_handler));

        for (clause, target) in try_stmt.catches.iter().zip(&catches) {
            self.start_block(target.block, "try.catch");
            self.push_scope();
            if let Some(var) = &target.var {
                let ty = match &clause.ty {
                    Some(ty) => self.resolve_type(ty),
                    None => Type::unknown(),
                };
                let ir = match IrType::from_type(&ty) {
                    IrType::Void => IrType::Ptr,
                    ir => ir,
                };
                // The caught value is not delivered yet
                let slot = self.alloca(ir.clone());
                self.store(IrValue::zero(&ir), slot.clone());
                self.bind(var, Binding { ptr: slot, ty, ir });
            }
            self.lower_block(&clause.body);
            self.pop_scope();
            self.jump_if_open(exit);
        }

        self.state.exceptions.pop();

        if let (Some(block), Some(finally)) = (finally_block, &try_stmt.finally) {
            self.start_block(block, "try.finally");
            self.lower_block(finally);
            self.jump_if_open(end);
        }

        self.start_block(resume, "try.resume");
        self.set_terminator(Terminator::Unreachable);

        self.start_block(end, "try.end");
    }

    pub(super) fn lower_throw(&mut self, throw: &'a ThrowStatement) {
        let value = self.lower_expr(&throw.value);
        self.throw_value(value);
    }

    /// Store the value in a slot and hand it to `__cxa_throw`.
    pub(super) fn throw_value(&mut self, value: Operand) {
        let ir = match value.ir() {
            IrType::Void => IrType::I32,
            ir => ir,
        };
        let slot = self.alloca(ir);
        self.store(value.value, slot.clone());

        self.module
            .declare(CXA_THROW, IrType::Void, vec![IrType::Ptr, IrType::Ptr, IrType::Ptr], false);
        self.call(
            IrType::Void,
            Callee::Direct(CXA_THROW.to_string()),
            vec![slot, IrValue::Null, IrValue::Null],
            None,
        );
        self.set_terminator(Terminator::Unreachable);
    }

    /// Inline the finally blocks of enclosing trys, innermost first, down to
    /// `depth` trys. Used before `return`, `break` and `continue` leave them.
    pub(super) fn run_finally_blocks(&mut self, depth: usize) {
        let mut level = self.state.exceptions.len();
        while level > depth {
            level -= 1;
            let Some(finally) = self.state.exceptions[level].finally else {
                continue;
            };
            // The finally body runs outside its own try
            let inner = self.state.exceptions.split_off(level);
            self.lower_block(finally);
            self.state.exceptions.extend(inner);

            if self.current_block_is_terminated() {
                break;
            }
        }
    }

    fn use_personality(&mut self) {
        self.module.declare(PERSONALITY, IrType::I32, Vec::new(), true);
        match self.state.function.as_mut() {
            Some(function) => function.personality = Some(PERSONALITY.to_string()),
            None => self.internal("try outside a function"),
        }
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
    fn test_throw_lowering() {
        let ir = generate("func fail() { throw 42 }");
        assert!(ir.contains("declare void @__cxa_throw(ptr, ptr, ptr)"), "got: {}", ir);
        assert!(ir.contains("store i32 42, ptr %r0"), "got: {}", ir);
        assert!(ir.contains("call void @__cxa_throw(ptr %r0, ptr null, ptr null)"), "got: {}", ir);
        assert!(ir.contains("unreachable"), "got: {}", ir);
    }

    #[test]
    fn test_try_catch_regions() {
        let ir = generate("func f() { try { throw 1 } catch (e int) { println(e) } }");
        assert!(ir.contains("define void @f() personality ptr @__gxx_personality_v0 {"), "got: {}", ir);
        assert!(ir.contains("declare i32 @__gxx_personality_v0(...)"), "got: {}", ir);
        for label in ["; try.body", "; try.landing", "; try.catch", "; try.resume", "; try.end"] {
            assert!(ir.contains(label), "missing {} in: {}", label, ir);
        }
        assert!(ir.contains("; exception type dispatch not implemented"), "got: {}", ir);
    }

    #[test]
    fn test_exits_run_finally() {
        let ir = generate(
            "func f() int { try { return 1 } catch (e int) { return 2 } finally { println(\"done\") } return 0 }",
        );
        assert!(ir.contains("; try.finally"), "got: {}", ir);
        // Inlined before each return, plus the finally block itself
        assert_eq!(ir.matches("call i32 (ptr, ...) @printf").count(), 3, "got: {}", ir);
    }

    #[test]
    fn test_landing_pad_branches_to_first_catch() {
        let ir = generate("func f() { try { println(1) } catch (e int) { println(2) } }");
        let landing = ir.find("; try.landing").unwrap();
        let branch = ir[landing..].lines().nth(2).unwrap();
        assert_eq!(branch, "  br label %bb3", "got: {}", ir);
    }
}
