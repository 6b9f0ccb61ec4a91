//! Call Lowering
//!
//! Resolution order for `f(args)`: local function value, user function,
//! template (type arguments inferred from the arguments), method of the
//! enclosing class, builtin, and finally an external C symbol.
//!
//! `pkg.f(args)` maps the few package functions with a C counterpart
//! (`fmt.Println`, `os.Exit`) and declares everything else as an external
//! `pkg_f`.

use super::template::mangle;
use super::{is_unresolved, storage_type, IrGenerator, Operand};
use crate::error::IrGenError;
use crate::ir::{Callee, IrType, IrValue};
use gominus_checker::builtins::{is_builtin_package, package_member};
use gominus_checker::{BasicKind, Type};
use gominus_parser::ast::{CallExpression, Expression, Identifier, MemberExpression};
use gominus_parser::Span;

const PRINTF: &str = "printf";

impl<'a> IrGenerator<'a> {
    pub(super) fn lower_call(&mut self, call: &'a CallExpression) -> Operand {
        match call.function.as_ref() {
            Expression::Identifier(id) => self.call_named(id, &call.arguments),
            Expression::Member(member) => self.call_member(member, &call.arguments),
            Expression::Super(span) => {
                let args = self.lower_args(&call.arguments);
                self.call_super_method("constructor", args, *span)
            }
            Expression::TemplateInstance(instance) => {
                let types = instance.type_args.iter().map(|arg| self.resolve_type(arg)).collect();
                let Some(symbol) = self.instantiate(&instance.template, types) else {
                    return Operand::undef();
                };
                let args = self.lower_args(&call.arguments);
                self.call_symbol(&symbol, args, instance.span)
            }
            callee => {
                let span = *callee.span();
                let callee = self.lower_expr(callee);
                let args = self.lower_args(&call.arguments);
                self.call_indirect(callee, args, span)
            }
        }
    }

    fn lower_args(&mut self, args: &'a [Expression]) -> Vec<Operand> {
        args.iter().map(|arg| self.lower_expr(arg)).collect()
    }

    fn call_named(&mut self, id: &'a Identifier, args: &'a [Expression]) -> Operand {
        let name = id.name.as_str();

        if let Some(binding) = self.lookup(name) {
            let value = self.load(binding.ptr, binding.ir);
            let args = self.lower_args(args);
            return self.call_indirect(Operand::new(value, binding.ty), args, id.span);
        }
        if self.functions.contains_key(name) {
            let args = self.lower_args(args);
            return self.call_symbol(name, args, id.span);
        }
        if self.templates.contains_key(name) {
            let args = self.lower_args(args);
            let types = self.infer_template_args(name, &args);
            let Some(symbol) = self.instantiate(id, types) else {
                return Operand::undef();
            };
            return self.call_symbol(&symbol, args, id.span);
        }
        if let Some((this, class)) = self.state.this.clone() {
            if self.find_method(&class, name).is_some() {
                let args = self.lower_args(args);
                return self.call_method(Operand::new(this, Type::Class(class.clone())), &class, name, args, true, id.span);
            }
        }

        let args = self.lower_args(args);
        match name {
            "println" => self.lower_print(args, true),
            "print" => self.lower_print(args, false),
            "len" | "cap" => self.lower_len(args),
            "panic" => {
                let value = args
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| Operand::new(IrValue::Null, Type::null()));
                self.throw_value(value);
                let cont = self.alloc_block();
                self.start_block(cont, "panic.cont");
                void_result()
            }
            "recover" => Operand::new(IrValue::Null, Type::unknown()),
            _ => {
                tracing::debug!(function = name, "call to undeclared function, declaring external");
                self.call_external(name, IrType::I32, Type::unknown(), args)
            }
        }
    }

    fn call_member(&mut self, member: &'a MemberExpression, args: &'a [Expression]) -> Operand {
        let method = member.property.name.as_str();
        let span = member.property.span;

        match member.object.as_ref() {
            Expression::Identifier(object) if self.lookup(&object.name).is_none() => {
                if self.classes.contains_key(&object.name) {
                    let args = self.lower_args(args);
                    let class = object.name.clone();
                    return self.call_method(Operand::new(IrValue::Null, Type::Class(class.clone())), &class, method, args, false, span);
                }
                if self.is_package(&object.name) {
                    let args = self.lower_args(args);
                    return self.call_package(&object.name, method, args);
                }
            }
            Expression::Super(span) => {
                let args = self.lower_args(args);
                return self.call_super_method(method, args, *span);
            }
            _ => {}
        }

        let receiver = self.lower_expr(&member.object);
        let args = self.lower_args(args);
        if let Type::Class(class) = receiver.ty.clone() {
            if self.find_method(&class, method).is_some() {
                return self.call_method(receiver, &class, method, args, true, span);
            }
        }

        // Receivers the lowering cannot resolve call an external
        // `<object>_<method>` with the receiver first
        let name = format!("{}_{}", mangle(&member.object.to_string()), method);
        tracing::debug!(function = %name, "unresolved method call, declaring external");
        let mut all = Vec::with_capacity(args.len() + 1);
        all.push(receiver);
        all.extend(args);
        self.call_external(&name, IrType::I32, Type::unknown(), all)
    }

    /// Call a method of `class`. Virtual methods dispatch through the
    /// vtable when `dynamic` is set; static methods take no receiver.
    pub(super) fn call_method(
        &mut self,
        receiver: Operand,
        class: &str,
        method: &str,
        args: Vec<Operand>,
        dynamic: bool,
        span: Span,
    ) -> Operand {
        let Some(entry) = self.find_method(class, method) else {
            self.error(IrGenError::UnknownMember {
                class: class.to_string(),
                member: method.to_string(),
                span,
            });
            return Operand::undef();
        };

        let mut values = Vec::with_capacity(args.len() + 1);
        if !entry.is_static {
            values.push(receiver.value.clone());
        }
        values.extend(self.convert_args(&entry.params, args));

        let ret = IrType::from_type(&entry.ret);
        let result = match entry.slot {
            Some(slot) if dynamic && !entry.is_static => {
                let function = self.load_vtable_slot(receiver.value, class, slot);
                self.call(ret, Callee::Indirect(function), values, None)
            }
            _ => self.call(ret, Callee::Direct(entry.symbol.clone()), values, None),
        };
        call_result(result, entry.ret)
    }

    fn call_super_method(&mut self, method: &str, args: Vec<Operand>, span: Span) -> Operand {
        let Some((this, class)) = self.state.this.clone() else {
            self.error(IrGenError::UndefinedVariable {
                name: "super".to_string(),
                span,
            });
            return Operand::undef();
        };
        let Some(parent) = self.classes.get(&class).and_then(|layout| layout.parent.clone()) else {
            self.error(IrGenError::UnknownMember {
                class,
                member: method.to_string(),
                span,
            });
            return Operand::undef();
        };
        self.call_method(Operand::new(this, Type::Class(parent.clone())), &parent, method, args, false, span)
    }

    /// Direct call of a module-level function.
    fn call_symbol(&mut self, symbol: &str, args: Vec<Operand>, span: Span) -> Operand {
        let Some(info) = self.functions.get(symbol).cloned() else {
            self.error(IrGenError::NotCallable {
                name: symbol.to_string(),
                span,
            });
            return Operand::undef();
        };
        let values = self.convert_args(&info.params, args);
        let ret = IrType::from_type(&info.ret);
        let result = self.call(ret, Callee::Direct(symbol.to_string()), values, None);
        call_result(result, info.ret)
    }

    /// Call through a function pointer.
    fn call_indirect(&mut self, callee: Operand, args: Vec<Operand>, span: Span) -> Operand {
        let (params, ret) = match &callee.ty {
            Type::Function { params, ret, .. } => (params.clone(), (**ret).clone()),
            _ if callee.ir() == IrType::Ptr => (Vec::new(), Type::unknown()),
            other => {
                self.error(IrGenError::NotCallable {
                    name: other.to_string(),
                    span,
                });
                return Operand::undef();
            }
        };
        let values = self.convert_args(&params, args);
        let ret_ir = IrType::from_type(&ret);
        let result = self.call(ret_ir, Callee::Indirect(callee.value), values, None);
        call_result(result, ret)
    }

    fn convert_args(&mut self, params: &[Type], args: Vec<Operand>) -> Vec<IrValue> {
        args.into_iter()
            .enumerate()
            .map(|(i, arg)| match params.get(i) {
                Some(ty) if !is_unresolved(ty) => {
                    let ir = storage_type(ty);
                    self.convert(arg.value, &ir)
                }
                _ => arg.value,
            })
            .collect()
    }

    /// Variadic call of a symbol the module only declares.
    fn call_external(&mut self, name: &str, ret_ir: IrType, ret: Type, args: Vec<Operand>) -> Operand {
        let values: Vec<IrValue> = args.into_iter().map(|arg| self.promote_vararg(arg)).collect();
        self.module.declare(name, ret_ir.clone(), Vec::new(), true);
        let result = self.call(ret_ir, Callee::Direct(name.to_string()), values, Some(Vec::new()));
        call_result(result, ret)
    }

    // ========================================================================
    // Packages
    // ========================================================================

    fn call_package(&mut self, package: &str, function: &str, args: Vec<Operand>) -> Operand {
        if !self.packages.contains(package) && !is_builtin_package(package) {
            tracing::warn!(package, function, "call into a package that is not imported");
        }
        tracing::trace!(package, function, "package call");

        match (package, function) {
            ("fmt", "Println") => self.lower_print(args, true),
            ("fmt", "Print") => self.lower_print(args, false),
            ("fmt", "Printf") => self.lower_printf(args),
            ("os", "Exit") => {
                self.module.declare("exit", IrType::Void, vec![IrType::I32], false);
                let code = match args.into_iter().next() {
                    Some(code) => self.convert(code.value, &IrType::I32),
                    None => IrValue::i32(0),
                };
                self.call(IrType::Void, Callee::Direct("exit".to_string()), vec![code], None);
                void_result()
            }
            _ => {
                let ret = package_member(package, function)
                    .map(|sig| sig.ret)
                    .unwrap_or_else(Type::unknown);
                let ret_ir = IrType::from_type(&ret);
                self.call_external(&format!("{}_{}", package, function), ret_ir, ret, args)
            }
        }
    }

    // ========================================================================
    // Builtins
    // ========================================================================

    /// `println`/`print`: one printf with a format built from the argument
    /// types. `println` separates with spaces and ends the line.
    fn lower_print(&mut self, args: Vec<Operand>, newline: bool) -> Operand {
        let separator = if newline { " " } else { "" };
        let mut format = args.iter().map(format_spec).collect::<Vec<_>>().join(separator);
        if newline {
            format.push('\n');
        }
        let values = args.into_iter().map(|arg| self.promote_vararg(arg)).collect();
        self.printf(format.as_bytes(), values)
    }

    /// `fmt.Printf(format, args...)`
    fn lower_printf(&mut self, args: Vec<Operand>) -> Operand {
        let mut args = args.into_iter();
        let Some(format) = args.next() else {
            return self.printf(b"", Vec::new());
        };
        let mut values = vec![format.value];
        values.extend(args.map(|arg| self.promote_vararg(arg)));
        self.emit_printf(values)
    }

    fn printf(&mut self, format: &[u8], mut values: Vec<IrValue>) -> Operand {
        let name = self.module.add_string(format);
        values.insert(0, IrValue::Global(name));
        self.emit_printf(values)
    }

    fn emit_printf(&mut self, values: Vec<IrValue>) -> Operand {
        self.module.declare(PRINTF, IrType::I32, vec![IrType::Ptr], true);
        let result = self.call(
            IrType::I32,
            Callee::Direct(PRINTF.to_string()),
            values,
            Some(vec![IrType::Ptr]),
        );
        call_result(result, Type::int())
    }

    /// `len`/`cap` of a string, array or map.
    fn lower_len(&mut self, args: Vec<Operand>) -> Operand {
        let Some(arg) = args.into_iter().next() else {
            return Operand::new(IrValue::i32(0), Type::int());
        };
        let value = match &arg.ty {
            Type::Array(_) => self.array_length(arg.value),
            Type::Map(..) => {
                self.module
                    .declare(super::expr::MAP_LEN, IrType::I32, vec![IrType::Ptr], false);
                self.call(
                    IrType::I32,
                    Callee::Direct(super::expr::MAP_LEN.to_string()),
                    vec![arg.value],
                    None,
                )
                .unwrap_or_else(|| IrValue::i32(0))
            }
            _ if arg.ir() == IrType::Ptr => {
                self.module.declare("strlen", IrType::I64, vec![IrType::Ptr], false);
                let len = self
                    .call(IrType::I64, Callee::Direct("strlen".to_string()), vec![arg.value], None)
                    .unwrap_or_else(|| IrValue::i64(0));
                self.convert(len, &IrType::I32)
            }
            _ => IrValue::i32(0),
        };
        Operand::new(value, Type::int())
    }
}

fn call_result(result: Option<IrValue>, ty: Type) -> Operand {
    match result {
        Some(value) => Operand::new(value, ty),
        None => void_result(),
    }
}

fn void_result() -> Operand {
    Operand::new(IrValue::Undef(IrType::Void), Type::void())
}

/// printf conversion for one argument.
fn format_spec(arg: &Operand) -> &'static str {
    if arg.ty.kind() == Some(BasicKind::Char) {
        return "%c";
    }
    match arg.ir() {
        IrType::I1 | IrType::I8 | IrType::I16 | IrType::I32 => "%d",
        IrType::I64 => "%lld",
        IrType::Float | IrType::Double => "%f",
        IrType::Ptr if arg.ty.is_string() || arg.ty.is_unknown() => "%s",
        IrType::Ptr => "%p",
        _ => "%d",
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
    fn test_println_format() {
        let ir = generate("func main() { println(\"n =\", 42, 1.5) }");
        assert!(ir.contains("declare i32 @printf(ptr, ...)"), "got: {}", ir);
        assert!(ir.contains("c\"%s %d %f\\0A\\00\""), "got: {}", ir);
        assert!(ir.contains("call i32 (ptr, ...) @printf(ptr @.str."), "got: {}", ir);
    }

    #[test]
    fn test_print_without_newline() {
        let ir = generate("func main() { print(1, 2) }");
        assert!(ir.contains("c\"%d%d\\00\""), "got: {}", ir);
    }

    #[test]
    fn test_bool_is_promoted() {
        let ir = generate("func f(b bool) { println(b) }");
        assert!(ir.contains("zext i1"), "got: {}", ir);
    }

    #[test]
    fn test_os_exit() {
        let ir = generate("import \"os\"\nfunc main() { os.Exit(3) }");
        assert!(ir.contains("declare void @exit(i32)"), "got: {}", ir);
        assert!(ir.contains("call void @exit(i32 3)"), "got: {}", ir);
    }

    #[test]
    fn test_package_call_is_external() {
        // Members of packages outside the builtin set are opaque to the checker
        let ir = generate("import \"example.com/textutil\"\nfunc f(s string) { textutil.Upper(s) }");
        assert!(ir.contains("@textutil_Upper("), "got: {}", ir);
        assert!(ir.contains("(...) @textutil_Upper"), "got: {}", ir);
    }

    #[test]
    fn test_len_of_string() {
        let ir = generate("func f(s string) int { return len(s) }");
        assert!(ir.contains("call i64 @strlen(ptr"), "got: {}", ir);
        assert!(ir.contains("trunc i64"), "got: {}", ir);
    }

    #[test]
    fn test_direct_call() {
        let ir = generate("func add(a int, b int) int { return a + b }\nfunc main() { add(1, 2) }");
        assert!(ir.contains("call i32 @add(i32 1, i32 2)"), "got: {}", ir);
    }
}
