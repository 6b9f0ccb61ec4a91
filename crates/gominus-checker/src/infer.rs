//! Expression type inference
//!
//! One case per expression variant. Every case returns a type even after
//! reporting, falling back to `unknown`.

use crate::analyzer::Analyzer;
use crate::builtins::{is_builtin_package, package_member};
use crate::error::CheckError;
use crate::symbols::{FunctionSignature, Symbol, SymbolKind};
use crate::types::Type;
use gominus_parser::ast::*;
use gominus_parser::Span;

impl Analyzer {
    /// Infer the type of an expression, reporting what is wrong with it.
    pub fn infer_type(&mut self, expr: &Expression) -> Type {
        match expr {
            Expression::IntegerLiteral(_) => Type::int(),
            Expression::FloatLiteral(_) => Type::float(),
            Expression::StringLiteral(_) => Type::string(),
            Expression::CharLiteral(_) => Type::char(),
            Expression::BooleanLiteral(_) => Type::bool(),
            Expression::NullLiteral(_) => Type::null(),
            Expression::Identifier(id) => self.infer_identifier(id),
            Expression::Prefix(e) => self.infer_prefix(e),
            Expression::Infix(e) => {
                let left = self.infer_type(&e.left);
                let right = self.infer_type(&e.right);
                self.binary_result(e.operator, &left, &right, e.span)
            }
            Expression::Postfix(e) => {
                let ty = self.infer_type(&e.operand);
                self.check_assign_target(&e.operand);
                if !ty.is_numeric() && !ty.is_wildcard() {
                    self.report(CheckError::InvalidUnaryOp {
                        op: e.operator.to_string(),
                        operand: ty.to_string(),
                        span: e.span,
                    });
                }
                ty
            }
            Expression::Assign(e) => self.infer_assign(e),
            Expression::Call(e) => self.infer_call(e),
            Expression::Index(e) => self.infer_index(e),
            Expression::Member(e) => self.infer_member(e),
            Expression::ArrayLiteral(e) => {
                let elem = self.common_type(&e.elements);
                Type::Array(Box::new(elem))
            }
            Expression::HashLiteral(e) => {
                let keys: Vec<&Expression> = e.pairs.iter().map(|(k, _)| k).collect();
                let values: Vec<&Expression> = e.pairs.iter().map(|(_, v)| v).collect();
                let key = self.common_type_of(&keys);
                let value = self.common_type_of(&values);
                Type::Map(Box::new(key), Box::new(value))
            }
            Expression::FunctionLiteral(e) => {
                let signature = self.resolve_signature(&e.params, e.return_type.as_ref());
                self.check_function_body(&e.params, &signature, &e.body);
                signature.to_type()
            }
            Expression::New(e) => self.infer_new(e),
            Expression::This(span) => match self.class_stack.last() {
                Some(class) => Type::Class(class.clone()),
                None => {
                    self.report(CheckError::ThisOutsideClass { span: *span });
                    Type::unknown()
                }
            },
            Expression::Super(span) => {
                let parent = self
                    .class_stack
                    .last()
                    .and_then(|class| self.scopes.class_info(class))
                    .and_then(|info| info.parent.clone());
                match parent {
                    Some(parent) => Type::Class(parent),
                    None => {
                        self.report(CheckError::SuperWithoutParent { span: *span });
                        Type::unknown()
                    }
                }
            }
            Expression::TemplateInstance(e) => match self.instantiate(e) {
                Some(Instance::Function(sig)) => sig.to_type(),
                Some(Instance::Class(name)) => Type::Class(name),
                None => Type::unknown(),
            },
        }
    }

    fn infer_identifier(&mut self, id: &Identifier) -> Type {
        let Some(symbol) = self.scopes.resolve(&id.name) else {
            self.report(CheckError::UndefinedIdentifier {
                name: id.name.clone(),
                span: id.span,
            });
            return Type::unknown();
        };

        if symbol.kind == SymbolKind::Package {
            self.mark_package_used(&id.name);
            return Type::unknown();
        }
        symbol.ty.clone()
    }

    fn infer_prefix(&mut self, e: &PrefixExpression) -> Type {
        let operand = self.infer_type(&e.right);
        let (ok, result) = match e.operator {
            PrefixOperator::Not => (operand.is_bool(), Type::bool()),
            PrefixOperator::Negate => (operand.is_numeric(), operand.clone()),
            PrefixOperator::BitNot => (operand.is_int(), operand.clone()),
        };

        if !ok && !operand.is_wildcard() {
            self.report(CheckError::InvalidUnaryOp {
                op: e.operator.to_string(),
                operand: operand.to_string(),
                span: e.span,
            });
        }
        result
    }

    /// Result type of `left op right`, reporting invalid operand types.
    pub(crate) fn binary_result(&mut self, op: InfixOperator, left: &Type, right: &Type, span: Span) -> Type {
        let wildcard = left.is_wildcard() || right.is_wildcard();

        let result = if op.is_logical() {
            (left.is_bool() && right.is_bool() || wildcard).then(Type::bool)
        } else if op.is_comparison() {
            let comparable = self.assignable(left, right) || self.assignable(right, left);
            comparable.then(Type::bool)
        } else if op == InfixOperator::Add && left.is_string() && right.is_string() {
            Some(Type::string())
        } else if op == InfixOperator::Modulo || op.is_bitwise() {
            match (left.is_int(), right.is_int()) {
                (true, true) => Some(left.clone()),
                _ if wildcard => Some(pick_known(left, right)),
                _ => None,
            }
        } else {
            match (left.is_numeric(), right.is_numeric()) {
                (true, true) if left.is_float() || right.is_float() => Some(Type::float()),
                (true, true) => Some(Type::int()),
                _ if wildcard => Some(pick_known(left, right)),
                _ => None,
            }
        };

        result.unwrap_or_else(|| {
            self.report(CheckError::InvalidBinaryOp {
                op: op.to_string(),
                left: left.to_string(),
                right: right.to_string(),
                span,
            });
            Type::unknown()
        })
    }

    /// Infer an expression whose value is used; a `void` call is reported
    /// and typed as unknown so it is not reported twice.
    pub(crate) fn infer_value(&mut self, expr: &Expression) -> Type {
        let ty = self.infer_type(expr);
        if !ty.is_void() {
            return ty;
        }
        self.report(CheckError::NoValue {
            expr: expr.to_string(),
            span: *expr.span(),
        });
        Type::unknown()
    }

    fn infer_assign(&mut self, e: &AssignExpression) -> Type {
        if e.operator == AssignOperator::Define {
            let value = self.infer_value(&e.value);
            let Expression::Identifier(id) = e.target.as_ref() else {
                self.report(CheckError::InvalidAssignTarget {
                    target: e.target.to_string(),
                    span: *e.target.span(),
                });
                return value;
            };
            let ty = if self.type_inference() { value } else { Type::unknown() };
            self.redefine(Symbol::new(&id.name, SymbolKind::Variable, ty.clone(), id.span));
            return ty;
        }

        if !self.check_assign_target(&e.target) {
            self.infer_type(&e.value);
            return Type::unknown();
        }

        let target = self.infer_type(&e.target);
        let value = self.infer_value(&e.value);
        let value = match e.operator {
            AssignOperator::Compound(op) => self.binary_result(op, &target, &value, e.span),
            _ => value,
        };

        if !self.assignable(&target, &value) {
            self.report(CheckError::TypeMismatch {
                expected: target.to_string(),
                actual: value.to_string(),
                span: *e.value.span(),
            });
        }
        target
    }

    /// Report targets that cannot be assigned; returns whether it can be.
    fn check_assign_target(&mut self, target: &Expression) -> bool {
        match target {
            Expression::Identifier(id) => {
                let constant = self.scopes.resolve(&id.name).is_some_and(Symbol::is_const);
                if constant {
                    self.report(CheckError::AssignToConstant {
                        name: id.name.clone(),
                        span: id.span,
                    });
                }
                true
            }
            Expression::Index(_) | Expression::Member(_) => true,
            other => {
                self.report(CheckError::InvalidAssignTarget {
                    target: other.to_string(),
                    span: *other.span(),
                });
                false
            }
        }
    }

    // ========================================================================
    // Calls and members
    // ========================================================================

    fn infer_call(&mut self, call: &CallExpression) -> Type {
        let callee = call.function.to_string();
        let Some(signature) = self.callee_signature(&call.function) else {
            for arg in &call.arguments {
                self.infer_value(arg);
            }
            return Type::unknown();
        };

        self.check_arguments(&callee, &signature, &call.arguments, call.span);
        signature.ret
    }

    /// Check argument count and per-argument types against a signature.
    fn check_arguments(&mut self, callee: &str, signature: &FunctionSignature, args: &[Expression], span: Span) {
        let expected = signature.params.len();
        let count_ok = if signature.variadic {
            args.len() >= expected
        } else {
            args.len() == expected
        };
        if !count_ok {
            self.report(CheckError::ArgumentCount {
                callee: callee.to_string(),
                expected: if signature.variadic {
                    format!("at least {}", expected)
                } else {
                    expected.to_string()
                },
                actual: args.len(),
                span,
            });
        }

        for (index, arg) in args.iter().enumerate() {
            let actual = self.infer_value(arg);
            let Some(param) = signature.params.get(index) else {
                continue;
            };
            if !param.is_wildcard() && !self.assignable(param, &actual) {
                self.report(CheckError::ArgumentType {
                    callee: callee.to_string(),
                    index: index + 1,
                    expected: param.to_string(),
                    actual: actual.to_string(),
                    span: *arg.span(),
                });
            }
        }
    }

    /// Signature of a called expression, or `None` when it cannot be known.
    fn callee_signature(&mut self, function: &Expression) -> Option<FunctionSignature> {
        match function {
            Expression::Identifier(id) => {
                let Some(symbol) = self.scopes.resolve(&id.name) else {
                    self.report(CheckError::UndefinedIdentifier {
                        name: id.name.clone(),
                        span: id.span,
                    });
                    return None;
                };
                if let Some(signature) = &symbol.signature {
                    return Some(signature.clone());
                }
                // Template functions called without type arguments keep their
                // parameters unbound; the generator infers them from the call
                if let Some(signature) = symbol.template.as_ref().and_then(|t| t.signature.clone()) {
                    return Some(signature);
                }
                let ty = symbol.ty.clone();
                self.signature_of(function, &ty)
            }
            Expression::Member(member) => {
                if let Some(package) = self.package_name(&member.object) {
                    return self.package_function(&package, &member.property);
                }
                let object = self.infer_type(&member.object);
                let ty = self.member_type(&object, &member.property)?;
                self.signature_of(function, &ty)
            }
            Expression::TemplateInstance(e) => match self.instantiate(e)? {
                Instance::Function(sig) => Some(sig),
                Instance::Class(name) => {
                    self.report(CheckError::NotCallable {
                        callee: function.to_string(),
                        ty: name,
                        span: e.span,
                    });
                    None
                }
            },
            other => {
                let ty = self.infer_type(other);
                self.signature_of(other, &ty)
            }
        }
    }

    fn signature_of(&mut self, callee: &Expression, ty: &Type) -> Option<FunctionSignature> {
        match ty {
            Type::Function { params, ret, variadic } => Some(FunctionSignature {
                params: params.clone(),
                ret: (**ret).clone(),
                variadic: *variadic,
            }),
            ty if ty.is_wildcard() => None,
            ty => {
                self.report(CheckError::NotCallable {
                    callee: callee.to_string(),
                    ty: ty.to_string(),
                    span: *callee.span(),
                });
                None
            }
        }
    }

    /// Name of the package an expression refers to, if it is one.
    fn package_name(&mut self, object: &Expression) -> Option<String> {
        let Expression::Identifier(id) = object else {
            return None;
        };
        let is_package = self
            .scopes
            .resolve(&id.name)
            .is_some_and(|s| s.kind == SymbolKind::Package);
        if is_package {
            self.mark_package_used(&id.name);
            Some(id.name.clone())
        } else {
            None
        }
    }

    /// Member of a package. Members of non-builtin packages are opaque.
    fn package_function(&mut self, package: &str, member: &Identifier) -> Option<FunctionSignature> {
        let signature = package_member(package, &member.name);
        if signature.is_none() && is_builtin_package(package) {
            self.report(CheckError::UnknownPackageMember {
                package: package.to_string(),
                member: member.name.clone(),
                span: member.span,
            });
        }
        signature
    }

    fn infer_member(&mut self, e: &MemberExpression) -> Type {
        if let Some(package) = self.package_name(&e.object) {
            return self
                .package_function(&package, &e.property)
                .map(|sig| sig.to_type())
                .unwrap_or_else(Type::unknown);
        }
        let object = self.infer_type(&e.object);
        self.member_type(&object, &e.property).unwrap_or_else(Type::unknown)
    }

    /// Field or method type on an object type. `None` for wildcards and misses.
    fn member_type(&mut self, object: &Type, property: &Identifier) -> Option<Type> {
        let found = match object {
            ty if ty.is_wildcard() => return None,
            Type::Class(class) => self
                .scopes
                .find_field(class, &property.name)
                .map(|f| f.ty.clone())
                .or_else(|| {
                    self.scopes
                        .find_method(class, &property.name)
                        .map(|m| m.signature.to_type())
                }),
            Type::Interface(iface) => self.scopes.interface_info(iface).and_then(|info| {
                info.methods
                    .iter()
                    .find(|(name, _)| *name == property.name)
                    .map(|(_, sig)| sig.to_type())
            }),
            _ => None,
        };

        if found.is_none() {
            self.report(CheckError::UnknownMember {
                ty: object.to_string(),
                member: property.name.clone(),
                span: property.span,
            });
        }
        found
    }

    fn infer_index(&mut self, e: &IndexExpression) -> Type {
        let object = self.infer_type(&e.object);
        let index = self.infer_type(&e.index);

        let (key, result) = match &object {
            Type::Array(elem) => (Type::int(), (**elem).clone()),
            Type::Map(key, value) => ((**key).clone(), (**value).clone()),
            ty if ty.is_string() => (Type::int(), Type::from_basic_name("byte").unwrap_or_else(Type::int)),
            ty if ty.is_wildcard() => return Type::unknown(),
            ty => {
                self.report(CheckError::NotIndexable {
                    ty: ty.to_string(),
                    span: *e.object.span(),
                });
                return Type::unknown();
            }
        };

        if !self.assignable(&key, &index) {
            self.report(CheckError::InvalidIndex {
                expected: key.to_string(),
                actual: index.to_string(),
                span: *e.index.span(),
            });
        }
        result
    }

    // ========================================================================
    // Literals, new, templates
    // ========================================================================

    fn common_type(&mut self, elements: &[Expression]) -> Type {
        let refs: Vec<&Expression> = elements.iter().collect();
        self.common_type_of(&refs)
    }

    /// Type shared by all elements; the first element decides.
    fn common_type_of(&mut self, elements: &[&Expression]) -> Type {
        let mut common: Option<Type> = None;
        for element in elements {
            let ty = self.infer_type(element);
            match &common {
                None => common = Some(ty),
                Some(expected) if expected.is_wildcard() => common = Some(ty),
                Some(expected) => {
                    if !ty.is_wildcard() && !expected.equals(&ty) {
                        self.report(CheckError::MixedElements {
                            expected: expected.to_string(),
                            actual: ty.to_string(),
                            span: *element.span(),
                        });
                    }
                }
            }
        }
        common.unwrap_or_else(Type::unknown)
    }

    fn infer_new(&mut self, e: &NewExpression) -> Type {
        let (name, span) = match &e.class {
            TypeExpr::Generic { name, args, .. } => {
                for arg in args {
                    self.resolve_type(arg);
                }
                (name.name.clone(), name.span)
            }
            other => {
                let id = other.base();
                match id {
                    TypeExpr::Named(id) => (id.name.clone(), id.span),
                    written => {
                        self.report(CheckError::NotAClass {
                            name: written.to_string(),
                            span: *written.span(),
                        });
                        return Type::unknown();
                    }
                }
            }
        };

        let Some(symbol) = self.scopes.resolve(&name) else {
            self.report(CheckError::UndefinedType { name, span });
            for arg in &e.arguments {
                self.infer_value(arg);
            }
            return Type::unknown();
        };

        let is_class = symbol.kind == SymbolKind::Class
            || symbol.template.as_ref().is_some_and(|t| t.class.is_some());
        if !is_class {
            self.report(CheckError::NotAClass { name, span });
            return Type::unknown();
        }

        let constructor = self
            .scopes
            .find_method(&name, "constructor")
            .map(|m| m.signature.clone());
        match constructor {
            Some(signature) => self.check_arguments(&format!("{}.constructor", name), &signature, &e.arguments, e.span),
            None => {
                for arg in &e.arguments {
                    self.infer_value(arg);
                }
            }
        }
        Type::Class(name)
    }

    /// Resolve `Name<T, ...>` to a specialised signature or class name.
    fn instantiate(&mut self, e: &TemplateInstanceExpression) -> Option<Instance> {
        let args: Vec<Type> = e.type_args.iter().map(|t| self.resolve_type(t)).collect();
        let name = &e.template;

        let Some(symbol) = self.scopes.resolve(&name.name) else {
            self.report(CheckError::UndefinedIdentifier {
                name: name.name.clone(),
                span: name.span,
            });
            return None;
        };
        let Some(info) = symbol.template.clone() else {
            self.report(CheckError::NotATemplate {
                name: name.name.clone(),
                span: name.span,
            });
            return None;
        };

        if info.params.len() != args.len() {
            self.report(CheckError::TypeArgumentCount {
                name: name.name.clone(),
                expected: info.params.len(),
                actual: args.len(),
                span: e.span,
            });
            return None;
        }

        let bindings: Vec<(String, Type)> = info.params.iter().cloned().zip(args).collect();
        tracing::trace!(template = %name, args = bindings.len(), "instantiated template");
        match (info.signature, info.class) {
            (Some(sig), _) => Some(Instance::Function(sig.substitute(&bindings))),
            (None, Some(_)) => Some(Instance::Class(name.name.clone())),
            (None, None) => None,
        }
    }
}

/// A specialised template
enum Instance {
    Function(FunctionSignature),
    Class(String),
}

fn pick_known(left: &Type, right: &Type) -> Type {
    if left.is_wildcard() {
        right.clone()
    } else {
        left.clone()
    }
}

#[cfg(test)]
mod tests {
    use crate::analyzer::Analyzer;
    use gominus_parser::parse;

    fn errors(source: &str) -> Vec<String> {
        let (program, parse_errors) = parse(source);
        assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);
        let mut analyzer = Analyzer::new();
        analyzer.analyze(&program);
        analyzer.errors()
    }

    #[test]
    fn test_arithmetic_promotion() {
        assert!(errors("var a float = 1 + 2.5").is_empty());
        assert_eq!(errors("var a int = 1 + 2.5").len(), 1);
        assert!(errors("var s string = \"a\" + \"b\"").is_empty());
    }

    #[test]
    fn test_invalid_operands() {
        let errs = errors("var a = true + 1");
        assert_eq!(errs, vec!["line 1, col 9: invalid operation: bool + int"]);
    }

    #[test]
    fn test_logical_requires_bool() {
        assert_eq!(errors("var a = 1 && true").len(), 1);
    }

    #[test]
    fn test_condition_must_be_bool() {
        let errs = errors("func f() { if 1 { } }");
        assert_eq!(errs, vec!["line 1, col 15: condition must be bool, got int"]);
    }

    #[test]
    fn test_call_checks() {
        let source = "func add(a int, b int) int { return a + b }
            var x = add(1)
            var y = add(1, \"two\")";
        let errs = errors(source);
        assert_eq!(errs.len(), 2, "got: {:?}", errs);
        assert!(errs[0].contains("wrong number of arguments to add: expected 2, got 1"));
        assert!(errs[1].contains("argument 2 to add: expected int, got string"));
    }

    #[test]
    fn test_variadic_minimum() {
        assert!(errors("func main() { fmt.Printf(\"%d\", 1, 2); println() }").is_empty());
        let errs = errors("func main() { os.Exit() }");
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn test_package_member_miss() {
        let errs = errors("func main() { fmt.Nope(1) }");
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("undefined: fmt.Nope"));
    }

    #[test]
    fn test_class_members_through_parent() {
        let source = "
            class A { var x int func get() int { return this.x } }
            class B extends A { func twice() int { return this.get() * 2 } }
            func main() { var b = new B(); var n int = b.x + b.twice(); b.y = 1 }
        ";
        let errs = errors(source);
        assert_eq!(errs.len(), 1, "got: {:?}", errs);
        assert!(errs[0].contains("B has no field or method y"));
    }

    #[test]
    fn test_void_call_has_no_value() {
        let errs = errors("func g() { } func main() { x := g(); var y = g() }");
        assert_eq!(errs.len(), 2, "got: {:?}", errs);
        assert!(errs[0].ends_with("g() (no value) used as value"), "got: {:?}", errs);

        let errs = errors("func g() { } func h(n int) { } func main() { println(1, g()); h(g()) }");
        assert_eq!(errs.len(), 2, "got: {:?}", errs);
        assert!(errs.iter().all(|e| e.ends_with("g() (no value) used as value")), "got: {:?}", errs);

        assert!(errors("func g() { } func main() { g() }").is_empty());
    }

    #[test]
    fn test_template_call_without_type_arguments() {
        assert!(errors("template<T> func id(x T) T { return x } func main() { n := id(3) }").is_empty());
    }

    #[test]
    fn test_subclass_assignable_to_parent() {
        let source = "class A { } class B extends A { } var a A = new B()";
        assert!(errors(source).is_empty());
        assert_eq!(errors("class A { } class B { } var a A = new B()").len(), 1);
    }

    #[test]
    fn test_this_outside_class() {
        let errs = errors("func f() { var t = this }");
        assert!(errs[0].contains("this used outside a class"));
    }

    #[test]
    fn test_new_requires_class() {
        let errs = errors("interface I { } var i = new I()");
        assert!(errs[0].contains("I is not a class"), "got: {:?}", errs);
    }

    #[test]
    fn test_constructor_arguments() {
        let source = "class P { var x int func constructor(x int) { this.x = x } } var p = new P(1, 2)";
        let errs = errors(source);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("P.constructor"));
    }

    #[test]
    fn test_array_elements_share_type() {
        let errs = errors("var a = [1, 2, \"x\"]");
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("array elements must share a type"));
    }

    #[test]
    fn test_index_types() {
        assert!(errors("var a = [1, 2]; var n int = a[0]").is_empty());
        assert_eq!(errors("var a = [1, 2]; var n = a[\"k\"]").len(), 1);
        assert!(errors("var m = {\"a\": 1}; var n int = m[\"a\"]").is_empty());
    }

    #[test]
    fn test_constant_assignment() {
        let errs = errors("const k = 1; func f() { k = 2 }");
        assert!(errs[0].contains("cannot assign to constant k"));
    }

    #[test]
    fn test_define_shadows_without_error() {
        assert!(errors("func f() { x := 1; x := \"s\"; var y string = x }").is_empty());
    }
}
