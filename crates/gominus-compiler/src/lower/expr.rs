//! Expression Lowering
//!
//! Every expression lowers to an [`Operand`]: an IR value plus the semantic
//! type it carries. Assignable expressions also lower to a [`Place`], the
//! address they live at.

use super::{is_unresolved, storage_type, FunctionSource, IrGenerator, Operand};
use crate::error::IrGenError;
use crate::ir::{BinaryOp, Callee, CastOp, ComparePred, IrInstr, IrType, IrValue, Terminator};
use gominus_checker::{BasicKind, Type};
use gominus_parser::ast::{
    ArrayLiteral, AssignExpression, AssignOperator, Expression, FunctionLiteral, HashLiteral, Identifier,
    InfixExpression, InfixOperator, PostfixExpression, PostfixOperator, PrefixExpression, PrefixOperator,
    TemplateInstanceExpression,
};
use gominus_parser::Span;

pub(super) const STRING_CONCAT: &str = "gominus_string_concat";
pub(super) const MAP_NEW: &str = "gominus_map_new";
pub(super) const MAP_SLOT: &str = "gominus_map_slot";
pub(super) const MAP_LEN: &str = "gominus_map_len";

/// Bytes in front of array data holding the `i64` length
const ARRAY_HEADER: i64 = 8;

/// An assignable location
#[derive(Debug, Clone)]
pub(super) struct Place {
    pub ptr: IrValue,
    pub ty: Type,
    pub ir: IrType,
}

impl<'a> IrGenerator<'a> {
    pub(super) fn lower_expr(&mut self, expr: &'a Expression) -> Operand {
        match expr {
            Expression::IntegerLiteral(lit) => match i32::try_from(lit.value) {
                Ok(_) => Operand::new(IrValue::i32(lit.value), Type::int()),
                Err(_) => Operand::new(IrValue::i64(lit.value), Type::basic("int64", BasicKind::Int)),
            },
            Expression::FloatLiteral(lit) => Operand::new(
                IrValue::Float {
                    value: lit.value,
                    ty: IrType::Double,
                },
                Type::float(),
            ),
            Expression::StringLiteral(lit) => {
                let name = self.module.add_string(&unescape(&lit.value));
                Operand::new(IrValue::Global(name), Type::string())
            }
            Expression::CharLiteral(lit) => Operand::new(IrValue::i32(char_code(&lit.value)), Type::char()),
            Expression::BooleanLiteral(lit) => Operand::new(IrValue::Bool(lit.value), Type::bool()),
            Expression::NullLiteral(_) => Operand::new(IrValue::Null, Type::null()),
            Expression::Identifier(id) => self.lower_identifier(id),
            Expression::Prefix(prefix) => self.lower_prefix(prefix),
            Expression::Infix(infix) if infix.operator.is_logical() => self.lower_logical(infix),
            Expression::Infix(infix) => {
                let left = self.lower_expr(&infix.left);
                let right = self.lower_expr(&infix.right);
                self.binary(infix.operator, left, right)
            }
            Expression::Postfix(postfix) => self.lower_postfix(postfix),
            Expression::Assign(assign) => self.lower_assign(assign),
            Expression::Call(call) => self.lower_call(call),
            Expression::Index(index) => {
                let object = self.lower_expr(&index.object);
                let key = self.lower_expr(&index.index);
                let place = self.element_place(object, key);
                let value = self.load(place.ptr, place.ir);
                Operand::new(value, place.ty)
            }
            Expression::Member(member) => {
                if let Expression::Identifier(object) = member.object.as_ref() {
                    if self.is_package(&object.name) {
                        self.error(IrGenError::UnknownMember {
                            class: object.name.clone(),
                            member: member.property.name.clone(),
                            span: member.property.span,
                        });
                        return Operand::undef();
                    }
                }
                let object = self.lower_expr(&member.object);
                match self.field_place(object, &member.property) {
                    Some(place) => {
                        let value = self.load(place.ptr, place.ir);
                        Operand::new(value, place.ty)
                    }
                    None => Operand::undef(),
                }
            }
            Expression::ArrayLiteral(array) => self.lower_array_literal(array),
            Expression::HashLiteral(hash) => self.lower_hash_literal(hash),
            Expression::FunctionLiteral(func) => self.lower_lambda(func),
            Expression::New(new) => self.lower_new(new),
            Expression::This(span) => self.lower_this(*span),
            Expression::Super(span) => {
                // `super` as a value is `this` seen as the parent class
                let this = self.lower_this(*span);
                let parent = match &this.ty {
                    Type::Class(class) => self.classes.get(class).and_then(|layout| layout.parent.clone()),
                    _ => None,
                };
                match parent {
                    Some(parent) => Operand::new(this.value, Type::Class(parent)),
                    None => this,
                }
            }
            Expression::TemplateInstance(instance) => self.lower_template_value(instance),
        }
    }

    fn lower_identifier(&mut self, id: &Identifier) -> Operand {
        if let Some(binding) = self.lookup(&id.name) {
            let value = self.load(binding.ptr, binding.ir);
            return Operand::new(value, binding.ty);
        }
        if let Some(place) = self.implicit_field(&id.name) {
            let value = self.load(place.ptr, place.ir);
            return Operand::new(value, place.ty);
        }
        if let Some(info) = self.functions.get(&id.name) {
            return Operand::new(IrValue::Global(id.name.clone()), info.to_type());
        }
        self.error(IrGenError::UndefinedVariable {
            name: id.name.clone(),
            span: id.span,
        });
        Operand::undef()
    }

    fn lower_this(&mut self, span: Span) -> Operand {
        match self.state.this.clone() {
            Some((this, class)) => Operand::new(this, Type::Class(class)),
            None => {
                self.error(IrGenError::UndefinedVariable {
                    name: "this".to_string(),
                    span,
                });
                Operand::undef()
            }
        }
    }

    /// A name that denotes a package rather than a value.
    pub(super) fn is_package(&self, name: &str) -> bool {
        self.lookup(name).is_none()
            && !self.functions.contains_key(name)
            && !self.classes.contains_key(name)
            && self.implicit_field_type(name).is_none()
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn lower_prefix(&mut self, prefix: &'a PrefixExpression) -> Operand {
        let operand = self.lower_expr(&prefix.right);
        match prefix.operator {
            PrefixOperator::Not => {
                let cond = self.truthy(operand.value);
                if let IrValue::Bool(b) = cond {
                    return Operand::new(IrValue::Bool(!b), Type::bool());
                }
                let value = self.emit_binary(BinaryOp::Xor, cond, IrValue::Bool(true));
                Operand::new(value, Type::bool())
            }
            PrefixOperator::Negate => {
                let value = match operand.value {
                    IrValue::Int { value, ty } => IrValue::Int { value: -value, ty },
                    IrValue::Float { value, ty } => IrValue::Float { value: -value, ty },
                    other => {
                        let zero = IrValue::zero(&other.ty());
                        self.emit_binary(BinaryOp::Sub, zero, other)
                    }
                };
                Operand::new(value, operand.ty)
            }
            PrefixOperator::BitNot => {
                let ty = operand.ir();
                let value = self.emit_binary(BinaryOp::Xor, operand.value, IrValue::Int { value: -1, ty });
                Operand::new(value, operand.ty)
            }
        }
    }

    /// `&&` and `||` evaluate the right side only when needed; the result
    /// merges through a phi.
    fn lower_logical(&mut self, infix: &'a InfixExpression) -> Operand {
        let is_and = infix.operator == InfixOperator::And;
        let left = self.lower_condition(&infix.left);
        let left_end = self.state.block;

        let rhs = self.alloc_block();
        let merge = self.alloc_block();
        let (then_block, else_block) = if is_and { (rhs, merge) } else { (merge, rhs) };
        self.set_terminator(Terminator::Branch {
            cond: left,
            then_block,
            else_block,
        });

        self.start_block(rhs, if is_and { "and.rhs" } else { "or.rhs" });
        let right = self.lower_condition(&infix.right);
        let right_end = self.state.block;
        self.jump_if_open(merge);

        self.start_block(merge, "logic.merge");
        let dest = self.alloc_register(IrType::I1);
        self.emit(IrInstr::Phi {
            dest: dest.clone(),
            incoming: vec![(IrValue::Bool(!is_and), left_end), (right, right_end)],
        });
        Operand::new(dest.into(), Type::bool())
    }

    /// Arithmetic, bitwise and comparison operators on lowered operands.
    pub(super) fn binary(&mut self, op: InfixOperator, left: Operand, right: Operand) -> Operand {
        if op.is_comparison() {
            let value = self.compare(op, left, right);
            return Operand::new(value, Type::bool());
        }
        if op.is_logical() {
            // Compound assignment path; both sides are already evaluated
            let l = self.truthy(left.value);
            let r = self.truthy(right.value);
            let bin = if op == InfixOperator::And { BinaryOp::And } else { BinaryOp::Or };
            let value = self.emit_binary(bin, l, r);
            return Operand::new(value, Type::bool());
        }
        if op == InfixOperator::Add && (left.ty.is_string() || right.ty.is_string()) {
            return self.concat(left, right);
        }

        let bin = match op {
            InfixOperator::Add => BinaryOp::Add,
            InfixOperator::Subtract => BinaryOp::Sub,
            InfixOperator::Multiply => BinaryOp::Mul,
            InfixOperator::Divide => BinaryOp::Div,
            InfixOperator::Modulo => BinaryOp::Rem,
            InfixOperator::BitAnd => BinaryOp::And,
            InfixOperator::BitOr => BinaryOp::Or,
            InfixOperator::BitXor => BinaryOp::Xor,
            InfixOperator::LeftShift => BinaryOp::Shl,
            _ => BinaryOp::Shr,
        };
        let (l, r, ty) = self.unify(left, right);
        let value = self.emit_binary(bin, l, r);
        Operand::new(value, ty)
    }

    /// Compare two operands; strings compare by content.
    pub(super) fn compare(&mut self, op: InfixOperator, left: Operand, right: Operand) -> IrValue {
        let pred = match op {
            InfixOperator::NotEqual => ComparePred::Ne,
            InfixOperator::Less => ComparePred::Lt,
            InfixOperator::Greater => ComparePred::Gt,
            InfixOperator::LessEqual => ComparePred::Le,
            InfixOperator::GreaterEqual => ComparePred::Ge,
            _ => ComparePred::Eq,
        };

        let (l, r) = if left.ty.is_string() && right.ty.is_string() {
            self.module.declare("strcmp", IrType::I32, vec![IrType::Ptr, IrType::Ptr], false);
            let order = self
                .call(
                    IrType::I32,
                    Callee::Direct("strcmp".to_string()),
                    vec![left.value, right.value],
                    None,
                )
                .unwrap_or_else(|| IrValue::i32(0));
            (order, IrValue::i32(0))
        } else {
            let (l, r, _) = self.unify(left, right);
            (l, r)
        };

        let dest = self.alloc_register(IrType::I1);
        self.emit(IrInstr::Compare {
            dest: dest.clone(),
            pred,
            left: l,
            right: r,
        });
        dest.into()
    }

    fn concat(&mut self, left: Operand, right: Operand) -> Operand {
        self.module
            .declare(STRING_CONCAT, IrType::Ptr, vec![IrType::Ptr, IrType::Ptr], false);
        let value = self
            .call(
                IrType::Ptr,
                Callee::Direct(STRING_CONCAT.to_string()),
                vec![left.value, right.value],
                None,
            )
            .unwrap_or(IrValue::Null);
        Operand::new(value, Type::string())
    }

    /// Bring two operands to a common IR type: the float side wins, then
    /// the wider integer.
    fn unify(&mut self, left: Operand, right: Operand) -> (IrValue, IrValue, Type) {
        let (lt, rt) = (left.ir(), right.ir());
        if lt == rt {
            let ty = if is_unresolved(&left.ty) { right.ty } else { left.ty };
            return (left.value, right.value, ty);
        }

        let target = if lt.is_float() || rt.is_float() {
            if lt == IrType::Double || rt == IrType::Double {
                IrType::Double
            } else {
                IrType::Float
            }
        } else if lt.is_integer() && rt.is_integer() {
            if lt.bits() >= rt.bits() {
                lt.clone()
            } else {
                rt.clone()
            }
        } else if lt == IrType::Ptr || rt == IrType::Ptr {
            IrType::Ptr
        } else {
            lt.clone()
        };

        let ty = if lt == target { left.ty } else { right.ty };
        let l = self.convert(left.value, &target);
        let r = self.convert(right.value, &target);
        (l, r, ty)
    }

    fn emit_binary(&mut self, op: BinaryOp, left: IrValue, right: IrValue) -> IrValue {
        let dest = self.alloc_register(left.ty());
        self.emit(IrInstr::Binary {
            dest: dest.clone(),
            op,
            left,
            right,
        });
        dest.into()
    }

    fn lower_postfix(&mut self, postfix: &'a PostfixExpression) -> Operand {
        let Some(place) = self.lower_place(&postfix.operand) else {
            return Operand::undef();
        };
        let old = self.load(place.ptr.clone(), place.ir.clone());
        let one = if place.ir.is_float() {
            IrValue::Float {
                value: 1.0,
                ty: place.ir.clone(),
            }
        } else {
            IrValue::Int {
                value: 1,
                ty: place.ir.clone(),
            }
        };
        let op = match postfix.operator {
            PostfixOperator::Increment => BinaryOp::Add,
            PostfixOperator::Decrement => BinaryOp::Sub,
        };
        let new = self.emit_binary(op, old.clone(), one);
        self.store(new, place.ptr);
        Operand::new(old, place.ty)
    }

    fn lower_assign(&mut self, assign: &'a AssignExpression) -> Operand {
        match assign.operator {
            AssignOperator::Define => {
                let value = self.lower_expr(&assign.value);
                let Expression::Identifier(id) = assign.target.as_ref() else {
                    self.error(IrGenError::InvalidAssignTarget {
                        target: assign.target.to_string(),
                        span: *assign.target.span(),
                    });
                    return value;
                };
                let binding = self.define_local(&id.name, None, Some(value));
                let value = self.load(binding.ptr, binding.ir);
                Operand::new(value, binding.ty)
            }
            AssignOperator::Assign => {
                let value = self.lower_expr(&assign.value);
                let Some(place) = self.lower_place(&assign.target) else {
                    return value;
                };
                let value = self.convert(value.value, &place.ir);
                self.store(value.clone(), place.ptr);
                Operand::new(value, place.ty)
            }
            AssignOperator::Compound(op) => {
                let Some(place) = self.lower_place(&assign.target) else {
                    return Operand::undef();
                };
                let current = self.load(place.ptr.clone(), place.ir.clone());
                let rhs = self.lower_expr(&assign.value);
                let result = self.binary(op, Operand::new(current, place.ty.clone()), rhs);
                let value = self.convert(result.value, &place.ir);
                self.store(value.clone(), place.ptr);
                Operand::new(value, place.ty)
            }
        }
    }

    // ========================================================================
    // Places
    // ========================================================================

    pub(super) fn lower_place(&mut self, expr: &'a Expression) -> Option<Place> {
        match expr {
            Expression::Identifier(id) => {
                if let Some(binding) = self.lookup(&id.name) {
                    return Some(Place {
                        ptr: binding.ptr,
                        ty: binding.ty,
                        ir: binding.ir,
                    });
                }
                if let Some(place) = self.implicit_field(&id.name) {
                    return Some(place);
                }
                self.error(IrGenError::UndefinedVariable {
                    name: id.name.clone(),
                    span: id.span,
                });
                None
            }
            Expression::Member(member) => {
                let object = self.lower_expr(&member.object);
                self.field_place(object, &member.property)
            }
            Expression::Index(index) => {
                let object = self.lower_expr(&index.object);
                let key = self.lower_expr(&index.index);
                Some(self.element_place(object, key))
            }
            other => {
                self.error(IrGenError::InvalidAssignTarget {
                    target: other.to_string(),
                    span: *other.span(),
                });
                None
            }
        }
    }

    /// Address of `object[index]` for arrays, maps and strings.
    fn element_place(&mut self, object: Operand, index: Operand) -> Place {
        match object.ty {
            Type::Map(key, value) => {
                let key_ir = storage_type(&key);
                let key_value = self.convert(index.value, &key_ir);
                let key_slot = self.alloca(key_ir);
                self.store(key_value, key_slot.clone());

                self.module
                    .declare(MAP_SLOT, IrType::Ptr, vec![IrType::Ptr, IrType::Ptr], false);
                let ptr = self
                    .call(
                        IrType::Ptr,
                        Callee::Direct(MAP_SLOT.to_string()),
                        vec![object.value, key_slot],
                        None,
                    )
                    .unwrap_or(IrValue::Null);
                let ir = storage_type(&value);
                Place { ptr, ty: *value, ir }
            }
            ty if ty.is_string() => {
                let ptr = self.gep(IrType::I8, object.value, vec![index.value]);
                Place {
                    ptr,
                    ty: Type::basic("byte", BasicKind::Int),
                    ir: IrType::I8,
                }
            }
            Type::Array(element) => {
                let ir = storage_type(&element);
                let ptr = self.array_element(object.value, ir.clone(), index.value);
                Place { ptr, ty: *element, ir }
            }
            _ => {
                let ptr = self.array_element(object.value, IrType::I32, index.value);
                Place {
                    ptr,
                    ty: Type::unknown(),
                    ir: IrType::I32,
                }
            }
        }
    }

    pub(super) fn gep(&mut self, base: IrType, ptr: IrValue, indices: Vec<IrValue>) -> IrValue {
        let dest = self.alloc_register(IrType::Ptr);
        self.emit(IrInstr::GetElementPtr {
            dest: dest.clone(),
            base,
            ptr,
            indices,
        });
        dest.into()
    }

    fn array_element(&mut self, array: IrValue, element: IrType, index: IrValue) -> IrValue {
        let data = self.gep(IrType::I8, array, vec![IrValue::i64(ARRAY_HEADER)]);
        self.gep(element, data, vec![index])
    }

    /// Length of an array: the `i64` header, truncated.
    pub(super) fn array_length(&mut self, array: IrValue) -> IrValue {
        let len = self.load(array, IrType::I64);
        self.cast(CastOp::Trunc, len, IrType::I32)
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn lower_array_literal(&mut self, array: &'a ArrayLiteral) -> Operand {
        let elements: Vec<Operand> = array.elements.iter().map(|e| self.lower_expr(e)).collect();
        let element_ty = elements
            .iter()
            .map(|e| e.ty.clone())
            .find(|ty| !is_unresolved(ty))
            .unwrap_or_else(Type::unknown);
        let ir = storage_type(&element_ty);

        let size = ARRAY_HEADER + (elements.len() as i64) * i64::from(ir.bits().max(8) / 8);
        let array_ptr = self.malloc(IrValue::i64(size));
        self.store(IrValue::i64(elements.len() as i64), array_ptr.clone());

        for (i, element) in elements.into_iter().enumerate() {
            let value = self.convert(element.value, &ir);
            let slot = self.array_element(array_ptr.clone(), ir.clone(), IrValue::i32(i as i64));
            self.store(value, slot);
        }
        Operand::new(array_ptr, Type::Array(Box::new(element_ty)))
    }

    fn lower_hash_literal(&mut self, hash: &'a HashLiteral) -> Operand {
        let pairs: Vec<(Operand, Operand)> = hash
            .pairs
            .iter()
            .map(|(k, v)| (self.lower_expr(k), self.lower_expr(v)))
            .collect();
        let key_ty = pairs.first().map(|(k, _)| k.ty.clone()).unwrap_or_else(Type::unknown);
        let value_ty = pairs.first().map(|(_, v)| v.ty.clone()).unwrap_or_else(Type::unknown);
        let key_size = i64::from(storage_type(&key_ty).bits().max(8) / 8);
        let value_size = i64::from(storage_type(&value_ty).bits().max(8) / 8);

        self.module
            .declare(MAP_NEW, IrType::Ptr, vec![IrType::I64, IrType::I64], false);
        let map = self
            .call(
                IrType::Ptr,
                Callee::Direct(MAP_NEW.to_string()),
                vec![IrValue::i64(key_size), IrValue::i64(value_size)],
                None,
            )
            .unwrap_or(IrValue::Null);
        let map = Operand::new(map, Type::Map(Box::new(key_ty), Box::new(value_ty)));

        for (key, value) in pairs {
            let place = self.element_place(map.clone(), key);
            let value = self.convert(value.value, &place.ir);
            self.store(value, place.ptr);
        }
        map
    }

    /// Function literals become module-level `__lambda_N` functions. They
    /// capture nothing.
    fn lower_lambda(&mut self, func: &'a FunctionLiteral) -> Operand {
        let symbol = format!("__lambda_{}", self.lambda_count);
        self.lambda_count += 1;

        let info = self.function_info(&func.params, func.return_type.as_ref());
        let ty = info.to_type();
        self.functions.insert(symbol.clone(), info.clone());

        let bindings = self.type_bindings.clone();
        self.with_nested(bindings, |gen| {
            gen.lower_function(FunctionSource {
                symbol: symbol.clone(),
                params: &func.params,
                info,
                body: &func.body,
                span: func.span,
                this_class: None,
                receiver: None,
            })
        });
        Operand::new(IrValue::Global(symbol), ty)
    }

    fn lower_template_value(&mut self, instance: &'a TemplateInstanceExpression) -> Operand {
        let args = instance.type_args.iter().map(|arg| self.resolve_type(arg)).collect();
        let Some(symbol) = self.instantiate(&instance.template, args) else {
            return Operand::undef();
        };
        match self.functions.get(&symbol) {
            Some(info) => Operand::new(IrValue::Global(symbol), info.to_type()),
            None => Operand::new(IrValue::Global(symbol), Type::unknown()),
        }
    }

    pub(super) fn malloc(&mut self, size: IrValue) -> IrValue {
        self.module.declare("malloc", IrType::Ptr, vec![IrType::I64], false);
        self.call(
            IrType::Ptr,
            Callee::Direct("malloc".to_string()),
            vec![size],
            None,
        )
        .unwrap_or(IrValue::Null)
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// Lower an expression used as a branch condition to `i1`.
    pub(super) fn lower_condition(&mut self, expr: &'a Expression) -> IrValue {
        let operand = self.lower_expr(expr);
        self.truthy(operand.value)
    }

    /// Nonzero (or non-null) test.
    pub(super) fn truthy(&mut self, value: IrValue) -> IrValue {
        let ty = value.ty();
        match &value {
            _ if ty == IrType::I1 => return value,
            IrValue::Int { value, .. } => return IrValue::Bool(*value != 0),
            IrValue::Null => return IrValue::Bool(false),
            _ => {}
        }
        let zero = IrValue::zero(&ty);
        let dest = self.alloc_register(IrType::I1);
        self.emit(IrInstr::Compare {
            dest: dest.clone(),
            pred: ComparePred::Ne,
            left: value,
            right: zero,
        });
        dest.into()
    }

    /// Convert a value to another IR type. Constants fold; pointers only
    /// convert to integers through an explicit cast.
    pub(super) fn convert(&mut self, value: IrValue, to: &IrType) -> IrValue {
        let from = value.ty();
        if from == *to || to.is_void() {
            return value;
        }
        if *to == IrType::I1 && from.is_integer() {
            return self.truthy(value);
        }

        match (&value, to) {
            (IrValue::Int { value, .. }, t) if t.is_integer() => {
                return IrValue::Int {
                    value: *value,
                    ty: t.clone(),
                }
            }
            (IrValue::Int { value, .. }, t) if t.is_float() => {
                return IrValue::Float {
                    value: *value as f64,
                    ty: t.clone(),
                }
            }
            (IrValue::Int { value: 0, .. }, IrType::Ptr) | (IrValue::Null, IrType::Ptr) => return IrValue::Null,
            (IrValue::Float { value, .. }, t) if t.is_float() => {
                return IrValue::Float {
                    value: *value,
                    ty: t.clone(),
                }
            }
            (IrValue::Float { value, .. }, t) if t.is_integer() => {
                return IrValue::Int {
                    value: *value as i64,
                    ty: t.clone(),
                }
            }
            (IrValue::Bool(b), t) if t.is_integer() => {
                return IrValue::Int {
                    value: i64::from(*b),
                    ty: t.clone(),
                }
            }
            (IrValue::Undef(_), t) => return IrValue::Undef(t.clone()),
            _ => {}
        }

        let op = match (&from, to) {
            (f, t) if f.is_integer() && t.is_integer() => {
                if f.bits() > t.bits() {
                    CastOp::Trunc
                } else if *f == IrType::I1 {
                    CastOp::ZExt
                } else {
                    CastOp::SExt
                }
            }
            (f, t) if f.is_integer() && t.is_float() => CastOp::SIToFP,
            (f, t) if f.is_float() && t.is_integer() => CastOp::FPToSI,
            (IrType::Float, IrType::Double) => CastOp::FPExt,
            (IrType::Double, IrType::Float) => CastOp::FPTrunc,
            _ => return value,
        };
        self.cast(op, value, to.clone())
    }

    pub(super) fn cast(&mut self, op: CastOp, value: IrValue, to: IrType) -> IrValue {
        let dest = self.alloc_register(to);
        self.emit(IrInstr::Cast {
            dest: dest.clone(),
            op,
            value,
        });
        dest.into()
    }

    /// C default argument promotion for variadic calls.
    pub(super) fn promote_vararg(&mut self, operand: Operand) -> IrValue {
        match operand.ir() {
            IrType::I1 | IrType::I8 | IrType::I16 => self.convert(operand.value, &IrType::I32),
            IrType::Float => self.convert(operand.value, &IrType::Double),
            _ => operand.value,
        }
    }
}

/// Interpret the escapes of a raw string or char literal body.
pub(crate) fn unescape(raw: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some('r') => bytes.push(b'\r'),
            Some('0') => bytes.push(0),
            Some('\\') => bytes.push(b'\\'),
            Some('"') => bytes.push(b'"'),
            Some('\'') => bytes.push(b'\''),
            Some(other) => {
                bytes.push(b'\\');
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => bytes.push(b'\\'),
        }
    }
    bytes
}

/// Code point of a char literal body.
pub(crate) fn char_code(raw: &str) -> i64 {
    let mut chars = raw.chars();
    match chars.next() {
        Some('\\') => unescape(raw).first().copied().map(i64::from).unwrap_or(0),
        Some(c) => i64::from(u32::from(c)),
        None => 0,
    }
}
