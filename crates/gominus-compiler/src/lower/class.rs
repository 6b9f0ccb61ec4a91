//! Class Lowering
//!
//! A class `C` becomes `%C = type { ptr, <parent fields>, <own fields> }`
//! with the vtable pointer in slot 0, a global `@C_vtable` and one function
//! `C_m(ptr this, ...)` per method. Overrides take over the parent's vtable
//! slot; new virtual methods append a slot.

use super::expr::Place;
use super::{literal_type, storage_type, FunctionInfo, FunctionSource, IrGenerator, Operand};
use crate::error::IrGenError;
use crate::ir::{CastOp, IrGlobal, IrType, IrValue};
use gominus_checker::Type;
use gominus_parser::ast::{ClassStatement, Expression, FunctionStatement, Identifier, MethodStatement, NewExpression};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub(super) struct FieldSlot<'a> {
    pub name: String,
    pub ty: Type,
    pub ir: IrType,
    pub default: Option<&'a Expression>,
}

#[derive(Debug, Clone)]
pub(super) struct MethodEntry {
    pub symbol: String,
    pub params: Vec<Type>,
    pub ret: Type,
    /// Vtable slot of a virtual method
    pub slot: Option<usize>,
    pub is_static: bool,
}

/// Memory layout and dispatch table of one class
#[derive(Debug, Clone)]
pub(super) struct ClassLayout<'a> {
    pub name: String,
    pub parent: Option<String>,
    /// Inherited fields first; struct index is position + 1
    pub fields: Vec<FieldSlot<'a>>,
    pub vtable: Vec<String>,
    /// Every callable method, inherited ones included
    pub methods: FxHashMap<String, MethodEntry>,
}

impl<'a> ClassLayout<'a> {
    /// Struct index and slot of a field; own fields shadow inherited ones.
    pub fn field_slot(&self, name: &str) -> Option<(usize, &FieldSlot<'a>)> {
        self.fields
            .iter()
            .rposition(|field| field.name == name)
            .map(|i| (i + 1, &self.fields[i]))
    }
}

impl<'a> IrGenerator<'a> {
    /// Lay out every declared class, parents before children.
    pub(super) fn layout_classes(&mut self) {
        for name in self.class_order.clone() {
            self.layout_class(&name, &mut Vec::new());
        }
    }

    /// Returns whether `name` has a layout afterwards.
    pub(super) fn layout_class(&mut self, name: &str, visiting: &mut Vec<String>) -> bool {
        if self.classes.contains_key(name) {
            return true;
        }
        let Some(decl) = self.class_decls.get(name).copied() else {
            return false;
        };
        if visiting.iter().any(|v| v == name) {
            self.error(IrGenError::CyclicClass {
                name: name.to_string(),
                span: decl.name.span,
            });
            return false;
        }

        visiting.push(name.to_string());
        let parent = match &decl.extends {
            Some(parent) if self.layout_class(&parent.name, visiting) => Some(parent.name.clone()),
            Some(parent) if self.class_decls.contains_key(&parent.name) => {
                visiting.pop();
                return false;
            }
            // Unknown parents are reported by the analyzer
            _ => None,
        };
        visiting.pop();

        let layout = self.build_layout(name, decl, parent);
        self.emit_layout(layout);
        true
    }

    /// Layout of `decl` under the name `layout_name`, resolving member types
    /// under the current type bindings.
    pub(super) fn build_layout(
        &mut self,
        layout_name: &str,
        decl: &'a ClassStatement,
        parent: Option<String>,
    ) -> ClassLayout<'a> {
        let (mut fields, mut vtable, mut methods) = match parent.as_ref().and_then(|p| self.classes.get(p)) {
            Some(parent) => (parent.fields.clone(), parent.vtable.clone(), parent.methods.clone()),
            None => (Vec::new(), Vec::new(), FxHashMap::default()),
        };
        let scopes = self.scopes;
        let analyzed = scopes.class_info(&decl.name.name);
        let bindings = self.type_bindings.clone();

        for field in decl.fields() {
            let ty = match &field.ty {
                Some(written) => self.resolve_type(written),
                None => analyzed
                    .and_then(|info| info.field(&field.name.name))
                    .map(|info| info.ty.substitute(&bindings))
                    .filter(|ty| !ty.is_unknown())
                    .or_else(|| field.value.as_ref().and_then(literal_type))
                    .unwrap_or_else(Type::unknown),
            };
            let ir = storage_type(&ty);
            fields.push(FieldSlot {
                name: field.name.name.clone(),
                ty,
                ir,
                default: field.value.as_ref(),
            });
        }

        for method in decl.methods() {
            let info = self.function_info(&method.params, method.return_type.as_ref());
            let wants_slot = method.modifiers.is_virtual || method.modifiers.is_override;
            add_method(
                &mut methods,
                &mut vtable,
                layout_name,
                &method.name.name,
                info,
                wants_slot,
                method.modifiers.is_static,
            );
        }
        let receivers = self.receiver_methods.get(&decl.name.name).cloned().unwrap_or_default();
        for method in receivers {
            let info = self.function_info(&method.params, method.return_type.as_ref());
            add_method(&mut methods, &mut vtable, layout_name, &method.name.name, info, false, false);
        }

        ClassLayout {
            name: layout_name.to_string(),
            parent,
            fields,
            vtable,
            methods,
        }
    }

    pub(super) fn emit_layout(&mut self, layout: ClassLayout<'a>) {
        let mut body = Vec::with_capacity(layout.fields.len() + 1);
        body.push(IrType::Ptr);
        body.extend(layout.fields.iter().map(|field| field.ir.clone()));
        self.module.add_struct(layout.name.clone(), body);
        self.module.add_global(IrGlobal::Vtable {
            name: vtable_name(&layout.name),
            entries: layout.vtable.clone(),
        });

        tracing::trace!(
            class = %layout.name,
            fields = layout.fields.len(),
            slots = layout.vtable.len(),
            "laid out class"
        );
        self.classes.insert(layout.name.clone(), layout);
    }

    /// Lower the methods of a laid-out class, including receiver methods
    /// declared outside its body.
    pub(super) fn lower_class_body(&mut self, layout_name: &str, decl: &'a ClassStatement) {
        let Some(methods) = self.classes.get(layout_name).map(|layout| layout.methods.clone()) else {
            return;
        };

        for method in decl.methods() {
            if let Some(entry) = methods.get(&method.name.name) {
                self.lower_method(layout_name, entry, method);
            }
        }
        let receivers = self.receiver_methods.get(&decl.name.name).cloned().unwrap_or_default();
        for method in receivers {
            if let Some(entry) = methods.get(&method.name.name) {
                let receiver = method.receiver.name.name.clone();
                self.lower_receiver_method(layout_name, entry, method, receiver);
            }
        }
    }

    fn lower_method(&mut self, layout_name: &str, entry: &MethodEntry, method: &'a FunctionStatement) {
        self.lower_function(FunctionSource {
            symbol: entry.symbol.clone(),
            params: &method.params,
            info: entry_info(entry),
            body: &method.body,
            span: method.span,
            this_class: (!entry.is_static).then(|| layout_name.to_string()),
            receiver: None,
        });
    }

    fn lower_receiver_method(
        &mut self,
        layout_name: &str,
        entry: &MethodEntry,
        method: &'a MethodStatement,
        receiver: String,
    ) {
        self.lower_function(FunctionSource {
            symbol: entry.symbol.clone(),
            params: &method.params,
            info: entry_info(entry),
            body: &method.body,
            span: method.span,
            this_class: Some(layout_name.to_string()),
            receiver: Some(receiver),
        });
    }

    /// A receiver method whose type is not a class becomes a function
    /// `T_m(ptr this, ...)`. Methods of classes are lowered with the class.
    pub(super) fn lower_detached_method(&mut self, method: &'a MethodStatement) {
        let Some(class) = method.receiver_class() else {
            return;
        };
        if self.class_decls.contains_key(class) || self.templates.contains_key(class) {
            return;
        }

        let info = self.function_info(&method.params, method.return_type.as_ref());
        let symbol = format!("{}_{}", class, method.name.name);
        self.functions.insert(symbol.clone(), info.clone());
        self.lower_function(FunctionSource {
            symbol,
            params: &method.params,
            info,
            body: &method.body,
            span: method.span,
            this_class: Some(class.to_string()),
            receiver: Some(method.receiver.name.name.clone()),
        });
    }

    pub(super) fn find_method(&self, class: &str, method: &str) -> Option<MethodEntry> {
        self.classes.get(class)?.methods.get(method).cloned()
    }

    // ========================================================================
    // Objects
    // ========================================================================

    /// Address of `object.field`.
    pub(super) fn field_place(&mut self, object: Operand, field: &Identifier) -> Option<Place> {
        let class = match &object.ty {
            Type::Class(name) if self.classes.contains_key(name) => name.clone(),
            other => {
                self.error(IrGenError::UnknownMember {
                    class: other.to_string(),
                    member: field.name.clone(),
                    span: field.span,
                });
                return None;
            }
        };
        let slot = self
            .classes
            .get(&class)
            .and_then(|layout| layout.field_slot(&field.name))
            .map(|(index, slot)| (index, slot.ty.clone(), slot.ir.clone()));
        let Some((index, ty, ir)) = slot else {
            self.error(IrGenError::UnknownMember {
                class,
                member: field.name.clone(),
                span: field.span,
            });
            return None;
        };

        let ptr = self.gep(
            IrType::Struct(class),
            object.value,
            vec![IrValue::i32(0), IrValue::i32(index as i64)],
        );
        Some(Place { ptr, ty, ir })
    }

    /// A bare field name inside a method refers to `this.name`.
    pub(super) fn implicit_field(&mut self, name: &str) -> Option<Place> {
        let (this, class) = self.state.this.clone()?;
        let (index, ty, ir) = self
            .classes
            .get(&class)?
            .field_slot(name)
            .map(|(index, slot)| (index, slot.ty.clone(), slot.ir.clone()))?;
        let ptr = self.gep(IrType::Struct(class), this, vec![IrValue::i32(0), IrValue::i32(index as i64)]);
        Some(Place { ptr, ty, ir })
    }

    pub(super) fn implicit_field_type(&self, name: &str) -> Option<Type> {
        let (_, class) = self.state.this.as_ref()?;
        let (_, slot) = self.classes.get(class)?.field_slot(name)?;
        Some(slot.ty.clone())
    }

    /// Function pointer stored in vtable `slot` of an object.
    pub(super) fn load_vtable_slot(&mut self, object: IrValue, class: &str, slot: usize) -> IrValue {
        let vptr = self.gep(
            IrType::Struct(class.to_string()),
            object,
            vec![IrValue::i32(0), IrValue::i32(0)],
        );
        let vtable = self.load(vptr, IrType::Ptr);
        let entry = self.gep(IrType::Ptr, vtable, vec![IrValue::i32(slot as i64)]);
        self.load(entry, IrType::Ptr)
    }

    /// `new C(args)`: allocate, install the vtable, store field defaults and
    /// run the constructor if the class chain has one.
    pub(super) fn lower_new(&mut self, new: &'a NewExpression) -> Operand {
        let class = match self.resolve_type(&new.class) {
            Type::Class(name) if self.classes.contains_key(&name) => name,
            _ => {
                self.error(IrGenError::NotAClass {
                    name: new.class.to_string(),
                    span: *new.class.span(),
                });
                return Operand::undef();
            }
        };
        let args: Vec<Operand> = new.arguments.iter().map(|arg| self.lower_expr(arg)).collect();

        let object = self.allocate_object(&class);
        let fields = self
            .classes
            .get(&class)
            .map(|layout| layout.fields.clone())
            .unwrap_or_default();
        for (i, field) in fields.iter().enumerate() {
            let value = match field.default {
                Some(default) => {
                    let value = self.lower_expr(default);
                    self.convert(value.value, &field.ir)
                }
                None => IrValue::zero(&field.ir),
            };
            let ptr = self.gep(
                IrType::Struct(class.clone()),
                object.clone(),
                vec![IrValue::i32(0), IrValue::i32(i as i64 + 1)],
            );
            self.store(value, ptr);
        }

        let object = Operand::new(object, Type::Class(class.clone()));
        if self.find_method(&class, "constructor").is_some() {
            self.call_method(object.clone(), &class, "constructor", args, false, new.span);
        }
        object
    }

    fn allocate_object(&mut self, class: &str) -> IrValue {
        let ty = IrType::Struct(class.to_string());
        // Size of the struct: address of element 1 from null
        let end = self.gep(ty.clone(), IrValue::Null, vec![IrValue::i32(1)]);
        let size = self.cast(CastOp::PtrToInt, end, IrType::I64);
        let object = self.malloc(size);

        let vptr = self.gep(ty, object.clone(), vec![IrValue::i32(0), IrValue::i32(0)]);
        self.store(IrValue::Global(vtable_name(class)), vptr);
        object
    }
}

fn add_method(
    methods: &mut FxHashMap<String, MethodEntry>,
    vtable: &mut Vec<String>,
    layout_name: &str,
    name: &str,
    info: FunctionInfo,
    wants_slot: bool,
    is_static: bool,
) {
    let symbol = format!("{}_{}", layout_name, name);
    let inherited = methods.get(name).and_then(|entry| entry.slot);
    let slot = match inherited {
        _ if is_static => None,
        Some(slot) => {
            vtable[slot] = symbol.clone();
            Some(slot)
        }
        None if wants_slot => {
            vtable.push(symbol.clone());
            Some(vtable.len() - 1)
        }
        None => None,
    };
    methods.insert(
        name.to_string(),
        MethodEntry {
            symbol,
            params: info.params,
            ret: info.ret,
            slot,
            is_static,
        },
    );
}

fn entry_info(entry: &MethodEntry) -> FunctionInfo {
    FunctionInfo {
        params: entry.params.clone(),
        ret: entry.ret.clone(),
        variadic: false,
    }
}

pub(super) fn vtable_name(class: &str) -> String {
    format!("{}_vtable", class)
}

#[cfg(test)]
mod tests {
    use crate::lower::IrGenerator;
    use gominus_parser::parse;

    fn lower(source: &str) -> Result<String, Vec<String>> {
        lower_with(source, true)
    }

    /// Lower input the checker rejects, to reach the generator's own errors.
    fn lower_unchecked(source: &str) -> Result<String, Vec<String>> {
        lower_with(source, false)
    }

    fn lower_with(source: &str, checked: bool) -> Result<String, Vec<String>> {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        let analysis = gominus_checker::analyze_with(&program, true);
        if checked {
            assert!(analysis.errors().is_empty(), "check errors: {:?}", analysis.errors());
        }
        let mut generator = IrGenerator::new(&analysis.scopes);
        generator
            .generate_program(&program)
            .map_err(|errors| errors.iter().map(|e| e.to_string()).collect())
    }

    fn generate(source: &str) -> String {
        match lower(source) {
            Ok(ir) => ir,
            Err(errors) => panic!("ir errors: {:?}", errors),
        }
    }

    const SHAPES: &str = "
class A {
    virtual func f() int { return 1 }
}
class B extends A {
    override func f() int { return 2 }
    virtual func g() int { return 3 }
}
";

    #[test]
    fn test_vtable_slots() {
        let ir = generate(SHAPES);
        assert!(ir.contains("@A_vtable = global [1 x ptr] [ptr @A_f]"), "got: {}", ir);
        assert!(ir.contains("@B_vtable = global [2 x ptr] [ptr @B_f, ptr @B_g]"), "got: {}", ir);
        assert!(ir.contains("define i32 @B_f(ptr %r0)"), "got: {}", ir);
    }

    #[test]
    fn test_struct_layout_inherits_fields() {
        let ir = generate("class P {\n var x int\n var y float\n}\nclass Q extends P {\n var z bool\n}");
        assert!(ir.contains("%P = type { ptr, i32, double }"), "got: {}", ir);
        assert!(ir.contains("%Q = type { ptr, i32, double, i1 }"), "got: {}", ir);
        assert!(ir.contains("@P_vtable = global [0 x ptr] zeroinitializer"), "got: {}", ir);
    }

    #[test]
    fn test_new_allocates_and_installs_vtable() {
        let ir = generate("class P {\n var x int = 7\n}\nfunc main() { p := new P() }");
        assert!(ir.contains("getelementptr %P, ptr null, i32 1"), "got: {}", ir);
        assert!(ir.contains("ptrtoint ptr"), "got: {}", ir);
        assert!(ir.contains("call ptr @malloc(i64"), "got: {}", ir);
        assert!(ir.contains("store ptr @P_vtable, ptr"), "got: {}", ir);
        assert!(ir.contains("store i32 7, ptr"), "got: {}", ir);
    }

    #[test]
    fn test_constructor_is_called() {
        let ir = generate(
            "class C {\n var n int\n func constructor(v int) { this.n = v }\n}\nfunc main() { c := new C(3) }",
        );
        assert!(ir.contains("define void @C_constructor(ptr %r0, i32 %r1)"), "got: {}", ir);
        assert!(ir.contains("call void @C_constructor(ptr %r"), "got: {}", ir);
        assert!(ir.contains(", i32 3)"), "got: {}", ir);
    }

    #[test]
    fn test_virtual_call_goes_through_vtable() {
        let source = format!("{}\nfunc call(a A) int {{ return a.f() }}", SHAPES);
        let ir = generate(&source);
        let body = &ir[ir.find("define i32 @call(").unwrap()..];
        assert!(body.contains("getelementptr %A, ptr %r2, i32 0, i32 0"), "got: {}", body);
        assert!(body.contains("getelementptr ptr, ptr"), "got: {}", body);
        assert!(body.contains("call i32 %r"), "got: {}", body);
    }

    #[test]
    fn test_implicit_field_access() {
        let ir = generate("class C {\n var n int\n func get() int { return n }\n}");
        assert!(ir.contains("getelementptr %C, ptr %r0, i32 0, i32 1"), "got: {}", ir);
    }

    #[test]
    fn test_cyclic_hierarchy() {
        let errors = lower_unchecked("class A extends B { }\nclass B extends A { }").unwrap_err();
        assert!(
            errors.iter().any(|e| e.starts_with("class hierarchy of") && e.ends_with("is cyclic")),
            "got: {:?}",
            errors
        );
    }

    #[test]
    fn test_unknown_field() {
        let errors = lower_unchecked("class C { }\nfunc f(c C) int { return c.missing }").unwrap_err();
        assert_eq!(errors, vec!["C has no field or method missing"]);
    }
}
