//! AST to IR Lowering
//!
//! Converts the analyzed AST into an [`IrModule`]. The generator keeps a
//! current function and current block; each lowering method either appends
//! to that block or creates new blocks and moves the cursor.

mod call;
mod class;
mod control_flow;
mod debug;
mod exception;
mod expr;
mod stmt;
mod template;

pub use debug::DebugInfo;

use crate::error::IrGenError;
use crate::ir::{
    BasicBlock, BasicBlockId, Callee, IrFunction, IrGlobal, IrInstr, IrModule, IrType, IrValue, Register, RegisterId,
    Terminator,
};
use class::ClassLayout;
use control_flow::{ExceptionContext, LoopStack};
use gominus_checker::{FunctionSignature, ScopeTree, SymbolKind, Type};
use gominus_parser::ast::{
    BlockStatement, ClassStatement, Expression, MethodStatement, Parameter, PrefixOperator, Statement, TypeExpr,
};
use gominus_parser::{Program, Span};
use rustc_hash::{FxHashMap, FxHashSet};
use template::{PendingInstance, TemplateDef};

/// Runs top-level statements before `main`
const INIT_FUNCTION: &str = "__gominus_init";

/// Storage for a named value
#[derive(Debug, Clone)]
pub(crate) struct Binding {
    /// Address of the slot (alloca or global)
    pub ptr: IrValue,
    pub ty: Type,
    pub ir: IrType,
}

/// A lowered expression: its value and semantic type
#[derive(Debug, Clone)]
pub(crate) struct Operand {
    pub value: IrValue,
    pub ty: Type,
}

impl Operand {
    pub fn new(value: IrValue, ty: Type) -> Self {
        Self { value, ty }
    }

    /// Placeholder after a reported error
    pub fn undef() -> Self {
        Self::new(IrValue::Undef(IrType::I32), Type::unknown())
    }

    pub fn ir(&self) -> IrType {
        self.value.ty()
    }
}

/// Signature of a callable symbol
#[derive(Debug, Clone)]
pub(crate) struct FunctionInfo {
    pub params: Vec<Type>,
    pub ret: Type,
    pub variadic: bool,
}

impl FunctionInfo {
    pub fn to_type(&self) -> Type {
        Type::Function {
            params: self.params.clone(),
            ret: Box::new(self.ret.clone()),
            variadic: self.variadic,
        }
    }
}

impl From<&FunctionSignature> for FunctionInfo {
    fn from(sig: &FunctionSignature) -> Self {
        Self {
            params: sig.params.clone(),
            ret: sig.ret.clone(),
            variadic: sig.variadic,
        }
    }
}

/// Everything needed to lower one function body
pub(crate) struct FunctionSource<'a> {
    pub symbol: String,
    pub params: &'a [Parameter],
    pub info: FunctionInfo,
    pub body: &'a BlockStatement,
    pub span: Span,
    /// Class of the implicit `this` parameter
    pub this_class: Option<String>,
    /// Receiver name of a `func (p *T) m()` method, bound to `this`
    pub receiver: Option<String>,
}

/// Per-function lowering state
struct FunctionState<'a> {
    function: Option<IrFunction>,
    block: BasicBlockId,
    next_register: u32,
    next_block: u32,
    scopes: Vec<FxHashMap<String, Binding>>,
    loops: LoopStack,
    exceptions: Vec<ExceptionContext<'a>>,
    return_ty: IrType,
    this: Option<(IrValue, String)>,
    is_main: bool,
}

impl Default for FunctionState<'_> {
    fn default() -> Self {
        Self {
            function: None,
            block: BasicBlockId(0),
            next_register: 0,
            next_block: 0,
            scopes: Vec::new(),
            loops: LoopStack::new(),
            exceptions: Vec::new(),
            return_ty: IrType::Void,
            this: None,
            is_main: false,
        }
    }
}

/// Lowers one program to IR text.
///
/// One generator serves one [`IrGenerator::generate_program`] call.
pub struct IrGenerator<'a> {
    scopes: &'a ScopeTree,
    module: IrModule,
    errors: Vec<IrGenError>,
    debug: DebugInfo,
    state: FunctionState<'a>,
    globals: FxHashMap<String, Binding>,
    /// Globals whose initializer runs in the init function
    runtime_globals: FxHashSet<String>,
    functions: FxHashMap<String, FunctionInfo>,
    class_order: Vec<String>,
    class_decls: FxHashMap<String, &'a ClassStatement>,
    receiver_methods: FxHashMap<String, Vec<&'a MethodStatement>>,
    classes: FxHashMap<String, ClassLayout<'a>>,
    templates: FxHashMap<String, TemplateDef<'a>>,
    pending_instances: Vec<PendingInstance<'a>>,
    /// Type parameter substitutions while instantiating a template
    type_bindings: Vec<(String, Type)>,
    lambda_count: usize,
    init_function: Option<String>,
    packages: FxHashSet<String>,
}

impl<'a> IrGenerator<'a> {
    pub fn new(scopes: &'a ScopeTree) -> Self {
        Self {
            scopes,
            module: IrModule::new("main"),
            errors: Vec::new(),
            debug: DebugInfo::disabled(),
            state: FunctionState::default(),
            globals: FxHashMap::default(),
            runtime_globals: FxHashSet::default(),
            functions: FxHashMap::default(),
            class_order: Vec::new(),
            class_decls: FxHashMap::default(),
            receiver_methods: FxHashMap::default(),
            classes: FxHashMap::default(),
            templates: FxHashMap::default(),
            pending_instances: Vec::new(),
            type_bindings: Vec::new(),
            lambda_count: 0,
            init_function: None,
            packages: FxHashSet::default(),
        }
    }

    /// Emit source positions for `file`.
    pub fn with_debug_info(mut self, file: impl Into<String>) -> Self {
        let file = file.into();
        self.module.source_file = Some(file.clone());
        self.debug = DebugInfo::enabled(file);
        self
    }

    pub fn module(&self) -> &IrModule {
        &self.module
    }

    pub fn errors(&self) -> &[IrGenError] {
        &self.errors
    }

    /// Lower the whole program and print the module.
    ///
    /// Errors are collected while lowering; generation fails only if any
    /// were recorded by the time of a checkpoint.
    pub fn generate_program(&mut self, program: &'a Program) -> Result<String, Vec<IrGenError>> {
        tracing::debug!(statements = program.statements.len(), "ir generation started");

        self.collect_declarations(program);
        self.layout_classes();
        self.lower_global_initializers(program);

        for stmt in &program.statements {
            match stmt {
                Statement::Function(func) => {
                    let info = self.functions.get(&func.name.name).cloned();
                    let info = info.unwrap_or_else(|| self.function_info(&func.params, func.return_type.as_ref()));
                    self.lower_function(FunctionSource {
                        symbol: func.name.name.clone(),
                        params: &func.params,
                        info,
                        body: &func.body,
                        span: func.span,
                        this_class: None,
                        receiver: None,
                    });
                }
                Statement::Class(class) => self.lower_class_body(&class.name.name, class),
                Statement::Method(method) => self.lower_detached_method(method),
                _ => {}
            }
        }
        self.lower_pending_instances();
        self.checkpoint()?;

        self.ensure_main();
        self.checkpoint()?;

        if let Err(problems) = self.module.validate() {
            self.errors.extend(problems.into_iter().map(IrGenError::Internal));
            self.checkpoint()?;
        }

        tracing::debug!(
            functions = self.module.function_count(),
            instructions = self.module.total_instruction_count(),
            "ir generation finished"
        );
        Ok(self.module.to_string())
    }

    fn checkpoint(&self) -> Result<(), Vec<IrGenError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors.clone())
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn collect_declarations(&mut self, program: &'a Program) {
        // Type names first, so signatures and globals can refer to them
        for stmt in &program.statements {
            match stmt {
                Statement::Import(import) => {
                    for path in &import.paths {
                        let alias = path.rsplit('/').next().unwrap_or(path);
                        self.packages.insert(alias.to_string());
                    }
                }
                Statement::Class(class) => {
                    self.class_order.push(class.name.name.clone());
                    self.class_decls.insert(class.name.name.clone(), class);
                }
                Statement::Method(method) => {
                    if let Some(class) = method.receiver_class() {
                        self.receiver_methods.entry(class.to_string()).or_default().push(method);
                    }
                }
                Statement::Template(template) => {
                    if let Some(name) = template.name() {
                        self.templates.insert(name.name.clone(), TemplateDef::new(template));
                    }
                }
                _ => {}
            }
        }

        for stmt in &program.statements {
            match stmt {
                Statement::Function(func) => {
                    let analyzed = self
                        .scopes
                        .global()
                        .get(&func.name.name)
                        .filter(|symbol| symbol.kind == SymbolKind::Function && symbol.span.line > 0)
                        .and_then(|symbol| symbol.signature.as_ref())
                        .filter(|sig| sig.params.len() == func.params.len())
                        .map(FunctionInfo::from);
                    let info = match analyzed {
                        Some(info) => info,
                        None => self.function_info(&func.params, func.return_type.as_ref()),
                    };
                    self.functions.insert(func.name.name.clone(), info);
                }
                Statement::Var(var) => self.declare_global(&var.name.name, var.ty.as_ref(), var.value.as_ref()),
                Statement::Const(c) => self.declare_global(&c.name.name, c.ty.as_ref(), Some(&c.value)),
                _ => {}
            }
        }

        tracing::debug!(
            functions = self.functions.len(),
            classes = self.class_decls.len(),
            templates = self.templates.len(),
            globals = self.globals.len(),
            "collected declarations"
        );
    }

    /// Signature written on a parameter list, resolved under the current
    /// type bindings.
    pub(crate) fn function_info(&mut self, params: &[Parameter], ret: Option<&TypeExpr>) -> FunctionInfo {
        let params = params
            .iter()
            .map(|p| match &p.ty {
                Some(ty) => self.resolve_type(ty),
                None => Type::unknown(),
            })
            .collect();
        let ret = match ret {
            Some(ty) => self.resolve_type(ty),
            None => Type::void(),
        };
        FunctionInfo {
            params,
            ret,
            variadic: false,
        }
    }

    fn declare_global(&mut self, name: &str, ty: Option<&TypeExpr>, value: Option<&'a Expression>) {
        let sem = match ty {
            Some(ty) => self.resolve_type(ty),
            None => value
                .and_then(literal_type)
                .or_else(|| {
                    self.scopes
                        .global()
                        .get(name)
                        .map(|symbol| symbol.ty.clone())
                        .filter(|ty| !ty.is_unknown())
                })
                .unwrap_or_else(Type::unknown),
        };
        let ir = storage_type(&sem);

        let init = match value {
            Some(value) => match self.constant_value(value, &ir) {
                Some(constant) => constant,
                None => {
                    self.runtime_globals.insert(name.to_string());
                    IrValue::zero(&ir)
                }
            },
            None => IrValue::zero(&ir),
        };

        tracing::trace!(global = name, ty = %ir, "declared global");
        self.module.add_global(IrGlobal::Variable {
            name: name.to_string(),
            ty: ir.clone(),
            init,
        });
        self.globals.insert(
            name.to_string(),
            Binding {
                ptr: IrValue::Global(name.to_string()),
                ty: sem,
                ir,
            },
        );
    }

    /// Constant initializer for a global, if the expression is one.
    fn constant_value(&mut self, expr: &Expression, ir: &IrType) -> Option<IrValue> {
        let value = match expr {
            Expression::IntegerLiteral(lit) if ir.is_integer() => IrValue::Int {
                value: lit.value,
                ty: ir.clone(),
            },
            Expression::IntegerLiteral(lit) if ir.is_float() => IrValue::Float {
                value: lit.value as f64,
                ty: ir.clone(),
            },
            Expression::FloatLiteral(lit) if ir.is_float() => IrValue::Float {
                value: lit.value,
                ty: ir.clone(),
            },
            Expression::BooleanLiteral(lit) if *ir == IrType::I1 => IrValue::Bool(lit.value),
            Expression::CharLiteral(lit) if ir.is_integer() => IrValue::Int {
                value: expr::char_code(&lit.value),
                ty: ir.clone(),
            },
            Expression::StringLiteral(lit) if *ir == IrType::Ptr => {
                IrValue::Global(self.module.add_string(&expr::unescape(&lit.value)))
            }
            Expression::NullLiteral(_) if *ir == IrType::Ptr => IrValue::Null,
            Expression::Prefix(prefix) if prefix.operator == PrefixOperator::Negate => {
                match self.constant_value(&prefix.right, ir)? {
                    IrValue::Int { value, ty } => IrValue::Int { value: -value, ty },
                    IrValue::Float { value, ty } => IrValue::Float { value: -value, ty },
                    _ => return None,
                }
            }
            _ => return None,
        };
        Some(value)
    }

    /// Lower top-level statements that must run at startup into the init
    /// function.
    fn lower_global_initializers(&mut self, program: &'a Program) {
        let runtime: Vec<&'a Statement> = program
            .statements
            .iter()
            .filter(|stmt| match stmt {
                Statement::Var(var) => self.runtime_globals.contains(&var.name.name),
                Statement::Const(c) => self.runtime_globals.contains(&c.name.name),
                other => !other.is_declaration(),
            })
            .collect();
        if runtime.is_empty() {
            return;
        }

        tracing::debug!(statements = runtime.len(), "lowering global initializers");
        self.begin_function(INIT_FUNCTION, &[], &[], IrType::Void, program.span, None);
        for stmt in runtime {
            match stmt {
                Statement::Var(var) => {
                    if let Some(value) = &var.value {
                        self.emit_marker(&var.span);
                        self.store_global(&var.name.name, value);
                    }
                }
                Statement::Const(c) => {
                    self.emit_marker(&c.span);
                    self.store_global(&c.name.name, &c.value);
                }
                other => self.lower_stmt(other),
            }
            if self.current_block_is_terminated() {
                break;
            }
        }
        self.finish_function();
        self.init_function = Some(INIT_FUNCTION.to_string());
    }

    fn store_global(&mut self, name: &str, value: &'a Expression) {
        let operand = self.lower_expr(value);
        if let Some(binding) = self.globals.get(name).cloned() {
            let value = self.convert(operand.value, &binding.ir);
            self.store(value, binding.ptr);
        }
    }

    fn call_init(&mut self) {
        if let Some(init) = self.init_function.clone() {
            self.call(IrType::Void, Callee::Direct(init), Vec::new(), None);
        }
    }

    /// Synthesize `main` when the program has none.
    fn ensure_main(&mut self) {
        if self.module.has_function("main") {
            return;
        }
        tracing::debug!("synthesizing main");
        self.begin_function("main", &[], &[], IrType::I32, Span::default(), None);
        self.state.is_main = true;
        self.call_init();
        self.set_terminator(Terminator::Return(Some(IrValue::i32(0))));
        self.finish_function();
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// Lower a function, method or lambda body.
    pub(crate) fn lower_function(&mut self, source: FunctionSource<'a>) {
        let is_main = source.symbol == "main" && source.this_class.is_none();
        let ret = if is_main {
            IrType::I32
        } else {
            IrType::from_type(&source.info.ret)
        };
        let names: Vec<String> = source.params.iter().map(|p| p.name.name.clone()).collect();
        let types: Vec<Type> = (0..names.len())
            .map(|i| source.info.params.get(i).cloned().unwrap_or_else(Type::unknown))
            .collect();

        self.begin_function(&source.symbol, &names, &types, ret, source.span, source.this_class.clone());
        self.state.is_main = is_main;

        if let (Some(receiver), Some((this, class))) = (&source.receiver, self.state.this.clone()) {
            let slot = self.alloca(IrType::Ptr);
            self.store(this, slot.clone());
            self.bind(
                receiver,
                Binding {
                    ptr: slot,
                    ty: Type::Class(class),
                    ir: IrType::Ptr,
                },
            );
        }
        if is_main {
            self.call_init();
        }

        self.lower_block(source.body);
        self.finish_function();
    }

    /// Start a new function and point the cursor at its entry block.
    fn begin_function(
        &mut self,
        name: &str,
        names: &[String],
        types: &[Type],
        ret: IrType,
        span: Span,
        this_class: Option<String>,
    ) {
        self.state = FunctionState {
            return_ty: ret.clone(),
            ..FunctionState::default()
        };

        let this = this_class.as_ref().map(|_| self.alloc_register(IrType::Ptr));
        let params: Vec<Register> = types.iter().map(|ty| self.alloc_register(storage_type(ty))).collect();

        let mut all_params = Vec::with_capacity(params.len() + 1);
        all_params.extend(this.clone());
        all_params.extend(params.iter().cloned());

        let mut function = IrFunction::new(name, all_params, ret);
        if let Some(file) = self.debug.file() {
            function.source_file = Some(file.to_string());
            function.source_span = span;
        }
        let entry = self.alloc_block();
        function.add_block(BasicBlock::with_label(entry, "entry"));
        function.entry_block = entry;

        self.state.function = Some(function);
        self.state.block = entry;
        self.push_scope();

        if let (Some(this), Some(class)) = (this, this_class) {
            self.state.this = Some((this.into(), class));
        }
        for ((name, ty), reg) in names.iter().zip(types).zip(params) {
            let ir = reg.ty.clone();
            let slot = self.alloca(ir.clone());
            self.store(reg.into(), slot.clone());
            self.bind(
                name,
                Binding {
                    ptr: slot,
                    ty: ty.clone(),
                    ir,
                },
            );
        }
    }

    /// Seal open blocks and add the function to the module.
    fn finish_function(&mut self) {
        let Some(mut function) = self.state.function.take() else {
            self.internal("no current function to finish");
            return;
        };

        let current = self.state.block;
        let default_return = match &function.return_ty {
            IrType::Void => Terminator::Return(None),
            ty => Terminator::Return(Some(IrValue::zero(ty))),
        };
        for block in &mut function.blocks {
            if !block.is_terminated() {
                if block.id == current {
                    block.set_terminator(default_return.clone());
                } else {
                    block.set_terminator(Terminator::Unreachable);
                }
            }
        }

        tracing::trace!(function = %function.name, blocks = function.block_count(), "lowered function");
        self.module.add_function(function);
        self.state = FunctionState::default();
    }

    /// Lower something into a separate function without disturbing the
    /// one in progress.
    pub(crate) fn with_nested<R>(&mut self, bindings: Vec<(String, Type)>, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved_state = std::mem::take(&mut self.state);
        let saved_bindings = std::mem::replace(&mut self.type_bindings, bindings);
        let result = f(self);
        self.state = saved_state;
        self.type_bindings = saved_bindings;
        result
    }

    // ========================================================================
    // Cursor
    // ========================================================================

    fn alloc_register(&mut self, ty: IrType) -> Register {
        let id = RegisterId::new(self.state.next_register);
        self.state.next_register += 1;
        Register::new(id, ty)
    }

    fn alloc_block(&mut self) -> BasicBlockId {
        let id = BasicBlockId::new(self.state.next_block);
        self.state.next_block += 1;
        id
    }

    /// Add a block to the current function and move the cursor to it.
    fn start_block(&mut self, id: BasicBlockId, label: &str) {
        match self.state.function.as_mut() {
            Some(function) => {
                function.add_block(BasicBlock::with_label(id, label));
                self.state.block = id;
            }
            None => self.internal("no current function"),
        }
    }

    fn current_block_mut(&mut self) -> Option<&mut BasicBlock> {
        let block = self.state.block;
        self.state.function.as_mut().and_then(|f| f.get_block_mut(block))
    }

    fn emit(&mut self, instr: IrInstr) {
        match self.current_block_mut() {
            Some(block) => block.add_instr(instr),
            None => self.internal("no current block"),
        }
    }

    /// Set the terminator of the current block unless it already has one.
    fn set_terminator(&mut self, term: Terminator) {
        match self.current_block_mut() {
            Some(block) if !block.is_terminated() => block.set_terminator(term),
            Some(_) => {}
            None => self.internal("no current block"),
        }
    }

    fn current_block_is_terminated(&self) -> bool {
        self.state
            .function
            .as_ref()
            .and_then(|f| f.get_block(self.state.block))
            .map(|b| b.is_terminated())
            .unwrap_or(false)
    }

    fn emit_marker(&mut self, span: &Span) {
        if let Some(marker) = self.debug.marker(span) {
            self.emit(marker);
        }
    }

    fn jump_if_open(&mut self, target: BasicBlockId) {
        if !self.current_block_is_terminated() {
            self.set_terminator(Terminator::Jump(target));
        }
    }

    // ========================================================================
    // Memory
    // ========================================================================

    /// Stack slot in the entry block.
    fn alloca(&mut self, ty: IrType) -> IrValue {
        let dest = self.alloc_register(IrType::Ptr);
        match self.state.function.as_mut() {
            Some(function) => function.insert_alloca(IrInstr::Alloca { dest: dest.clone(), ty }),
            None => self.internal("alloca outside a function"),
        }
        dest.into()
    }

    fn load(&mut self, ptr: IrValue, ty: IrType) -> IrValue {
        let dest = self.alloc_register(ty);
        self.emit(IrInstr::Load { dest: dest.clone(), ptr });
        dest.into()
    }

    fn store(&mut self, value: IrValue, ptr: IrValue) {
        self.emit(IrInstr::Store { value, ptr });
    }

    /// Emit a call; returns the result unless the callee returns void.
    fn call(&mut self, ret: IrType, callee: Callee, args: Vec<IrValue>, varargs: Option<Vec<IrType>>) -> Option<IrValue> {
        let dest = if ret.is_void() {
            None
        } else {
            Some(self.alloc_register(ret.clone()))
        };
        self.emit(IrInstr::Call {
            dest: dest.clone(),
            ret,
            callee,
            args,
            varargs,
        });
        dest.map(IrValue::from)
    }

    // ========================================================================
    // Names
    // ========================================================================

    fn push_scope(&mut self) {
        self.state.scopes.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.state.scopes.pop();
    }

    fn bind(&mut self, name: &str, binding: Binding) {
        match self.state.scopes.last_mut() {
            Some(scope) => {
                scope.insert(name.to_string(), binding);
            }
            None => self.internal("no open scope"),
        }
    }

    /// Innermost local, then global.
    fn lookup(&self, name: &str) -> Option<Binding> {
        self.state
            .scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .or_else(|| self.globals.get(name))
            .cloned()
    }

    /// Resolve a written type under the current type bindings.
    pub(crate) fn resolve_type(&mut self, ty: &TypeExpr) -> Type {
        match ty {
            TypeExpr::Named(id) => {
                if let Some((_, bound)) = self.type_bindings.iter().find(|(param, _)| *param == id.name) {
                    return bound.clone();
                }
                if let Some(basic) = Type::from_basic_name(&id.name) {
                    return basic;
                }
                if self.class_decls.contains_key(&id.name) || self.classes.contains_key(&id.name) {
                    return Type::Class(id.name.clone());
                }
                if self.scopes.interface_info(&id.name).is_some() {
                    return Type::Interface(id.name.clone());
                }
                if self.scopes.class_info(&id.name).is_some() {
                    return Type::Class(id.name.clone());
                }
                Type::unknown()
            }
            TypeExpr::Array { element, .. } => Type::Array(Box::new(self.resolve_type(element))),
            TypeExpr::Map { key, value, .. } => {
                let key = self.resolve_type(key);
                let value = self.resolve_type(value);
                Type::Map(Box::new(key), Box::new(value))
            }
            TypeExpr::Pointer { inner, .. } => self.resolve_type(inner),
            TypeExpr::Generic { name, args, .. } => {
                let args: Vec<Type> = args.iter().map(|arg| self.resolve_type(arg)).collect();
                match self.instantiate(name, args) {
                    Some(symbol) if self.classes.contains_key(&symbol) || self.is_class_template(&name.name) => {
                        Type::Class(symbol)
                    }
                    Some(_) => {
                        self.error(IrGenError::NotAClass {
                            name: name.name.clone(),
                            span: name.span,
                        });
                        Type::unknown()
                    }
                    None => Type::unknown(),
                }
            }
        }
    }

    // ========================================================================
    // Errors
    // ========================================================================

    fn error(&mut self, err: IrGenError) {
        tracing::debug!(error = %err, "ir generation error");
        self.errors.push(err);
    }

    fn internal(&mut self, message: &str) {
        self.error(IrGenError::Internal(message.to_string()));
    }
}

/// IR type used for storage; `void` has none, so it is stored as `i32`.
pub(crate) fn storage_type(ty: &Type) -> IrType {
    match IrType::from_type(ty) {
        IrType::Void => IrType::I32,
        ir => ir,
    }
}

/// Placeholder type for names the analyzer could not resolve.
pub(crate) fn is_unresolved(ty: &Type) -> bool {
    matches!(ty, Type::Basic { name, .. } if name == "unknown")
}

pub(crate) fn literal_type(expr: &Expression) -> Option<Type> {
    match expr {
        Expression::IntegerLiteral(_) => Some(Type::int()),
        Expression::FloatLiteral(_) => Some(Type::float()),
        Expression::StringLiteral(_) => Some(Type::string()),
        Expression::CharLiteral(_) => Some(Type::char()),
        Expression::BooleanLiteral(_) => Some(Type::bool()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn test_synthesized_main() {
        let ir = generate("var x int = 5;");
        assert!(ir.contains("@x = global i32 5"), "got: {}", ir);
        assert!(ir.contains("define i32 @main() {"), "got: {}", ir);
        assert!(ir.contains("ret i32 0"), "got: {}", ir);
    }

    #[test]
    fn test_runtime_global_initializer() {
        let ir = generate("func five() int { return 5 }\nvar x = five()\nfunc main() { }");
        assert!(ir.contains("define void @__gominus_init()"), "got: {}", ir);
        assert!(ir.contains("call void @__gominus_init()"), "got: {}", ir);
        assert!(ir.contains("store i32 %r0, ptr @x"), "got: {}", ir);
    }

    #[test]
    fn test_user_main_returns_i32() {
        let ir = generate("func main() { return }");
        assert!(ir.contains("define i32 @main() {"), "got: {}", ir);
        assert!(!ir.contains("ret void"), "got: {}", ir);
    }

    #[test]
    fn test_params_are_spilled() {
        let ir = generate("func id(a int) int { return a }");
        assert!(ir.contains("define i32 @id(i32 %r0) {"), "got: {}", ir);
        assert!(ir.contains("%r1 = alloca i32"), "got: {}", ir);
        assert!(ir.contains("store i32 %r0, ptr %r1"), "got: {}", ir);
        assert!(ir.contains("%r2 = load i32, ptr %r1"), "got: {}", ir);
        assert!(ir.contains("ret i32 %r2"), "got: {}", ir);
    }

    #[test]
    fn test_debug_markers() {
        let (program, _) = parse("func main() {\n  var x = 1\n}");
        let analysis = gominus_checker::analyze_with(&program, true);
        assert!(analysis.errors().is_empty(), "check errors: {:?}", analysis.errors());
        let mut generator = IrGenerator::new(&analysis.scopes).with_debug_info("main.gom");
        let ir = generator.generate_program(&program).unwrap();
        assert!(ir.contains("source_filename = \"main.gom\""), "got: {}", ir);
        assert!(ir.contains("; main defined at main.gom:1:"), "got: {}", ir);
        assert!(ir.contains("; line 2, col 3"), "got: {}", ir);
    }
}
