//! Semantic analyzer - builds the scope tree and checks statements
//!
//! Analysis runs in two phases. [`Analyzer::collect_declarations`] registers
//! every top-level class, interface, function and template so that forward
//! references resolve, then fills in their signatures and member tables. The
//! statement walk then checks bodies in order; `var` and `:=` define their
//! symbol at the point they appear.
//!
//! Findings never stop the walk. Unresolved names type as `unknown`, which is
//! assignable both ways, so one mistake is reported once.

use crate::builtins::{self, package_symbol};
use crate::diagnostic::Level;
use crate::error::CheckError;
use crate::symbols::{
    ClassInfo, FieldInfo, FunctionSignature, InterfaceInfo, MethodInfo, ScopeKind, ScopeTree, Symbol, SymbolKind,
    TemplateInfo,
};
use crate::types::Type;
use gominus_parser::ast::*;
use gominus_parser::Span;

/// An import and whether anything referenced it
#[derive(Debug, Clone)]
struct ImportRecord {
    name: String,
    path: String,
    span: Span,
    used: bool,
}

/// Result of analyzing one program
#[derive(Debug, Clone)]
pub struct Analysis {
    pub scopes: ScopeTree,
    pub diagnostics: Vec<CheckError>,
}

impl Analysis {
    /// Error-level findings as `line L, col C: message`.
    pub fn errors(&self) -> Vec<String> {
        self.at_level(Level::Error)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.at_level(Level::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level() == Level::Error)
    }

    fn at_level(&self, level: Level) -> Vec<String> {
        self.diagnostics
            .iter()
            .filter(|d| d.level() == level)
            .map(CheckError::to_diagnostic_string)
            .collect()
    }
}

/// Semantic analyzer state for one compilation unit
pub struct Analyzer {
    pub(crate) scopes: ScopeTree,
    diagnostics: Vec<CheckError>,
    type_inference: bool,

    /// Declared return types of the enclosing functions
    return_types: Vec<Type>,

    /// Enclosing loops and switches; reset inside function literals
    loop_depth: usize,
    switch_depth: usize,

    /// Enclosing class names, innermost last
    pub(crate) class_stack: Vec<String>,

    /// Type parameters visible while filling template declarations
    bound_params: Vec<String>,

    imports: Vec<ImportRecord>,
}

impl Analyzer {
    /// Create an analyzer with builtins in the global scope.
    pub fn new() -> Self {
        let mut scopes = ScopeTree::new();
        builtins::register_builtins(&mut scopes);

        Self {
            scopes,
            diagnostics: Vec::new(),
            type_inference: true,
            return_types: Vec::new(),
            loop_depth: 0,
            switch_depth: 0,
            class_stack: Vec::new(),
            bound_params: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Enable or disable inference for untyped `var` and `:=`.
    pub fn with_type_inference(mut self, enabled: bool) -> Self {
        self.type_inference = enabled;
        self
    }

    pub fn type_inference(&self) -> bool {
        self.type_inference
    }

    /// Analyze a program. Findings accumulate; see [`Analyzer::errors`].
    pub fn analyze(&mut self, program: &Program) {
        tracing::debug!(statements = program.statements.len(), "analysis started");

        self.collect_declarations(program);
        self.check_statements(&program.statements);
        self.report_unused_imports();

        tracing::debug!(
            scopes = self.scopes.scope_count(),
            diagnostics = self.diagnostics.len(),
            "analysis finished"
        );
    }

    /// Error-level findings as `line L, col C: message`.
    pub fn errors(&self) -> Vec<String> {
        self.diagnostics
            .iter()
            .filter(|d| d.level() == Level::Error)
            .map(CheckError::to_diagnostic_string)
            .collect()
    }

    /// All findings, including warnings and notes.
    pub fn diagnostics(&self) -> &[CheckError] {
        &self.diagnostics
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    /// Consume the analyzer, keeping the scope tree and findings.
    pub fn finish(self) -> Analysis {
        Analysis {
            scopes: self.scopes,
            diagnostics: self.diagnostics,
        }
    }

    pub(crate) fn report(&mut self, error: CheckError) {
        tracing::trace!(error = %error, "diagnostic");
        self.diagnostics.push(error);
    }

    // ========================================================================
    // Phase 1: declarations
    // ========================================================================

    /// Register top-level declarations, then fill in their types.
    pub fn collect_declarations(&mut self, program: &Program) {
        for stmt in &program.statements {
            match stmt {
                Statement::Class(class) => {
                    let mut info = ClassInfo::new(&class.name.name);
                    info.parent = class.extends.as_ref().map(|p| p.name.clone());
                    info.interfaces = class.implements.iter().map(|i| i.name.clone()).collect();

                    let mut symbol = Symbol::new(
                        &class.name.name,
                        SymbolKind::Class,
                        Type::Class(class.name.name.clone()),
                        class.name.span,
                    );
                    symbol.class = Some(info);
                    self.declare(symbol);
                }
                Statement::Interface(iface) => {
                    let mut symbol = Symbol::new(
                        &iface.name.name,
                        SymbolKind::Interface,
                        Type::Interface(iface.name.name.clone()),
                        iface.name.span,
                    );
                    symbol.interface = Some(InterfaceInfo {
                        name: iface.name.name.clone(),
                        methods: Vec::new(),
                    });
                    self.declare(symbol);
                }
                Statement::Function(func) => {
                    let symbol = Symbol::new(&func.name.name, SymbolKind::Function, Type::unknown(), func.name.span)
                        .with_signature(FunctionSignature::new(Vec::new(), Type::unknown()));
                    self.declare(symbol);
                }
                Statement::Template(template) => {
                    if let Some(name) = template.name() {
                        let params: Vec<String> = template.type_params.iter().map(|p| p.name.clone()).collect();
                        let mut symbol = Symbol::new(
                            &name.name,
                            SymbolKind::Template,
                            Type::Template {
                                name: name.name.clone(),
                                params: params.clone(),
                                base: Some(Box::new(Type::unknown())),
                            },
                            name.span,
                        );
                        symbol.template = Some(TemplateInfo {
                            params,
                            signature: None,
                            class: None,
                        });
                        self.declare(symbol);
                    }
                }
                _ => {}
            }
        }

        for stmt in &program.statements {
            self.fill_declaration(stmt);
        }
    }

    fn fill_declaration(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Function(func) => {
                let signature = self.resolve_signature(&func.params, func.return_type.as_ref());
                tracing::trace!(function = %func.name, signature = %signature.to_type(), "declared function");
                if let Some(symbol) = self.scopes.global_mut(&func.name.name) {
                    if symbol.kind == SymbolKind::Function {
                        symbol.ty = signature.to_type();
                        symbol.signature = Some(signature);
                    }
                }
            }
            Statement::Class(class) => {
                let (fields, methods) = self.class_members(class);
                tracing::trace!(class = %class.name, fields = fields.len(), methods = methods.len(), "declared class");
                if let Some(info) = self
                    .scopes
                    .global_mut(&class.name.name)
                    .and_then(|symbol| symbol.class.as_mut())
                {
                    info.fields = fields;
                    info.methods = methods;
                }
            }
            Statement::Method(method) => {
                let Some(class) = method.receiver_class().map(str::to_string) else {
                    return;
                };
                if self.scopes.class_info(&class).is_none() {
                    return;
                }
                let signature = self.resolve_signature(&method.params, method.return_type.as_ref());
                if let Some(info) = self.scopes.global_mut(&class).and_then(|symbol| symbol.class.as_mut()) {
                    info.methods.push(MethodInfo {
                        name: method.name.name.clone(),
                        signature,
                        is_virtual: false,
                    });
                }
            }
            Statement::Interface(iface) => {
                let methods: Vec<(String, FunctionSignature)> = iface
                    .methods
                    .iter()
                    .map(|m| (m.name.name.clone(), self.resolve_signature(&m.params, m.return_type.as_ref())))
                    .collect();
                if let Some(info) = self
                    .scopes
                    .global_mut(&iface.name.name)
                    .and_then(|symbol| symbol.interface.as_mut())
                {
                    info.methods = methods;
                }
            }
            Statement::Template(template) => self.fill_template(template),
            _ => {}
        }
    }

    fn fill_template(&mut self, template: &TemplateStatement) {
        let Some(name) = template.name().map(|n| n.name.clone()) else {
            return;
        };
        self.bound_params = template.type_params.iter().map(|p| p.name.clone()).collect();

        let (signature, class, base) = match template.body.as_ref() {
            Statement::Function(func) => {
                let sig = self.resolve_signature(&func.params, func.return_type.as_ref());
                let base = sig.to_type();
                (Some(sig), None, base)
            }
            Statement::Class(class) => {
                let (fields, methods) = self.class_members(class);
                let info = ClassInfo {
                    name: name.clone(),
                    parent: class.extends.as_ref().map(|p| p.name.clone()),
                    interfaces: class.implements.iter().map(|i| i.name.clone()).collect(),
                    fields,
                    methods,
                };
                (None, Some(info), Type::Class(name.clone()))
            }
            _ => (None, None, Type::unknown()),
        };
        self.bound_params.clear();
        tracing::trace!(template = %name, base = %base, "declared template");

        if let Some(symbol) = self.scopes.global_mut(&name) {
            if let Type::Template { base: slot, .. } = &mut symbol.ty {
                *slot = Some(Box::new(base));
            }
            if let Some(info) = symbol.template.as_mut() {
                info.signature = signature;
                info.class = class;
            }
        }
    }

    fn class_members(&mut self, class: &ClassStatement) -> (Vec<FieldInfo>, Vec<MethodInfo>) {
        let mut fields = Vec::new();
        let mut methods = Vec::new();

        for member in &class.members {
            match member {
                ClassMember::Field(field) => {
                    let ty = match &field.ty {
                        Some(ty) => self.resolve_type(ty),
                        None => field.value.as_ref().and_then(literal_type).unwrap_or_else(Type::unknown),
                    };
                    fields.push(FieldInfo {
                        name: field.name.name.clone(),
                        ty,
                        is_const: field.is_const,
                    });
                }
                ClassMember::Method(method) => {
                    let signature = self.resolve_signature(&method.params, method.return_type.as_ref());
                    methods.push(MethodInfo {
                        name: method.name.name.clone(),
                        signature,
                        is_virtual: method.modifiers.is_virtual || method.modifiers.is_override,
                    });
                }
            }
        }

        (fields, methods)
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// Resolve a written type, reporting unknown names.
    pub(crate) fn resolve_type(&mut self, ty: &TypeExpr) -> Type {
        match ty {
            TypeExpr::Named(id) => {
                if let Some(basic) = Type::from_basic_name(&id.name) {
                    return basic;
                }
                if self.bound_params.contains(&id.name) {
                    return Type::type_param(&id.name);
                }
                match self.scopes.resolve(&id.name) {
                    Some(symbol) => match symbol.kind {
                        SymbolKind::Class | SymbolKind::Interface | SymbolKind::TypeParameter => symbol.ty.clone(),
                        SymbolKind::Template if symbol.template.as_ref().is_some_and(|t| t.class.is_some()) => {
                            Type::Class(id.name.clone())
                        }
                        _ => self.undefined_type(id),
                    },
                    None => self.undefined_type(id),
                }
            }
            TypeExpr::Array { element, .. } => Type::Array(Box::new(self.resolve_type(element))),
            TypeExpr::Map { key, value, .. } => {
                let key = self.resolve_type(key);
                let value = self.resolve_type(value);
                Type::Map(Box::new(key), Box::new(value))
            }
            TypeExpr::Pointer { inner, .. } => self.resolve_type(inner),
            TypeExpr::Generic { name, args, .. } => {
                for arg in args {
                    self.resolve_type(arg);
                }
                match self.scopes.resolve(&name.name).map(|s| s.kind) {
                    Some(SymbolKind::Template) => Type::Class(name.name.clone()),
                    Some(_) => {
                        self.report(CheckError::NotATemplate {
                            name: name.name.clone(),
                            span: name.span,
                        });
                        Type::unknown()
                    }
                    None => self.undefined_type(name),
                }
            }
        }
    }

    fn undefined_type(&mut self, id: &Identifier) -> Type {
        self.report(CheckError::UndefinedType {
            name: id.name.clone(),
            span: id.span,
        });
        Type::unknown()
    }

    pub(crate) fn resolve_signature(&mut self, params: &[Parameter], ret: Option<&TypeExpr>) -> FunctionSignature {
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
        FunctionSignature::new(params, ret)
    }

    /// Assignability including subclassing and declared interfaces.
    pub(crate) fn assignable(&self, target: &Type, value: &Type) -> bool {
        if target.is_assignable(value) {
            return true;
        }
        match (target, value) {
            (Type::Class(t), Type::Class(v)) => self.scopes.is_subclass(v, t),
            (Type::Interface(i), Type::Class(c)) => self.scopes.implements(c, i),
            _ => false,
        }
    }

    // ========================================================================
    // Symbols
    // ========================================================================

    /// Define in the current scope, reporting same-scope redeclaration.
    pub(crate) fn declare(&mut self, symbol: Symbol) {
        self.note_shadowing(&symbol);
        if let Err(dup) = self.scopes.define(symbol.clone()) {
            // Builtins carry no position and may be redeclared by user code
            if dup.original.line == 0 {
                self.scopes.define_or_replace(symbol);
                return;
            }
            self.report(CheckError::Redeclared {
                name: dup.name,
                original: dup.original,
                span: dup.duplicate,
            });
        }
    }

    /// Define for `:=`, replacing any same-scope binding.
    pub(crate) fn redefine(&mut self, symbol: Symbol) {
        self.note_shadowing(&symbol);
        self.scopes.define_or_replace(symbol);
    }

    fn note_shadowing(&mut self, symbol: &Symbol) {
        if self.scopes.resolve_local(&symbol.name).is_some() {
            return;
        }
        let shadows = self.scopes.resolve(&symbol.name).is_some_and(|outer| {
            matches!(
                outer.kind,
                SymbolKind::Variable | SymbolKind::Constant | SymbolKind::Parameter
            )
        });
        if shadows {
            self.report(CheckError::Shadowed {
                name: symbol.name.clone(),
                span: symbol.span,
            });
        }
    }

    /// Record a use of a package for unused-import detection.
    pub(crate) fn mark_package_used(&mut self, name: &str) {
        for import in self.imports.iter_mut().filter(|i| i.name == name) {
            import.used = true;
        }
    }

    fn report_unused_imports(&mut self) {
        let unused: Vec<_> = self.imports.iter().filter(|i| !i.used).cloned().collect();
        for import in unused {
            self.report(CheckError::UnusedImport {
                path: import.path,
                span: import.span,
            });
        }
    }

    // ========================================================================
    // Phase 2: statements
    // ========================================================================

    pub(crate) fn check_statements(&mut self, statements: &[Statement]) {
        for stmt in statements {
            self.check_statement(stmt);
        }
    }

    fn check_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Package(_) | Statement::Interface(_) => {}
            Statement::Import(import) => self.check_import(import),
            Statement::Var(var) => self.check_var(&var.name, var.ty.as_ref(), var.value.as_ref(), SymbolKind::Variable),
            Statement::Const(c) => self.check_var(&c.name, c.ty.as_ref(), Some(&c.value), SymbolKind::Constant),
            Statement::Return(ret) => self.check_return(ret),
            Statement::Expression(expr) => {
                self.infer_type(&expr.expression);
            }
            Statement::Block(block) => self.check_block(block, ScopeKind::Block),
            Statement::If(stmt) => self.check_if(stmt),
            Statement::For(stmt) => self.check_for(stmt),
            Statement::While(stmt) => {
                self.check_condition(&stmt.condition);
                self.loop_depth += 1;
                self.check_block(&stmt.body, ScopeKind::Loop);
                self.loop_depth -= 1;
            }
            Statement::Switch(stmt) => self.check_switch(stmt),
            Statement::Break(span) => {
                if self.loop_depth == 0 && self.switch_depth == 0 {
                    self.report(CheckError::BreakOutsideLoop { span: *span });
                }
            }
            Statement::Continue(span) => {
                if self.loop_depth == 0 {
                    self.report(CheckError::ContinueOutsideLoop { span: *span });
                }
            }
            Statement::Function(func) => self.check_function_statement(func),
            Statement::Method(method) => self.check_method(method),
            Statement::Class(class) => self.check_class(class, false),
            Statement::Template(template) => self.check_template(template),
            Statement::TryCatch(stmt) => self.check_try(stmt),
            Statement::Throw(stmt) => {
                self.infer_type(&stmt.value);
            }
            Statement::Scope(stmt) => self.check_block(&stmt.body, ScopeKind::Block),
        }
    }

    fn check_import(&mut self, import: &ImportStatement) {
        for path in &import.paths {
            let name = path.rsplit('/').next().unwrap_or(path).to_string();
            if self.scopes.global().get(&name).is_none() {
                let mut symbol = package_symbol(&name);
                symbol.span = import.span;
                self.scopes.define_or_replace(symbol);
            }
            self.imports.push(ImportRecord {
                name,
                path: path.clone(),
                span: import.span,
                used: false,
            });
        }
    }

    fn check_var(&mut self, name: &Identifier, ty: Option<&TypeExpr>, value: Option<&Expression>, kind: SymbolKind) {
        let declared = ty.map(|t| self.resolve_type(t));
        let value_ty = value.map(|v| (self.infer_value(v), *v.span()));

        let ty = match (declared, value_ty) {
            (Some(declared), Some((actual, span))) => {
                if !self.assignable(&declared, &actual) {
                    self.report(CheckError::TypeMismatch {
                        expected: declared.to_string(),
                        actual: actual.to_string(),
                        span,
                    });
                }
                declared
            }
            (Some(declared), None) => declared,
            (None, Some((actual, _))) if self.type_inference => actual,
            (None, _) => Type::unknown(),
        };

        tracing::trace!(name = %name, ty = %ty, "declared variable");
        self.declare(Symbol::new(&name.name, kind, ty, name.span));
    }

    fn check_return(&mut self, ret: &ReturnStatement) {
        let actual = match &ret.value {
            Some(value) => self.infer_type(value),
            None => Type::void(),
        };

        let Some(expected) = self.return_types.last().cloned() else {
            self.report(CheckError::ReturnOutsideFunction { span: ret.span });
            return;
        };

        let matches = if expected.is_void() || actual.is_void() {
            expected.is_void() == actual.is_void()
        } else {
            self.assignable(&expected, &actual)
        };
        if !matches {
            self.report(CheckError::ReturnTypeMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
                span: ret.span,
            });
        }
    }

    pub(crate) fn check_block(&mut self, block: &BlockStatement, kind: ScopeKind) {
        self.scopes.push_scope(kind);
        self.check_statements(&block.statements);
        self.scopes.pop_scope();
    }

    fn check_condition(&mut self, condition: &Expression) {
        let ty = self.infer_type(condition);
        if !ty.is_bool() && !ty.is_wildcard() {
            self.report(CheckError::NonBoolCondition {
                actual: ty.to_string(),
                span: *condition.span(),
            });
        }
    }

    fn check_if(&mut self, stmt: &IfStatement) {
        self.check_condition(&stmt.condition);
        self.check_block(&stmt.consequence, ScopeKind::Block);
        if let Some(alt) = &stmt.alternative {
            self.check_statement(alt);
        }
    }

    fn check_for(&mut self, stmt: &ForStatement) {
        self.scopes.push_scope(ScopeKind::Loop);
        if let Some(init) = &stmt.init {
            self.check_statement(init);
        }
        if let Some(condition) = &stmt.condition {
            self.check_condition(condition);
        }
        if let Some(post) = &stmt.post {
            self.check_statement(post);
        }
        self.loop_depth += 1;
        self.check_block(&stmt.body, ScopeKind::Block);
        self.loop_depth -= 1;
        self.scopes.pop_scope();
    }

    fn check_switch(&mut self, stmt: &SwitchStatement) {
        let tag = stmt.tag.as_ref().map(|t| self.infer_type(t));

        for case in &stmt.cases {
            for value in &case.values {
                match &tag {
                    Some(tag_ty) => {
                        let value_ty = self.infer_type(value);
                        if !self.assignable(tag_ty, &value_ty) {
                            self.report(CheckError::TypeMismatch {
                                expected: tag_ty.to_string(),
                                actual: value_ty.to_string(),
                                span: *value.span(),
                            });
                        }
                    }
                    None => self.check_condition(value),
                }
            }
        }

        self.switch_depth += 1;
        for case in &stmt.cases {
            self.check_block(&case.body, ScopeKind::Block);
        }
        if let Some(default) = &stmt.default {
            self.check_block(default, ScopeKind::Block);
        }
        self.switch_depth -= 1;
    }

    fn check_try(&mut self, stmt: &TryCatchStatement) {
        self.check_block(&stmt.body, ScopeKind::Block);

        for clause in &stmt.catches {
            self.scopes.push_scope(ScopeKind::Block);
            if let Some(param) = &clause.param {
                let ty = match &clause.ty {
                    Some(ty) => self.resolve_type(ty),
                    None => Type::unknown(),
                };
                self.declare(Symbol::new(&param.name, SymbolKind::Variable, ty, param.span));
            }
            self.check_statements(&clause.body.statements);
            self.scopes.pop_scope();
        }

        if let Some(finally) = &stmt.finally {
            self.check_block(finally, ScopeKind::Block);
        }
    }

    // ========================================================================
    // Functions, classes, templates
    // ========================================================================

    /// Check a function body against an already resolved signature.
    pub(crate) fn check_function_body(&mut self, params: &[Parameter], signature: &FunctionSignature, body: &BlockStatement) {
        self.scopes.push_scope(ScopeKind::Function);
        for (param, ty) in params.iter().zip(&signature.params) {
            self.declare(Symbol::new(&param.name.name, SymbolKind::Parameter, ty.clone(), param.name.span));
        }

        self.return_types.push(signature.ret.clone());
        let depths = (std::mem::take(&mut self.loop_depth), std::mem::take(&mut self.switch_depth));
        self.check_statements(&body.statements);
        (self.loop_depth, self.switch_depth) = depths;
        self.return_types.pop();

        self.scopes.pop_scope();
    }

    fn check_function_statement(&mut self, func: &FunctionStatement) {
        let signature = match self.scopes.resolve(&func.name.name) {
            Some(symbol) if symbol.kind == SymbolKind::Function && symbol.span == func.name.span => {
                symbol.signature.clone()
            }
            _ => None,
        };
        let signature = match signature {
            Some(sig) => sig,
            None => self.resolve_signature(&func.params, func.return_type.as_ref()),
        };
        self.check_function_body(&func.params, &signature, &func.body);
    }

    fn check_method(&mut self, method: &MethodStatement) {
        let class = method.receiver_class().map(str::to_string);
        let known = class.as_deref().and_then(|c| {
            self.scopes
                .class_info(c)
                .and_then(|info| info.method(&method.name.name))
                .map(|m| m.signature.clone())
        });

        let (receiver_ty, signature) = match (&class, known) {
            (Some(class), Some(sig)) => (Type::Class(class.clone()), sig),
            _ => {
                let receiver_ty = match &method.receiver.ty {
                    Some(ty) => self.resolve_type(ty),
                    None => Type::unknown(),
                };
                (receiver_ty, self.resolve_signature(&method.params, method.return_type.as_ref()))
            }
        };

        if let Some(class) = &class {
            self.class_stack.push(class.clone());
        }
        self.scopes.push_scope(ScopeKind::Class);
        if let Some(class) = &class {
            self.bind_fields(class, method.receiver.name.span);
        }
        self.redefine(Symbol::new(
            &method.receiver.name.name,
            SymbolKind::Parameter,
            receiver_ty,
            method.receiver.name.span,
        ));
        self.check_function_body(&method.params, &signature, &method.body);
        self.scopes.pop_scope();
        if class.is_some() {
            self.class_stack.pop();
        }
    }

    /// Bind the fields of `class` and its ancestors by bare name in the
    /// current scope. Own fields are bound last and shadow inherited ones.
    fn bind_fields(&mut self, class: &str, span: Span) {
        let chain: Vec<&ClassInfo> = self.scopes.class_chain(class).collect();
        let fields: Vec<Symbol> = chain
            .iter()
            .rev()
            .flat_map(|info| info.fields.iter())
            .map(|field| {
                let kind = if field.is_const {
                    SymbolKind::Constant
                } else {
                    SymbolKind::Variable
                };
                Symbol::new(&field.name, kind, field.ty.clone(), span)
            })
            .collect();
        for field in fields {
            self.scopes.define_or_replace(field);
        }
    }

    fn check_class(&mut self, class: &ClassStatement, templated: bool) {
        let name = class.name.name.clone();

        if let Some(parent) = &class.extends {
            match self.scopes.resolve(&parent.name).map(|s| s.kind) {
                Some(SymbolKind::Class) => {}
                Some(_) => self.report(CheckError::NotAClass {
                    name: parent.name.clone(),
                    span: parent.span,
                }),
                None => {
                    self.undefined_type(parent);
                }
            }
        }

        for iface in &class.implements {
            match self.scopes.interface_info(&iface.name).cloned() {
                Some(info) => {
                    for (method, _) in &info.methods {
                        if self.scopes.find_method(&name, method).is_none() {
                            self.report(CheckError::MissingInterfaceMethod {
                                class: name.clone(),
                                interface: iface.name.clone(),
                                method: method.clone(),
                                span: class.name.span,
                            });
                        }
                    }
                }
                None if self.scopes.resolve(&iface.name).is_some() => self.report(CheckError::NotAnInterface {
                    name: iface.name.clone(),
                    span: iface.span,
                }),
                None => {
                    self.undefined_type(iface);
                }
            }
        }

        let info = self.scopes.class_info(&name).cloned();
        self.class_stack.push(name.clone());
        self.scopes.push_scope(ScopeKind::Class);
        self.bind_fields(&name, class.name.span);

        for member in &class.members {
            match member {
                ClassMember::Field(field) => {
                    let Some(value) = &field.value else { continue };
                    let actual = self.infer_value(value);
                    let expected = info
                        .as_ref()
                        .and_then(|i| i.field(&field.name.name))
                        .map(|f| f.ty.clone())
                        .unwrap_or_else(Type::unknown);
                    if !self.assignable(&expected, &actual) {
                        self.report(CheckError::TypeMismatch {
                            expected: expected.to_string(),
                            actual: actual.to_string(),
                            span: *value.span(),
                        });
                    }
                }
                ClassMember::Method(method) => {
                    let signature = info
                        .as_ref()
                        .and_then(|i| i.method(&method.name.name))
                        .map(|m| m.signature.clone());
                    let signature = match signature {
                        Some(sig) => sig,
                        None => self.resolve_signature(&method.params, method.return_type.as_ref()),
                    };
                    self.check_function_body(&method.params, &signature, &method.body);
                }
            }
        }

        self.scopes.pop_scope();
        self.class_stack.pop();
        tracing::trace!(class = %name, templated, "checked class");
    }

    fn check_template(&mut self, template: &TemplateStatement) {
        self.scopes.push_scope(ScopeKind::Block);
        for param in &template.type_params {
            self.declare(Symbol::new(
                &param.name,
                SymbolKind::TypeParameter,
                Type::type_param(&param.name),
                param.span,
            ));
        }

        let info = template
            .name()
            .and_then(|name| self.scopes.global().get(&name.name))
            .and_then(|symbol| symbol.template.clone());

        match template.body.as_ref() {
            Statement::Function(func) => {
                let signature = match info.and_then(|i| i.signature) {
                    Some(sig) => sig,
                    None => self.resolve_signature(&func.params, func.return_type.as_ref()),
                };
                self.check_function_body(&func.params, &signature, &func.body);
            }
            Statement::Class(class) => self.check_class(class, true),
            other => self.check_statement(other),
        }

        self.scopes.pop_scope();
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of a literal, without touching scopes.
fn literal_type(expr: &Expression) -> Option<Type> {
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

    fn analyze(source: &str) -> Analysis {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        let mut analyzer = Analyzer::new();
        analyzer.analyze(&program);
        analyzer.finish()
    }

    #[test]
    fn test_forward_reference_to_class() {
        let analysis = analyze("func make_point() Point { return new Point() } class Point { var x int }");
        assert!(analysis.errors().is_empty(), "got: {:?}", analysis.errors());
    }

    #[test]
    fn test_same_scope_redeclaration() {
        let analysis = analyze("var x = 1; var x = 2");
        assert_eq!(analysis.errors(), vec!["line 1, col 16: x redeclared in this scope"]);
    }

    #[test]
    fn test_break_outside_loop() {
        let analysis = analyze("func f() { break }");
        assert_eq!(analysis.errors().len(), 1);
        assert!(analysis.errors()[0].contains("break outside loop"));
    }

    #[test]
    fn test_break_inside_switch_and_loop() {
        let analysis = analyze("func f(x int) { switch x { case 1: break } for { continue } }");
        assert!(analysis.errors().is_empty(), "got: {:?}", analysis.errors());
    }

    #[test]
    fn test_return_type_checked() {
        let analysis = analyze("func f() int { return \"no\" }");
        assert_eq!(analysis.errors().len(), 1);
        assert!(analysis.errors()[0].contains("cannot return string from function returning int"));
    }

    #[test]
    fn test_missing_interface_method() {
        let source = "interface Shape { area() float } class Dot implements Shape { var x int }";
        let analysis = analyze(source);
        assert_eq!(analysis.errors().len(), 1);
        assert!(analysis.errors()[0].contains("Dot does not implement Shape: missing method area"));
    }

    #[test]
    fn test_unused_import_is_warning() {
        let analysis = analyze("import \"fmt\"\nimport \"os\"\nfunc main() { fmt.Println(1) }");
        assert!(analysis.errors().is_empty());
        assert_eq!(analysis.warnings(), vec!["line 2, col 1: imported and not used: \"os\""]);
    }

    #[test]
    fn test_inference_toggle() {
        let (program, _) = parse("var x = 5; var y string = x");
        let mut analyzer = Analyzer::new().with_type_inference(false);
        analyzer.analyze(&program);
        assert!(analyzer.errors().is_empty(), "got: {:?}", analyzer.errors());
        assert!(analyzer.scopes().resolve("x").unwrap().ty.is_unknown());

        let mut analyzer = Analyzer::new();
        analyzer.analyze(&program);
        assert_eq!(analyzer.errors().len(), 1);
    }

    #[test]
    fn test_fields_visible_in_methods() {
        let analysis = analyze("class C {\n var n int\n func get() int { return n }\n}");
        assert!(analysis.errors().is_empty(), "got: {:?}", analysis.errors());

        let source = "class A { var n int }\nclass B extends A { var s string func show() string { n = n + 1; return s } }";
        let analysis = analyze(source);
        assert!(analysis.errors().is_empty(), "got: {:?}", analysis.errors());
    }

    #[test]
    fn test_fields_visible_in_receiver_methods() {
        let analysis = analyze("class C { var n int }\nfunc (c C) get() int { return n }");
        assert!(analysis.errors().is_empty(), "got: {:?}", analysis.errors());

        let analysis = analyze("class C { var n int }\nfunc get() int { return n }");
        assert_eq!(analysis.errors().len(), 1);
        assert!(analysis.errors()[0].contains("undefined identifier: n"));
    }

    #[test]
    fn test_template_params_bound() {
        let analysis = analyze("template<T> func id(x T) T { return x } var n int = id<int>(3)");
        assert!(analysis.errors().is_empty(), "got: {:?}", analysis.errors());
    }
}
