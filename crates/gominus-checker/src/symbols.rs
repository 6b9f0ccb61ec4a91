//! Scope tree for name resolution
//!
//! Scopes live in an arena and are addressed by [`ScopeId`]. Closed scopes
//! stay in the arena so the finished tree can be inspected after analysis.

use crate::types::Type;
use gominus_parser::Span;
use rustc_hash::FxHashMap;

/// Symbol kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// var binding or `:=`
    Variable,
    /// const binding
    Constant,
    /// Function or method parameter
    Parameter,
    Function,
    Class,
    Interface,
    /// Builtin or imported package
    Package,
    /// template<...> declaration
    Template,
    /// Type parameter bound inside a template
    TypeParameter,
}

/// Function signature
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub params: Vec<Type>,
    pub ret: Type,
    /// Extra arguments beyond `params` are accepted
    pub variadic: bool,
}

impl FunctionSignature {
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        Self {
            params,
            ret,
            variadic: false,
        }
    }

    pub fn variadic(params: Vec<Type>, ret: Type) -> Self {
        Self {
            params,
            ret,
            variadic: true,
        }
    }

    pub fn to_type(&self) -> Type {
        Type::Function {
            params: self.params.clone(),
            ret: Box::new(self.ret.clone()),
            variadic: self.variadic,
        }
    }

    pub fn substitute(&self, bindings: &[(String, Type)]) -> Self {
        Self {
            params: self.params.iter().map(|p| p.substitute(bindings)).collect(),
            ret: self.ret.substitute(bindings),
            variadic: self.variadic,
        }
    }
}

/// Class field
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: String,
    pub ty: Type,
    pub is_const: bool,
}

/// Class method
#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub name: String,
    pub signature: FunctionSignature,
    pub is_virtual: bool,
}

/// Member tables of a class, in declaration order
#[derive(Debug, Clone, Default)]
pub struct ClassInfo {
    pub name: String,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Interface method table
#[derive(Debug, Clone, Default)]
pub struct InterfaceInfo {
    pub name: String,
    pub methods: Vec<(String, FunctionSignature)>,
}

/// What a template declares once its parameters are bound
#[derive(Debug, Clone)]
pub struct TemplateInfo {
    pub params: Vec<String>,
    pub signature: Option<FunctionSignature>,
    pub class: Option<ClassInfo>,
}

/// Symbol information
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Type,
    /// Declaring location
    pub span: Span,
    pub signature: Option<FunctionSignature>,
    pub class: Option<ClassInfo>,
    pub interface: Option<InterfaceInfo>,
    pub template: Option<TemplateInfo>,
    /// Scope where this symbol was defined
    pub scope_id: ScopeId,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, ty: Type, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
            span,
            signature: None,
            class: None,
            interface: None,
            template: None,
            scope_id: ScopeId(0),
        }
    }

    pub fn with_signature(mut self, signature: FunctionSignature) -> Self {
        self.ty = signature.to_type();
        self.signature = Some(signature);
        self
    }

    pub fn is_const(&self) -> bool {
        self.kind == SymbolKind::Constant
    }
}

/// Scope identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// Scope kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
    Class,
    Loop,
}

/// Scope in the scope tree
#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// Parent scope (None for global scope)
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub symbols: FxHashMap<String, Symbol>,
}

impl Scope {
    pub fn new(id: ScopeId, kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Scope {
            id,
            kind,
            parent,
            children: Vec::new(),
            symbols: FxHashMap::default(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }
}

/// Duplicate definition in one scope
#[derive(Debug, Clone)]
pub struct DuplicateSymbolError {
    pub name: String,
    pub original: Span,
    pub duplicate: Span,
}

/// Arena of scopes with a cursor at the scope being analyzed.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl ScopeTree {
    /// Create a tree holding only the global scope.
    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![Scope::new(ScopeId(0), ScopeKind::Global, None)],
            current: ScopeId(0),
        }
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn global(&self) -> &Scope {
        &self.scopes[0]
    }

    pub fn current_id(&self) -> ScopeId {
        self.current
    }

    pub fn current(&self) -> &Scope {
        &self.scopes[self.current.0 as usize]
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }

    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    /// Open a child of the current scope and make it current.
    pub fn push_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(id, kind, Some(self.current)));
        self.scopes[self.current.0 as usize].children.push(id);
        self.current = id;
        id
    }

    /// Return to the parent scope. Does nothing at global scope.
    pub fn pop_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current.0 as usize].parent {
            self.current = parent;
        }
    }

    /// Define a symbol in the current scope, rejecting same-scope duplicates.
    pub fn define(&mut self, mut symbol: Symbol) -> Result<(), DuplicateSymbolError> {
        let scope = &mut self.scopes[self.current.0 as usize];

        if let Some(existing) = scope.symbols.get(&symbol.name) {
            return Err(DuplicateSymbolError {
                name: symbol.name.clone(),
                original: existing.span,
                duplicate: symbol.span,
            });
        }

        symbol.scope_id = self.current;
        scope.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Define a symbol in the current scope, replacing any previous one.
    pub fn define_or_replace(&mut self, mut symbol: Symbol) {
        symbol.scope_id = self.current;
        self.scopes[self.current.0 as usize]
            .symbols
            .insert(symbol.name.clone(), symbol);
    }

    /// Resolve a name from the current scope outward; the innermost wins.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.resolve_from(self.current, name)
    }

    /// Resolve a name from a given scope outward.
    pub fn resolve_from(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let scope = self.get(id)?;
            if let Some(symbol) = scope.symbols.get(name) {
                return Some(symbol);
            }
            cursor = scope.parent;
        }
        None
    }

    /// Look a name up in the current scope only.
    pub fn resolve_local(&self, name: &str) -> Option<&Symbol> {
        self.current().symbols.get(name)
    }

    /// Mutable access to a global symbol, for filling in declarations.
    pub fn global_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.scopes[0].symbols.get_mut(name)
    }

    /// Class member tables by class name, including template classes.
    pub fn class_info(&self, name: &str) -> Option<&ClassInfo> {
        let symbol = self.global().get(name)?;
        symbol
            .class
            .as_ref()
            .or_else(|| symbol.template.as_ref().and_then(|t| t.class.as_ref()))
    }

    pub fn interface_info(&self, name: &str) -> Option<&InterfaceInfo> {
        self.global().get(name)?.interface.as_ref()
    }

    /// Find a field through the parent chain.
    pub fn find_field(&self, class: &str, field: &str) -> Option<&FieldInfo> {
        self.class_chain(class).find_map(|info| info.field(field))
    }

    /// Find a method through the parent chain.
    pub fn find_method(&self, class: &str, method: &str) -> Option<&MethodInfo> {
        self.class_chain(class).find_map(|info| info.method(method))
    }

    /// Whether `class` is `ancestor` or derives from it.
    pub fn is_subclass(&self, class: &str, ancestor: &str) -> bool {
        self.class_chain(class).any(|info| info.name == ancestor)
    }

    /// Whether `class` (or a parent) names `interface` in its implements list.
    pub fn implements(&self, class: &str, interface: &str) -> bool {
        self.class_chain(class)
            .any(|info| info.interfaces.iter().any(|i| i == interface))
    }

    /// The class followed by its ancestors. Stops on unknown parents and cycles.
    pub fn class_chain<'a>(&'a self, class: &str) -> impl Iterator<Item = &'a ClassInfo> + 'a {
        let mut next = self.class_info(class);
        let mut seen: Vec<&'a str> = Vec::new();
        std::iter::from_fn(move || {
            let info = next?;
            if seen.contains(&info.name.as_str()) {
                return None;
            }
            seen.push(info.name.as_str());
            next = info.parent.as_deref().and_then(|p| self.class_info(p));
            Some(info)
        })
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, ty: Type) -> Symbol {
        Symbol::new(name, SymbolKind::Variable, ty, Span::default())
    }

    #[test]
    fn test_push_pop_scope() {
        let mut tree = ScopeTree::new();
        let block = tree.push_scope(ScopeKind::Block);
        assert_eq!(tree.current_id(), block);
        assert_eq!(tree.global().children, vec![block]);
        tree.pop_scope();
        assert_eq!(tree.current_id(), ScopeId(0));
        tree.pop_scope();
        assert_eq!(tree.current_id(), ScopeId(0));
    }

    #[test]
    fn test_shadowing_resolves_innermost() {
        let mut tree = ScopeTree::new();
        tree.define(var("x", Type::int())).unwrap();
        let inner = tree.push_scope(ScopeKind::Block);
        tree.define(var("x", Type::bool())).unwrap();

        assert!(tree.resolve("x").unwrap().ty.is_bool());
        tree.pop_scope();
        assert!(tree.resolve("x").unwrap().ty.is_int());
        assert!(tree.get(inner).unwrap().get("x").unwrap().ty.is_bool());
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let mut tree = ScopeTree::new();
        tree.define(var("x", Type::int())).unwrap();
        let err = tree.define(var("x", Type::int())).unwrap_err();
        assert_eq!(err.name, "x");
    }

    #[test]
    fn test_class_chain() {
        let mut tree = ScopeTree::new();
        let mut base = Symbol::new("A", SymbolKind::Class, Type::Class("A".into()), Span::default());
        let mut a = ClassInfo::new("A");
        a.fields.push(FieldInfo {
            name: "x".into(),
            ty: Type::int(),
            is_const: false,
        });
        base.class = Some(a);
        tree.define(base).unwrap();

        let mut derived = Symbol::new("B", SymbolKind::Class, Type::Class("B".into()), Span::default());
        let mut b = ClassInfo::new("B");
        b.parent = Some("A".into());
        derived.class = Some(b);
        tree.define(derived).unwrap();

        assert!(tree.find_field("B", "x").is_some());
        assert!(tree.is_subclass("B", "A"));
        assert!(!tree.is_subclass("A", "B"));
    }
}
