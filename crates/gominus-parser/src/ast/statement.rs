//! Statement AST nodes
//!
//! Declarations (package, import, var, const, func, class, interface,
//! template), control flow (if, for, while, switch, break, continue, return)
//! and exception/scope statements.

use super::*;
use crate::token::Span;

/// Statement (performs an action)
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// package main
    Package(PackageStatement),

    /// import "fmt"
    Import(ImportStatement),

    /// var x int = 5
    Var(VarStatement),

    /// const pi = 3.14
    Const(ConstStatement),

    /// return x
    Return(ReturnStatement),

    /// Expression statement: f(x)
    Expression(ExpressionStatement),

    /// { ... }
    Block(BlockStatement),

    /// if cond { ... } else { ... }
    If(IfStatement),

    /// for init; cond; post { ... }
    For(ForStatement),

    /// while cond { ... }
    While(WhileStatement),

    /// switch tag { case ...: ... }
    Switch(SwitchStatement),

    /// break
    Break(Span),

    /// continue
    Continue(Span),

    /// func name(params) ret { ... }
    Function(FunctionStatement),

    /// func (recv T) name(params) ret { ... }
    Method(MethodStatement),

    /// class Name extends P implements I { ... }
    Class(ClassStatement),

    /// interface Name { ... }
    Interface(InterfaceStatement),

    /// template<T> func/class ...
    Template(TemplateStatement),

    /// try { } catch (e T) { } finally { }
    TryCatch(TryCatchStatement),

    /// throw expr
    Throw(ThrowStatement),

    /// scope { ... }
    Scope(ScopeStatement),
}

impl Statement {
    /// Get the span of this statement
    pub fn span(&self) -> &Span {
        match self {
            Statement::Package(s) => &s.span,
            Statement::Import(s) => &s.span,
            Statement::Var(s) => &s.span,
            Statement::Const(s) => &s.span,
            Statement::Return(s) => &s.span,
            Statement::Expression(s) => &s.span,
            Statement::Block(s) => &s.span,
            Statement::If(s) => &s.span,
            Statement::For(s) => &s.span,
            Statement::While(s) => &s.span,
            Statement::Switch(s) => &s.span,
            Statement::Break(span) => span,
            Statement::Continue(span) => span,
            Statement::Function(s) => &s.span,
            Statement::Method(s) => &s.span,
            Statement::Class(s) => &s.span,
            Statement::Interface(s) => &s.span,
            Statement::Template(s) => &s.span,
            Statement::TryCatch(s) => &s.span,
            Statement::Throw(s) => &s.span,
            Statement::Scope(s) => &s.span,
        }
    }

    /// Text of the token that starts this statement.
    pub fn token_literal(&self) -> String {
        match self {
            Statement::Package(_) => "package".to_string(),
            Statement::Import(_) => "import".to_string(),
            Statement::Var(_) => "var".to_string(),
            Statement::Const(_) => "const".to_string(),
            Statement::Return(_) => "return".to_string(),
            Statement::Expression(s) => s.expression.token_literal(),
            Statement::Block(_) => "{".to_string(),
            Statement::If(_) => "if".to_string(),
            Statement::For(_) => "for".to_string(),
            Statement::While(_) => "while".to_string(),
            Statement::Switch(_) => "switch".to_string(),
            Statement::Break(_) => "break".to_string(),
            Statement::Continue(_) => "continue".to_string(),
            Statement::Function(_) | Statement::Method(_) => "func".to_string(),
            Statement::Class(_) => "class".to_string(),
            Statement::Interface(_) => "interface".to_string(),
            Statement::Template(_) => "template".to_string(),
            Statement::TryCatch(_) => "try".to_string(),
            Statement::Throw(_) => "throw".to_string(),
            Statement::Scope(_) => "scope".to_string(),
        }
    }

    /// Whether this statement declares something at the top level.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Statement::Package(_)
                | Statement::Import(_)
                | Statement::Function(_)
                | Statement::Method(_)
                | Statement::Class(_)
                | Statement::Interface(_)
                | Statement::Template(_)
        )
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Package(s) => write!(f, "package {}", s.name),
            Statement::Import(s) => {
                f.write_str("import ")?;
                for (i, p) in s.paths.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "\"{}\"", p)?;
                }
                Ok(())
            }
            Statement::Var(s) => {
                write!(f, "var {}", s.name)?;
                if let Some(ty) = &s.ty {
                    write!(f, " {}", ty)?;
                }
                if let Some(value) = &s.value {
                    write!(f, " = {}", value)?;
                }
                f.write_str(";")
            }
            Statement::Const(s) => {
                write!(f, "const {}", s.name)?;
                if let Some(ty) = &s.ty {
                    write!(f, " {}", ty)?;
                }
                write!(f, " = {};", s.value)
            }
            Statement::Return(s) => match &s.value {
                Some(value) => write!(f, "return {};", value),
                None => f.write_str("return;"),
            },
            Statement::Expression(s) => write!(f, "{}", s.expression),
            Statement::Block(s) => write!(f, "{}", s),
            Statement::If(s) => {
                write!(f, "if {} {}", s.condition, s.consequence)?;
                if let Some(alt) = &s.alternative {
                    write!(f, " else {}", alt)?;
                }
                Ok(())
            }
            Statement::For(s) => {
                f.write_str("for ")?;
                if let Some(init) = &s.init {
                    write!(f, "{}", init)?;
                }
                f.write_str("; ")?;
                if let Some(cond) = &s.condition {
                    write!(f, "{}", cond)?;
                }
                f.write_str("; ")?;
                if let Some(post) = &s.post {
                    write!(f, "{}", post)?;
                }
                write!(f, " {}", s.body)
            }
            Statement::While(s) => write!(f, "while {} {}", s.condition, s.body),
            Statement::Switch(s) => {
                f.write_str("switch ")?;
                if let Some(tag) = &s.tag {
                    write!(f, "{} ", tag)?;
                }
                f.write_str("{ ")?;
                for case in &s.cases {
                    f.write_str("case ")?;
                    write_list(f, &case.values)?;
                    write!(f, ": {} ", case.body)?;
                }
                if let Some(default) = &s.default {
                    write!(f, "default: {} ", default)?;
                }
                f.write_str("}")
            }
            Statement::Break(_) => f.write_str("break;"),
            Statement::Continue(_) => f.write_str("continue;"),
            Statement::Function(s) => write!(f, "{}", s),
            Statement::Method(s) => {
                write!(f, "func ({}) {}(", s.receiver, s.name)?;
                write_list(f, &s.params)?;
                f.write_str(")")?;
                if let Some(ret) = &s.return_type {
                    write!(f, " {}", ret)?;
                }
                write!(f, " {}", s.body)
            }
            Statement::Class(s) => {
                write!(f, "class {}", s.name)?;
                if let Some(parent) = &s.extends {
                    write!(f, " extends {}", parent)?;
                }
                if !s.implements.is_empty() {
                    f.write_str(" implements ")?;
                    write_list(f, &s.implements)?;
                }
                f.write_str(" { ")?;
                for member in &s.members {
                    match member {
                        ClassMember::Field(field) => {
                            let kw = if field.is_const { "const" } else { "var" };
                            write!(f, "{} {}", kw, field.name)?;
                            if let Some(ty) = &field.ty {
                                write!(f, " {}", ty)?;
                            }
                            if let Some(value) = &field.value {
                                write!(f, " = {}", value)?;
                            }
                            f.write_str("; ")?;
                        }
                        ClassMember::Method(method) => write!(f, "{} ", method)?,
                    }
                }
                f.write_str("}")
            }
            Statement::Interface(s) => {
                write!(f, "interface {} {{ ", s.name)?;
                for method in &s.methods {
                    write!(f, "{}(", method.name)?;
                    write_list(f, &method.params)?;
                    f.write_str(")")?;
                    if let Some(ret) = &method.return_type {
                        write!(f, " {}", ret)?;
                    }
                    f.write_str("; ")?;
                }
                f.write_str("}")
            }
            Statement::Template(s) => {
                f.write_str("template<")?;
                write_list(f, &s.type_params)?;
                write!(f, "> {}", s.body)
            }
            Statement::TryCatch(s) => {
                write!(f, "try {}", s.body)?;
                for clause in &s.catches {
                    f.write_str(" catch")?;
                    if let Some(param) = &clause.param {
                        write!(f, " ({}", param)?;
                        if let Some(ty) = &clause.ty {
                            write!(f, " {}", ty)?;
                        }
                        f.write_str(")")?;
                    }
                    write!(f, " {}", clause.body)?;
                }
                if let Some(fin) = &s.finally {
                    write!(f, " finally {}", fin)?;
                }
                Ok(())
            }
            Statement::Throw(s) => write!(f, "throw {};", s.value),
            Statement::Scope(s) => write!(f, "scope {}", s.body),
        }
    }
}

/// package name
#[derive(Debug, Clone, PartialEq)]
pub struct PackageStatement {
    pub name: Identifier,
    pub span: Span,
}

/// import "path" or import ( "a" "b" )
#[derive(Debug, Clone, PartialEq)]
pub struct ImportStatement {
    pub paths: Vec<String>,
    pub span: Span,
}

/// var name [Type] [= value]
#[derive(Debug, Clone, PartialEq)]
pub struct VarStatement {
    pub name: Identifier,
    pub ty: Option<TypeExpr>,
    pub value: Option<Expression>,
    pub span: Span,
}

/// const name [Type] = value
#[derive(Debug, Clone, PartialEq)]
pub struct ConstStatement {
    pub name: Identifier,
    pub ty: Option<TypeExpr>,
    pub value: Expression,
    pub span: Span,
}

/// return [value]
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub span: Span,
}

/// Expression used as a statement
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

/// Brace-delimited statement list
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for stmt in &self.statements {
            write!(f, "{} ", stmt)?;
        }
        f.write_str("}")
    }
}

/// if cond { } [else ...]
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub consequence: BlockStatement,
    /// `Statement::Block` or a chained `Statement::If`
    pub alternative: Option<Box<Statement>>,
    pub span: Span,
}

/// for loop; a loop with only a condition is while-style
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub init: Option<Box<Statement>>,
    pub condition: Option<Expression>,
    pub post: Option<Box<Statement>>,
    pub body: BlockStatement,
    pub span: Span,
}

/// while cond { }
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: BlockStatement,
    pub span: Span,
}

/// switch [tag] { case ...: ... default: ... }
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    /// Missing tag means each case value is a boolean condition
    pub tag: Option<Expression>,
    pub cases: Vec<SwitchCase>,
    pub default: Option<BlockStatement>,
    pub span: Span,
}

/// case v1, v2: body
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub values: Vec<Expression>,
    pub body: BlockStatement,
    pub span: Span,
}

/// Function parameter: name [Type]
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Identifier,
    pub ty: Option<TypeExpr>,
    pub span: Span,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ty {
            Some(ty) => write!(f, "{} {}", self.name, ty),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

/// Modifiers written before a class member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
}

/// func name(params) [ret] { body }
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionStatement {
    pub name: Identifier,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeExpr>,
    pub body: BlockStatement,
    /// Only meaningful for class members
    pub modifiers: Modifiers,
    pub span: Span,
}

impl fmt::Display for FunctionStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func {}(", self.name)?;
        write_list(f, &self.params)?;
        f.write_str(")")?;
        if let Some(ret) = &self.return_type {
            write!(f, " {}", ret)?;
        }
        write!(f, " {}", self.body)
    }
}

/// func (recv Type) name(params) [ret] { body }
#[derive(Debug, Clone, PartialEq)]
pub struct MethodStatement {
    pub receiver: Parameter,
    pub name: Identifier,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeExpr>,
    pub body: BlockStatement,
    pub span: Span,
}

impl MethodStatement {
    /// Name of the receiver's class, with pointers stripped.
    pub fn receiver_class(&self) -> Option<&str> {
        match self.receiver.ty.as_ref().map(TypeExpr::base) {
            Some(TypeExpr::Named(id)) => Some(&id.name),
            Some(TypeExpr::Generic { name, .. }) => Some(&name.name),
            _ => None,
        }
    }
}

/// A class field declared with var or const
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: Identifier,
    pub ty: Option<TypeExpr>,
    pub value: Option<Expression>,
    pub is_const: bool,
    pub modifiers: Modifiers,
    pub span: Span,
}

/// Class body member
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Field(FieldDecl),
    Method(FunctionStatement),
}

/// class Name [extends Parent] [implements I, J] { members }
#[derive(Debug, Clone, PartialEq)]
pub struct ClassStatement {
    pub name: Identifier,
    pub extends: Option<Identifier>,
    pub implements: Vec<Identifier>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

impl ClassStatement {
    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Field(field) => Some(field),
            ClassMember::Method(_) => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &FunctionStatement> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Method(method) => Some(method),
            ClassMember::Field(_) => None,
        })
    }
}

/// Method signature inside an interface
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceMethod {
    pub name: Identifier,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeExpr>,
    pub span: Span,
}

/// interface Name { method signatures }
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceStatement {
    pub name: Identifier,
    pub methods: Vec<InterfaceMethod>,
    pub span: Span,
}

/// template<T, U> followed by a function or class declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateStatement {
    pub type_params: Vec<Identifier>,
    /// `Statement::Function` or `Statement::Class`
    pub body: Box<Statement>,
    pub span: Span,
}

impl TemplateStatement {
    /// Name of the templated function or class.
    pub fn name(&self) -> Option<&Identifier> {
        match self.body.as_ref() {
            Statement::Function(func) => Some(&func.name),
            Statement::Class(class) => Some(&class.name),
            _ => None,
        }
    }
}

/// catch (name Type) { body }
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Identifier>,
    pub ty: Option<TypeExpr>,
    pub body: BlockStatement,
    pub span: Span,
}

/// try { } catch ... [finally { }]
#[derive(Debug, Clone, PartialEq)]
pub struct TryCatchStatement {
    pub body: BlockStatement,
    /// Never empty after a successful parse
    pub catches: Vec<CatchClause>,
    pub finally: Option<BlockStatement>,
    pub span: Span,
}

/// throw value
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStatement {
    pub value: Expression,
    pub span: Span,
}

/// scope { body }
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeStatement {
    pub body: BlockStatement,
    pub span: Span,
}
