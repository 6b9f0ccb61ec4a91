//! Expression AST nodes
//!
//! Literals, operators, calls, member access, object construction and
//! template instantiation.

use super::*;
use crate::token::{Span, TokenKind};

/// Expression (produces a value)
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Identifier: x
    Identifier(Identifier),

    /// Integer literal: 42
    IntegerLiteral(IntegerLiteral),

    /// Float literal: 3.14
    FloatLiteral(FloatLiteral),

    /// String literal: "hello"
    StringLiteral(StringLiteral),

    /// Char literal: 'a'
    CharLiteral(CharLiteral),

    /// Boolean literal: true, false
    BooleanLiteral(BooleanLiteral),

    /// nil
    NullLiteral(Span),

    /// Prefix expression: !x, -y, ~z
    Prefix(PrefixExpression),

    /// Infix expression: a + b, x && y
    Infix(InfixExpression),

    /// Postfix expression: i++, i--
    Postfix(PostfixExpression),

    /// Assignment: x = 1, x += 1, x := 1
    Assign(AssignExpression),

    /// Call: f(1, 2)
    Call(CallExpression),

    /// Index: a[0]
    Index(IndexExpression),

    /// Member access: obj.field, ptr->field
    Member(MemberExpression),

    /// Array literal: [1, 2, 3]
    ArrayLiteral(ArrayLiteral),

    /// Hash literal: {"a": 1}
    HashLiteral(HashLiteral),

    /// Function literal: func(a int) int { ... }
    FunctionLiteral(FunctionLiteral),

    /// Object construction: new Point(1, 2)
    New(NewExpression),

    /// this
    This(Span),

    /// super
    Super(Span),

    /// Template instantiation: Stack<int>
    TemplateInstance(TemplateInstanceExpression),
}

impl Expression {
    /// Get the span of this expression
    pub fn span(&self) -> &Span {
        match self {
            Expression::Identifier(e) => &e.span,
            Expression::IntegerLiteral(e) => &e.span,
            Expression::FloatLiteral(e) => &e.span,
            Expression::StringLiteral(e) => &e.span,
            Expression::CharLiteral(e) => &e.span,
            Expression::BooleanLiteral(e) => &e.span,
            Expression::NullLiteral(span) => span,
            Expression::Prefix(e) => &e.span,
            Expression::Infix(e) => &e.span,
            Expression::Postfix(e) => &e.span,
            Expression::Assign(e) => &e.span,
            Expression::Call(e) => &e.span,
            Expression::Index(e) => &e.span,
            Expression::Member(e) => &e.span,
            Expression::ArrayLiteral(e) => &e.span,
            Expression::HashLiteral(e) => &e.span,
            Expression::FunctionLiteral(e) => &e.span,
            Expression::New(e) => &e.span,
            Expression::This(span) => span,
            Expression::Super(span) => span,
            Expression::TemplateInstance(e) => &e.span,
        }
    }

    /// Text of the token that starts this expression.
    pub fn token_literal(&self) -> String {
        match self {
            Expression::Identifier(id) => id.name.clone(),
            Expression::IntegerLiteral(e) => e.value.to_string(),
            Expression::FloatLiteral(e) => e.value.to_string(),
            Expression::StringLiteral(e) => e.value.clone(),
            Expression::CharLiteral(e) => e.value.clone(),
            Expression::BooleanLiteral(e) => e.value.to_string(),
            Expression::NullLiteral(_) => "nil".to_string(),
            Expression::Prefix(e) => e.operator.to_string(),
            Expression::Infix(e) => e.left.token_literal(),
            Expression::Postfix(e) => e.operand.token_literal(),
            Expression::Assign(e) => e.target.token_literal(),
            Expression::Call(e) => e.function.token_literal(),
            Expression::Index(e) => e.object.token_literal(),
            Expression::Member(e) => e.object.token_literal(),
            Expression::ArrayLiteral(_) => "[".to_string(),
            Expression::HashLiteral(_) => "{".to_string(),
            Expression::FunctionLiteral(_) => "func".to_string(),
            Expression::New(_) => "new".to_string(),
            Expression::This(_) => "this".to_string(),
            Expression::Super(_) => "super".to_string(),
            Expression::TemplateInstance(e) => e.template.name.clone(),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(id) => write!(f, "{}", id),
            Expression::IntegerLiteral(e) => write!(f, "{}", e.value),
            Expression::FloatLiteral(e) => write!(f, "{}", e.value),
            Expression::StringLiteral(e) => write!(f, "\"{}\"", e.value),
            Expression::CharLiteral(e) => write!(f, "'{}'", e.value),
            Expression::BooleanLiteral(e) => write!(f, "{}", e.value),
            Expression::NullLiteral(_) => f.write_str("nil"),
            Expression::Prefix(e) => write!(f, "({}{})", e.operator, e.right),
            Expression::Infix(e) => write!(f, "({} {} {})", e.left, e.operator, e.right),
            Expression::Postfix(e) => write!(f, "({}{})", e.operand, e.operator),
            Expression::Assign(e) => write!(f, "{} {} {}", e.target, e.operator, e.value),
            Expression::Call(e) => {
                write!(f, "{}(", e.function)?;
                write_list(f, &e.arguments)?;
                f.write_str(")")
            }
            Expression::Index(e) => write!(f, "({}[{}])", e.object, e.index),
            Expression::Member(e) => {
                let sep = if e.arrow { "->" } else { "." };
                write!(f, "{}{}{}", e.object, sep, e.property)
            }
            Expression::ArrayLiteral(e) => {
                f.write_str("[")?;
                write_list(f, &e.elements)?;
                f.write_str("]")
            }
            Expression::HashLiteral(e) => {
                f.write_str("{")?;
                for (i, (k, v)) in e.pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Expression::FunctionLiteral(e) => {
                f.write_str("func(")?;
                write_list(f, &e.params)?;
                f.write_str(")")?;
                if let Some(ret) = &e.return_type {
                    write!(f, " {}", ret)?;
                }
                write!(f, " {}", e.body)
            }
            Expression::New(e) => {
                write!(f, "new {}(", e.class)?;
                write_list(f, &e.arguments)?;
                f.write_str(")")
            }
            Expression::This(_) => f.write_str("this"),
            Expression::Super(_) => f.write_str("super"),
            Expression::TemplateInstance(e) => {
                write!(f, "{}<", e.template)?;
                write_list(f, &e.type_args)?;
                f.write_str(">")
            }
        }
    }
}

/// Integer literal
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteral {
    pub value: i64,
    pub span: Span,
}

/// Float literal
#[derive(Debug, Clone, PartialEq)]
pub struct FloatLiteral {
    pub value: f64,
    pub span: Span,
}

/// String literal (raw body, escapes uninterpreted)
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub span: Span,
}

/// Char literal (raw body)
#[derive(Debug, Clone, PartialEq)]
pub struct CharLiteral {
    pub value: String,
    pub span: Span,
}

/// Boolean literal
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
    pub span: Span,
}

/// Prefix operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    /// !
    Not,
    /// -
    Negate,
    /// ~
    BitNot,
}

impl PrefixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Bang => Some(PrefixOperator::Not),
            TokenKind::Minus => Some(PrefixOperator::Negate),
            TokenKind::BitNot => Some(PrefixOperator::BitNot),
            _ => None,
        }
    }
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrefixOperator::Not => "!",
            PrefixOperator::Negate => "-",
            PrefixOperator::BitNot => "~",
        })
    }
}

/// Prefix expression: !x
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    pub operator: PrefixOperator,
    pub right: Box<Expression>,
    pub span: Span,
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfixOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
}

impl InfixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus => InfixOperator::Add,
            TokenKind::Minus => InfixOperator::Subtract,
            TokenKind::Asterisk => InfixOperator::Multiply,
            TokenKind::Slash => InfixOperator::Divide,
            TokenKind::Modulo => InfixOperator::Modulo,
            TokenKind::Eq => InfixOperator::Equal,
            TokenKind::NotEq => InfixOperator::NotEqual,
            TokenKind::Lt => InfixOperator::Less,
            TokenKind::Gt => InfixOperator::Greater,
            TokenKind::LtEq => InfixOperator::LessEqual,
            TokenKind::GtEq => InfixOperator::GreaterEqual,
            TokenKind::LogicalAnd => InfixOperator::And,
            TokenKind::LogicalOr => InfixOperator::Or,
            TokenKind::BitAnd => InfixOperator::BitAnd,
            TokenKind::BitOr => InfixOperator::BitOr,
            TokenKind::BitXor => InfixOperator::BitXor,
            TokenKind::LeftShift => InfixOperator::LeftShift,
            TokenKind::RightShift => InfixOperator::RightShift,
            _ => return None,
        })
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            InfixOperator::Equal
                | InfixOperator::NotEqual
                | InfixOperator::Less
                | InfixOperator::Greater
                | InfixOperator::LessEqual
                | InfixOperator::GreaterEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, InfixOperator::And | InfixOperator::Or)
    }

    pub fn is_bitwise(&self) -> bool {
        matches!(
            self,
            InfixOperator::BitAnd
                | InfixOperator::BitOr
                | InfixOperator::BitXor
                | InfixOperator::LeftShift
                | InfixOperator::RightShift
        )
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InfixOperator::Add => "+",
            InfixOperator::Subtract => "-",
            InfixOperator::Multiply => "*",
            InfixOperator::Divide => "/",
            InfixOperator::Modulo => "%",
            InfixOperator::Equal => "==",
            InfixOperator::NotEqual => "!=",
            InfixOperator::Less => "<",
            InfixOperator::Greater => ">",
            InfixOperator::LessEqual => "<=",
            InfixOperator::GreaterEqual => ">=",
            InfixOperator::And => "&&",
            InfixOperator::Or => "||",
            InfixOperator::BitAnd => "&",
            InfixOperator::BitOr => "|",
            InfixOperator::BitXor => "^",
            InfixOperator::LeftShift => "<<",
            InfixOperator::RightShift => ">>",
        })
    }
}

/// Infix expression: a + b
#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    pub left: Box<Expression>,
    pub operator: InfixOperator,
    pub right: Box<Expression>,
    pub span: Span,
}

/// Postfix operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOperator {
    Increment,
    Decrement,
}

impl fmt::Display for PostfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PostfixOperator::Increment => "++",
            PostfixOperator::Decrement => "--",
        })
    }
}

/// Postfix expression: i++
#[derive(Debug, Clone, PartialEq)]
pub struct PostfixExpression {
    pub operand: Box<Expression>,
    pub operator: PostfixOperator,
    pub span: Span,
}

/// Assignment operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOperator {
    /// =
    Assign,
    /// :=
    Define,
    /// +=, -=, ... carrying the underlying binary operator
    Compound(InfixOperator),
}

impl AssignOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Assign => AssignOperator::Assign,
            TokenKind::Define => AssignOperator::Define,
            TokenKind::PlusAssign => AssignOperator::Compound(InfixOperator::Add),
            TokenKind::MinusAssign => AssignOperator::Compound(InfixOperator::Subtract),
            TokenKind::MulAssign => AssignOperator::Compound(InfixOperator::Multiply),
            TokenKind::DivAssign => AssignOperator::Compound(InfixOperator::Divide),
            TokenKind::ModAssign => AssignOperator::Compound(InfixOperator::Modulo),
            TokenKind::AndAssign => AssignOperator::Compound(InfixOperator::BitAnd),
            TokenKind::OrAssign => AssignOperator::Compound(InfixOperator::BitOr),
            TokenKind::XorAssign => AssignOperator::Compound(InfixOperator::BitXor),
            TokenKind::LeftShiftAssign => AssignOperator::Compound(InfixOperator::LeftShift),
            TokenKind::RightShiftAssign => AssignOperator::Compound(InfixOperator::RightShift),
            _ => return None,
        })
    }
}

impl fmt::Display for AssignOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignOperator::Assign => f.write_str("="),
            AssignOperator::Define => f.write_str(":="),
            AssignOperator::Compound(op) => write!(f, "{}=", op),
        }
    }
}

/// Assignment expression
#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpression {
    pub target: Box<Expression>,
    pub operator: AssignOperator,
    pub value: Box<Expression>,
    pub span: Span,
}

/// Call expression: f(a, b)
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub function: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

/// Index expression: a[i]
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub object: Box<Expression>,
    pub index: Box<Expression>,
    pub span: Span,
}

/// Member access: obj.name or ptr->name
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: Identifier,
    /// Written with `->`
    pub arrow: bool,
    pub span: Span,
}

/// Array literal
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub elements: Vec<Expression>,
    pub span: Span,
}

/// Hash literal
#[derive(Debug, Clone, PartialEq)]
pub struct HashLiteral {
    pub pairs: Vec<(Expression, Expression)>,
    pub span: Span,
}

/// Anonymous function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeExpr>,
    pub body: BlockStatement,
    pub span: Span,
}

/// new Class(args)
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpression {
    /// Named class, or a template instance like `Stack<int>`
    pub class: TypeExpr,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

/// Name<T, U> where Name is a declared template
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateInstanceExpression {
    pub template: Identifier,
    pub type_args: Vec<TypeExpr>,
    pub span: Span,
}
