//! Statement AST nodes

use super::{Expr, Type};
use crate::common::Span;

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement kinds
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Variable declaration: int x = 1;
    VarDecl(VarDecl),

    /// Expression statement: expr;
    Expr(Expr),

    /// Block: { ... }
    Block(Block),

    /// If statement: if (cond) then [else else]
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// While loop: while (cond) body
    While { condition: Expr, body: Box<Stmt> },

    /// Return statement: return [expr];
    Return(Option<Expr>),
}

/// Variable declaration; a missing initializer is filled with the
/// type's default literal by the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub ty: Type,
    pub name: String,
    pub init: Expr,
    pub span: Span,
}

impl VarDecl {
    pub fn new(ty: Type, name: impl Into<String>, init: Expr, span: Span) -> Self {
        Self {
            ty,
            name: name.into(),
            init,
            span,
        }
    }
}

/// Block of statements
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(statements: Vec<Stmt>, span: Span) -> Self {
        Self { statements, span }
    }
}
