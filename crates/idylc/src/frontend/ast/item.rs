//! Top-level declarations

use super::{Block, Type};
use crate::common::Span;

/// `use <module>;`
#[derive(Debug, Clone, PartialEq)]
pub struct UseDecl {
    pub module: String,
    pub span: Span,
}

impl UseDecl {
    pub fn new(module: impl Into<String>, span: Span) -> Self {
        Self {
            module: module.into(),
            span,
        }
    }
}

/// Function declaration, including `main`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

impl FunctionDecl {
    pub fn new(
        name: impl Into<String>,
        return_type: Type,
        params: Vec<Param>,
        body: Block,
        span: Span,
    ) -> Self {
        Self {
            name: name.into(),
            return_type,
            params,
            body,
            span,
        }
    }

    /// `main` is always void and takes no parameters
    pub fn main(body: Block, span: Span) -> Self {
        Self::new("main", Type::Void, Vec::new(), body, span)
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: Type,
    pub name: String,
    pub span: Span,
}

impl Param {
    pub fn new(ty: Type, name: impl Into<String>, span: Span) -> Self {
        Self {
            ty,
            name: name.into(),
            span,
        }
    }
}
