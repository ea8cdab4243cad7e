//! Abstract Syntax Tree definitions
//!
//! The tree is built once by the parser and only read afterwards; the
//! analyzer keeps its findings in side tables.

mod types;
mod expr;
mod stmt;
mod item;

use std::sync::Arc;

pub use types::*;
pub use expr::*;
pub use stmt::*;
pub use item::*;

/// A complete source file: imports, global functions, then `main`
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub imports: Vec<UseDecl>,
    pub functions: Vec<FunctionDecl>,
    pub main: FunctionDecl,
    /// Source identifier, used when reporting semantic errors
    pub file: Arc<str>,
}

impl Program {
    pub fn new(
        imports: Vec<UseDecl>,
        functions: Vec<FunctionDecl>,
        main: FunctionDecl,
        file: Arc<str>,
    ) -> Self {
        Self {
            imports,
            functions,
            main,
            file,
        }
    }

    /// Global functions followed by `main`
    pub fn all_functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.functions.iter().chain(std::iter::once(&self.main))
    }
}
