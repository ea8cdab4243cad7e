//! Semantic analysis module
//!
//! This module performs scoping and type checking over a parsed program.

mod analyzer;
mod builtins;
mod diagnostics;
mod scope;
mod types;

pub use analyzer::{analyze, collect_errors, ProgramInfo, SemanticAnalyzer};
pub use builtins::{is_builtin_module, is_reserved, ConsoleMethod, Conversion, BUILTIN_MODULES, RESERVED_NAMES};
pub use diagnostics::Diagnostics;
pub use scope::{SymbolTable, VarInfo};
pub use types::{arithmetic_result, is_compatible, literal_type};
