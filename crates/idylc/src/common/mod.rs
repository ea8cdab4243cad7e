//! Common infrastructure shared across the pipeline stages

mod error;
mod span;

pub use error::{CompileError, CompileResult, DiagnosticReporter};
pub use span::{LineIndex, Span};
