//! Idyllium compiler front end
//!
//! This library scans, parses and checks programs written in Idyllium, a
//! small statically-typed teaching language.
//!
//! ## Architecture
//!
//! The compiler is organized into:
//! - **Frontend** (`frontend/`): lexer, parser, AST and semantic analysis
//! - **Driver** (`driver/`): library resolution and the compilation pipeline
//! - **Common** (`common/`): shared infrastructure (errors, spans)

pub mod common;
pub mod driver;
pub mod frontend;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, DiagnosticReporter, Span};
pub use driver::{CheckedProgram, FsLibraryResolver, LibraryResolver, MemoryLibraryResolver, Pipeline};
pub use frontend::{CompileContext, FrontendConfig, IdylliumFrontend};
