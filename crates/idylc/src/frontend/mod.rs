//! Idyllium frontend
//!
//! The frontend is responsible for:
//! 1. Lexing source code into tokens
//! 2. Parsing tokens into an AST
//! 3. Performing semantic analysis
//!
//! Each phase consumes only the previous phase's output.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod sema;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::common::CompileResult;

pub use ast::{FunctionDecl, Program};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use sema::{ProgramInfo, SemanticAnalyzer};

/// Configuration options passed to the frontend
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub verbose: bool,
    /// Directory searched for user libraries; defaults to the input's directory
    pub library_dir: Option<PathBuf>,
}

/// Per-file compilation context
#[derive(Debug, Clone)]
pub struct CompileContext {
    /// Source identifier carried by tokens and diagnostics
    pub filename: Arc<str>,
}

impl CompileContext {
    pub fn new(filename: impl Into<Arc<str>>) -> Self {
        Self {
            filename: filename.into(),
        }
    }
}

/// The Idyllium frontend: scan, parse and analyze with optional debug dumps
#[derive(Debug, Clone, Default)]
pub struct IdylliumFrontend {
    config: FrontendConfig,
}

impl IdylliumFrontend {
    pub fn new(config: FrontendConfig) -> Self {
        Self { config }
    }

    /// Run one phase, reporting its duration when `verbose` is set
    fn timed<T>(
        &self,
        phase: &str,
        filename: &str,
        run: impl FnOnce() -> CompileResult<T>,
    ) -> CompileResult<T> {
        let start = Instant::now();
        let result = run();
        if self.config.verbose {
            log::info!("{} {} took {:.2?}", phase, filename, start.elapsed());
        }
        result
    }

    /// Phase 1: lexing
    pub fn scan(&self, source: &str, ctx: &CompileContext) -> CompileResult<Vec<Token>> {
        log::debug!("scanning {}", ctx.filename);
        let tokens = self.timed("scanning", &ctx.filename, || {
            lexer::scan(source, Arc::clone(&ctx.filename))
        })?;

        if self.config.dump_tokens {
            eprintln!("=== Tokens: {} ===", ctx.filename);
            for token in &tokens {
                eprintln!(
                    "{:>4}:{:<3} {:<24} {:?}",
                    token.line(),
                    token.column(),
                    token.kind.to_string(),
                    token.lexeme
                );
            }
            eprintln!("=== End Tokens ===\n");
        }

        log::trace!("{} token(s) in {}", tokens.len(), ctx.filename);
        Ok(tokens)
    }

    /// Phase 2: parsing a program
    pub fn parse(&self, tokens: Vec<Token>, ctx: &CompileContext) -> CompileResult<Program> {
        log::debug!("parsing {}", ctx.filename);
        let program = self.timed("parsing", &ctx.filename, || Parser::new(tokens).parse())?;

        if self.config.dump_ast {
            eprintln!("=== AST: {} ===", ctx.filename);
            eprintln!("{:#?}", program);
            eprintln!("=== End AST ===\n");
        }
        Ok(program)
    }

    /// Phase 2, library mode: only `use` directives and functions
    pub fn parse_library(
        &self,
        tokens: Vec<Token>,
        ctx: &CompileContext,
    ) -> CompileResult<Vec<FunctionDecl>> {
        log::debug!("parsing library {}", ctx.filename);
        let functions = self.timed("parsing library", &ctx.filename, || {
            Parser::new(tokens).parse_as_library()
        })?;

        if self.config.dump_ast {
            eprintln!("=== Library AST: {} ===", ctx.filename);
            eprintln!("{:#?}", functions);
            eprintln!("=== End AST ===\n");
        }
        Ok(functions)
    }

    /// Phase 3: semantic analysis
    pub fn analyze(
        &self,
        program: &Program,
        user_libraries: &BTreeSet<String>,
    ) -> CompileResult<ProgramInfo> {
        log::debug!("analyzing {}", program.file);
        self.timed("analyzing", &program.file, || sema::analyze(program, user_libraries))
    }

    /// Run all three phases over a single program source
    pub fn compile(
        &self,
        source: &str,
        ctx: &CompileContext,
        user_libraries: &BTreeSet<String>,
    ) -> CompileResult<(Program, ProgramInfo)> {
        let tokens = self.scan(source, ctx)?;
        let program = self.parse(tokens, ctx)?;
        let info = self.analyze(&program, user_libraries)?;
        Ok((program, info))
    }
}
