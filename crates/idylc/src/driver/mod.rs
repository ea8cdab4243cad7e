//! Compilation driver and pipeline orchestration

mod library;

use std::collections::{BTreeMap, BTreeSet};

use crate::common::{CompileResult, DiagnosticReporter};
use crate::frontend::ast::{FunctionDecl, Program};
use crate::frontend::lexer::{Token, TokenKind};
use crate::frontend::sema::{is_builtin_module, ProgramInfo};
use crate::frontend::{CompileContext, FrontendConfig, IdylliumFrontend};

pub use library::{
    FsLibraryResolver, LibraryResolver, LibrarySource, MemoryLibraryResolver, SOURCE_EXTENSION,
};

/// A program that passed every check, ready for emission
#[derive(Debug, Clone)]
pub struct CheckedProgram {
    pub program: Program,
    pub info: ProgramInfo,
    /// Parsed functions of each user library, by module name
    pub libraries: BTreeMap<String, Vec<FunctionDecl>>,
}

/// Compilation pipeline: libraries first, then the program itself
pub struct Pipeline<R> {
    frontend: IdylliumFrontend,
    resolver: R,
}

impl<R: LibraryResolver> Pipeline<R> {
    pub fn new(config: FrontendConfig, resolver: R) -> Self {
        Self {
            frontend: IdylliumFrontend::new(config),
            resolver,
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Compile one program source.
    ///
    /// Every file read along the way is registered with `reporter`, so an
    /// error in a library renders against that library's text.
    pub fn compile(
        &self,
        source: &str,
        filename: &str,
        reporter: &mut DiagnosticReporter,
    ) -> CompileResult<CheckedProgram> {
        reporter.add_file(filename, source);
        let ctx = CompileContext::new(filename);

        let tokens = self.frontend.scan(source, &ctx)?;
        let libraries = self.load_libraries(&leading_imports(&tokens), reporter)?;
        let program = self.frontend.parse(tokens, &ctx)?;

        let names: BTreeSet<String> = libraries.keys().cloned().collect();
        let info = self.frontend.analyze(&program, &names)?;

        log::debug!(
            "{}: {} import(s), {} global function(s), {} user librar(ies)",
            filename,
            info.imported_modules.len(),
            info.global_functions.len(),
            info.user_libraries.len()
        );
        Ok(CheckedProgram {
            program,
            info,
            libraries,
        })
    }

    /// Resolve and parse every imported module that is not built in
    fn load_libraries(
        &self,
        imports: &[String],
        reporter: &mut DiagnosticReporter,
    ) -> CompileResult<BTreeMap<String, Vec<FunctionDecl>>> {
        let mut libraries = BTreeMap::new();

        for name in imports {
            if is_builtin_module(name) || libraries.contains_key(name) {
                continue;
            }

            let library = self.resolver.resolve(name)?;
            reporter.add_file(&library.filename, &library.source);

            let ctx = CompileContext::new(library.filename.as_str());
            let tokens = self.frontend.scan(&library.source, &ctx)?;
            let functions = self.frontend.parse_library(tokens, &ctx)?;

            log::debug!(
                "loaded library '{}' from {} ({} function(s))",
                name,
                library.filename,
                functions.len()
            );
            libraries.insert(name.clone(), functions);
        }

        Ok(libraries)
    }
}

impl Pipeline<FsLibraryResolver> {
    /// A pipeline resolving libraries from `config.library_dir`, or next to `input`
    pub fn for_input(config: FrontendConfig, input: &std::path::Path) -> Self {
        let resolver = match &config.library_dir {
            Some(dir) => FsLibraryResolver::new(dir.clone()),
            None => FsLibraryResolver::beside(input),
        };
        Self::new(config, resolver)
    }
}

/// Module names from the `use` directives at the start of a token stream.
///
/// Collection stops at the first token sequence that is not `use <name>;`;
/// the parser reports any malformed directive.
pub fn leading_imports(tokens: &[Token]) -> Vec<String> {
    let mut imports = Vec::new();
    for window in tokens.chunks(3) {
        match window {
            [
                Token { kind: TokenKind::Use, .. },
                Token { kind: TokenKind::Identifier(name), .. },
                Token { kind: TokenKind::Semi, .. },
            ] => imports.push(name.clone()),
            _ => break,
        }
    }
    imports
}
