//! Locating user library sources for `use` directives

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::common::{CompileError, CompileResult};

/// Extension of Idyllium source files
pub const SOURCE_EXTENSION: &str = "idyl";

/// A library's source text and the identifier used in its diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySource {
    pub name: String,
    pub filename: String,
    pub source: String,
}

/// Maps a module name from `use <name>;` to its source text
pub trait LibraryResolver {
    fn resolve(&self, name: &str) -> CompileResult<LibrarySource>;
}

/// Looks up `<dir>/<name>.idyl` on disk
#[derive(Debug, Clone)]
pub struct FsLibraryResolver {
    dir: PathBuf,
}

impl FsLibraryResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve libraries next to `input`
    pub fn beside(input: &Path) -> Self {
        let dir = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name).with_extension(SOURCE_EXTENSION)
    }
}

impl LibraryResolver for FsLibraryResolver {
    fn resolve(&self, name: &str) -> CompileResult<LibrarySource> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(CompileError::library_not_found(name, path));
        }

        log::debug!("reading library '{}' from {}", name, path.display());
        let source = std::fs::read_to_string(&path)
            .map_err(|e| CompileError::library_read(name, &path, e))?;
        Ok(LibrarySource {
            name: name.to_string(),
            filename: path.display().to_string(),
            source,
        })
    }
}

/// Library sources held in memory, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryLibraryResolver {
    libraries: HashMap<String, String>,
}

impl MemoryLibraryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.libraries.insert(name.into(), source.into());
    }

    pub fn with_library(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }
}

impl LibraryResolver for MemoryLibraryResolver {
    fn resolve(&self, name: &str) -> CompileResult<LibrarySource> {
        let filename = format!("{}.{}", name, SOURCE_EXTENSION);
        match self.libraries.get(name) {
            Some(source) => Ok(LibrarySource {
                name: name.to_string(),
                filename,
                source: source.clone(),
            }),
            None => Err(CompileError::library_not_found(name, filename)),
        }
    }
}
