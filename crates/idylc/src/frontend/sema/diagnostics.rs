//! Error accumulation for the analyzer

use crate::common::{CompileError, CompileResult};

/// Collects every error found during a walk; the first one is the one
/// surfaced to the caller.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<CompileError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: CompileError) {
        log::trace!("diagnostic: {}", error);
        self.errors.push(error);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompileError> {
        self.errors.iter()
    }

    /// `Ok` if nothing was reported, otherwise the first error
    pub fn into_result(self) -> CompileResult<()> {
        match self.errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(()),
        }
    }

    pub fn into_errors(self) -> Vec<CompileError> {
        self.errors
    }
}
