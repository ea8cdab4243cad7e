//! Symbol table for a single function analysis

use std::collections::HashMap;

use crate::frontend::ast::Type;

/// A declared variable or parameter
#[derive(Debug, Clone, PartialEq)]
pub struct VarInfo {
    pub name: String,
    pub ty: Type,
}

/// Flat variable table owned by one function analysis.
///
/// Blocks nested in the function share this table, so a name can be
/// declared only once per function.
#[derive(Debug, Default)]
pub struct SymbolTable {
    variables: HashMap<String, VarInfo>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name; fails with the existing entry if it is already declared.
    pub fn define(&mut self, info: VarInfo) -> Result<(), &VarInfo> {
        if self.variables.contains_key(&info.name) {
            return Err(&self.variables[&info.name]);
        }
        self.variables.insert(info.name.clone(), info);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&VarInfo> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
