//! Primitive types of the language

use std::fmt;

use super::Literal;

/// The fixed set of primitive types; there are no user-defined types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    Int,
    Float,
    Bool,
    Char,
    Str,
    Void,
}

impl Type {
    /// Every type name, in the order used for typo suggestions
    pub const ALL: [Type; 6] = [
        Type::Int,
        Type::Float,
        Type::Bool,
        Type::Char,
        Type::Str,
        Type::Void,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Float => "float",
            Type::Bool => "bool",
            Type::Char => "char",
            Type::Str => "string",
            Type::Void => "void",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// Value given to a variable declared without an initializer.
    /// `void` has none.
    pub fn default_literal(self) -> Option<Literal> {
        match self {
            Type::Int => Some(Literal::Int(0)),
            Type::Float => Some(Literal::Float(0.0)),
            Type::Bool => Some(Literal::Bool(false)),
            Type::Char => Some(Literal::Char('\0')),
            Type::Str => Some(Literal::Str(String::new())),
            Type::Void => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
