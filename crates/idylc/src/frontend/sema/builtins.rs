//! Built-in modules, console methods and conversion functions

use crate::frontend::ast::Type;

/// Modules provided by the runtime; a `use` of any other name refers to a
/// user library file.
pub const BUILTIN_MODULES: [&str; 4] = ["console", "random", "time", "file"];

/// Names that cannot be used for variables
pub const RESERVED_NAMES: [&str; 7] = ["main", "use", "if", "else", "while", "return", "console"];

/// The module whose methods the analyzer knows
pub const CONSOLE: &str = "console";

pub fn is_builtin_module(name: &str) -> bool {
    BUILTIN_MODULES.contains(&name)
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// Methods of the `console` module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleMethod {
    GetInt,
    GetFloat,
    GetString,
    Write,
}

impl ConsoleMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "get_int" => Some(Self::GetInt),
            "get_float" => Some(Self::GetFloat),
            "get_string" => Some(Self::GetString),
            "write" => Some(Self::Write),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::GetInt => "get_int",
            Self::GetFloat => "get_float",
            Self::GetString => "get_string",
            Self::Write => "write",
        }
    }

    /// `None` when any number of arguments is accepted
    pub fn arity(self) -> Option<usize> {
        match self {
            Self::Write => None,
            Self::GetInt | Self::GetFloat | Self::GetString => Some(0),
        }
    }

    pub fn return_type(self) -> Type {
        match self {
            Self::GetInt => Type::Int,
            Self::GetFloat => Type::Float,
            Self::GetString => Type::Str,
            Self::Write => Type::Void,
        }
    }
}

/// Free conversion functions, each taking exactly one argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    ToString,
    ToInt,
    ToFloat,
}

impl Conversion {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "to_string" => Some(Self::ToString),
            "to_int" => Some(Self::ToInt),
            "to_float" => Some(Self::ToFloat),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ToString => "to_string",
            Self::ToInt => "to_int",
            Self::ToFloat => "to_float",
        }
    }

    pub fn return_type(self) -> Type {
        match self {
            Self::ToString => Type::Str,
            Self::ToInt => Type::Int,
            Self::ToFloat => Type::Float,
        }
    }
}
