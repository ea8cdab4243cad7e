//! Typing rules shared by the analyzer

use crate::frontend::ast::{Literal, Type};

/// Whether a value of type `actual` may be stored where `expected` is declared.
///
/// The only widening is `int` to `float`; `char` and `string` stay distinct.
pub fn is_compatible(expected: Type, actual: Type) -> bool {
    expected == actual || (expected == Type::Float && actual == Type::Int)
}

/// Static type of a literal.
///
/// A string literal of exactly one character types as `char`.
pub fn literal_type(literal: &Literal) -> Type {
    match literal {
        Literal::Int(_) => Type::Int,
        Literal::Float(_) => Type::Float,
        Literal::Bool(_) => Type::Bool,
        Literal::Char(_) => Type::Char,
        Literal::Str(s) if s.chars().count() == 1 => Type::Char,
        Literal::Str(_) => Type::Str,
    }
}

/// Result type of `+ - * /`.
///
/// Mixed `int`/`float` operands promote to `float` whichever side the
/// `float` is on, so `int c = -2.5;` (parsed as `0 - 2.5`) does not type as
/// `int`. Only when an operand is not numeric does the left operand's type
/// pass through unchanged.
pub fn arithmetic_result(left: Option<Type>, right: Option<Type>) -> Option<Type> {
    match (left, right) {
        (Some(l), Some(r)) if l.is_numeric() && r.is_numeric() => {
            if l == Type::Float || r == Type::Float {
                Some(Type::Float)
            } else {
                Some(Type::Int)
            }
        }
        _ => left,
    }
}
