//! Parser module for building the Idyllium AST

mod parser;
mod suggest;

pub use parser::Parser;
pub use suggest::{closest_type, levenshtein};
