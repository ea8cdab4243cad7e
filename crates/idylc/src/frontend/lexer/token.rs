//! Token definitions for the Idyllium lexer

use std::fmt;
use std::sync::Arc;

use crate::common::Span;
use logos::Logos;
use thiserror::Error;

/// Token with source location
///
/// `lexeme` is the exact source text of the token, except for string and
/// character literals where it holds the decoded value.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
    pub file: Arc<str>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span, file: &Arc<str>) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
            file: Arc::clone(file),
        }
    }

    pub fn line(&self) -> u32 {
        self.span.line
    }

    pub fn column(&self) -> u32 {
        self.span.column
    }
}

/// Faults raised while matching a single token
#[derive(Error, Debug, Clone, PartialEq, Default)]
pub enum LexErrorKind {
    #[default]
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated escape sequence in string literal")]
    UnterminatedEscape,
    #[error("unterminated character literal")]
    UnterminatedChar,
    #[error("empty character literal")]
    EmptyChar,
    #[error("character literal cannot contain a line break")]
    NewlineInChar,
    #[error("character literal must contain exactly one character")]
    MultiCharLiteral,
    #[error("unknown escape sequence '\\{0}' in character literal")]
    UnknownCharEscape(char),
}

/// All token kinds in Idyllium
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n]+")] // Skip whitespace
#[logos(skip r"//[^\n]*")] // Skip line comments
pub enum TokenKind {
    // === Keywords ===
    #[token("use")]
    Use,
    #[token("main")]
    Main,
    #[token("int")]
    Int,
    #[token("float")]
    Float,
    #[token("bool")]
    Bool,
    #[token("char")]
    Char,
    /// The `string` type keyword
    #[token("string")]
    Str,
    #[token("void")]
    Void,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("return")]
    Return,
    #[token("function")]
    Function,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Word operators
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,

    // === Identifiers ===
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // === Literals ===
    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    IntLiteral(String),

    /// Produced by the scanner when an integer run continues with `.digit`
    FloatLiteral(String),

    #[token("\"", lex_string)]
    StringLiteral(String),

    #[token("'", lex_char)]
    CharLiteral(char),

    // === Operators ===
    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,

    // Special
    Eof,
}

/// Decode a string literal body; the opening quote is already matched.
///
/// Unknown escapes are kept verbatim (`\q` stays `\q`).
fn lex_string<'s>(lex: &mut logos::Lexer<'s, TokenKind>) -> Result<String, LexErrorKind> {
    let remainder: &'s str = lex.remainder();
    let mut value = String::new();
    let mut chars = remainder.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                lex.bump(i + 1);
                return Ok(value);
            }
            '\\' => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, 'r')) => value.push('\r'),
                Some((_, '"')) => value.push('"'),
                Some((_, '\\')) => value.push('\\'),
                Some((_, 'e')) => value.push('\x1b'),
                Some((_, other)) => {
                    value.push('\\');
                    value.push(other);
                }
                None => {
                    lex.bump(remainder.len());
                    return Err(LexErrorKind::UnterminatedEscape);
                }
            },
            _ => value.push(c),
        }
    }

    lex.bump(remainder.len());
    Err(LexErrorKind::UnterminatedString)
}

/// Decode a character literal body; the opening quote is already matched.
fn lex_char<'s>(lex: &mut logos::Lexer<'s, TokenKind>) -> Result<char, LexErrorKind> {
    let remainder: &'s str = lex.remainder();
    let mut chars = remainder.char_indices();

    let (value, consumed) = match chars.next() {
        None => return Err(LexErrorKind::UnterminatedChar),
        Some((_, '\'')) => {
            lex.bump(1);
            return Err(LexErrorKind::EmptyChar);
        }
        Some((_, '\n')) => {
            lex.bump(1);
            return Err(LexErrorKind::NewlineInChar);
        }
        Some((_, '\\')) => match chars.next() {
            None => {
                lex.bump(remainder.len());
                return Err(LexErrorKind::UnterminatedChar);
            }
            Some((i, escape)) => {
                let consumed = i + escape.len_utf8();
                let value = match escape {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '\'' => '\'',
                    '"' => '"',
                    other => {
                        lex.bump(consumed);
                        return Err(LexErrorKind::UnknownCharEscape(other));
                    }
                };
                (value, consumed)
            }
        },
        Some((_, c)) => (c, c.len_utf8()),
    };

    match remainder[consumed..].chars().next() {
        Some('\'') => {
            lex.bump(consumed + 1);
            Ok(value)
        }
        None => {
            lex.bump(consumed);
            Err(LexErrorKind::UnterminatedChar)
        }
        Some(_) => {
            lex.bump(consumed);
            Err(LexErrorKind::MultiCharLiteral)
        }
    }
}

impl TokenKind {
    /// Check if this token names one of the primitive types
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Float
                | TokenKind::Bool
                | TokenKind::Char
                | TokenKind::Str
                | TokenKind::Void
        )
    }

    /// Return types that may open a global function declaration.
    ///
    /// `char` is deliberately absent: a top-level `char` is not a function start.
    pub fn can_start_function(&self) -> bool {
        matches!(
            self,
            TokenKind::Void | TokenKind::Int | TokenKind::Float | TokenKind::Str | TokenKind::Bool
        )
    }

    /// Fixed spelling of keyword, operator and punctuation tokens
    pub fn fixed_lexeme(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Use => "use",
            TokenKind::Main => "main",
            TokenKind::Int => "int",
            TokenKind::Float => "float",
            TokenKind::Bool => "bool",
            TokenKind::Char => "char",
            TokenKind::Str => "string",
            TokenKind::Void => "void",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::Return => "return",
            TokenKind::Function => "function",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Dot => ".",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Colon => ":",
            TokenKind::Identifier(_)
            | TokenKind::IntLiteral(_)
            | TokenKind::FloatLiteral(_)
            | TokenKind::StringLiteral(_)
            | TokenKind::CharLiteral(_)
            | TokenKind::Eof => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.fixed_lexeme() {
            return write!(f, "'{}'", text);
        }
        match self {
            TokenKind::Identifier(s) => write!(f, "identifier '{}'", s),
            TokenKind::IntLiteral(s) => write!(f, "integer '{}'", s),
            TokenKind::FloatLiteral(s) => write!(f, "float '{}'", s),
            TokenKind::StringLiteral(s) => write!(f, "string {:?}", s),
            TokenKind::CharLiteral(c) => write!(f, "character {:?}", c),
            TokenKind::Eof => write!(f, "end of file"),
            _ => write!(f, "{:?}", self),
        }
    }
}
