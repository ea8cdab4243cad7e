//! Lexer implementation using logos

use std::sync::Arc;

use super::token::{LexErrorKind, Token, TokenKind};
use crate::common::{CompileError, CompileResult, LineIndex, Span};
use logos::Logos;

/// Lexer for Idyllium source code
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    file: Arc<str>,
    lines: LineIndex,
    at_eof: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer; `file` only appears in positions and diagnostics
    pub fn new(source: &'a str, file: impl Into<Arc<str>>) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            file: file.into(),
            lines: LineIndex::new(source),
            at_eof: false,
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> CompileResult<Token> {
        if self.at_eof {
            return Ok(self.eof_token());
        }

        match self.inner.next() {
            Some(Ok(TokenKind::IntLiteral(digits))) => Ok(self.number(digits)),
            Some(Ok(kind)) => {
                let lexeme = match &kind {
                    TokenKind::StringLiteral(value) => value.clone(),
                    TokenKind::CharLiteral(value) => value.to_string(),
                    _ => self.inner.slice().to_string(),
                };
                Ok(self.make_token(kind, lexeme))
            }
            Some(Err(kind)) => Err(self.error(kind)),
            None => {
                self.at_eof = true;
                Ok(self.eof_token())
            }
        }
    }

    /// Tokenize the entire source and return all tokens, ending with `Eof`
    pub fn tokenize_all(mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    /// An integer run becomes a float only when `.` is followed by a digit;
    /// otherwise the `.` is left for the next token.
    fn number(&mut self, digits: String) -> Token {
        let rest = self.inner.remainder();
        let mut ahead = rest.chars();
        if ahead.next() == Some('.') && ahead.next().is_some_and(|c| c.is_ascii_digit()) {
            let fraction = rest[1..].bytes().take_while(u8::is_ascii_digit).count();
            self.inner.bump(1 + fraction);
            let text = self.inner.slice().to_string();
            return self.make_token(TokenKind::FloatLiteral(text.clone()), text);
        }
        self.make_token(TokenKind::IntLiteral(digits.clone()), digits)
    }

    fn current_span(&self) -> Span {
        let range = self.inner.span();
        self.lines.span(self.inner.source(), range.start, range.end)
    }

    fn make_token(&self, kind: TokenKind, lexeme: String) -> Token {
        Token::new(kind, lexeme, self.current_span(), &self.file)
    }

    fn eof_token(&self) -> Token {
        let len = self.inner.source().len();
        let span = self.lines.span(self.inner.source(), len, len);
        Token::new(TokenKind::Eof, "", span, &self.file)
    }

    fn error(&self, kind: LexErrorKind) -> CompileError {
        let slice = self.inner.slice();
        let message = match kind {
            LexErrorKind::UnexpectedCharacter if slice.starts_with('!') => {
                "unexpected '!': use '!=' for inequality or 'not' for negation".to_string()
            }
            LexErrorKind::UnexpectedCharacter => {
                let c = slice.chars().next().unwrap_or_default();
                format!("unexpected character '{}'", c)
            }
            other => other.to_string(),
        };
        CompileError::lexer(message, &self.file, self.current_span())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, "test.idyl")
            .tokenize_all()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn scan_error(source: &str) -> CompileError {
        Lexer::new(source, "test.idyl").tokenize_all().unwrap_err()
    }

    #[test]
    fn test_keywords() {
        let source = "use main int float bool char string void if else while for return function true false";
        let mut lexer = Lexer::new(source, "test.idyl");

        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Use));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Main));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Int));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Float));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Bool));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Char));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Str));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Void));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::If));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Else));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::While));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::For));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Return));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Function));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::True));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::False));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Eof));
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            kinds("foo bar_baz _test test123 integer android"),
            vec![
                TokenKind::Identifier("foo".into()),
                TokenKind::Identifier("bar_baz".into()),
                TokenKind::Identifier("_test".into()),
                TokenKind::Identifier("test123".into()),
                TokenKind::Identifier("integer".into()),
                TokenKind::Identifier("android".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 3.14 7. 0.5"),
            vec![
                TokenKind::IntLiteral("42".into()),
                TokenKind::FloatLiteral("3.14".into()),
                TokenKind::IntLiteral("7".into()),
                TokenKind::Dot,
                TokenKind::FloatLiteral("0.5".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_trailing_dot_left_for_member_access() {
        assert_eq!(
            kinds("12.length"),
            vec![
                TokenKind::IntLiteral("12".into()),
                TokenKind::Dot,
                TokenKind::Identifier("length".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators_maximal_munch() {
        assert_eq!(
            kinds("= == != < <= > >= + - * / and or not"),
            vec![
                TokenKind::Assign,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("a<=b"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::LtEq,
                TokenKind::Identifier("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_bare_bang_is_error() {
        let err = scan_error("x = !y;");
        assert!(err.is_syntax());
        assert!(err.message().contains("'!'"));
        assert_eq!(err.span().unwrap().column, 5);
    }

    #[test]
    fn test_unexpected_character() {
        let err = scan_error("int x = 5 % 2;");
        assert_eq!(err.message(), "unexpected character '%'");
    }

    #[test]
    fn test_string_escapes() {
        let tokens = Lexer::new(r#""a\nb\tc\rd\"e\\f\eg""#, "test.idyl")
            .tokenize_all()
            .unwrap();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral("a\nb\tc\rd\"e\\f\x1bg".into()));
        assert_eq!(tokens[0].lexeme, "a\nb\tc\rd\"e\\f\x1bg");
    }

    #[test]
    fn test_unknown_string_escape_is_preserved() {
        assert_eq!(
            kinds(r#""C:\path\q""#),
            vec![TokenKind::StringLiteral("C:\\path\\q".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = scan_error("string s = \"hello;\n");
        assert_eq!(err.message(), "unterminated string literal");
        assert_eq!(err.span().unwrap().line, 1);
        assert_eq!(err.span().unwrap().column, 12);

        let err = scan_error("\"abc\\");
        assert_eq!(err.message(), "unterminated escape sequence in string literal");
    }

    #[test]
    fn test_char_literals() {
        assert_eq!(
            kinds(r"'a' '\n' '\'' '\\' '\t'"),
            vec![
                TokenKind::CharLiteral('a'),
                TokenKind::CharLiteral('\n'),
                TokenKind::CharLiteral('\''),
                TokenKind::CharLiteral('\\'),
                TokenKind::CharLiteral('\t'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_char_literal_errors() {
        assert_eq!(
            scan_error(r"'\e'").message(),
            "unknown escape sequence '\\e' in character literal"
        );
        assert_eq!(
            scan_error("'ab'").message(),
            "character literal must contain exactly one character"
        );
        assert_eq!(scan_error("''").message(), "empty character literal");
        assert_eq!(scan_error("'a").message(), "unterminated character literal");
        assert_eq!(
            scan_error("'\n'").message(),
            "character literal cannot contain a line break"
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("int // line comment\nx / y // trailing"),
            vec![
                TokenKind::Int,
                TokenKind::Identifier("x".into()),
                TokenKind::Slash,
                TokenKind::Identifier("y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let source = "main() {\n  int x = 1;\n}";
        let tokens = Lexer::new(source, "pos.idyl").tokenize_all().unwrap();

        let int = &tokens[4];
        assert_eq!(int.kind, TokenKind::Int);
        assert_eq!((int.line(), int.column()), (2, 3));

        let one = &tokens[7];
        assert_eq!(one.lexeme, "1");
        assert_eq!((one.line(), one.column()), (2, 11));
        assert_eq!(&*one.file, "pos.idyl");

        let eof = tokens.last().unwrap();
        assert_eq!((eof.line(), eof.column()), (3, 2));
    }

    #[test]
    fn test_lexemes_reproduce_source() {
        let source = "use mathlib;\nvoid function f(int n) { n = n * 2 >= 3.5; }\nmain() { console.write(\"x\", 'y'); }";
        let tokens = Lexer::new(source, "test.idyl").tokenize_all().unwrap();

        for token in &tokens {
            match &token.kind {
                TokenKind::StringLiteral(_) | TokenKind::CharLiteral(_) | TokenKind::Eof => {}
                kind => {
                    assert_eq!(&source[token.span.start..token.span.end], token.lexeme);
                    if let Some(fixed) = kind.fixed_lexeme() {
                        assert_eq!(fixed, token.lexeme);
                    }
                }
            }
        }
    }
}
