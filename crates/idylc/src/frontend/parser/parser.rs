//! Recursive descent parser for Idyllium

use std::sync::Arc;

use super::suggest::closest_type;
use crate::common::{CompileError, CompileResult, Span};
use crate::frontend::ast::*;
use crate::frontend::lexer::{self, Token, TokenKind};

/// Deepest nesting of statements and expressions the parser descends into.
/// A parenthesized operand costs two levels.
const MAX_DEPTH: usize = 128;

/// Recursive descent parser for Idyllium
///
/// Fails fast: the first grammatical violation is returned as a syntax error
/// and nothing after it is examined.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    file: Arc<str>,
    depth: usize,
}

impl Parser {
    /// Create a parser over a token sequence produced by the lexer
    pub fn new(mut tokens: Vec<Token>) -> Self {
        let file = tokens
            .first()
            .map_or_else(|| Arc::from("<input>"), |t| Arc::clone(&t.file));

        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let span = tokens.last().map_or_else(Span::default, |t| {
                Span::new(t.span.end, t.span.end, t.span.line, t.span.column)
            });
            tokens.push(Token::new(TokenKind::Eof, "", span, &file));
        }

        Self {
            tokens,
            pos: 0,
            file,
            depth: 0,
        }
    }

    /// Scan `source` and create a parser over the result
    pub fn from_source(source: &str, file: impl Into<Arc<str>>) -> CompileResult<Self> {
        Ok(Self::new(lexer::scan(source, file)?))
    }

    /// Parse a complete program: imports, global functions, `main`, end of input
    pub fn parse(&mut self) -> CompileResult<Program> {
        let mut imports = Vec::new();
        while self.check(&TokenKind::Use) {
            imports.push(self.parse_use()?);
        }

        let mut functions = Vec::new();
        while self.at_function_start() {
            functions.push(self.parse_function()?);
        }

        if !self.check(&TokenKind::Main) {
            return Err(self.error_at_current("expected 'main' function"));
        }
        let main = self.parse_main()?;

        if !self.at_end() {
            return Err(self.error_at_current("expected end of file after main()"));
        }

        Ok(Program::new(imports, functions, main, Arc::clone(&self.file)))
    }

    /// Parse a library file: only `use` directives and function declarations.
    ///
    /// A library's own `use` directives are accepted but not returned.
    pub fn parse_as_library(&mut self) -> CompileResult<Vec<FunctionDecl>> {
        let mut functions = Vec::new();

        while !self.at_end() {
            if self.check(&TokenKind::Use) {
                self.parse_use()?;
            } else if self.at_function_start() {
                functions.push(self.parse_function()?);
            } else {
                return Err(self.error_at_current(
                    "only functions and 'use' directives are allowed in a library",
                ));
            }
        }

        Ok(functions)
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_next(&self) -> &TokenKind {
        let next = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[next].kind
    }

    fn at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.at_end() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> CompileResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            let message = if context.is_empty() {
                format!("expected {}", kind)
            } else {
                format!("expected {} {}", kind, context)
            };
            Err(self.error_at_current(&message))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> CompileResult<(String, Span)> {
        if let TokenKind::Identifier(name) = &self.current().kind {
            let name = name.clone();
            let token = self.advance();
            Ok((name, token.span))
        } else {
            Err(self.error_at_current(&format!("expected {}", what)))
        }
    }

    /// "<message>, found <token>" positioned at the current token
    fn error_at_current(&self, message: &str) -> CompileError {
        let token = self.current();
        CompileError::parser(format!("{}, found {}", message, token.kind), &token.file, token.span)
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> CompileError {
        CompileError::parser(message, &token.file, token.span)
    }

    fn unknown_type_error(&self, token: &Token, name: &str) -> CompileError {
        match closest_type(name) {
            Some(suggestion) => self.error_at(
                token,
                format!("unknown type '{}'. Did you mean '{}'?", name, suggestion),
            ),
            None => self.error_at(token, format!("unknown type '{}'", name)),
        }
    }

    /// Run `parse` one nesting level deeper; past [`MAX_DEPTH`] the input is
    /// rejected instead of recursing further.
    fn nested<T>(
        &mut self,
        what: &str,
        parse: impl FnOnce(&mut Self) -> CompileResult<T>,
    ) -> CompileResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error_at(self.current(), format!("{} nested too deeply", what)));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// A function starts with a return type, or with a misspelled one
    /// directly followed by `function`.
    fn at_function_start(&self) -> bool {
        self.current().kind.can_start_function()
            || (matches!(self.current().kind, TokenKind::Identifier(_))
                && matches!(self.peek_next(), TokenKind::Function))
    }

    // =========================================================================
    // Top-level declarations
    // =========================================================================

    fn parse_use(&mut self) -> CompileResult<UseDecl> {
        let start = self.expect(TokenKind::Use, "")?.span;
        let (module, _) = self.expect_identifier("module name after 'use'")?;
        let semi = self.expect(TokenKind::Semi, "after module name")?;
        Ok(UseDecl::new(module, start.merge(semi.span)))
    }

    fn parse_type(&mut self) -> CompileResult<Type> {
        let token = self.current().clone();
        if let Some(ty) = type_of_keyword(&token.kind) {
            self.advance();
            return Ok(ty);
        }
        match &token.kind {
            TokenKind::Identifier(name) => Err(self.unknown_type_error(&token, name)),
            _ => Err(self.error_at_current("expected type name")),
        }
    }

    /// `<type> function <name>(<type> <name>?) { ... }`
    ///
    /// At most one parameter is part of the grammar.
    fn parse_function(&mut self) -> CompileResult<FunctionDecl> {
        let start = self.current().span;
        let return_type = self.parse_type()?;
        self.expect(TokenKind::Function, "after return type")?;
        let (name, _) = self.expect_identifier("function name")?;
        self.expect(TokenKind::LParen, "after function name")?;

        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            let param_start = self.current().span;
            let ty = self.parse_type()?;
            let (param_name, name_span) = self.expect_identifier("parameter name")?;
            params.push(Param::new(ty, param_name, param_start.merge(name_span)));

            if self.check(&TokenKind::Comma) {
                let comma = self.current().clone();
                return Err(self.error_at(
                    &comma,
                    format!("function '{}' may declare at most one parameter", name),
                ));
            }
        }
        self.expect(TokenKind::RParen, "after parameters")?;

        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Ok(FunctionDecl::new(name, return_type, params, body, span))
    }

    /// `main() { ... }`
    fn parse_main(&mut self) -> CompileResult<FunctionDecl> {
        let start = self.expect(TokenKind::Main, "")?.span;
        self.expect(TokenKind::LParen, "after 'main'")?;
        self.expect(TokenKind::RParen, "after '('")?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Ok(FunctionDecl::main(body, span))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_block(&mut self) -> CompileResult<Block> {
        let start = self.expect(TokenKind::LBrace, "to open a block")?.span;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            statements.push(self.parse_declaration()?);
        }

        let end = self.expect(TokenKind::RBrace, "to close the block")?.span;
        Ok(Block::new(statements, start.merge(end)))
    }

    fn parse_declaration(&mut self) -> CompileResult<Stmt> {
        if self.current().kind.is_type_keyword() {
            return self.parse_var_decl();
        }

        // `floot x;` reads as a declaration with a misspelled type
        if let TokenKind::Identifier(name) = &self.current().kind {
            if matches!(self.peek_next(), TokenKind::Identifier(_) | TokenKind::Semi) {
                let name = name.clone();
                let token = self.current().clone();
                return Err(self.unknown_type_error(&token, &name));
            }
        }

        self.parse_statement()
    }

    fn parse_var_decl(&mut self) -> CompileResult<Stmt> {
        let type_token = self.current().clone();
        let ty = self.parse_type()?;
        let (name, name_span) = self.expect_identifier("variable name")?;

        let Some(default) = ty.default_literal() else {
            return Err(self.error_at(
                &type_token,
                format!("variable '{}' cannot have type 'void'", name),
            ));
        };

        let init = if self.match_token(&TokenKind::Assign) {
            self.parse_expression()?
        } else {
            Expr::literal(default, name_span)
        };

        let semi = self.expect(TokenKind::Semi, "after variable declaration")?;
        let span = type_token.span.merge(semi.span);
        Ok(Stmt::new(StmtKind::VarDecl(VarDecl::new(ty, name, init, span)), span))
    }

    fn parse_statement(&mut self) -> CompileResult<Stmt> {
        self.nested("statement", Self::parse_statement_kind)
    }

    fn parse_statement_kind(&mut self) -> CompileResult<Stmt> {
        match &self.current().kind {
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                let span = block.span;
                Ok(Stmt::new(StmtKind::Block(block), span))
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_if_statement(&mut self) -> CompileResult<Stmt> {
        let start = self.expect(TokenKind::If, "")?.span;
        self.expect(TokenKind::LParen, "after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "after condition")?;

        let then_branch = Box::new(self.parse_statement()?);
        let mut span = start.merge(then_branch.span);

        let else_branch = if self.match_token(&TokenKind::Else) {
            let branch = self.parse_statement()?;
            span = span.merge(branch.span);
            Some(Box::new(branch))
        } else {
            None
        };

        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    fn parse_while_statement(&mut self) -> CompileResult<Stmt> {
        let start = self.expect(TokenKind::While, "")?.span;
        self.expect(TokenKind::LParen, "after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "after condition")?;

        let body = Box::new(self.parse_statement()?);
        let span = start.merge(body.span);
        Ok(Stmt::new(StmtKind::While { condition, body }, span))
    }

    fn parse_return_statement(&mut self) -> CompileResult<Stmt> {
        let start = self.expect(TokenKind::Return, "")?.span;

        let value = if self.check(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        let semi = self.expect(TokenKind::Semi, "after return")?;
        Ok(Stmt::new(StmtKind::Return(value), start.merge(semi.span)))
    }

    fn parse_expression_statement(&mut self) -> CompileResult<Stmt> {
        let expr = self.parse_expression()?;
        let semi = self.expect(TokenKind::Semi, "after expression")?;
        let span = expr.span.merge(semi.span);
        Ok(Stmt::new(StmtKind::Expr(expr), span))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression(&mut self) -> CompileResult<Expr> {
        self.parse_assignment()
    }

    /// Right-associative; only a bare variable may be assigned.
    fn parse_assignment(&mut self) -> CompileResult<Expr> {
        let expr = self.parse_logical_or()?;

        if self.check(&TokenKind::Assign) {
            let eq = self.advance();
            let ExprKind::Variable(name) = &expr.kind else {
                return Err(self.error_at(
                    &eq,
                    format!("invalid assignment target: cannot assign to {}", describe(&expr)),
                ));
            };
            let name = name.clone();
            let value = self.parse_assignment()?;
            let span = expr.span.merge(value.span);
            return Ok(Expr::new(
                ExprKind::Assign {
                    name,
                    value: Box::new(value),
                },
                span,
            ));
        }

        Ok(expr)
    }

    /// Consume the current token if it is one of the listed operators
    fn match_binary_op(&mut self, ops: &[(TokenKind, BinaryOp)]) -> Option<BinaryOp> {
        let op = ops
            .iter()
            .find(|(kind, _)| self.check(kind))
            .map(|(_, op)| *op)?;
        self.advance();
        Some(op)
    }

    fn parse_logical_or(&mut self) -> CompileResult<Expr> {
        let mut expr = self.parse_logical_and()?;
        while let Some(op) = self.match_binary_op(&[(TokenKind::Or, BinaryOp::Or)]) {
            let right = self.parse_logical_and()?;
            expr = Expr::binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_logical_and(&mut self) -> CompileResult<Expr> {
        let mut expr = self.parse_equality()?;
        while let Some(op) = self.match_binary_op(&[(TokenKind::And, BinaryOp::And)]) {
            let right = self.parse_equality()?;
            expr = Expr::binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> CompileResult<Expr> {
        let mut expr = self.parse_comparison()?;
        while let Some(op) = self.match_binary_op(&[
            (TokenKind::EqEq, BinaryOp::Eq),
            (TokenKind::NotEq, BinaryOp::Ne),
        ]) {
            let right = self.parse_comparison()?;
            expr = Expr::binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> CompileResult<Expr> {
        let mut expr = self.parse_term()?;
        while let Some(op) = self.match_binary_op(&[
            (TokenKind::Lt, BinaryOp::Lt),
            (TokenKind::LtEq, BinaryOp::Le),
            (TokenKind::Gt, BinaryOp::Gt),
            (TokenKind::GtEq, BinaryOp::Ge),
        ]) {
            let right = self.parse_term()?;
            expr = Expr::binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> CompileResult<Expr> {
        let mut expr = self.parse_factor()?;
        while let Some(op) = self.match_binary_op(&[
            (TokenKind::Plus, BinaryOp::Add),
            (TokenKind::Minus, BinaryOp::Sub),
        ]) {
            let right = self.parse_factor()?;
            expr = Expr::binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> CompileResult<Expr> {
        let mut expr = self.parse_unary()?;
        while let Some(op) = self.match_binary_op(&[
            (TokenKind::Star, BinaryOp::Mul),
            (TokenKind::Slash, BinaryOp::Div),
        ]) {
            let right = self.parse_unary()?;
            expr = Expr::binary(expr, op, right);
        }
        Ok(expr)
    }

    /// `not x` stays a unary node; `-x` becomes `0 - x`.
    fn parse_unary(&mut self) -> CompileResult<Expr> {
        self.nested("expression", Self::parse_prefix)
    }

    fn parse_prefix(&mut self) -> CompileResult<Expr> {
        if self.check(&TokenKind::Not) {
            let start = self.advance().span;
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                span,
            ));
        }

        if self.check(&TokenKind::Minus) {
            let minus = self.advance().span;
            let operand = self.parse_unary()?;
            let zero = Expr::literal(Literal::Int(0), minus);
            return Ok(Expr::binary(zero, BinaryOp::Sub, operand));
        }

        self.parse_call()
    }

    /// Postfix chains of calls and member accesses: `a.b(c).d`
    fn parse_call(&mut self) -> CompileResult<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.match_token(&TokenKind::LParen) {
                let args = self.parse_arguments()?;
                let close = self.expect(TokenKind::RParen, "after arguments")?;
                let span = expr.span.merge(close.span);
                expr = Expr::new(
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    span,
                );
            } else if self.match_token(&TokenKind::Dot) {
                let (name, name_span) = self.expect_identifier("property name after '.'")?;
                let span = expr.span.merge(name_span);
                expr = Expr::new(
                    ExprKind::Get {
                        object: Box::new(expr),
                        name,
                    },
                    span,
                );
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_arguments(&mut self) -> CompileResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> CompileResult<Expr> {
        let token = self.current().clone();
        let literal = match &token.kind {
            TokenKind::IntLiteral(text) => Literal::Int(text.parse().map_err(|_| {
                self.error_at(&token, format!("integer literal '{}' is too large", text))
            })?),
            TokenKind::FloatLiteral(text) => Literal::Float(text.parse().map_err(|_| {
                self.error_at(&token, format!("invalid float literal '{}'", text))
            })?),
            TokenKind::StringLiteral(value) => Literal::Str(value.clone()),
            TokenKind::CharLiteral(value) => Literal::Char(*value),
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            TokenKind::Identifier(name) => {
                self.advance();
                return Ok(Expr::variable(name.clone(), token.span));
            }
            TokenKind::LParen => {
                self.advance();
                return self.nested("expression", |parser| {
                    let expr = parser.parse_expression()?;
                    parser.expect(TokenKind::RParen, "after expression")?;
                    Ok(expr)
                });
            }
            _ => return Err(self.error_at_current("expected expression")),
        };

        self.advance();
        Ok(Expr::literal(literal, token.span))
    }
}

fn type_of_keyword(kind: &TokenKind) -> Option<Type> {
    match kind {
        TokenKind::Int => Some(Type::Int),
        TokenKind::Float => Some(Type::Float),
        TokenKind::Bool => Some(Type::Bool),
        TokenKind::Char => Some(Type::Char),
        TokenKind::Str => Some(Type::Str),
        TokenKind::Void => Some(Type::Void),
        _ => None,
    }
}

/// Human-readable name of an expression form, for diagnostics
fn describe(expr: &Expr) -> &'static str {
    match &expr.kind {
        ExprKind::Literal(_) => "a literal",
        ExprKind::Variable(_) => "a variable",
        ExprKind::Assign { .. } => "an assignment",
        ExprKind::Binary { .. } => "a binary expression",
        ExprKind::Unary { .. } => "a unary expression",
        ExprKind::Call { .. } => "a function call",
        ExprKind::Get { .. } => "a member access",
    }
}
