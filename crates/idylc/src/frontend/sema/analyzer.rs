//! Semantic analyzer - scoping and type checking

use std::collections::BTreeSet;
use std::sync::Arc;

use super::builtins::{self, ConsoleMethod, Conversion};
use super::diagnostics::Diagnostics;
use super::scope::{SymbolTable, VarInfo};
use super::types::{arithmetic_result, is_compatible, literal_type};
use crate::common::{CompileError, CompileResult, Span};
use crate::frontend::ast::*;

/// Names gathered from a checked program, needed by later stages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramInfo {
    /// Every module named by a `use` directive
    pub imported_modules: BTreeSet<String>,
    /// Global functions declared in the program, excluding `main`
    pub global_functions: BTreeSet<String>,
    /// User library modules whose calls are accepted
    pub user_libraries: BTreeSet<String>,
}

/// Semantic analyzer for type checking
///
/// Every function is checked against a fresh [`SymbolTable`]; errors are
/// collected over the whole program instead of stopping at the first one.
pub struct SemanticAnalyzer {
    file: Arc<str>,
    info: ProgramInfo,
    diagnostics: Diagnostics,
}

impl SemanticAnalyzer {
    /// `user_libraries` are the library modules resolved by the driver
    pub fn new(user_libraries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            file: Arc::from("<input>"),
            info: ProgramInfo {
                user_libraries: user_libraries.into_iter().map(Into::into).collect(),
                ..ProgramInfo::default()
            },
            diagnostics: Diagnostics::new(),
        }
    }

    /// Analyze a program; the first error found is returned
    pub fn analyze(self, program: &Program) -> CompileResult<ProgramInfo> {
        let (info, diagnostics) = self.check(program);
        for later in diagnostics.iter().skip(1) {
            log::debug!("also found: {}", later);
        }
        diagnostics.into_result()?;
        Ok(info)
    }

    /// Analyze a program and return every error found, in walk order
    pub fn check(mut self, program: &Program) -> (ProgramInfo, Diagnostics) {
        self.file = Arc::clone(&program.file);
        self.collect_declarations(program);

        for func in program.all_functions() {
            self.analyze_function(func);
        }

        log::debug!(
            "analyzed {}: {} function(s), {} error(s)",
            self.file,
            program.functions.len() + 1,
            self.diagnostics.len()
        );
        (self.info, self.diagnostics)
    }

    fn error(&mut self, message: impl Into<String>, span: Span) {
        let error = CompileError::semantic(message, &self.file, span);
        self.diagnostics.push(error);
    }

    /// Pre-pass: imported modules and global function names
    fn collect_declarations(&mut self, program: &Program) {
        for import in &program.imports {
            self.info.imported_modules.insert(import.module.clone());
        }

        for func in &program.functions {
            if !self.info.global_functions.insert(func.name.clone()) {
                self.error(format!("function '{}' is already defined", func.name), func.span);
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn analyze_function(&mut self, func: &FunctionDecl) {
        log::trace!("analyzing function '{}'", func.name);

        let mut scope = SymbolTable::new();
        for param in &func.params {
            let info = VarInfo {
                name: param.name.clone(),
                ty: param.ty,
            };
            if scope.define(info).is_err() {
                self.error(format!("parameter '{}' is already declared", param.name), param.span);
            }
        }

        for stmt in &func.body.statements {
            self.analyze_stmt(stmt, &mut scope);
        }
    }

    fn analyze_stmt(&mut self, stmt: &Stmt, scope: &mut SymbolTable) {
        match &stmt.kind {
            StmtKind::VarDecl(decl) => self.analyze_var_decl(decl, scope),
            StmtKind::Expr(expr) => {
                self.analyze_expr(expr, scope);
            }
            StmtKind::Block(block) => {
                for stmt in &block.statements {
                    self.analyze_stmt(stmt, scope);
                }
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.analyze_expr(condition, scope);
                self.analyze_stmt(then_branch, scope);
                if let Some(else_branch) = else_branch {
                    self.analyze_stmt(else_branch, scope);
                }
            }
            StmtKind::While { condition, body } => {
                self.analyze_expr(condition, scope);
                self.analyze_stmt(body, scope);
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.analyze_expr(value, scope);
                }
            }
        }
    }

    /// The name is bound only when its initializer types and is compatible.
    fn analyze_var_decl(&mut self, decl: &VarDecl, scope: &mut SymbolTable) {
        if builtins::is_reserved(&decl.name) {
            self.error(
                format!("cannot use '{}' as a variable name", decl.name),
                decl.span,
            );
            self.analyze_expr(&decl.init, scope);
            return;
        }

        if scope.contains(&decl.name) {
            self.error(
                format!("variable '{}' is already declared", decl.name),
                decl.span,
            );
            self.analyze_expr(&decl.init, scope);
            return;
        }

        // An untyped initializer has already been reported
        let Some(init_ty) = self.analyze_expr(&decl.init, scope) else {
            return;
        };

        if !is_compatible(decl.ty, init_ty) {
            self.error(
                format!(
                    "cannot assign a value of type '{}' to variable '{}' of type '{}'",
                    init_ty, decl.name, decl.ty
                ),
                decl.init.span,
            );
            return;
        }

        let info = VarInfo {
            name: decl.name.clone(),
            ty: decl.ty,
        };
        // Presence was checked above
        let _ = scope.define(info);
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Type an expression; `None` means it has no usable type.
    fn analyze_expr(&mut self, expr: &Expr, scope: &mut SymbolTable) -> Option<Type> {
        match &expr.kind {
            ExprKind::Literal(literal) => Some(literal_type(literal)),
            ExprKind::Variable(name) => match scope.lookup(name) {
                Some(info) => Some(info.ty),
                None => {
                    self.error(format!("variable '{}' is not declared", name), expr.span);
                    None
                }
            },
            ExprKind::Assign { name, value } => self.analyze_assign(name, value, expr.span, scope),
            ExprKind::Binary { left, op, right } => self.analyze_binary(left, *op, right, expr.span, scope),
            ExprKind::Unary { op, operand } => {
                let ty = self.analyze_expr(operand, scope);
                match op {
                    UnaryOp::Neg if !ty.is_some_and(Type::is_numeric) => {
                        self.error("unary '-' requires a numeric operand", expr.span);
                    }
                    UnaryOp::Not if ty != Some(Type::Bool) => {
                        self.error("operator 'not' requires a bool operand", expr.span);
                    }
                    _ => {}
                }
                ty
            }
            ExprKind::Call { callee, args } => self.analyze_call(callee, args, expr.span, scope),
            ExprKind::Get { object, name } => {
                let object_ty = self.analyze_expr(object, scope);
                (object_ty == Some(Type::Str) && name == "length").then_some(Type::Int)
            }
        }
    }

    /// Yields the target's declared type even when the value does not fit.
    fn analyze_assign(
        &mut self,
        name: &str,
        value: &Expr,
        span: Span,
        scope: &mut SymbolTable,
    ) -> Option<Type> {
        let target_ty = scope.lookup(name).map(|info| info.ty);
        if target_ty.is_none() {
            self.error(format!("variable '{}' is not declared", name), span);
        }

        let value_ty = self.analyze_expr(value, scope);
        let target_ty = target_ty?;

        if let Some(value_ty) = value_ty {
            if !is_compatible(target_ty, value_ty) {
                self.error(
                    format!(
                        "cannot assign a value of type '{}' to variable '{}' of type '{}'",
                        value_ty, name, target_ty
                    ),
                    value.span,
                );
            }
        }
        Some(target_ty)
    }

    /// Comparison and logical operands are not checked.
    fn analyze_binary(
        &mut self,
        left: &Expr,
        op: BinaryOp,
        right: &Expr,
        span: Span,
        scope: &mut SymbolTable,
    ) -> Option<Type> {
        let left_ty = self.analyze_expr(left, scope);
        let right_ty = self.analyze_expr(right, scope);

        if op.is_comparison() {
            return Some(Type::Bool);
        }

        if op.is_arithmetic() {
            let numeric = |ty: Option<Type>| ty.is_some_and(Type::is_numeric);
            if !numeric(left_ty) || !numeric(right_ty) {
                self.error(
                    format!(
                        "operator '{}' requires numeric operands, found {} and {}",
                        op,
                        describe_type(left_ty),
                        describe_type(right_ty)
                    ),
                    span,
                );
            }
            return arithmetic_result(left_ty, right_ty);
        }

        left_ty
    }

    fn analyze_args(&mut self, args: &[Expr], scope: &mut SymbolTable) {
        for arg in args {
            self.analyze_expr(arg, scope);
        }
    }

    fn analyze_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        span: Span,
        scope: &mut SymbolTable,
    ) -> Option<Type> {
        match &callee.kind {
            ExprKind::Get { object, name } => match object.as_variable() {
                Some(module) => self.analyze_module_call(module, name, args, span, scope),
                None => {
                    self.analyze_expr(object, scope);
                    self.analyze_args(args, scope);
                    self.error(
                        format!("invalid call: '.{}' is not a module function", name),
                        span,
                    );
                    None
                }
            },
            ExprKind::Variable(name) => self.analyze_function_call(name, args, span, scope),
            _ => {
                self.analyze_args(args, scope);
                self.error("invalid call: expression is not a function name", span);
                None
            }
        }
    }

    /// `module.method(args)`
    fn analyze_module_call(
        &mut self,
        module: &str,
        method: &str,
        args: &[Expr],
        span: Span,
        scope: &mut SymbolTable,
    ) -> Option<Type> {
        self.analyze_args(args, scope);

        if module == builtins::CONSOLE {
            let Some(method) = ConsoleMethod::from_name(method) else {
                self.error(format!("unknown method '{}.{}'", module, method), span);
                return None;
            };
            if let Some(arity) = method.arity() {
                if args.len() != arity {
                    self.error(
                        format!(
                            "{}.{}() takes no arguments, but {} were given",
                            module,
                            method.name(),
                            args.len()
                        ),
                        span,
                    );
                }
            }
            return Some(method.return_type());
        }

        // Library signatures are not enforced
        if self.info.user_libraries.contains(module) {
            return Some(Type::Void);
        }

        self.error(format!("unknown module '{}'", module), span);
        None
    }

    /// `name(args)`: a conversion or a global function
    fn analyze_function_call(
        &mut self,
        name: &str,
        args: &[Expr],
        span: Span,
        scope: &mut SymbolTable,
    ) -> Option<Type> {
        self.analyze_args(args, scope);

        if let Some(conversion) = Conversion::from_name(name) {
            if args.len() != 1 {
                self.error(
                    format!(
                        "{}() takes exactly one argument, but {} were given",
                        conversion.name(),
                        args.len()
                    ),
                    span,
                );
                return None;
            }
            return Some(conversion.return_type());
        }

        // Global function signatures are not enforced
        if self.info.global_functions.contains(name) {
            return Some(Type::Void);
        }

        self.error(format!("unknown function '{}'", name), span);
        None
    }
}

fn describe_type(ty: Option<Type>) -> String {
    ty.map_or_else(|| "an untyped value".to_string(), |ty| format!("'{}'", ty))
}

/// Analyze `program`, returning the first semantic error if any
pub fn analyze(program: &Program, user_libraries: &BTreeSet<String>) -> CompileResult<ProgramInfo> {
    SemanticAnalyzer::new(user_libraries.iter().cloned()).analyze(program)
}

/// Analyze `program` and return every semantic error found
pub fn collect_errors(program: &Program, user_libraries: &BTreeSet<String>) -> Vec<CompileError> {
    let (_, diagnostics) = SemanticAnalyzer::new(user_libraries.iter().cloned()).check(program);
    diagnostics.into_errors()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::Parser;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Program {
        Parser::from_source(source, "test.idyl").unwrap().parse().unwrap()
    }

    fn errors_with(source: &str, libraries: &[&str]) -> Vec<String> {
        let libraries: BTreeSet<String> = libraries.iter().map(|s| s.to_string()).collect();
        collect_errors(&parse(source), &libraries)
            .iter()
            .map(CompileError::message)
            .collect()
    }

    fn errors(source: &str) -> Vec<String> {
        errors_with(source, &[])
    }

    fn errors_in_main(body: &str) -> Vec<String> {
        errors(&format!("main() {{ {} }}", body))
    }

    #[test]
    fn test_valid_program() {
        let program = parse(
            "use console;
             int function square(int n) { return n * n; }
             main() {
                 int x = console.get_int();
                 float y = x;
                 string s = \"hello\";
                 int len = s.length;
                 bool big = x > 10 and len < 3;
                 if (not big) { console.write(\"small\", x); } else { square(x); }
                 while (x > 0) x = x - 1;
                 y = y * 2.5 + to_float(\"1.5\");
             }",
        );

        let info = analyze(&program, &BTreeSet::new()).unwrap();
        assert_eq!(info.imported_modules, BTreeSet::from(["console".to_string()]));
        assert_eq!(info.global_functions, BTreeSet::from(["square".to_string()]));
        assert!(info.user_libraries.is_empty());
    }

    #[test]
    fn test_arithmetic_result_types() {
        assert_eq!(errors_in_main("int a = 1; int b = 2; int c = a + b;"), Vec::<String>::new());
        assert_eq!(errors_in_main("int a = 1; float b = 2.0; float c = a * b;"), Vec::<String>::new());
        assert_eq!(
            errors_in_main("int a = 1; float b = 2.0; int c = a + b;"),
            vec!["cannot assign a value of type 'float' to variable 'c' of type 'int'"]
        );
    }

    #[test]
    fn test_mixed_operands_promote_regardless_of_order() {
        assert_eq!(
            errors_in_main("int c = -2.5;"),
            vec!["cannot assign a value of type 'float' to variable 'c' of type 'int'"]
        );
        assert_eq!(errors_in_main("float c = -2.5; float d = 1 + c;"), Vec::<String>::new());
        assert_eq!(errors_in_main("int c = -2;"), Vec::<String>::new());
    }

    #[test]
    fn test_non_numeric_operand_reports_once() {
        assert_eq!(
            errors_in_main("string s = \"ab\"; int n = 1; int r = s + n;"),
            vec![
                "operator '+' requires numeric operands, found 'string' and 'int'",
                "cannot assign a value of type 'string' to variable 'r' of type 'int'",
            ]
        );
        assert_eq!(
            errors_in_main("bool b = true; b - 1;"),
            vec!["operator '-' requires numeric operands, found 'bool' and 'int'"]
        );
    }

    #[test]
    fn test_redeclaration_in_nested_block() {
        assert_eq!(
            errors_in_main("int x = 0; if (true) { int x = 1; }"),
            vec!["variable 'x' is already declared"]
        );
        assert_eq!(
            errors_in_main("while (false) { int i = 0; } int i = 1;"),
            vec!["variable 'i' is already declared"]
        );
    }

    #[test]
    fn test_parameter_conflicts_with_local() {
        assert_eq!(
            errors("void function f(int n) { float n = 1.0; } main() { }"),
            vec!["variable 'n' is already declared"]
        );
    }

    #[test]
    fn test_tables_are_per_function() {
        assert_eq!(
            errors("void function f() { int x = 1; } main() { int x = 2; x = x + 1; }"),
            Vec::<String>::new()
        );
        assert_eq!(
            errors("void function f() { int x = 1; } main() { x = 2; }"),
            vec!["variable 'x' is not declared"]
        );
    }

    #[test]
    fn test_initializer_compatibility() {
        assert_eq!(errors_in_main("float f = 1;"), Vec::<String>::new());
        assert_eq!(
            errors_in_main("int i = 1.5;"),
            vec!["cannot assign a value of type 'float' to variable 'i' of type 'int'"]
        );
        assert_eq!(
            errors_in_main("char c = \"ab\";"),
            vec!["cannot assign a value of type 'string' to variable 'c' of type 'char'"]
        );
        assert_eq!(
            errors_in_main("string s = 'a';"),
            vec!["cannot assign a value of type 'char' to variable 's' of type 'string'"]
        );
    }

    #[test]
    fn test_single_character_string_types_as_char() {
        assert_eq!(errors_in_main("char c = \"a\";"), Vec::<String>::new());
        assert_eq!(
            errors_in_main("string s = \"a\";"),
            vec!["cannot assign a value of type 'char' to variable 's' of type 'string'"]
        );
    }

    #[test]
    fn test_reserved_names() {
        assert_eq!(
            errors_in_main("int console = 1;"),
            vec!["cannot use 'console' as a variable name"]
        );
    }

    #[test]
    fn test_console_calls() {
        assert_eq!(errors_in_main("int n = console.get_int();"), Vec::<String>::new());
        assert_eq!(
            errors_in_main("int n = console.get_int(5);"),
            vec!["console.get_int() takes no arguments, but 1 were given"]
        );
        assert_eq!(
            errors_in_main("string s = console.get_float();"),
            vec!["cannot assign a value of type 'float' to variable 's' of type 'string'"]
        );
        assert_eq!(
            errors_in_main("console.read();"),
            vec!["unknown method 'console.read'"]
        );
    }

    #[test]
    fn test_undeclared_assignment_continues_walk() {
        assert_eq!(
            errors_in_main("y = 1; int z = \"text\";"),
            vec![
                "variable 'y' is not declared",
                "cannot assign a value of type 'string' to variable 'z' of type 'int'",
            ]
        );
    }

    #[test]
    fn test_undeclared_names_inside_arguments_are_reported() {
        assert_eq!(
            errors_in_main("console.get_string(a); console.write(b);"),
            vec![
                "variable 'a' is not declared",
                "console.get_string() takes no arguments, but 1 were given",
                "variable 'b' is not declared",
            ]
        );
    }

    #[test]
    fn test_assignment_types() {
        assert_eq!(errors_in_main("float f = 0.0; f = 3;"), Vec::<String>::new());
        assert_eq!(
            errors_in_main("int i = 0; i = 2.5;"),
            vec!["cannot assign a value of type 'float' to variable 'i' of type 'int'"]
        );
        // The assignment still types as the target's type
        assert_eq!(
            errors_in_main("int i = 0; int j = i = 2.5;"),
            vec!["cannot assign a value of type 'float' to variable 'i' of type 'int'"]
        );
    }

    #[test]
    fn test_not_requires_bool() {
        assert_eq!(errors_in_main("bool b = not true;"), Vec::<String>::new());
        assert_eq!(
            errors_in_main("int n = 1; not n;"),
            vec!["operator 'not' requires a bool operand"]
        );
    }

    #[test]
    fn test_comparison_and_logical_operands_unchecked() {
        assert_eq!(errors_in_main("bool b = \"x\" < 3;"), Vec::<String>::new());
        // `and` yields its left operand's type
        assert_eq!(errors_in_main("int n = 1 and true;"), Vec::<String>::new());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(
            errors_in_main("string s = to_string(42); int i = to_int(\"7\"); float f = to_float(i);"),
            Vec::<String>::new()
        );
        assert_eq!(
            errors_in_main("to_int(1, 2);"),
            vec!["to_int() takes exactly one argument, but 2 were given"]
        );
    }

    #[test]
    fn test_wrong_arity_conversion_has_no_type() {
        // No second error for the initializer
        assert_eq!(
            errors_in_main("int i = to_int();"),
            vec!["to_int() takes exactly one argument, but 0 were given"]
        );
        assert_eq!(
            errors_in_main("int i = to_int(); i = 1;"),
            vec![
                "to_int() takes exactly one argument, but 0 were given",
                "variable 'i' is not declared",
            ]
        );
    }

    #[test]
    fn test_global_and_library_calls_return_void() {
        assert_eq!(
            errors_with(
                "use mathlib; void function square(int n) { } main() { int x = square(4); }",
                &["mathlib"]
            ),
            vec!["cannot assign a value of type 'void' to variable 'x' of type 'int'"]
        );
        assert_eq!(
            errors_with("use mathlib; main() { mathlib.anything(1, \"a\"); }", &["mathlib"]),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_unknown_callees() {
        assert_eq!(errors_in_main("foo();"), vec!["unknown function 'foo'"]);
        assert_eq!(errors_in_main("mathlib.f();"), vec!["unknown module 'mathlib'"]);
        assert_eq!(
            errors_in_main("(1 + 2)();"),
            vec!["invalid call: expression is not a function name"]
        );
        assert_eq!(
            errors_in_main("string s = \"ab\"; s.length.x();"),
            vec!["invalid call: '.x' is not a module function"]
        );
    }

    #[test]
    fn test_length_only_on_strings() {
        assert_eq!(errors_in_main("string s = \"abc\"; int n = s.length;"), Vec::<String>::new());
        // `x.length` on a non-string has no type, so nothing more is reported
        assert_eq!(errors_in_main("int x = 1; int n = x.length; n = 1;"), vec!["variable 'n' is not declared"]);
    }

    #[test]
    fn test_duplicate_global_function() {
        assert_eq!(
            errors("void function f() { } int function f() { return 1; } main() { }"),
            vec!["function 'f' is already defined"]
        );
    }

    #[test]
    fn test_first_error_is_surfaced_with_position() {
        let program = parse("main() {\n  int a = b;\n  int c = d;\n}");
        let err = analyze(&program, &BTreeSet::new()).unwrap_err();

        assert!(err.is_semantic());
        assert_eq!(err.message(), "variable 'b' is not declared");
        let span = err.span().unwrap();
        assert_eq!((span.line, span.column), (2, 11));
        assert_eq!(err.file(), Some("test.idyl"));
    }

    #[test]
    fn test_unary_minus_node_checked_if_present() {
        let span = Span::default();
        let operand = Expr::literal(Literal::Bool(true), span);
        let neg = Expr::new(
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            },
            span,
        );
        let body = Block::new(vec![Stmt::new(StmtKind::Expr(neg), span)], span);
        let program = Program::new(Vec::new(), Vec::new(), FunctionDecl::main(body, span), Arc::from("t.idyl"));

        let errors: Vec<String> = collect_errors(&program, &BTreeSet::new())
            .iter()
            .map(CompileError::message)
            .collect();
        assert_eq!(errors, vec!["unary '-' requires a numeric operand"]);
    }
}
