//! End-to-end checks through the public pipeline

use idyl_compiler::common::{CompileError, DiagnosticReporter};
use idyl_compiler::driver::{MemoryLibraryResolver, Pipeline};
use idyl_compiler::frontend::FrontendConfig;
use pretty_assertions::assert_eq;

const MATHLIB: &str = "
use console;

int function square(int n) {
    return n * n;
}

void function show(string text) {
    console.write(text);
}
";

fn pipeline() -> Pipeline<MemoryLibraryResolver> {
    let resolver = MemoryLibraryResolver::new().with_library("mathlib", MATHLIB);
    Pipeline::new(FrontendConfig::default(), resolver)
}

fn compile(source: &str) -> Result<idyl_compiler::CheckedProgram, CompileError> {
    let mut reporter = DiagnosticReporter::new();
    pipeline().compile(source, "main.idyl", &mut reporter)
}

#[test]
fn test_complete_program() {
    let checked = compile(
        r#"
use console;
use mathlib;

void function greet(string name) {
    console.write("Hello, ", name, "!\n");
}

main() {
    string name = console.get_string();
    greet(name);

    int count = 0;
    float total = 0.0;
    while (count < 3) {
        total = total + to_float(console.get_string()) * 1.5;
        count = count + 1;
    }

    if (total >= 10 and not (count == 0)) {
        mathlib.show("big");
    } else {
        console.write(to_string(total));
    }
}
"#,
    )
    .unwrap();

    let imports: Vec<&str> = checked.info.imported_modules.iter().map(String::as_str).collect();
    assert_eq!(imports, vec!["console", "mathlib"]);
    let globals: Vec<&str> = checked.info.global_functions.iter().map(String::as_str).collect();
    assert_eq!(globals, vec!["greet"]);

    let library: Vec<&str> = checked.libraries["mathlib"].iter().map(|f| f.name.as_str()).collect();
    assert_eq!(library, vec!["square", "show"]);
    assert_eq!(checked.program.main.body.statements.len(), 6);
}

#[test]
fn test_void_call_result_is_incompatible() {
    let err = compile("use mathlib; void function square(int n) { } main() { int x = square(4); }")
        .unwrap_err();

    assert!(err.is_semantic());
    assert_eq!(
        err.message(),
        "cannot assign a value of type 'void' to variable 'x' of type 'int'"
    );
}

#[test]
fn test_syntax_error_position() {
    let err = compile("main() {\n    int x = 5\n}").unwrap_err();

    assert!(err.is_syntax());
    assert_eq!(err.to_string(), "main.idyl:3:1: syntax error: expected ';' after variable declaration, found '}'");
}

#[test]
fn test_missing_library() {
    let err = compile("use geometry; main() { }").unwrap_err();
    assert_eq!(err.to_string(), "library 'geometry' not found: geometry.idyl");
}

#[test]
fn test_rendered_diagnostic_points_at_source() {
    let source = "main() {\n    int n = \"text\";\n}";
    let mut reporter = DiagnosticReporter::new();
    let err = pipeline().compile(source, "main.idyl", &mut reporter).unwrap_err();

    let rendered = reporter.render_to_string(&err);
    assert!(rendered.contains("semantic error"), "{}", rendered);
    assert!(rendered.contains("main.idyl:2:13"), "{}", rendered);
    assert!(rendered.contains("cannot assign a value of type 'string'"), "{}", rendered);
}

#[test]
fn test_error_inside_library_renders_library_source() {
    let resolver = MemoryLibraryResolver::new().with_library("broken", "int x;");
    let mut reporter = DiagnosticReporter::new();
    let err = Pipeline::new(FrontendConfig::default(), resolver)
        .compile("use broken; main() { }", "main.idyl", &mut reporter)
        .unwrap_err();

    assert_eq!(err.file(), Some("broken.idyl"));
    let rendered = reporter.render_to_string(&err);
    assert!(rendered.contains("broken.idyl:1:5"), "{}", rendered);
}

#[test]
fn test_scan_errors_stop_the_pipeline() {
    let err = compile("main() { bool b = !true; }").unwrap_err();
    assert!(err.is_syntax());
    assert_eq!(
        err.message(),
        "unexpected '!': use '!=' for inequality or 'not' for negation"
    );
}
