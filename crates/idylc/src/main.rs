//! Idyllium compiler front end
//!
//! Usage: idylc [OPTIONS] <input>

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser as ClapParser;
use idyl_compiler::common::DiagnosticReporter;
use idyl_compiler::driver::{CheckedProgram, Pipeline};
use idyl_compiler::frontend::FrontendConfig;

#[derive(ClapParser, Debug)]
#[command(name = "idylc")]
#[command(author = "Idyllium Team")]
#[command(version)]
#[command(about = "Checks Idyllium programs: scanning, parsing and semantic analysis", long_about = None)]
struct Args {
    /// Input source file (.idyl)
    #[arg(required = true)]
    input: PathBuf,

    /// Directory searched for user libraries (defaults to the input's directory)
    #[arg(short = 'L', long = "lib-dir")]
    lib_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}

/// `Ok(false)` when the program was rejected; the diagnostic is already printed.
fn run(args: &Args) -> anyhow::Result<bool> {
    if args
        .input
        .extension()
        .is_none_or(|ext| ext != idyl_compiler::driver::SOURCE_EXTENSION)
    {
        log::warn!("{} does not have the .idyl extension", args.input.display());
    }

    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read '{}'", args.input.display()))?;
    let filename = args.input.display().to_string();

    let config = FrontendConfig {
        dump_tokens: args.dump_tokens,
        dump_ast: args.dump_ast,
        verbose: args.verbose,
        library_dir: args.lib_dir.clone(),
    };

    let pipeline = Pipeline::for_input(config, &args.input);
    log::debug!("resolving libraries in {}", pipeline.resolver().dir().display());

    let mut reporter = DiagnosticReporter::new();
    match pipeline.compile(&source, &filename, &mut reporter) {
        Ok(checked) => {
            print_summary(&filename, &checked, args.verbose);
            Ok(true)
        }
        Err(e) => {
            reporter.report_error(&e);
            Ok(false)
        }
    }
}

fn print_summary(filename: &str, checked: &CheckedProgram, verbose: bool) {
    println!("{}: ok", filename);

    if verbose {
        let join = |names: Vec<&str>| if names.is_empty() { "-".to_string() } else { names.join(", ") };
        let info = &checked.info;
        println!("  imports:          {}", join(info.imported_modules.iter().map(String::as_str).collect()));
        println!("  global functions: {}", join(info.global_functions.iter().map(String::as_str).collect()));
        for (name, functions) in &checked.libraries {
            let names = functions.iter().map(|f| f.name.as_str()).collect();
            println!("  library {}: {}", name, join(names));
        }
    }
}
