//! Entrypoint for CLI
use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
    time::Instant,
};

use log::{debug, error, info, LevelFilter};
use thiserror::Error;
use tinyc_lexer::{Lexer, TokenKind};
use tinyc_types::CompileErrors;
use wasmi::{Engine, Linker, Module, Store};

static USAGE: &str = r#"
usage: tinyc [-v] CMD FILE [-o OUT]

commands:
    build   Compile the source file into a .wasm module
    run     Compile the source file and print the result of main
    tokens  Dump the token stream of the source file
    ast     Dump the parsed syntax tree of the source file

options:
    -v      Log at debug level (otherwise TINYC_LOG, default warn)
    -o OUT  Output path for build (default: FILE with a .wasm extension)

examples:
    tinyc build fib.c
    tinyc build fib.c -o out/fib.wasm
    tinyc run fib.c
    tinyc tokens fib.c
    tinyc ast fib.c
"#;

/// FreeBSD EX_USAGE
const EX_USAGE: i32 = 64;
/// FreeBSD EX_DATAERR
const EX_DATAERR: i32 = 65;

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Compile(String),
    #[error("wasm execution failed: {0}")]
    Wasm(#[from] wasmi::Error),
}

impl CliError {
    fn from_errors(errors: &CompileErrors) -> Self {
        Self::Compile(
            errors
                .errors
                .iter()
                .map(|e| format!("{}:{e}\n    {}", e.file, e.source_line.trim()))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}

type CliResult<T> = Result<T, CliError>;

#[derive(Debug, PartialEq, Eq)]
enum Cmd {
    /// Compile to a module file
    Build { filepath: String, output: PathBuf },
    /// Compile and execute main
    Run { filepath: String },
    /// Print tokens
    Tokens { filepath: String },
    /// Print the syntax tree
    Ast { filepath: String },
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    verbose: bool,
    cmd: Cmd,
}

fn main() {
    let Some(args) = parse_args(env::args().skip(1)) else {
        print_usage();
        process::exit(EX_USAGE)
    };

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        env::var("TINYC_LOG")
            .ok()
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::Warn)
    };
    if let Err(err) = simple_logger::SimpleLogger::new().with_level(level).init() {
        eprintln!("failed to install logger: {err}");
    }

    let result = match args.cmd {
        Cmd::Build { filepath, output } => run_build(&filepath, &output),
        Cmd::Run { filepath } => run_main(&filepath),
        Cmd::Tokens { filepath } => run_tokens(&filepath),
        Cmd::Ast { filepath } => run_ast(&filepath),
    };

    if let Err(err) = result {
        error!("{err}");
        eprintln!("{err}");
        let code = match err {
            CliError::Compile(_) => EX_DATAERR,
            _ => 1,
        };
        process::exit(code)
    }
}

fn compile_file(filepath: &str) -> CliResult<Vec<u8>> {
    let source = fs::read_to_string(filepath)?;
    let start = Instant::now();
    let result = tinyc_compiler::compile(&source, filepath);
    debug!(
        "compile took {}ms",
        start.elapsed().as_nanos() as f64 / 1000000.0
    );
    result.map_err(|errors| CliError::from_errors(&errors))
}

fn run_build(filepath: &str, output: &Path) -> CliResult<()> {
    let wasm = compile_file(filepath)?;
    fs::write(output, &wasm)?;
    info!("wrote {} bytes to {}", wasm.len(), output.display());
    Ok(())
}

fn run_main(filepath: &str) -> CliResult<()> {
    let wasm = compile_file(filepath)?;

    let engine = Engine::default();
    let module = Module::new(&engine, &wasm[..])?;
    let mut store = Store::new(&engine, ());
    let instance = Linker::<()>::new(&engine)
        .instantiate(&mut store, &module)?
        .start(&mut store)?;
    let main = instance.get_typed_func::<(), i32>(&store, "main")?;

    let start = Instant::now();
    let value = main.call(&mut store, ())?;
    debug!(
        "main took {}ms",
        start.elapsed().as_nanos() as f64 / 1000000.0
    );

    println!("{value}");
    Ok(())
}

fn run_tokens(filepath: &str) -> CliResult<()> {
    let source = fs::read_to_string(filepath)?;

    println!("line:col | token");
    for token in Lexer::new(&source) {
        let position = format!("{}:{}", token.span.start_line, token.span.start_col);
        match token.kind {
            TokenKind::Identifier(name) => println!("{position: <8} | identifier \"{name}\""),
            TokenKind::Number(value) => println!("{position: <8} | number {value}"),
            kind => println!("{position: <8} | {kind}"),
        }
    }

    Ok(())
}

fn run_ast(filepath: &str) -> CliResult<()> {
    let source = fs::read_to_string(filepath)?;
    let parsed = tinyc_parser::parse(&source, filepath);
    let program = parsed
        .program
        .ok_or_else(|| CliError::from_errors(&parsed.errors))?;
    print!("{}", program.tree());
    Ok(())
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Option<Args> {
    let mut args = args.into_iter().peekable();
    let verbose = args.next_if(|arg| arg == "-v").is_some();
    let cmd = args.next()?;
    let filepath = args.next()?;

    let cmd = match cmd.as_str() {
        "build" => {
            let output = match args.next().as_deref() {
                Some("-o") => PathBuf::from(args.next()?),
                Some(_) => return None,
                None => PathBuf::from(&filepath).with_extension("wasm"),
            };
            Cmd::Build { filepath, output }
        }
        "run" => Cmd::Run { filepath },
        "tokens" => Cmd::Tokens { filepath },
        "ast" => Cmd::Ast { filepath },
        _ => return None,
    };

    if args.next().is_some() {
        return None;
    }
    Some(Args { verbose, cmd })
}

fn print_usage() {
    println!("tinyc v{}", env!("CARGO_PKG_VERSION"));
    println!("{USAGE}");
}
