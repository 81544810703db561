use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use vikey::{CodeTable, EngineConfig, EngineController, InputMethod, MacroTable, TransformResult};

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Telex,
    Vni,
    Simple,
}

#[derive(Clone, Copy, ValueEnum)]
enum TableArg {
    Unicode,
    Tcvn3,
    VniWindows,
    UnicodeCompound,
}

/// Type Vietnamese on stdin, see the composed line after every key.
#[derive(Parser)]
#[command(name = "vikey", version)]
struct Args {
    /// Input method (overrides the config file)
    #[arg(long, value_enum)]
    method: Option<MethodArg>,

    /// Output code table (overrides the config file)
    #[arg(long, value_enum)]
    code_table: Option<TableArg>,

    /// Old-style tone placement (hòa, thùy)
    #[arg(long)]
    legacy: bool,

    /// TOML file with engine settings and a [macros] table
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("VIKEY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn build_engine(args: &Args) -> vikey::ConfigResult<EngineController> {
    let (mut config, macros) = match &args.config {
        Some(path) => (EngineConfig::load(path)?, MacroTable::load(path)?),
        None => (EngineConfig::default(), MacroTable::new()),
    };
    if let Some(method) = args.method {
        config.input_method = match method {
            MethodArg::Telex => InputMethod::Telex,
            MethodArg::Vni => InputMethod::Vni,
            MethodArg::Simple => InputMethod::Simple,
        };
    }
    if let Some(table) = args.code_table {
        config.code_table = match table {
            TableArg::Unicode => CodeTable::Unicode,
            TableArg::Tcvn3 => CodeTable::Tcvn3,
            TableArg::VniWindows => CodeTable::VniWindows,
            TableArg::UnicodeCompound => CodeTable::UnicodeCompound,
        };
    }
    if args.legacy {
        config.modern_orthography = false;
    }
    Ok(EngineController::with_macros(config, macros))
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();
    let mut engine = match build_engine(&args) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("vikey: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout();
    let mut buf = [0u8; 1];
    let mut line = String::new();

    println!("Type {:?} (Ctrl+C or Ctrl+D to quit):", engine.config().input_method);

    loop {
        match stdin.read(&mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                eprintln!("vikey: {err}");
                return ExitCode::FAILURE;
            }
        }
        let b = buf[0];
        if b == 3 {
            break;
        }

        let c = char::from(b);
        match (c, engine.type_char(c)) {
            ('\u{8}' | '\u{7f}', TransformResult::NoChange) => {
                line.pop();
            }
            (_, result) => result.apply_to(&mut line, c),
        }

        // Clear the rest of the terminal line so deletions show.
        print!("\r{line}\x1b[K");
        if c == '\n' {
            line.clear();
        }
        if stdout.flush().is_err() {
            break;
        }
    }
    ExitCode::SUCCESS
}
