//! Loxi CLI - entry point for the Lox interpreter.
//!
//! Zero arguments starts the interactive prompt; one argument runs a
//! script. Anything clap cannot parse is bad usage (exit 64). The remaining
//! exit codes follow the interpreter contract: 65 for static diagnostics,
//! 70 for runtime errors.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use loxi_drv::Session;

/// Loxi - a tree-walking interpreter for the Lox language
#[derive(Parser, Debug)]
#[command(name = "loxi")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A tree-walking interpreter for the Lox language", long_about = None)]
struct Cli {
    /// Script to run; omit to start an interactive prompt
    script: Option<PathBuf>,

    /// Print the token stream instead of running the script
    #[arg(long, conflicts_with = "emit_ast")]
    emit_tokens: bool,

    /// Print the parsed AST instead of running the script
    #[arg(long)]
    emit_ast: bool,
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            let _ = err.print();
            process::exit(0);
        }
        Err(_) => {
            eprintln!("Usage: loxi [script]");
            process::exit(64);
        }
    };

    let mut session = Session::new();

    let Some(path) = cli.script else {
        if cli.emit_tokens || cli.emit_ast {
            eprintln!("Usage: loxi [script]");
            process::exit(64);
        }
        match session.run_prompt() {
            Ok(()) => process::exit(0),
            Err(err) => {
                eprintln!("loxi: {err}");
                process::exit(74);
            }
        }
    };

    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("loxi: {}: {err}", path.display());
            process::exit(74);
        }
    };

    let outcome = if cli.emit_tokens {
        session.emit_tokens(&source)
    } else if cli.emit_ast {
        session.emit_ast(&source)
    } else {
        session.run(&source)
    };
    process::exit(outcome.exit_code());
}

/// Logging goes to stderr, filtered by `LOXI_LOG` (falling back to
/// `RUST_LOG`, then `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOXI_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
