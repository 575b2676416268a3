//! Kestrel CLI: run a script file or start the REPL.

use std::env;
use std::path::Path;
use std::process;

use kestrel::repl::Repl;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI command to execute.
enum Command {
    /// Run a script file
    Run { file: String },
    /// Start the REPL
    Repl,
}

fn print_usage() {
    eprintln!("Kestrel {} - expression language", VERSION);
    eprintln!();
    eprintln!("Usage: kestrel [script.kst]");
    eprintln!();
    eprintln!("  kestrel              Start interactive REPL");
    eprintln!("  kestrel script.kst   Run a script file");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --help, -h      Show this help message");
}

fn parse_args() -> Command {
    let mut args = env::args().skip(1);
    match (args.next(), args.next()) {
        (None, _) => Command::Repl,
        (Some(flag), _) if flag == "--help" || flag == "-h" => {
            print_usage();
            process::exit(0);
        }
        (Some(file), None) => Command::Run { file },
        _ => {
            print_usage();
            process::exit(64);
        }
    }
}

fn main() {
    match parse_args() {
        Command::Repl => Repl::new().run(),
        Command::Run { file } => run_file(&file),
    }
}

fn run_file(path: &str) {
    if let Err(e) = kestrel::run_file(Path::new(path)) {
        eprintln!("error: {}", e);
        process::exit(70);
    }
}
