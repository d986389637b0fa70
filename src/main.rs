use clap::{Parser, Subcommand};
use formgen::{
    DiagnosticPolicy, GenerateOptions,
    cli::{self, CheckOptions, CliError, GenerateCommand},
};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "formgen")]
#[command(about = "formgen - Generate record classes and form bindings from a record-type AST")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the module for a persisted record type
    Generate {
        /// Persisted document (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Spaces per indentation level
        #[arg(long, default_value_t = 4)]
        indent: usize,

        /// Fail instead of emitting output that contains generation problems
        #[arg(long)]
        deny_diagnostics: bool,
    },

    /// Validate a persisted document and report generation problems
    Check {
        /// Persisted document (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            input,
            indent,
            deny_diagnostics,
        } => run_generate(input, indent, deny_diagnostics),
        Commands::Check { input } => run_check(input),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn read_input(input: Option<PathBuf>) -> Result<Option<String>, CliError> {
    match input {
        Some(path) => Ok(Some(fs::read_to_string(path)?)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn run_generate(input: Option<PathBuf>, indent: usize, deny_diagnostics: bool) -> Result<bool, CliError> {
    let command = GenerateCommand {
        input: read_input(input)?,
        options: GenerateOptions {
            indent_width: indent,
            policy: if deny_diagnostics {
                DiagnosticPolicy::Deny
            } else {
                DiagnosticPolicy::Warn
            },
            ..GenerateOptions::default()
        },
    };

    print!("{}", cli::execute_generate(&command)?);
    Ok(true)
}

fn run_check(input: Option<PathBuf>) -> Result<bool, CliError> {
    let options = CheckOptions {
        input: read_input(input)?,
        ..CheckOptions::default()
    };

    let report = cli::execute_check(&options)?;
    println!("{} objects", report.objects);
    for dangling in &report.dangling {
        println!(
            "dangling reference: {}.{} -> {}",
            dangling.node, dangling.property, dangling.target
        );
    }
    for diagnostic in &report.diagnostics {
        println!("{}", diagnostic);
    }
    if report.is_clean() {
        println!("Document is valid");
    }
    Ok(report.is_clean())
}
