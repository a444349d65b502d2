//! Command-line driver for drover scripts.
//!
//! Scripts run against the built-in function table and a dry-run command
//! host that records host invocations without touching a device.
//!
//! # Usage
//!
//! ```bash
//! # Run a script
//! drover run flow.dro
//!
//! # Run from stdin with a tight execution budget
//! cat flow.dro | drover run --budget 200
//!
//! # Parse only, reporting every skipped token
//! drover check flow.dro
//!
//! # Fail the build when a script has skipped tokens
//! drover check flow.dro --strict
//!
//! # Dump the parsed statement sequence as JSON
//! drover ast flow.dro
//! ```

use clap::{Parser, Subcommand};
use drover_core::budget::{ExecutionBudget, DEFAULT_BUDGET};
use drover_core::error::{BudgetExceeded, ScriptError};
use drover_core::host::NullHost;
use drover_core::interp::Interpreter;
use drover_core::parser::Parser as ScriptParser;
use drover_core::value::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Command-line driver for drover scripts.
#[derive(Parser)]
#[command(name = "drover")]
#[command(about = "Run, check, and inspect drover automation scripts")]
#[command(version)]
struct Cli {
    /// Enable debug-level log output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse and execute a script
    Run {
        /// Path to the script (reads from stdin if omitted)
        script: Option<PathBuf>,
        /// Execution budget in abstract cost units
        #[arg(short, long, default_value_t = DEFAULT_BUDGET, env = "DROVER_BUDGET")]
        budget: u32,
        /// Suppress printing the final value
        #[arg(short, long)]
        quiet: bool,
    },

    /// Parse a script and report skipped tokens without executing it
    Check {
        /// Path to the script (reads from stdin if omitted)
        script: Option<PathBuf>,
        /// Exit with an error when any token was skipped
        #[arg(long)]
        strict: bool,
    },

    /// Print the parsed statement sequence as JSON
    Ast {
        /// Path to the script (reads from stdin if omitted)
        script: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

#[derive(Debug)]
enum CliError {
    Script(ScriptError),
    CheckFailed { skipped: usize },
    Json(serde_json::Error),
    Io(std::io::Error),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Script(ScriptError::Assertion { .. }) => ExitCode::from(1),
            CliError::Script(ScriptError::Budget(_)) => ExitCode::from(2),
            CliError::Script(_) => ExitCode::from(3),
            CliError::CheckFailed { .. } => ExitCode::from(2),
            CliError::Json(_) => ExitCode::from(3),
            CliError::Io(_) => ExitCode::from(4),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Script(e) => write!(f, "{}", e),
            CliError::CheckFailed { skipped } => {
                write!(f, "check failed: {} token(s) were skipped", skipped)
            }
            CliError::Json(e) => write!(f, "could not serialize the syntax tree: {}", e),
            CliError::Io(e) => write!(f, "could not read the script: {}", e),
        }
    }
}

impl From<ScriptError> for CliError {
    fn from(e: ScriptError) -> Self {
        CliError::Script(e)
    }
}

impl From<BudgetExceeded> for CliError {
    fn from(e: BudgetExceeded) -> Self {
        CliError::Script(ScriptError::Budget(e))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Run {
            ref script,
            budget,
            quiet,
        } => run_script(script.as_deref(), budget, quiet),
        Command::Check { ref script, strict } => check_script(script.as_deref(), strict),
        Command::Ast { ref script } => dump_ast(script.as_deref()),
    }
}

/// Reads the script from a file, or from stdin when no path was given.
fn read_source(script: Option<&Path>) -> Result<String, CliError> {
    match script {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn run_script(script: Option<&Path>, budget: u32, quiet: bool) -> Result<(), CliError> {
    let source = read_source(script)?;
    let mut interp = Interpreter::with_budget(NullHost::new(), ExecutionBudget::new(budget));

    // Skip warnings are reported even when execution fails afterwards.
    let result = interp.run_source(&source);
    for token in interp.skipped() {
        eprintln!(
            "warning: skipped line {}, column {}: '{}'",
            token.line, token.column, token.lexeme
        );
    }
    let value = result?;

    debug!(
        used = interp.budget().used(),
        remaining = interp.budget().remaining(),
        "script finished"
    );

    if !quiet && value != Value::Null {
        println!("{}", value);
    }
    Ok(())
}

fn check_script(script: Option<&Path>, strict: bool) -> Result<(), CliError> {
    let source = read_source(script)?;
    let mut parser = ScriptParser::new();
    let statements = parser.parse_script(&source)?;

    for token in parser.skipped() {
        println!(
            "skipped line {}, column {}: '{}'",
            token.line, token.column, token.lexeme
        );
    }
    println!("{}", check_summary(statements.len(), parser.skipped().len()));

    if strict && !parser.skipped().is_empty() {
        return Err(CliError::CheckFailed {
            skipped: parser.skipped().len(),
        });
    }
    Ok(())
}

fn check_summary(statements: usize, skipped: usize) -> String {
    format!(
        "{} statement(s) parsed, {} token(s) skipped",
        statements, skipped
    )
}

fn dump_ast(script: Option<&Path>) -> Result<(), CliError> {
    let source = read_source(script)?;
    let mut parser = ScriptParser::new();
    let statements = parser.parse_script(&source)?;
    println!("{}", serde_json::to_string_pretty(&statements)?);
    Ok(())
}
