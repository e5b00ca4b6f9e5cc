//! jbscript CLI
//!
//! Type-checks and runs scripts given as JSON-serialized ASTs, and looks up
//! the system variable registry and function catalog.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::*;
use jbscript::ast::Expr;
use jbscript::config::Config;
use jbscript::typechecker::{check_program, Severity};
use jbscript::{stdlib, sysvars, Interpreter, Scope, Value};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jbscript")]
#[command(version)]
#[command(about = "Type-check and run integration scripts from their parsed AST", long_about = None)]
struct Cli {
    /// Config file (default: ./jbscript.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Type-check a script and print its diagnostics
    ///
    /// Exits with status 1 when there are errors, or warnings in strict mode.
    Check {
        /// JSON file holding the script's AST
        #[arg(value_name = "AST")]
        file: PathBuf,
        /// Output diagnostics as JSON
        #[arg(long)]
        json: bool,
        /// Treat warnings as failures (also JBSCRIPT_STRICT=1)
        #[arg(long)]
        strict: bool,
    },
    /// Evaluate a script and print its result
    Run {
        /// JSON file holding the script's AST
        #[arg(value_name = "AST")]
        file: PathBuf,
        /// Global variable provided by the host, e.g. --global customer=acme
        #[arg(long = "global", value_name = "NAME=VALUE")]
        globals: Vec<String>,
    },
    /// Describe a system variable
    Sysvar {
        /// Full name, e.g. $jitterbit.operation.name
        name: String,
    },
    /// List the built-in functions and their signatures
    Functions,
}

fn main() {
    let cli = Cli::parse();

    let result = Config::resolve(cli.config.as_deref())
        .context("loading configuration")
        .and_then(|config| {
            init_logging(&config.runtime.log_level);
            dispatch(cli.command, &config)
        });

    if let Err(e) = result {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Log lines go to stderr so command output stays parseable
fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();
}

fn dispatch(command: Commands, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Check { file, json, strict } => check_file(&file, json, strict || config.analyzer.strict),
        Commands::Run { file, globals } => run_file(&file, &globals),
        Commands::Sysvar { name } => describe_sysvar(&name),
        Commands::Functions => list_functions(),
    }
}

fn read_ast(path: &Path) -> anyhow::Result<Expr> {
    let source = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("parsing AST in {}", path.display()))
}

#[derive(Serialize)]
struct CheckReport<'a> {
    #[serde(rename = "type")]
    ty: jbscript::types::StaticType,
    diagnostics: &'a [jbscript::Diagnostic],
}

fn check_file(path: &Path, json: bool, strict: bool) -> anyhow::Result<()> {
    let script = read_ast(path)?;
    let analysis = check_program(&script)?;

    if json {
        let report = CheckReport {
            ty: analysis.typed.ty(),
            diagnostics: &analysis.diagnostics,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for diagnostic in &analysis.diagnostics {
            let label = match diagnostic.severity {
                Severity::Error => "error".red().bold(),
                Severity::Warning => "warning".yellow().bold(),
            };
            println!("{} {}: {}", diagnostic.range.to_string().dimmed(), label, diagnostic.message);
        }
    }

    let errors = analysis.errors().count();
    let warnings = analysis.warnings().count();
    if errors > 0 {
        bail!("{} error(s), {} warning(s) in {}", errors, warnings, path.display());
    }
    if strict && warnings > 0 {
        bail!("{} warning(s) in {} (strict mode)", warnings, path.display());
    }
    if !json {
        println!(
            "{} No errors found in {} (result type: {})",
            "✓".green(),
            path.display(),
            analysis.typed.ty()
        );
    }
    Ok(())
}

fn parse_global(assignment: &str) -> anyhow::Result<(String, Value)> {
    let Some((name, value)) = assignment.split_once('=') else {
        bail!("expected NAME=VALUE, got '{}'", assignment);
    };
    let name = stdlib::general::global_name(name);
    if name.len() < 2 {
        bail!("empty global name in '{}'", assignment);
    }
    Ok((name, Value::from(value)))
}

fn run_file(path: &Path, globals: &[String]) -> anyhow::Result<()> {
    let script = read_ast(path)?;
    let globals = globals
        .iter()
        .map(|g| parse_global(g))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let mut interpreter = Interpreter::new().with_scope(Scope::with_globals(globals));
    let result = interpreter.eval(&script)?;
    println!("{}", result);
    Ok(())
}

fn describe_sysvar(name: &str) -> anyhow::Result<()> {
    let Some(var) = sysvars::lookup(name) else {
        bail!("unknown system variable '{}'", name);
    };
    println!("{}", var.name.bold());
    println!("  module:  {}", var.module);
    println!("  access:  {:?}", var.access);
    println!("  type:    {:?}", var.data_type);
    if let Some(default) = var.default {
        println!("  default: {}", default);
    }
    println!("  {}", var.description);
    Ok(())
}

fn list_functions() -> anyhow::Result<()> {
    for builtin in stdlib::catalog().iter() {
        for signature in &builtin.descriptor.signatures {
            println!("{}", signature.describe(builtin.name()));
        }
    }
    Ok(())
}
