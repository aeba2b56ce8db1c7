//! Binary entry point for the fixturegen CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Generate factories for src/ into src/fixtures/
//! fixturegen generate
//!
//! # Randomized defaults with a fixed seed, without writing anything
//! fixturegen generate -O fixtures.randomize=true -O fixtures.seed=42 --dry-run
//!
//! # Show fixtures, adapters and field classifications
//! fixturegen list --src src
//! ```
//!
//! Responses are JSON on stdout; logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use fixturegen::generator::{DEFAULT_OUT_DIR, DEFAULT_SOURCE_DIR};
use fixturegen::{GenerateError, Generator};
use fixturegen_core::config::parse_key_value;
use fixturegen_core::error::FixtureError;
use fixturegen_core::output::emit_response;

// ============================================================================
// CLI Structure
// ============================================================================

/// Fixture factories for Rust structs.
///
/// Scans Rust sources for `#[fixture]` structs and writes factory functions
/// with generated default values. All output is JSON.
#[derive(Parser, Debug)]
#[command(name = "fixturegen", version, about = "Fixture factories for Rust structs")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate fixture units.
    Generate {
        /// Source directory to scan.
        #[arg(long, default_value = DEFAULT_SOURCE_DIR)]
        src: PathBuf,

        /// Directory generated units are written to.
        #[arg(long, default_value = DEFAULT_OUT_DIR)]
        out: PathBuf,

        /// Cargo.toml with `[package.metadata.fixtures]` (default: next to --src).
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Option override in `key=value` format (repeatable).
        #[arg(short = 'O', long = "option", value_name = "KEY=VALUE")]
        options: Vec<String>,

        /// Render but do not write.
        #[arg(long)]
        dry_run: bool,
    },
    /// List fixtures, adapters and how each field is classified.
    List {
        /// Source directory to scan.
        #[arg(long, default_value = DEFAULT_SOURCE_DIR)]
        src: PathBuf,

        /// Directory of previously generated units, excluded from the scan.
        #[arg(long, default_value = DEFAULT_OUT_DIR)]
        out: PathBuf,

        /// Cargo.toml with `[package.metadata.fixtures]` (default: next to --src).
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Option override in `key=value` format (repeatable).
        #[arg(short = 'O', long = "option", value_name = "KEY=VALUE")]
        options: Vec<String>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Errors go to stdout as JSON like every other response
            let _ = emit_response(&err.to_response(), &mut io::stdout());
            let _ = io::stdout().flush();
            ExitCode::from(err.error_code().code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), GenerateError> {
    match cli.command {
        Command::Generate {
            src,
            out,
            manifest,
            options,
            dry_run,
        } => {
            let generator = build_generator(src, out, manifest, &options)?.dry_run(dry_run);
            let report = generator.generate()?;
            write_json(&report.to_response())
        }
        Command::List {
            src,
            out,
            manifest,
            options,
        } => {
            let generator = build_generator(src, out, manifest, &options)?;
            write_json(&generator.list()?)
        }
    }
}

fn build_generator(
    src: PathBuf,
    out: PathBuf,
    manifest: Option<PathBuf>,
    options: &[String],
) -> Result<Generator, GenerateError> {
    let mut generator = Generator::new().source_dir(src).out_dir(out);
    if let Some(manifest) = manifest {
        generator = generator.manifest(manifest);
    }
    for option in options {
        let (key, value) = parse_key_value(option)?;
        generator = generator.option(key, value);
    }
    Ok(generator)
}

fn write_json<T: serde::Serialize>(response: &T) -> Result<(), GenerateError> {
    emit_response(response, &mut io::stdout())
        .map_err(|e| GenerateError::from(FixtureError::internal(e.to_string())))?;
    let _ = io::stdout().flush();
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
