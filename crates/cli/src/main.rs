// invdelta CLI - inventory count reconciliation

mod delta;
mod exit_codes;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use exit_codes::{
    EXIT_INPUT_PARSE, EXIT_INVALID_CONFIG, EXIT_IO, EXIT_MISSING_INPUTS, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "invdelta")]
#[command(about = "Reconcile location counts and rentals against the inventory ledger")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Errors only; no summary line
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reconciliation and write the four delta reports
    #[command(after_help = "\
Examples:
  invdelta run weekly.delta.toml
  invdelta run weekly.delta.toml --date 2024-06-15
  invdelta run weekly.delta.toml --out-dir reports --json
  invdelta run weekly.delta.toml --output result.json --fail-on-delta")]
    Run(RunArgs),

    /// Validate a config without reading any input
    #[command(after_help = "\
Examples:
  invdelta validate weekly.delta.toml")]
    Validate {
        /// Path to the .delta.toml config file
        config: PathBuf,
    },

    /// List the input files a config requires and whether each is present
    #[command(after_help = "\
Examples:
  invdelta inputs weekly.delta.toml
  invdelta inputs weekly.delta.toml --json")]
    Inputs {
        /// Path to the .delta.toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Path to the .delta.toml config file
    pub config: PathBuf,

    /// Reference date (YYYY-MM-DD). Overrides `reference_date` in the config;
    /// defaults to today.
    #[arg(long, env = "INVDELTA_DATE")]
    pub date: Option<NaiveDate>,

    /// Directory for the CSV reports (overrides `[output] dir`)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Output the JSON result to stdout
    #[arg(long)]
    pub json: bool,

    /// Write the JSON result to file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Exit 1 when any asset has a nonzero delta
    #[arg(long)]
    pub fail_on_delta: bool,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\nengine:  invdelta-recon ",
        env!("CARGO_PKG_VERSION"),
        "\nreports: rental_delta_detail, house_delta_detail, rental_delta, house_delta",
    )
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<(), CliError> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("INVDELTA_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init()
        .map_err(|e| CliError::args(format!("failed to initialize logging: {e}")))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = init_tracing(cli.quiet, cli.verbose).and_then(|()| match cli.command {
        Commands::Run(args) => delta::cmd_run(args, cli.quiet),
        Commands::Validate { config } => delta::cmd_validate(config),
        Commands::Inputs { config, json } => delta::cmd_inputs(config, json),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Map an engine error to its exit code.
    pub fn recon(err: invdelta_recon::ReconError) -> Self {
        use invdelta_recon::ReconError;
        let code = match &err {
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
            ReconError::MissingInputs(_) => EXIT_MISSING_INPUTS,
            ReconError::MissingColumn { .. }
            | ReconError::DateParse { .. }
            | ReconError::QuantityParse { .. } => EXIT_INPUT_PARSE,
        };
        let hint = match &err {
            ReconError::MissingColumn { .. } => {
                Some("check the [columns] mapping for that input in the config".to_string())
            }
            ReconError::DateParse { .. } => {
                Some("add the file's date layout to `date_formats` in the config".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Map a file loading error to its exit code.
    pub fn load(err: invdelta_io::IoError) -> Self {
        use invdelta_io::IoError;
        let code = match &err {
            IoError::Read { .. } | IoError::Write { .. } => EXIT_IO,
            IoError::Csv { .. } | IoError::Excel { .. } | IoError::UnsupportedFormat { .. } => {
                EXIT_INPUT_PARSE
            }
        };
        Self { code, message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
