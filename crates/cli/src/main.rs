// rrecon - registrant roster reconciliation CLI
// Reports registrants present in a registration export but absent from a
// reference key set (production snapshot).

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use roster_recon::ReconError;

use exit_codes::{recon_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "rrecon")]
#[command(about = "Find registrants missing from a production snapshot")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a registration export against reference keys
    #[command(after_help = "\
Exit code 0 means the report was printed, even when registrants are missing.
Use --strict-exit to exit 1 when any registrant is missing.

Examples:
  rrecon run registrations.csv --reference-file prod-emails.txt
  rrecon run registrations.csv --reference-json prod-query.json --format json
  rrecon run registrations.csv --key a@x.com --key b@x.com
  psql -Atc 'select email from users' | rrecon run registrations.csv --reference-file -
  rrecon run --config nightly.run.toml --strict-exit")]
    Run(recon::RunArgs),

    /// Validate a run config without reading any data
    #[command(after_help = "\
Examples:
  rrecon validate nightly.run.toml")]
    Validate {
        /// Path to the run config (.toml)
        config: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show usage
            eprintln!("Usage: rrecon <command> [options]");
            eprintln!("       rrecon --help for more information");
            Ok(())
        }
        Some(Commands::Run(args)) => recon::cmd_run(args),
        Some(Commands::Validate { config }) => recon::cmd_validate(config),
    };

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

    /// Create error from an engine error with its registered exit code.
    pub fn recon(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::SourceUnreadable { .. } => {
                Some("check the export path; the file must be UTF-8 text".to_string())
            }
            ReconError::ReferenceUnreadable { .. } => {
                Some("key lists are one key per line; JSON files must hold an array of strings".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
