//! `rrecon run` / `rrecon validate` — registrant reconciliation.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use roster_recon::config::{parse_delimiter, ReferenceConfig, RunConfig};
use roster_recon::report::{write_report, ReportFormat};
use roster_recon::{LoadStats, ReferenceSource};

use crate::exit_codes::{EXIT_MISSING, EXIT_OUTPUT};
use crate::CliError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Registration export (CSV, header row first), or - for stdin
    pub source: Option<PathBuf>,

    /// Run config (.toml); command-line flags override its values
    #[arg(long, env = "RRECON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Reference key list, one key per line (repeatable; - for stdin)
    #[arg(long, value_name = "FILE")]
    pub reference_file: Vec<PathBuf>,

    /// Reference keys as a JSON array of strings (repeatable)
    #[arg(long, value_name = "FILE")]
    pub reference_json: Vec<PathBuf>,

    /// Reference key given inline (repeatable)
    #[arg(long, value_name = "KEY")]
    pub key: Vec<String>,

    /// Field delimiter of the export (single character, or "tab")
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Column holding the identity key / email (0-based)
    #[arg(long, value_name = "N")]
    pub key_col: Option<usize>,

    /// Column holding the first name (0-based)
    #[arg(long, value_name = "N")]
    pub first_name_col: Option<usize>,

    /// Column holding the last name (0-based)
    #[arg(long, value_name = "N")]
    pub last_name_col: Option<usize>,

    /// Report format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Exit 1 when any registrant is missing from the reference
    #[arg(long)]
    pub strict_exit: bool,

    /// Quiet mode - suppress stderr notes
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Merge the optional config file with command-line overrides.
fn resolve_config(args: &RunArgs) -> Result<RunConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_path(path).map_err(CliError::recon)?,
        None => RunConfig::default(),
    };

    if let Some(ref source) = args.source {
        config.source = Some(source.clone());
    }
    if let Some(ref d) = args.delimiter {
        parse_delimiter(d).map_err(|e| {
            CliError::args(e.to_string()).with_hint("use a single character such as ',' or ';', or \"tab\"")
        })?;
        config.delimiter = Some(d.clone());
    }
    if let Some(n) = args.key_col {
        config.columns.key = n;
    }
    if let Some(n) = args.first_name_col {
        config.columns.first_name = n;
    }
    if let Some(n) = args.last_name_col {
        config.columns.last_name = n;
    }

    // Any reference flag replaces the config's reference section wholesale.
    if !args.reference_file.is_empty() || !args.reference_json.is_empty() || !args.key.is_empty() {
        config.reference = ReferenceConfig {
            files: args.reference_file.clone(),
            json_files: args.reference_json.clone(),
            keys: args.key.clone(),
        };
    }

    if let Err(e) = config.validate_runnable() {
        return Err(match args.config {
            Some(_) => CliError::recon(e),
            None => CliError::args(e.to_string())
                .with_hint("rrecon run registrations.csv --reference-file prod-emails.txt"),
        });
    }

    let stdin_readers = config.source.iter().filter(|p| is_stdin(p)).count()
        + config.reference.files.iter().filter(|p| is_stdin(p)).count()
        + config.reference.json_files.iter().filter(|p| is_stdin(p)).count();
    if stdin_readers > 1 {
        return Err(CliError::args("stdin (-) can feed only one input"));
    }

    Ok(config)
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn print_load_notes(load: &LoadStats, min_fields: usize) {
    if load.rows_skipped > 0 {
        eprintln!(
            "note: {} row(s) skipped (fewer than {} fields)",
            load.rows_skipped, min_fields
        );
    }
    if load.duplicate_keys > 0 {
        eprintln!(
            "note: {} duplicate key(s) overwritten (last row wins)",
            load.duplicate_keys
        );
    }
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = resolve_config(&args)?;
    let opts = config.load_options().map_err(CliError::recon)?;
    let reference = config.reference.to_source();
    // validate_runnable guarantees a source.
    let source = config.source.clone().unwrap_or_else(|| PathBuf::from("-"));
    log::debug!("source {}, {:?}, reference: {}", source.display(), opts, reference.describe());

    let outcome = roster_recon::run(&source, &opts, &reference).map_err(CliError::recon)?;

    if !args.quiet {
        print_load_notes(&outcome.load, opts.min_fields());
    }

    let mut report = Vec::new();
    write_report(&mut report, args.format.into(), &outcome.result, &outcome.load)
        .map_err(CliError::recon)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &report).map_err(|e| CliError {
                code: EXIT_OUTPUT,
                message: format!("cannot write {}: {e}", path.display()),
                hint: None,
            })?;
            if !args.quiet {
                eprintln!("wrote {}", path.display());
            }
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&report)
                .and_then(|_| stdout.flush())
                .map_err(|e| CliError { code: EXIT_OUTPUT, message: e.to_string(), hint: None })?;
        }
    }

    if args.strict_exit && outcome.result.missing_count > 0 {
        return Err(CliError {
            code: EXIT_MISSING,
            message: format!("{} registrant(s) missing in production", outcome.result.missing_count),
            hint: None,
        });
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = RunConfig::from_path(&config_path).map_err(CliError::recon)?;
    config.validate_runnable().map_err(CliError::recon)?;
    let opts = config.load_options().map_err(CliError::recon)?;
    let reference = config.reference.to_source();

    eprintln!(
        "valid: source '{}', key column {}, reference: {}",
        config.source.as_deref().map(|p| p.display().to_string()).unwrap_or_default(),
        opts.key_col,
        reference.describe(),
    );
    Ok(())
}
