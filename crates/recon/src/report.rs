//! Report rendering. Renderers take any `io::Write`; the caller picks the sink.

use std::io::Write;

use serde::Serialize;

use crate::error::ReconError;
use crate::model::{LoadStats, MissingEntry, ReconciliationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Plain-text report:
///
/// ```text
/// CSV has 2 emails
/// Production has 1 emails
///
/// Missing in production (1):
///   Bob B - b@x.com
/// ```
pub fn write_text<W: Write>(out: &mut W, result: &ReconciliationResult) -> Result<(), ReconError> {
    writeln!(out, "CSV has {} emails", result.registry_count)?;
    writeln!(out, "Production has {} emails", result.reference_count)?;
    writeln!(out)?;
    writeln!(out, "Missing in production ({}):", result.missing_count)?;
    for entry in &result.missing {
        writeln!(out, "  {} - {}", entry.label, entry.key)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    registry_count: usize,
    reference_count: usize,
    missing_count: usize,
    missing: &'a [MissingEntry],
    load: &'a LoadStats,
}

/// Pretty JSON, trailing newline included.
pub fn write_json<W: Write>(
    out: &mut W,
    result: &ReconciliationResult,
    load: &LoadStats,
) -> Result<(), ReconError> {
    let doc = JsonReport {
        registry_count: result.registry_count,
        reference_count: result.reference_count,
        missing_count: result.missing_count,
        missing: &result.missing,
        load,
    };
    serde_json::to_writer_pretty(&mut *out, &doc)
        .map_err(|e| ReconError::Io(format!("JSON serialization error: {e}")))?;
    writeln!(out)?;
    Ok(())
}

pub fn write_report<W: Write>(
    out: &mut W,
    format: ReportFormat,
    result: &ReconciliationResult,
    load: &LoadStats,
) -> Result<(), ReconError> {
    match format {
        ReportFormat::Text => write_text(out, result),
        ReportFormat::Json => write_json(out, result, load),
    }
}
