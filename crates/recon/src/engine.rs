use std::path::Path;

use crate::error::ReconError;
use crate::loader::{load_registry_path, load_registry_reader, LoadOptions};
use crate::matcher::reconcile;
use crate::model::{LoadStats, ReconciliationResult};
use crate::reference::ReferenceSource;

/// Everything a caller needs to render and judge a run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub result: ReconciliationResult,
    pub load: LoadStats,
}

/// Load the registration export at `source` (`-` = stdin), load the
/// reference keys, and reconcile.
///
/// The export is read completely before the reference source is touched.
/// Any failure aborts the run; nothing is rendered here.
pub fn run(
    source: &Path,
    opts: &LoadOptions,
    reference: &dyn ReferenceSource,
) -> Result<RunOutcome, ReconError> {
    let (registry, load) = if source.as_os_str() == "-" {
        load_registry_reader(std::io::stdin().lock(), opts)?
    } else {
        load_registry_path(source, opts)?
    };

    let reference_keys = reference.load_reference_keys()?;
    log::info!("{}: {} reference key(s)", reference.describe(), reference_keys.len());

    let result = reconcile(&registry, &reference_keys);
    log::info!(
        "{} registered, {} in reference, {} missing",
        result.registry_count,
        result.reference_count,
        result.missing_count
    );

    Ok(RunOutcome { result, load })
}
