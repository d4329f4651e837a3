//! `roster-recon` — registrant roster reconciliation engine.
//!
//! Loads a registration export into a key -> label mapping, loads a reference
//! key set from any [`ReferenceSource`], and reports the registrants missing
//! from the reference. No CLI dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod model;
pub mod reference;
pub mod report;

pub use config::RunConfig;
pub use engine::{run, RunOutcome};
pub use error::ReconError;
pub use loader::LoadOptions;
pub use model::{IdentityKey, LoadStats, ReconciliationResult, ReferenceKeySet, RegistryMapping};
pub use reference::ReferenceSource;
pub use report::ReportFormat;
