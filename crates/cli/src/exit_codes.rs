//! CLI Exit Code Registry
//!
//! Single source of truth for `rrecon` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Success (report printed)                            |
//! | 1    | Missing registrants found and `--strict-exit` set   |
//! | 2    | CLI usage error (bad args, nothing to compare)      |
//! | 3    | Registration export unreadable                      |
//! | 4    | Reference key source unreadable                     |
//! | 5    | Invalid run config                                  |
//! | 6    | Report could not be written                         |

use roster_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - report printed.
pub const EXIT_SUCCESS: u8 = 0;

/// Missing registrants found. Only with `--strict-exit`, like `diff(1)`.
pub const EXIT_MISSING: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Run failures (3-6)
// =============================================================================

/// Registration export cannot be opened, read, or decoded.
pub const EXIT_SOURCE_UNREADABLE: u8 = 3;

/// Reference key file / JSON cannot be read or parsed.
pub const EXIT_REFERENCE_UNREADABLE: u8 = 4;

/// Run config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// Writing the report (stdout or --output) failed.
pub const EXIT_OUTPUT: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::SourceUnreadable { .. } => EXIT_SOURCE_UNREADABLE,
        ReconError::ReferenceUnreadable { .. } => EXIT_REFERENCE_UNREADABLE,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::Io(_) => EXIT_OUTPUT,
    }
}
