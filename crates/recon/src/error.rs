use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// Registration export cannot be opened, read, or decoded. Fatal.
    SourceUnreadable { path: String, reason: String },
    /// A reference key source cannot be opened, read, or decoded. Fatal.
    ReferenceUnreadable { source: String, reason: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad delimiter, no reference source, etc.).
    ConfigValidation(String),
    /// IO error while writing the report.
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceUnreadable { path, reason } => {
                write!(f, "cannot read source '{path}': {reason}")
            }
            Self::ReferenceUnreadable { source, reason } => {
                write!(f, "cannot read reference keys from {source}: {reason}")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl From<std::io::Error> for ReconError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
