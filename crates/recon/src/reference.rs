//! Reference key sources: where the "already present" keys come from.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::error::ReconError;
use crate::model::ReferenceKeySet;

/// Anything that can produce the reference key set for a run.
pub trait ReferenceSource {
    /// Short human description, used in errors and notes.
    fn describe(&self) -> String;

    fn load_reference_keys(&self) -> Result<ReferenceKeySet, ReconError>;
}

/// Keys given inline (command-line arguments, config `keys = [...]`).
#[derive(Debug, Clone, Default)]
pub struct LiteralKeys(pub Vec<String>);

impl ReferenceSource for LiteralKeys {
    fn describe(&self) -> String {
        format!("{} literal key(s)", self.0.len())
    }

    fn load_reference_keys(&self) -> Result<ReferenceKeySet, ReconError> {
        Ok(self.0.iter().collect())
    }
}

/// Plain text, one key per line. Blank lines and `#` comments are ignored.
/// A path of `-` reads stdin.
#[derive(Debug, Clone)]
pub struct KeyListFile(pub PathBuf);

impl ReferenceSource for KeyListFile {
    fn describe(&self) -> String {
        format!("key list '{}'", self.0.display())
    }

    fn load_reference_keys(&self) -> Result<ReferenceKeySet, ReconError> {
        let text = read_source(&self.0).map_err(|e| self.unreadable(e))?;
        Ok(parse_key_list(&text))
    }
}

impl KeyListFile {
    fn unreadable(&self, e: io::Error) -> ReconError {
        ReconError::ReferenceUnreadable {
            source: self.describe(),
            reason: e.to_string(),
        }
    }
}

/// Parse key-list text into a normalized set.
pub fn parse_key_list(text: &str) -> ReferenceKeySet {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

/// A JSON array of strings, e.g. a saved query result.
#[derive(Debug, Clone)]
pub struct JsonKeyFile(pub PathBuf);

impl ReferenceSource for JsonKeyFile {
    fn describe(&self) -> String {
        format!("JSON key file '{}'", self.0.display())
    }

    fn load_reference_keys(&self) -> Result<ReferenceKeySet, ReconError> {
        let unreadable = |reason: String| ReconError::ReferenceUnreadable {
            source: self.describe(),
            reason,
        };
        let text = read_source(&self.0).map_err(|e| unreadable(e.to_string()))?;
        let keys: Vec<String> =
            serde_json::from_str(&text).map_err(|e| unreadable(format!("expected array of strings: {e}")))?;
        Ok(keys.iter().collect())
    }
}

/// Union of several sources. Fails on the first unreadable member.
#[derive(Default)]
pub struct Combined(pub Vec<Box<dyn ReferenceSource>>);

impl Combined {
    pub fn push(&mut self, source: impl ReferenceSource + 'static) {
        self.0.push(Box::new(source));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ReferenceSource for Combined {
    fn describe(&self) -> String {
        self.0
            .iter()
            .map(|s| s.describe())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn load_reference_keys(&self) -> Result<ReferenceKeySet, ReconError> {
        let mut all = ReferenceKeySet::new();
        for source in &self.0 {
            let keys = source.load_reference_keys()?;
            log::info!("{}: {} key(s)", source.describe(), keys.len());
            all.extend_from(keys);
        }
        Ok(all)
    }
}

fn read_source(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}
