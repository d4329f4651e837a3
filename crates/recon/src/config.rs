use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ReconError;
use crate::loader::LoadOptions;
use crate::reference::{Combined, JsonKeyFile, KeyListFile, LiteralKeys};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// A `.toml` run file describing one reconciliation.
///
/// Relative paths are resolved against the config file's directory by
/// [`RunConfig::resolve`], not against the process working directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub source: Option<PathBuf>,
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub columns: ColumnConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnConfig {
    #[serde(default = "default_first_name")]
    pub first_name: usize,
    #[serde(default = "default_last_name")]
    pub last_name: usize,
    #[serde(default = "default_key")]
    pub key: usize,
}

fn default_first_name() -> usize {
    3
}

fn default_last_name() -> usize {
    4
}

fn default_key() -> usize {
    5
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            first_name: default_first_name(),
            last_name: default_last_name(),
            key: default_key(),
        }
    }
}

// ---------------------------------------------------------------------------
// Reference
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceConfig {
    /// Key-list files, one key per line.
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// JSON files holding an array of key strings.
    #[serde(default)]
    pub json_files: Vec<PathBuf>,
    /// Inline keys.
    #[serde(default)]
    pub keys: Vec<String>,
}

impl ReferenceConfig {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.json_files.is_empty() && self.keys.is_empty()
    }

    /// Build the combined reference source. Files come first, inline keys last.
    pub fn to_source(&self) -> Combined {
        let mut combined = Combined::default();
        for path in &self.files {
            combined.push(KeyListFile(path.clone()));
        }
        for path in &self.json_files {
            combined.push(JsonKeyFile(path.clone()));
        }
        if !self.keys.is_empty() {
            combined.push(LiteralKeys(self.keys.clone()));
        }
        combined
    }
}

// ---------------------------------------------------------------------------
// Parsing + validation
// ---------------------------------------------------------------------------

impl RunConfig {
    pub fn from_toml(s: &str) -> Result<Self, ReconError> {
        let config: Self = toml::from_str(s).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.delimiter_byte()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ReconError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ReconError::ConfigParse(format!("cannot read {}: {e}", path.display())))?;
        let mut config = Self::from_toml(&text)?;
        config.resolve(path.parent().unwrap_or_else(|| Path::new(".")));
        Ok(config)
    }

    /// Rebase relative paths onto `base_dir`. `-` (stdin) is left alone.
    pub fn resolve(&mut self, base_dir: &Path) {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() && p.as_os_str() != "-" {
                *p = base_dir.join(&*p);
            }
        };
        if let Some(ref mut source) = self.source {
            rebase(source);
        }
        self.reference.files.iter_mut().for_each(rebase);
        self.reference.json_files.iter_mut().for_each(rebase);
    }

    /// Single-byte delimiter, default `,`.
    pub fn delimiter_byte(&self) -> Result<u8, ReconError> {
        match self.delimiter.as_deref() {
            None => Ok(b','),
            Some(d) => parse_delimiter(d),
        }
    }

    pub fn load_options(&self) -> Result<LoadOptions, ReconError> {
        Ok(LoadOptions {
            delimiter: self.delimiter_byte()?,
            first_name_col: self.columns.first_name,
            last_name_col: self.columns.last_name,
            key_col: self.columns.key,
        })
    }

    /// A config is runnable once it names a source and at least one reference.
    pub fn validate_runnable(&self) -> Result<(), ReconError> {
        if self.source.is_none() {
            return Err(ReconError::ConfigValidation("no source file configured".into()));
        }
        if self.reference.is_empty() {
            return Err(ReconError::ConfigValidation(
                "no reference keys configured (files, json_files, or keys)".into(),
            ));
        }
        Ok(())
    }
}

/// Accepts a single ASCII character, or `\t` / `tab` for tab.
pub fn parse_delimiter(s: &str) -> Result<u8, ReconError> {
    match s {
        "\\t" | "tab" | "\t" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(ReconError::ConfigValidation(format!(
            "delimiter must be a single ASCII character, got {s:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let toml = r#"
source = "registrations.csv"
delimiter = ";"

[columns]
first_name = 0
last_name = 1
key = 2

[reference]
files = ["prod.txt"]
json_files = ["prod.json"]
keys = ["a@x.com"]
"#;
        let config = RunConfig::from_toml(toml).unwrap();
        let opts = config.load_options().unwrap();
        assert_eq!(opts.delimiter, b';');
        assert_eq!((opts.first_name_col, opts.last_name_col, opts.key_col), (0, 1, 2));
        assert_eq!(config.reference.to_source().0.len(), 3);
        config.validate_runnable().unwrap();
    }

    #[test]
    fn defaults_match_registration_export() {
        let config = RunConfig::from_toml("source = \"x.csv\"\n[reference]\nkeys = []\n").unwrap();
        assert_eq!(config.load_options().unwrap(), LoadOptions::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = RunConfig::from_toml("sourse = \"x.csv\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn multi_char_delimiter_is_rejected() {
        let err = RunConfig::from_toml("delimiter = \"||\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn tab_delimiter_spellings() {
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn runnable_requires_source_and_reference() {
        let no_ref = RunConfig::from_toml("source = \"x.csv\"\n").unwrap();
        assert!(matches!(no_ref.validate_runnable(), Err(ReconError::ConfigValidation(_))));

        let no_source = RunConfig::from_toml("[reference]\nkeys = [\"a@x.com\"]\n").unwrap();
        assert!(matches!(no_source.validate_runnable(), Err(ReconError::ConfigValidation(_))));
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let mut config = RunConfig::from_toml(
            "source = \"data/reg.csv\"\n[reference]\nfiles = [\"/abs/prod.txt\", \"-\", \"rel.txt\"]\n",
        )
        .unwrap();
        config.resolve(Path::new("/runs/nightly"));
        assert_eq!(config.source.unwrap(), PathBuf::from("/runs/nightly/data/reg.csv"));
        assert_eq!(config.reference.files[0], PathBuf::from("/abs/prod.txt"));
        assert_eq!(config.reference.files[1], PathBuf::from("-"));
        assert_eq!(config.reference.files[2], PathBuf::from("/runs/nightly/rel.txt"));
    }
}
