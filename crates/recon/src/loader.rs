//! Registration export -> `RegistryMapping`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::ReconError;
use crate::model::{IdentityKey, LoadStats, RegistryMapping};

/// Column layout of the registration export (0-based indices).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub first_name_col: usize,
    pub last_name_col: usize,
    pub key_col: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            first_name_col: 3,
            last_name_col: 4,
            key_col: 5,
        }
    }
}

impl LoadOptions {
    /// Rows with fewer fields than this are skipped.
    pub fn min_fields(&self) -> usize {
        self.first_name_col.max(self.last_name_col).max(self.key_col) + 1
    }
}

/// Open `path` and load it. Any open/read/decode failure is fatal.
pub fn load_registry_path(
    path: &Path,
    opts: &LoadOptions,
) -> Result<(RegistryMapping, LoadStats), ReconError> {
    let source = path.display().to_string();
    let file = File::open(path).map_err(|e| ReconError::SourceUnreadable {
        path: source.clone(),
        reason: e.to_string(),
    })?;
    load(file, opts, &source)
}

/// Load from an already-open reader (stdin, in-memory data).
pub fn load_registry_reader<R: Read>(
    reader: R,
    opts: &LoadOptions,
) -> Result<(RegistryMapping, LoadStats), ReconError> {
    load(reader, opts, "<stdin>")
}

fn load<R: Read>(
    reader: R,
    opts: &LoadOptions,
    source: &str,
) -> Result<(RegistryMapping, LoadStats), ReconError> {
    // First row is a header regardless of its content.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(opts.delimiter)
        .from_reader(reader);

    let min_fields = opts.min_fields();
    let mut mapping = RegistryMapping::new();
    let mut stats = LoadStats::default();

    for record in reader.records() {
        let record = record.map_err(|e| ReconError::SourceUnreadable {
            path: source.to_string(),
            reason: e.to_string(),
        })?;
        stats.rows_read += 1;

        if record.len() < min_fields {
            log::debug!(
                "{source}: skipping row {} ({} of {min_fields} fields)",
                stats.rows_read,
                record.len()
            );
            stats.rows_skipped += 1;
            continue;
        }

        let field = |i: usize| record.get(i).unwrap_or("").trim();
        let key = IdentityKey::new(field(opts.key_col));
        let label = format!("{} {}", field(opts.first_name_col), field(opts.last_name_col));

        if let Some(prev) = mapping.insert(key.clone(), label) {
            log::debug!("{source}: duplicate key {key}, replacing label '{prev}'");
            stats.duplicate_keys += 1;
        }
        stats.rows_accepted += 1;
    }

    log::info!(
        "{source}: {} rows read, {} accepted, {} skipped, {} unique keys",
        stats.rows_read,
        stats.rows_accepted,
        stats.rows_skipped,
        mapping.len()
    );

    Ok((mapping, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,date,event,first,last,email\n";

    fn load_str(data: &str) -> (RegistryMapping, LoadStats) {
        load_registry_reader(data.as_bytes(), &LoadOptions::default()).unwrap()
    }

    #[test]
    fn header_is_skipped_unconditionally() {
        // Header row that looks like data must still be ignored.
        let data = "1,x,y,Hdr,Row,hdr@x.com\n2,x,y,Ann,Lee,ann@x.com\n";
        let (m, stats) = load_str(data);
        assert_eq!(m.len(), 1);
        assert!(!m.contains(&IdentityKey::new("hdr@x.com")));
        assert_eq!(stats.rows_read, 1);
    }

    #[test]
    fn label_trims_parts_and_keeps_case() {
        let data = format!("{HEADER}1,d,e,  Mary ,  McDonald  ,  Mary@X.com \n");
        let (m, _) = load_str(&data);
        assert_eq!(m.label(&IdentityKey::new("mary@x.com")), Some("Mary McDonald"));
    }

    #[test]
    fn short_rows_are_skipped_and_counted() {
        let data = format!("{HEADER}1,d,e,Ann,Lee\n2,d,e,Bob,Ray,bob@x.com\n3\n");
        let (m, stats) = load_str(&data);
        assert_eq!(m.len(), 1);
        assert_eq!(stats.rows_read, 3);
        assert_eq!(stats.rows_skipped, 2);
        assert_eq!(stats.rows_accepted, 1);
    }

    #[test]
    fn extra_fields_are_accepted() {
        let data = format!("{HEADER}1,d,e,Ann,Lee,ann@x.com,extra,more\n");
        let (m, _) = load_str(&data);
        assert_eq!(m.label(&IdentityKey::new("ann@x.com")), Some("Ann Lee"));
    }

    #[test]
    fn duplicates_resolve_last_write_wins() {
        let data = format!("{HEADER}1,d,e,Ann,Old,ann@x.com\n2,d,e,Ann,New,ANN@X.COM\n");
        let (m, stats) = load_str(&data);
        assert_eq!(m.len(), 1);
        assert_eq!(m.label(&IdentityKey::new("ann@x.com")), Some("Ann New"));
        assert_eq!(stats.duplicate_keys, 1);
        assert_eq!(stats.rows_accepted, 2);
    }

    #[test]
    fn quoted_fields_with_delimiters() {
        let data = format!("{HEADER}1,d,\"Gala, 2024\",\"Jo, Jr\",Ng,jo@x.com\n");
        let (m, _) = load_str(&data);
        assert_eq!(m.label(&IdentityKey::new("jo@x.com")), Some("Jo, Jr Ng"));
    }

    #[test]
    fn custom_delimiter_and_columns() {
        let opts = LoadOptions {
            delimiter: b';',
            first_name_col: 1,
            last_name_col: 2,
            key_col: 0,
        };
        let data = "email;first;last\nA@X.com;Ann;Lee\nshort\n";
        let (m, stats) = load_registry_reader(data.as_bytes(), &opts).unwrap();
        assert_eq!(m.label(&IdentityKey::new("a@x.com")), Some("Ann Lee"));
        assert_eq!(stats.rows_skipped, 1);
    }

    #[test]
    fn empty_input_yields_empty_mapping() {
        let (m, stats) = load_str("");
        assert!(m.is_empty());
        assert_eq!(stats, LoadStats::default());
    }

    #[test]
    fn invalid_utf8_is_fatal() {
        let mut data = HEADER.as_bytes().to_vec();
        data.extend_from_slice(b"1,d,e,\xff\xfe,Lee,a@x.com\n");
        let err = load_registry_reader(data.as_slice(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, ReconError::SourceUnreadable { .. }));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_registry_path(Path::new("/nonexistent/registrations.csv"), &LoadOptions::default())
            .unwrap_err();
        match err {
            ReconError::SourceUnreadable { path, .. } => {
                assert!(path.contains("registrations.csv"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn min_fields_tracks_highest_column() {
        assert_eq!(LoadOptions::default().min_fields(), 6);
        let opts = LoadOptions {
            key_col: 9,
            ..LoadOptions::default()
        };
        assert_eq!(opts.min_fields(), 10);
    }
}
