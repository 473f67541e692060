//! CSV ingestion.

use crate::error::ImportError;
use crate::models::{Entry, EntryId, Status};
use csv::StringRecord;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Header names accepted for each field, in lookup order.
const NAME: &[&str] = &["name"];
const URL: &[&str] = &["url"];
const USERNAME: &[&str] = &["username"];
const PASSWORD: &[&str] = &["password"];
const NOTE: &[&str] = &["note"];
const CREATED: &[&str] = &["date_created", "timeCreated"];
const LAST_USED: &[&str] = &["date_last_used", "timeLastUsed"];
const PASSWORD_CHANGED: &[&str] = &["date_password_changed", "timePasswordChanged"];

/// Column positions resolved from the header row.
#[derive(Debug, Default)]
struct Columns {
    name: Option<usize>,
    url: Option<usize>,
    username: Option<usize>,
    password: Option<usize>,
    note: Option<usize>,
    created: Option<usize>,
    last_used: Option<usize>,
    password_changed: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| names.iter().position(|name| name == alias))
        };

        Self {
            name: find(NAME),
            url: find(URL),
            username: find(USERNAME),
            password: find(PASSWORD),
            note: find(NOTE),
            created: find(CREATED),
            last_used: find(LAST_USED),
            password_changed: find(PASSWORD_CHANGED),
        }
    }

    /// Build an entry, or `None` when a required field is missing.
    fn entry(&self, record: &StringRecord, id: EntryId) -> Option<Entry> {
        let field = |column: Option<usize>| column.and_then(|i| record.get(i)).map(str::to_string);

        Some(Entry {
            id,
            url: field(self.url)?,
            username: field(self.username)?,
            password: field(self.password)?,
            name: field(self.name).unwrap_or_default(),
            note: field(self.note),
            time_created: field(self.created),
            time_last_used: field(self.last_used),
            time_password_changed: field(self.password_changed),
            status: Status::Review,
        })
    }
}

/// Parse CSV text into entries.
///
/// Rows without a `url`, `username` or `password` value are skipped. Any
/// read or decode error aborts the whole import.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Entry>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::from_headers(reader.headers()?);
    if columns.url.is_none() || columns.username.is_none() || columns.password.is_none() {
        tracing::warn!("CSV header lacks url, username or password column; no rows will be imported");
    }

    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record?;
        match columns.entry(&record, EntryId(entries.len())) {
            Some(entry) => entries.push(entry),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} rows missing required fields", skipped);
    }
    tracing::info!("Imported {} entries", entries.len());

    Ok(entries)
}

/// Parse CSV from a string.
pub fn parse_csv_str(data: &str) -> Result<Vec<Entry>, ImportError> {
    parse_csv(data.as_bytes())
}

/// Read and parse a CSV export from disk.
pub fn import_file(path: impl AsRef<Path>) -> Result<Vec<Entry>, ImportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Reading password export from {}", path.display());
    parse_csv(BufReader::new(file))
}
