//! Writing the cleaned export.

use crate::error::ExportError;
use crate::models::{Entry, Status};
use std::fs;
use std::path::Path;

/// Options controlling the exported columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Append a `status` column with each entry's review decision.
    pub include_status: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_status: true,
        }
    }
}

/// Optional columns, written only when some exported entry has the field.
const OPTIONAL_COLUMNS: [(&str, fn(&Entry) -> Option<&str>); 4] = [
    ("note", |e| e.note.as_deref()),
    ("date_created", |e| e.time_created.as_deref()),
    ("date_last_used", |e| e.time_last_used.as_deref()),
    ("date_password_changed", |e| e.time_password_changed.as_deref()),
];

/// Serialize every entry not marked for deletion, in the order given.
pub fn export_csv<'a>(
    entries: impl IntoIterator<Item = &'a Entry>,
    options: &ExportOptions,
) -> Result<String, ExportError> {
    let kept: Vec<&Entry> = entries
        .into_iter()
        .filter(|e| e.status != Status::Delete)
        .collect();

    let optional: Vec<_> = OPTIONAL_COLUMNS
        .iter()
        .filter(|(_, get)| kept.iter().any(|&e| get(e).is_some()))
        .collect();

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    let mut header = vec!["name", "url", "username", "password"];
    header.extend(optional.iter().map(|(column, _)| *column));
    if options.include_status {
        header.push("status");
    }
    writer.write_record(&header)?;

    for &entry in &kept {
        let mut row = vec![
            entry.name.as_str(),
            entry.url.as_str(),
            entry.username.as_str(),
            entry.password.as_str(),
        ];
        row.extend(optional.iter().map(|(_, get)| get(entry).unwrap_or_default()));
        if options.include_status {
            row.push(entry.status.as_str());
        }
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.into_error()))?;
    tracing::info!("Exported {} entries", kept.len());
    Ok(String::from_utf8(bytes)?)
}

/// Export to a file, replacing it if it exists.
pub fn write_csv<'a>(
    path: impl AsRef<Path>,
    entries: impl IntoIterator<Item = &'a Entry>,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let csv = export_csv(entries, options)?;
    fs::write(path, csv).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Wrote cleaned export to {}", path.display());
    Ok(())
}
