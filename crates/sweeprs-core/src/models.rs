//! Shared data types for the review workflow.

use crate::grouping::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier assigned to an entry at import time.
///
/// Ids are positions in the imported sequence, so they stay valid for the
/// whole session no matter how groups are sorted or filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EntryId(pub usize);

impl EntryId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The user's disposition for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Keep,
    Delete,
    /// Initial state after import. Also a valid final state.
    #[default]
    Review,
}

impl Status {
    /// Tag used in exported files.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Keep => "keep",
            Status::Delete => "delete",
            Status::Review => "review",
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Status::Keep => "Keep",
            Status::Delete => "Delete",
            Status::Review => "Review Later",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One imported credential record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    /// URL exactly as it appeared in the import.
    pub url: String,
    pub username: String,
    pub password: String,
    pub note: Option<String>,
    pub time_created: Option<String>,
    pub time_last_used: Option<String>,
    pub time_password_changed: Option<String>,
    pub status: Status,
}

impl Entry {
    /// Create an entry with only the required fields set.
    pub fn new(
        id: EntryId,
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id,
            url: url.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Normalized domain key of this entry's URL.
    pub fn domain(&self) -> String {
        crate::domain::normalize_url(&self.url)
    }

    /// Last-used time, if present and parseable.
    pub fn last_used(&self) -> Option<DateTime<Utc>> {
        self.time_last_used.as_deref().and_then(parse_timestamp)
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.time_created.as_deref().and_then(parse_timestamp)
    }

    pub fn password_changed(&self) -> Option<DateTime<Utc>> {
        self.time_password_changed.as_deref().and_then(parse_timestamp)
    }
}

/// Entries sharing a normalized domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub domain: String,
    /// Members in display order (most recently used first).
    pub entries: Vec<EntryId>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn date_accessors_parse_each_column() {
        let entry = Entry {
            time_created: Some("2020-01-02".to_string()),
            time_last_used: Some("1709641800000".to_string()),
            time_password_changed: Some("not a date".to_string()),
            ..Entry::new(EntryId(0), "https://a.com", "u", "p")
        };

        assert_eq!(entry.created(), Some(Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap()));
        assert_eq!(entry.last_used(), Some(Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap()));
        assert_eq!(entry.password_changed(), None);
        assert_eq!(Entry::default().created(), None);
    }

    #[test]
    fn status_tags_and_labels() {
        assert_eq!(Status::default(), Status::Review);
        assert_eq!(Status::Delete.to_string(), "delete");
        assert_eq!(Status::Review.label(), "Review Later");
    }
}
