//! Grouping entries by normalized domain.

use crate::domain::UNKNOWN_DOMAIN;
use crate::models::{Entry, EntryId, Group};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::collections::HashMap;

/// Group entries by their domain key.
///
/// Groups appear in the order their domain was first seen. Entries whose URL
/// normalizes to [`UNKNOWN_DOMAIN`] are left out; see [`unresolved`].
pub fn group_by_domain(entries: &[Entry]) -> Vec<Group> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(String, Vec<&Entry>)> = Vec::new();

    for entry in entries {
        let key = entry.domain();
        if key == UNKNOWN_DOMAIN {
            continue;
        }
        match index.get(&key) {
            Some(&slot) => buckets[slot].1.push(entry),
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push((key, vec![entry]));
            }
        }
    }

    tracing::debug!("Grouped {} entries into {} domains", entries.len(), buckets.len());

    buckets
        .into_iter()
        .map(|(domain, mut members)| {
            sort_recent_first(&mut members);
            Group {
                domain,
                entries: members.iter().map(|e| e.id).collect(),
            }
        })
        .collect()
}

/// Ids of entries whose URL has no usable domain.
pub fn unresolved(entries: &[Entry]) -> Vec<EntryId> {
    entries
        .iter()
        .filter(|e| e.domain() == UNKNOWN_DOMAIN)
        .map(|e| e.id)
        .collect()
}

/// Order entries by last use, newest first.
///
/// Only entries with a parseable timestamp move, and only among the slots
/// that held dated entries. Undated entries stay where they were and equal
/// timestamps keep their relative order.
pub fn sort_recent_first(entries: &mut [&Entry]) {
    let slots: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.last_used().is_some())
        .map(|(i, _)| i)
        .collect();
    if slots.len() < 2 {
        return;
    }

    let mut dated: Vec<(DateTime<Utc>, &Entry)> = slots
        .iter()
        .filter_map(|&i| entries[i].last_used().map(|t| (t, entries[i])))
        .collect();
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    for (slot, (_, entry)) in slots.into_iter().zip(dated) {
        entries[slot] = entry;
    }
}

/// Parse the date-like strings found in password exports.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (optionally with `T` and
/// fractional seconds), plain `YYYY-MM-DD`, and integer epoch milliseconds.
/// Naive values are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if value.bytes().all(|b| b.is_ascii_digit()) {
        let millis: i64 = value.parse().ok()?;
        return Utc.timestamp_millis_opt(millis).single();
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
