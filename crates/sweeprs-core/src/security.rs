//! Password reuse and weakness analysis.

use crate::models::{Entry, EntryId, Status};
use crate::strength::password_strength;
use std::collections::{HashMap, HashSet};

/// Two or more entries sharing the same password.
#[derive(Debug, Clone, PartialEq)]
pub struct ReusedCluster {
    pub password: String,
    /// Members ordered by domain.
    pub entries: Vec<EntryId>,
}

impl ReusedCluster {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Snapshot of the credential hygiene of a set of entries.
///
/// Entries are referenced by id; recompute after status edits to get fresh
/// status counts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SecurityAnalysis {
    pub reused: Vec<ReusedCluster>,
    pub weak: Vec<EntryId>,
    pub total: usize,
    pub unique_passwords: usize,
}

impl SecurityAnalysis {
    /// Number of entries that share their password with another entry.
    pub fn reused_entry_count(&self) -> usize {
        self.reused.iter().map(ReusedCluster::len).sum()
    }

    /// `count` as a rounded percentage of all analyzed entries.
    pub fn percent_of_total(&self, count: usize) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((count as f64 / self.total as f64) * 100.0).round() as u32
    }

    pub fn is_weak(&self, id: EntryId) -> bool {
        self.weak.contains(&id)
    }

    /// The cluster containing `id`, if its password is reused.
    pub fn cluster_of(&self, id: EntryId) -> Option<&ReusedCluster> {
        self.reused.iter().find(|c| c.entries.contains(&id))
    }
}

/// Analyze entries for reused and weak passwords.
pub fn analyze(entries: &[Entry]) -> SecurityAnalysis {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut by_password: Vec<(&str, Vec<(String, EntryId)>)> = Vec::new();
    let mut weak = Vec::new();

    for entry in entries {
        let member = (entry.domain(), entry.id);
        match index.get(entry.password.as_str()) {
            Some(&slot) => by_password[slot].1.push(member),
            None => {
                index.insert(&entry.password, by_password.len());
                by_password.push((&entry.password, vec![member]));
            }
        }

        if password_strength(&entry.password).is_weak() {
            weak.push(entry.id);
        }
    }

    let unique_passwords = unique_password_count(entries);

    let mut reused: Vec<(String, ReusedCluster)> = by_password
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(password, mut members)| {
            members.sort_by(|a, b| a.0.cmp(&b.0));
            let first_domain = members[0].0.clone();
            let cluster = ReusedCluster {
                password: password.to_string(),
                entries: members.into_iter().map(|(_, id)| id).collect(),
            };
            (first_domain, cluster)
        })
        .collect();
    reused.sort_by(|a, b| a.0.cmp(&b.0));

    tracing::debug!(
        "Analyzed {} entries: {} reused clusters, {} weak",
        entries.len(),
        reused.len(),
        weak.len()
    );

    SecurityAnalysis {
        reused: reused.into_iter().map(|(_, cluster)| cluster).collect(),
        weak,
        total: entries.len(),
        unique_passwords,
    }
}

/// Number of distinct password values, compared exactly.
pub fn unique_password_count(entries: &[Entry]) -> usize {
    entries
        .iter()
        .map(|e| e.password.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Keep/delete/review tallies for a set of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub keep: usize,
    pub delete: usize,
    pub review: usize,
}

impl StatusCounts {
    pub fn tally<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut counts = Self::default();
        for entry in entries {
            match entry.status {
                Status::Keep => counts.keep += 1,
                Status::Delete => counts.delete += 1,
                Status::Review => counts.review += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.keep + self.delete + self.review
    }

    /// Entries with a decision other than review.
    pub fn reviewed(&self) -> usize {
        self.keep + self.delete
    }

    /// Fraction of entries reviewed, in `0.0..=1.0`. Empty sets count as 0.
    pub fn progress(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.reviewed() as f64 / total as f64,
        }
    }
}
