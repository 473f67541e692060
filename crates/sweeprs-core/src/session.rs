//! In-memory review state for one imported export.

use crate::error::{ExportError, ImportError, SessionError};
use crate::export::{self, ExportOptions};
use crate::grouping::{group_by_domain, unresolved};
use crate::import;
use crate::models::{Entry, EntryId, Group, Status};
use crate::security::{analyze, SecurityAnalysis, StatusCounts};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Ordering of groups in the review list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupSort {
    /// Order in which domains first appeared in the import.
    Imported,
    /// Alphabetical by domain.
    #[default]
    Name,
    /// Least reviewed first.
    Progress,
}

impl GroupSort {
    pub fn next(self) -> Self {
        match self {
            GroupSort::Imported => GroupSort::Name,
            GroupSort::Name => GroupSort::Progress,
            GroupSort::Progress => GroupSort::Imported,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GroupSort::Imported => "import order",
            GroupSort::Name => "name",
            GroupSort::Progress => "progress",
        }
    }
}

/// Entries of one import, their domain groups and the user's decisions.
///
/// Entries are addressed by [`EntryId`]; group membership is fixed when the
/// session is created and status edits never move entries between groups.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    entries: Vec<Entry>,
    groups: Vec<Group>,
    group_index: HashMap<String, usize>,
    unresolved: Vec<EntryId>,
}

impl ReviewSession {
    /// Build a session. Ids are reassigned to match positions.
    pub fn new(mut entries: Vec<Entry>) -> Self {
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.id = EntryId(i);
        }

        let groups = group_by_domain(&entries);
        let group_index = groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.domain.clone(), i))
            .collect();
        let unresolved = unresolved(&entries);
        if !unresolved.is_empty() {
            tracing::warn!("{} entries have no usable URL", unresolved.len());
        }

        Self {
            entries,
            groups,
            group_index,
            unresolved,
        }
    }

    pub fn from_csv<R: Read>(reader: R) -> Result<Self, ImportError> {
        Ok(Self::new(import::parse_csv(reader)?))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        Ok(Self::new(import::import_file(path)?))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Groups in first-seen order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, domain: &str) -> Option<&Group> {
        self.group_index.get(domain).map(|&i| &self.groups[i])
    }

    /// Entries whose URL has no usable domain.
    pub fn unresolved(&self) -> &[EntryId] {
        &self.unresolved
    }

    /// Resolve ids to entries, skipping unknown ones.
    pub fn resolve<'a>(&'a self, ids: &'a [EntryId]) -> impl Iterator<Item = &'a Entry> + 'a {
        ids.iter().filter_map(|&id| self.entry(id))
    }

    /// Replace one entry's status.
    pub fn set_status(&mut self, id: EntryId, status: Status) -> Result<(), SessionError> {
        let entry = self
            .entries
            .get_mut(id.index())
            .ok_or(SessionError::UnknownEntry(id))?;
        tracing::debug!("Entry {} status {} -> {}", id, entry.status, status);
        entry.status = status;
        Ok(())
    }

    /// Set the status of several entries. Nothing changes if any id is unknown.
    pub fn set_statuses(&mut self, ids: &[EntryId], status: Status) -> Result<(), SessionError> {
        if let Some(&missing) = ids.iter().find(|id| id.index() >= self.entries.len()) {
            return Err(SessionError::UnknownEntry(missing));
        }
        for &id in ids {
            self.entries[id.index()].status = status;
        }
        tracing::debug!("Set {} entries to {}", ids.len(), status);
        Ok(())
    }

    /// Set the status of every entry in a domain group.
    pub fn set_group_status(&mut self, domain: &str, status: Status) -> Result<usize, SessionError> {
        let &slot = self
            .group_index
            .get(domain)
            .ok_or_else(|| SessionError::UnknownGroup(domain.to_string()))?;
        let ids = self.groups[slot].entries.clone();
        self.set_statuses(&ids, status)?;
        Ok(ids.len())
    }

    pub fn status_counts(&self, ids: &[EntryId]) -> StatusCounts {
        StatusCounts::tally(self.resolve(ids))
    }

    /// Tallies over every imported entry.
    pub fn review_progress(&self) -> StatusCounts {
        StatusCounts::tally(&self.entries)
    }

    pub fn group_progress(&self, domain: &str) -> Option<StatusCounts> {
        self.group(domain).map(|g| self.status_counts(&g.entries))
    }

    /// Groups sorted for display, filtered by a fuzzy query over the domain,
    /// entry names and usernames. An empty query keeps every group.
    pub fn ordered_groups(&self, sort: GroupSort, query: &str) -> Vec<&Group> {
        let query = query.trim();
        let mut groups: Vec<&Group> = if query.is_empty() {
            self.groups.iter().collect()
        } else {
            let matcher = SkimMatcherV2::default();
            self.groups
                .iter()
                .filter(|group| {
                    let mut haystack = group.domain.clone();
                    for entry in self.resolve(&group.entries) {
                        haystack.push(' ');
                        haystack.push_str(&entry.name);
                        haystack.push(' ');
                        haystack.push_str(&entry.username);
                    }
                    matcher.fuzzy_match(&haystack, query).is_some()
                })
                .collect()
        };

        match sort {
            GroupSort::Imported => {}
            GroupSort::Name => groups.sort_by(|a, b| a.domain.cmp(&b.domain)),
            GroupSort::Progress => groups.sort_by(|a, b| {
                let pa = self.status_counts(&a.entries).progress();
                let pb = self.status_counts(&b.entries).progress();
                pa.total_cmp(&pb).then_with(|| a.domain.cmp(&b.domain))
            }),
        }
        groups
    }

    /// Entries in export order: groups in import order, each group's entries
    /// in display order, then unresolved entries.
    pub fn export_order(&self) -> Vec<&Entry> {
        self.groups
            .iter()
            .flat_map(|g| self.resolve(&g.entries))
            .chain(self.resolve(&self.unresolved))
            .collect()
    }

    pub fn export_csv(&self, options: &ExportOptions) -> Result<String, ExportError> {
        export::export_csv(self.export_order(), options)
    }

    pub fn write_export(&self, path: impl AsRef<Path>, options: &ExportOptions) -> Result<(), ExportError> {
        export::write_csv(path, self.export_order(), options)
    }

    /// Fresh security analysis over every entry.
    pub fn analysis(&self) -> SecurityAnalysis {
        analyze(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "name,url,username,password,date_last_used\n\
                       x1,https://x.com/a,u1,p,2023-01-01\n\
                       x2,http://www.x.com,u2,p,2024-01-01\n\
                       mail,https://mail.example.org,alice,Str0ng&Unique!Pass,\n\
                       broken,,nobody,abc,\n\
                       bank,https://bank.example,alice,p,\n";

    fn session() -> ReviewSession {
        ReviewSession::from_csv(CSV.as_bytes()).unwrap()
    }

    #[test]
    fn groups_and_surfaces_unresolved_entries() {
        let session = session();
        let domains: Vec<_> = session.groups().iter().map(|g| g.domain.as_str()).collect();
        assert_eq!(domains, ["x.com", "mail.example.org", "bank.example"]);
        assert_eq!(session.group("x.com").unwrap().entries, [EntryId(1), EntryId(0)]);
        assert_eq!(session.unresolved(), [EntryId(3)]);
        assert_eq!(session.len(), 5);
    }

    #[test]
    fn new_reassigns_ids_by_position() {
        let entries = vec![
            Entry::new(EntryId(42), "a.com", "u", "p"),
            Entry::new(EntryId(42), "b.com", "u", "p"),
        ];
        let session = ReviewSession::new(entries);
        assert_eq!(session.entry(EntryId(1)).unwrap().url, "b.com");
        assert_eq!(session.entry(EntryId(1)).unwrap().id, EntryId(1));
    }

    #[test]
    fn status_edits_apply_in_call_order() {
        let mut session = session();
        session.set_status(EntryId(2), Status::Delete).unwrap();
        session.set_status(EntryId(2), Status::Keep).unwrap();
        session.set_status(EntryId(2), Status::Keep).unwrap();
        assert_eq!(session.entry(EntryId(2)).unwrap().status, Status::Keep);

        assert_eq!(
            session.set_status(EntryId(99), Status::Keep),
            Err(SessionError::UnknownEntry(EntryId(99)))
        );
    }

    #[test]
    fn bulk_updates_are_all_or_nothing() {
        let mut session = session();
        let result = session.set_statuses(&[EntryId(0), EntryId(50)], Status::Delete);
        assert_eq!(result, Err(SessionError::UnknownEntry(EntryId(50))));
        assert_eq!(session.entry(EntryId(0)).unwrap().status, Status::Review);

        assert_eq!(session.set_group_status("x.com", Status::Keep), Ok(2));
        assert_eq!(
            session.group_progress("x.com"),
            Some(StatusCounts { keep: 2, delete: 0, review: 0 })
        );
        assert_eq!(
            session.set_group_status("nope.com", Status::Keep),
            Err(SessionError::UnknownGroup("nope.com".to_string()))
        );
    }

    #[test]
    fn analysis_ids_target_the_right_entries() {
        let mut session = session();
        let analysis = session.analysis();
        assert_eq!(analysis.total, 5);
        assert_eq!(analysis.reused.len(), 1);

        let cluster = analysis.reused[0].clone();
        assert_eq!(cluster.password, "p");
        assert_eq!(cluster.entries, [EntryId(4), EntryId(0), EntryId(1)]);

        session.set_statuses(&cluster.entries, Status::Delete).unwrap();
        assert_eq!(session.status_counts(&cluster.entries).delete, 3);
        assert_eq!(session.entry(EntryId(2)).unwrap().status, Status::Review);

        // Analysis ignores status.
        assert_eq!(session.analysis(), analysis);
    }

    #[test]
    fn progress_counts_decisions() {
        let mut session = session();
        assert_eq!(session.review_progress().progress(), 0.0);
        session.set_status(EntryId(0), Status::Keep).unwrap();
        session.set_status(EntryId(3), Status::Delete).unwrap();
        let counts = session.review_progress();
        assert_eq!(counts.reviewed(), 2);
        assert_eq!(counts.review, 3);
    }

    #[test]
    fn orders_and_filters_groups() {
        let mut session = session();
        let by_name: Vec<_> = session
            .ordered_groups(GroupSort::Name, "")
            .iter()
            .map(|g| g.domain.clone())
            .collect();
        assert_eq!(by_name, ["bank.example", "mail.example.org", "x.com"]);

        session.set_group_status("bank.example", Status::Keep).unwrap();
        session.set_status(EntryId(0), Status::Keep).unwrap();
        let by_progress: Vec<_> = session
            .ordered_groups(GroupSort::Progress, "")
            .iter()
            .map(|g| g.domain.clone())
            .collect();
        assert_eq!(by_progress, ["mail.example.org", "x.com", "bank.example"]);

        let filtered: Vec<_> = session
            .ordered_groups(GroupSort::Imported, "alice")
            .iter()
            .map(|g| g.domain.clone())
            .collect();
        assert_eq!(filtered, ["mail.example.org", "bank.example"]);

        assert!(session.ordered_groups(GroupSort::Name, "zzzzqqq").is_empty());
    }

    #[test]
    fn export_drops_exactly_the_deleted_row() {
        let mut session = session();
        let before = session.export_csv(&ExportOptions { include_status: false }).unwrap();
        session.set_status(EntryId(2), Status::Delete).unwrap();
        let after = session.export_csv(&ExportOptions { include_status: false }).unwrap();

        let before_lines: Vec<_> = before.lines().collect();
        let after_lines: Vec<_> = after.lines().collect();
        assert_eq!(after_lines.len() + 1, before_lines.len());
        let removed: Vec<_> = before_lines
            .iter()
            .filter(|line| !after_lines.contains(line))
            .collect();
        assert_eq!(removed.len(), 1);
        assert!(removed[0].starts_with("mail,"));
    }

    #[test]
    fn export_order_follows_groups_then_unresolved() {
        let session = session();
        let names: Vec<_> = session.export_order().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["x2", "x1", "mail", "bank", "broken"]);
    }

    #[test]
    fn sort_cycles_through_all_orders() {
        let mut sort = GroupSort::default();
        assert_eq!(sort, GroupSort::Name);
        for _ in 0..3 {
            sort = sort.next();
        }
        assert_eq!(sort, GroupSort::Name);
    }
}
