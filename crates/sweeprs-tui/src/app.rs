//! Application state management.

use crate::clipboard::{Clipboard, SystemClipboard};
use crate::config::Config;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use sweeprs_core::{
    generate_password, Entry, EntryId, GroupSort, ReviewSession, SecurityAnalysis, Status,
    UNKNOWN_DOMAIN,
};

/// Application state.
#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Running,
    /// Application should quit.
    Quit,
}

/// Input mode for the application.
#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    /// Normal navigation mode.
    Normal,
    /// Typing a group filter.
    Search,
    /// Waiting for y/n on a bulk status change.
    Confirm,
    /// Help overlay is shown.
    Help,
}

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    /// Domain groups and entry details.
    Review,
    /// Reused and weak password dashboard.
    Security,
    /// Password generator.
    Generator,
}

impl View {
    pub fn next(self) -> Self {
        match self {
            View::Review => View::Security,
            View::Security => View::Generator,
            View::Generator => View::Review,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Review => "Review",
            View::Security => "Security",
            View::Generator => "Generator",
        }
    }
}

/// Which pane of the security view has the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SecurityFocus {
    /// Reused password clusters.
    Clusters,
    /// Members of the selected cluster, then weak entries.
    Entries,
}

/// A row in the flattened group list.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeItem {
    pub kind: TreeItemKind,
    /// Whether the group is expanded (only for groups).
    pub is_expanded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TreeItemKind {
    Group(String),
    /// Bucket of entries without a usable URL.
    Unresolved,
    Entry(EntryId),
}

/// A bulk status change waiting for confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingBulk {
    /// What is affected, e.g. `"x.com"`.
    pub target: String,
    pub ids: Vec<EntryId>,
    pub status: Status,
}

/// A password shown in clear text until `expires`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reveal {
    pub id: EntryId,
    pub expires: Instant,
}

/// Main application model.
pub struct App {
    pub state: AppState,
    pub input_mode: InputMode,
    pub view: View,
    pub config: Config,
    /// File the session was imported from.
    pub source_path: PathBuf,
    pub session: ReviewSession,
    /// Computed once; analysis does not depend on review status.
    pub analysis: SecurityAnalysis,

    // Review list state
    pub sort: GroupSort,
    /// Fuzzy filter over domains, names and usernames.
    pub filter: String,
    /// Domains of expanded groups.
    pub expanded_groups: HashSet<String>,
    /// Index of the selected row in `tree_items`.
    pub selected_index: usize,
    pub tree_items: Vec<TreeItem>,
    pub revealed: Option<Reveal>,

    // Security view state
    /// Selected reused cluster.
    pub cluster_index: usize,
    pub security_focus: SecurityFocus,
    /// Cursor into `security_rows()`.
    pub security_index: usize,

    /// Last generated password.
    pub generated: Option<String>,

    pub pending: Option<PendingBulk>,
    /// One-line feedback shown in the footer.
    pub status_message: Option<String>,
    /// Status changes since the last export.
    pub unsaved_changes: bool,
    clipboard: Box<dyn Clipboard>,
}

impl App {
    pub fn new(session: ReviewSession, config: Config, source_path: PathBuf) -> Self {
        let analysis = session.analysis();
        let mut app = Self {
            state: AppState::Running,
            input_mode: InputMode::Normal,
            view: View::Review,
            sort: config.default_sort,
            config,
            source_path,
            session,
            analysis,
            filter: String::new(),
            expanded_groups: HashSet::new(),
            selected_index: 0,
            tree_items: Vec::new(),
            revealed: None,
            cluster_index: 0,
            security_focus: SecurityFocus::Clusters,
            security_index: 0,
            generated: None,
            pending: None,
            status_message: None,
            unsaved_changes: false,
            clipboard: Box::new(SystemClipboard::default()),
        };
        app.rebuild_tree();
        app
    }

    /// Replace the clipboard used by [`App::yank`].
    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Rebuild the flattened list from the current sort, filter and expansion.
    pub fn rebuild_tree(&mut self) {
        let mut items = Vec::new();

        for group in self.session.ordered_groups(self.sort, &self.filter) {
            let is_expanded = self.expanded_groups.contains(&group.domain);
            items.push(TreeItem {
                kind: TreeItemKind::Group(group.domain.clone()),
                is_expanded,
            });
            if is_expanded {
                items.extend(group.entries.iter().map(|&id| TreeItem {
                    kind: TreeItemKind::Entry(id),
                    is_expanded: false,
                }));
            }
        }

        if !self.session.unresolved().is_empty() && self.filter.trim().is_empty() {
            let is_expanded = self.expanded_groups.contains(UNKNOWN_DOMAIN);
            items.push(TreeItem {
                kind: TreeItemKind::Unresolved,
                is_expanded,
            });
            if is_expanded {
                items.extend(self.session.unresolved().iter().map(|&id| TreeItem {
                    kind: TreeItemKind::Entry(id),
                    is_expanded: false,
                }));
            }
        }

        self.tree_items = items;
        if self.selected_index >= self.tree_items.len() {
            self.selected_index = self.tree_items.len().saturating_sub(1);
        }
    }

    pub fn current_item(&self) -> Option<&TreeItem> {
        self.tree_items.get(self.selected_index)
    }

    /// Entry under the cursor, if the cursor is on an entry row.
    pub fn selected_entry(&self) -> Option<&Entry> {
        match self.current_item()?.kind {
            TreeItemKind::Entry(id) => self.session.entry(id),
            _ => None,
        }
    }

    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.tree_items.len() {
            self.selected_index += 1;
        }
    }

    fn group_key(kind: &TreeItemKind) -> Option<String> {
        match kind {
            TreeItemKind::Group(domain) => Some(domain.clone()),
            TreeItemKind::Unresolved => Some(UNKNOWN_DOMAIN.to_string()),
            TreeItemKind::Entry(_) => None,
        }
    }

    /// Toggle the group under the cursor.
    pub fn toggle_current(&mut self) {
        let Some(key) = self.current_item().and_then(|item| Self::group_key(&item.kind)) else {
            return;
        };
        if !self.expanded_groups.remove(&key) {
            self.expanded_groups.insert(key);
        }
        self.rebuild_tree();
    }

    pub fn expand_current(&mut self) {
        if let Some(key) = self.current_item().and_then(|item| Self::group_key(&item.kind)) {
            if self.expanded_groups.insert(key) {
                self.rebuild_tree();
            }
        }
    }

    /// Collapse the current group, or the group containing the current entry.
    pub fn collapse_current(&mut self) {
        let Some(index) = self.tree_items[..self.selected_index.saturating_add(1).min(self.tree_items.len())]
            .iter()
            .rposition(|item| !matches!(item.kind, TreeItemKind::Entry(_)))
        else {
            return;
        };
        if let Some(key) = Self::group_key(&self.tree_items[index].kind) {
            if self.expanded_groups.remove(&key) {
                self.selected_index = index;
                self.rebuild_tree();
            }
        }
    }

    /// Apply a status to the row under the cursor.
    ///
    /// Entries change immediately; group rows ask for confirmation first.
    pub fn mark_current(&mut self, status: Status) {
        let Some(item) = self.current_item().cloned() else {
            return;
        };
        match item.kind {
            TreeItemKind::Entry(id) => {
                if let Err(e) = self.session.set_status(id, status) {
                    self.status_message = Some(e.to_string());
                    return;
                }
                self.unsaved_changes = true;
                self.status_message = None;
                self.move_down();
            }
            TreeItemKind::Group(domain) => {
                let ids = self
                    .session
                    .group(&domain)
                    .map(|g| g.entries.clone())
                    .unwrap_or_default();
                self.request_bulk(domain, ids, status);
            }
            TreeItemKind::Unresolved => {
                let ids = self.session.unresolved().to_vec();
                self.request_bulk("entries without a site".to_string(), ids, status);
            }
        }
    }

    /// Ask to apply a status to every entry of the selected reused cluster.
    pub fn mark_current_cluster(&mut self, status: Status) {
        let Some(cluster) = self.analysis.reused.get(self.cluster_index) else {
            return;
        };
        let target = format!("{} entries sharing one password", cluster.len());
        let ids = cluster.entries.clone();
        self.request_bulk(target, ids, status);
    }

    fn request_bulk(&mut self, target: String, ids: Vec<EntryId>, status: Status) {
        if ids.is_empty() {
            return;
        }
        self.pending = Some(PendingBulk { target, ids, status });
        self.input_mode = InputMode::Confirm;
    }

    pub fn confirm_pending(&mut self) {
        self.input_mode = InputMode::Normal;
        let Some(pending) = self.pending.take() else {
            return;
        };
        match self.session.set_statuses(&pending.ids, pending.status) {
            Ok(()) => {
                tracing::info!("Marked {} entries as {}", pending.ids.len(), pending.status);
                self.unsaved_changes = true;
                self.status_message = Some(format!(
                    "Marked {} entries as {}",
                    pending.ids.len(),
                    pending.status.label()
                ));
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    pub fn cancel_pending(&mut self) {
        self.pending = None;
        self.input_mode = InputMode::Normal;
    }

    /// Show the selected entry's password for the configured timeout.
    pub fn toggle_reveal(&mut self, now: Instant) {
        let Some(id) = self.focused_entry_id() else {
            return;
        };
        if self.revealed.is_some_and(|r| r.id == id) {
            self.revealed = None;
        } else {
            self.revealed = Some(Reveal {
                id,
                expires: now + Duration::from_secs(self.config.reveal_timeout_secs),
            });
        }
    }

    pub fn is_revealed(&self, id: EntryId) -> bool {
        self.revealed.is_some_and(|r| r.id == id)
    }

    /// Periodic housekeeping; hides expired reveals.
    pub fn tick(&mut self, now: Instant) {
        if self.revealed.is_some_and(|r| now >= r.expires) {
            self.revealed = None;
        }
    }

    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
        self.status_message = Some(format!("Sorted by {}", self.sort.label()));
        self.rebuild_tree();
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    /// Leave search mode, keeping the filter.
    pub fn accept_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Leave search mode and drop the filter.
    pub fn exit_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.filter.clear();
        self.rebuild_tree();
    }

    pub fn update_filter(&mut self) {
        self.selected_index = 0;
        self.rebuild_tree();
    }

    pub fn cluster_up(&mut self) {
        self.cluster_index = self.cluster_index.saturating_sub(1);
        self.security_index = 0;
    }

    pub fn cluster_down(&mut self) {
        if self.cluster_index + 1 < self.analysis.reused.len() {
            self.cluster_index += 1;
            self.security_index = 0;
        }
    }

    /// Entry rows of the security view: the selected cluster's members,
    /// then every weak entry.
    pub fn security_rows(&self) -> Vec<EntryId> {
        let members = self
            .analysis
            .reused
            .get(self.cluster_index)
            .map(|c| c.entries.as_slice())
            .unwrap_or_default();
        members.iter().chain(&self.analysis.weak).copied().collect()
    }

    pub fn focus_security_entries(&mut self) {
        if !self.security_rows().is_empty() {
            self.security_focus = SecurityFocus::Entries;
        }
    }

    pub fn focus_security_clusters(&mut self) {
        self.security_focus = SecurityFocus::Clusters;
    }

    pub fn security_up(&mut self) {
        self.security_index = self.security_index.saturating_sub(1);
    }

    pub fn security_down(&mut self) {
        if self.security_index + 1 < self.security_rows().len() {
            self.security_index += 1;
        }
    }

    /// Entry the cursor points at in the current view.
    pub fn focused_entry_id(&self) -> Option<EntryId> {
        match self.view {
            View::Review => self.selected_entry().map(|e| e.id),
            View::Security if self.security_focus == SecurityFocus::Entries => {
                self.security_rows().get(self.security_index).copied()
            }
            View::Security | View::Generator => None,
        }
    }

    /// Set the status of the entry under the security view cursor.
    pub fn mark_security_entry(&mut self, status: Status) {
        let Some(id) = self.focused_entry_id() else {
            return;
        };
        match self.session.set_status(id, status) {
            Ok(()) => {
                self.unsaved_changes = true;
                self.status_message = None;
                self.security_down();
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    /// Copy the generated password or the focused entry's password.
    pub fn yank(&mut self) {
        let text = match self.view {
            View::Generator => self.generated.clone(),
            View::Review | View::Security => self
                .focused_entry_id()
                .and_then(|id| self.session.entry(id))
                .map(|e| e.password.clone()),
        };
        let Some(text) = text else {
            self.status_message = Some("Nothing to copy".to_string());
            return;
        };
        self.status_message = Some(match self.clipboard.set_text(&text) {
            Ok(()) => "Copied password to clipboard".to_string(),
            Err(e) => {
                tracing::warn!("Clipboard write failed: {:#}", e);
                format!("Clipboard error: {e:#}")
            }
        });
    }

    pub fn regenerate(&mut self) {
        self.generated = generate_password(&self.config.generator);
        if self.generated.is_none() {
            self.status_message = Some("Enable at least one character set".to_string());
        }
    }

    /// Write the cleaned CSV to the configured output file.
    pub fn export(&mut self) {
        let path = self.config.output_file.clone();
        let options = self.config.export_options();
        match self.session.write_export(&path, &options) {
            Ok(()) => {
                let kept = self
                    .session
                    .entries()
                    .iter()
                    .filter(|e| e.status != Status::Delete)
                    .count();
                self.unsaved_changes = false;
                self.status_message = Some(format!("Exported {} entries to {}", kept, path.display()));
            }
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                self.status_message = Some(format!("Export failed: {e}"));
            }
        }
    }

    /// Quit, unless there are unexported changes and this is the first ask.
    pub fn request_quit(&mut self) -> bool {
        if self.unsaved_changes && self.status_message.as_deref() != Some(UNSAVED_WARNING) {
            self.status_message = Some(UNSAVED_WARNING.to_string());
            return false;
        }
        self.state = AppState::Quit;
        true
    }
}

pub const UNSAVED_WARNING: &str = "Unexported changes. Press e to export or q again to quit";

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    pub(crate) const CSV: &str = "name,url,username,password,date_last_used\n\
                                   x1,https://x.com/a,u1,p,2023-01-01\n\
                                   x2,http://www.x.com,u2,p,2024-01-01\n\
                                   mail,https://mail.example.org,alice,Str0ng&Unique!Pass,\n\
                                   router,,admin,admin,\n";

    /// Clipboard that records what was copied.
    #[derive(Default, Clone)]
    pub(crate) struct RecordingClipboard(pub Rc<RefCell<Vec<String>>>);

    impl Clipboard for RecordingClipboard {
        fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
            self.0.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    pub(crate) struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn set_text(&mut self, _text: &str) -> anyhow::Result<()> {
            anyhow::bail!("no display")
        }
    }

    pub(crate) fn app_with_clipboard(clipboard: Box<dyn Clipboard>) -> App {
        let session = ReviewSession::from_csv(CSV.as_bytes()).unwrap();
        App::new(session, Config::default(), PathBuf::from("passwords.csv"))
            .with_clipboard(clipboard)
    }

    pub(crate) fn app() -> App {
        app_with_clipboard(Box::new(RecordingClipboard::default()))
    }

    fn kinds(app: &App) -> Vec<TreeItemKind> {
        app.tree_items.iter().map(|i| i.kind.clone()).collect()
    }

    #[test]
    fn tree_lists_groups_then_unresolved() {
        let app = app();
        assert_eq!(
            kinds(&app),
            [
                TreeItemKind::Group("mail.example.org".to_string()),
                TreeItemKind::Group("x.com".to_string()),
                TreeItemKind::Unresolved,
            ]
        );
    }

    #[test]
    fn expanding_shows_entries_newest_first() {
        let mut app = app();
        app.move_down();
        app.toggle_current();
        assert_eq!(
            &kinds(&app)[1..4],
            [
                TreeItemKind::Group("x.com".to_string()),
                TreeItemKind::Entry(EntryId(1)),
                TreeItemKind::Entry(EntryId(0)),
            ]
        );

        app.move_down();
        app.move_down();
        assert_eq!(app.selected_entry().unwrap().name, "x1");
        app.collapse_current();
        assert_eq!(app.selected_index, 1);
        assert_eq!(app.tree_items.len(), 3);
    }

    #[test]
    fn marking_an_entry_updates_the_session() {
        let mut app = app();
        app.move_down();
        app.expand_current();
        app.move_down();
        app.mark_current(Status::Delete);

        assert_eq!(app.session.entry(EntryId(1)).unwrap().status, Status::Delete);
        assert!(app.unsaved_changes);
        assert_eq!(app.selected_index, 3);
    }

    #[test]
    fn group_rows_need_confirmation() {
        let mut app = app();
        app.move_down();
        app.mark_current(Status::Keep);
        assert_eq!(app.input_mode, InputMode::Confirm);
        assert_eq!(app.session.review_progress().keep, 0);

        app.confirm_pending();
        assert_eq!(app.session.group_progress("x.com").unwrap().keep, 2);
        assert_eq!(app.input_mode, InputMode::Normal);

        app.mark_current(Status::Delete);
        app.cancel_pending();
        assert_eq!(app.session.group_progress("x.com").unwrap().keep, 2);
    }

    #[test]
    fn reveal_expires_after_timeout() {
        let mut app = app();
        app.expand_current();
        app.move_down();
        let start = Instant::now();
        app.toggle_reveal(start);
        assert!(app.is_revealed(EntryId(2)));

        app.tick(start + Duration::from_secs(29));
        assert!(app.is_revealed(EntryId(2)));
        app.tick(start + Duration::from_secs(30));
        assert!(!app.is_revealed(EntryId(2)));
    }

    #[test]
    fn filter_hides_unmatched_groups() {
        let mut app = app();
        app.filter = "alice".to_string();
        app.update_filter();
        assert_eq!(kinds(&app), [TreeItemKind::Group("mail.example.org".to_string())]);

        app.exit_search();
        assert_eq!(app.tree_items.len(), 3);
    }

    #[test]
    fn export_writes_the_configured_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = app();
        app.config.output_file = dir.path().join("out.csv");
        app.config.include_status = false;
        app.session.set_status(EntryId(3), Status::Delete).unwrap();
        app.unsaved_changes = true;

        app.export();
        let written = std::fs::read_to_string(dir.path().join("out.csv")).unwrap();
        assert!(!written.contains("router"));
        assert!(!written.contains("status"));
        assert!(!app.unsaved_changes);
        assert!(app.status_message.unwrap().starts_with("Exported 3 entries"));
    }

    #[test]
    fn failed_export_is_reported_and_retryable() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = app();
        app.config.output_file = dir.path().join("missing").join("out.csv");
        app.unsaved_changes = true;

        app.export();
        assert!(app.status_message.as_deref().unwrap().starts_with("Export failed"));
        assert!(app.unsaved_changes);

        app.config.output_file = dir.path().join("out.csv");
        app.export();
        assert!(dir.path().join("out.csv").exists());
    }

    #[test]
    fn quitting_with_changes_asks_twice() {
        let mut app = app();
        app.unsaved_changes = true;
        assert!(!app.request_quit());
        assert!(app.request_quit());
        assert_eq!(app.state, AppState::Quit);
    }

    #[test]
    fn security_rows_list_members_then_weak_entries() {
        let mut app = app();
        app.view = View::Security;
        assert_eq!(app.analysis.weak, [EntryId(0), EntryId(1), EntryId(3)]);
        assert_eq!(
            app.security_rows(),
            [EntryId(0), EntryId(1), EntryId(0), EntryId(1), EntryId(3)]
        );
        assert_eq!(app.focused_entry_id(), None);

        app.focus_security_entries();
        app.security_down();
        app.security_down();
        app.security_down();
        app.security_down();
        app.security_down();
        assert_eq!(app.focused_entry_id(), Some(EntryId(3)));

        app.mark_security_entry(Status::Delete);
        assert_eq!(app.session.entry(EntryId(3)).unwrap().status, Status::Delete);
        assert!(app.unsaved_changes);
    }

    #[test]
    fn yank_copies_the_focused_password() {
        let copied = RecordingClipboard::default();
        let mut app = app_with_clipboard(Box::new(copied.clone()));
        app.yank();
        assert_eq!(app.status_message.as_deref(), Some("Nothing to copy"));

        app.expand_current();
        app.move_down();
        app.yank();
        assert_eq!(*copied.0.borrow(), ["Str0ng&Unique!Pass"]);
        assert_eq!(app.status_message.as_deref(), Some("Copied password to clipboard"));
    }

    #[test]
    fn clipboard_failure_is_reported() {
        let mut app = app_with_clipboard(Box::new(BrokenClipboard));
        app.view = View::Generator;
        app.regenerate();
        app.yank();
        let message = app.status_message.unwrap();
        assert!(message.starts_with("Clipboard error"));
        assert!(message.contains("no display"));
    }
}
