use crate::activity::{ActivityLog, LogKind};
use crate::entry::Entry;
use crate::job::Job;
use crate::overlay::EditOverlay;
use crate::table::{Tab, TableState};

/// Upload types the service accepts; checked before submission so an
/// unsupported document is rejected without a round-trip.
pub const ACCEPTED_EXTENSIONS: [&str; 4] = [".pdf", ".xlsx", ".xls", ".csv"];

pub fn is_accepted_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    ACCEPTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// The document chosen for upload. The platform layer keeps the path; the
/// core only needs what it shows and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
}

/// The last server-confirmed result: both sequences plus the optional
/// executive-summary narrative.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSet {
    pub detailed: Vec<Entry>,
    pub summary: Vec<Entry>,
    pub narrative: Option<String>,
}

/// A destructive action parked behind a confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    SwitchTab(Tab),
    Submit,
    Cancel,
    Delete,
}

/// The whole client session: current job, canonical result, table view
/// configuration, staged edits, and the activity log. Owned by the single
/// event loop; every mutation goes through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) selected_file: Option<SelectedFile>,
    pub(crate) prompt: String,
    /// A submission request is in flight.
    pub(crate) submitting: bool,
    pub(crate) job: Option<Job>,
    pub(crate) result: Option<ResultSet>,
    pub(crate) table: TableState,
    pub(crate) overlay: EditOverlay,
    /// The applied copy shipped by an in-flight save; folded into canonical
    /// state only once the server confirms.
    pub(crate) pending_save: Option<ResultSet>,
    pub(crate) pending: Option<PendingAction>,
    pub(crate) log: ActivityLog,
    /// Latest user-visible error/info banner.
    pub(crate) notice: Option<String>,
    pub(crate) health: Option<Result<(), String>>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sequence the active tab points at, or an empty slice before any
    /// result has loaded.
    pub fn active_entries(&self) -> &[Entry] {
        match (&self.result, self.table.tab) {
            (Some(result), Tab::Detailed) => &result.detailed,
            (Some(result), Tab::Summary) => &result.summary,
            (None, _) => &[],
        }
    }

    /// New analyses are blocked while one is in flight or a live job still
    /// holds the lock.
    pub fn submission_locked(&self) -> bool {
        self.submitting || self.job.as_ref().is_some_and(Job::holds_submission_lock)
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn result(&self) -> Option<&ResultSet> {
        self.result.as_ref()
    }

    pub fn overlay(&self) -> &EditOverlay {
        &self.overlay
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// True while a confirmation prompt is outstanding.
    pub fn awaiting_confirmation(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn set_notice(&mut self, text: impl Into<String>) {
        self.notice = Some(text.into());
        self.mark_dirty();
    }

    pub(crate) fn push_log(
        &mut self,
        tag: impl Into<String>,
        text: impl Into<String>,
        kind: LogKind,
    ) {
        self.log.push(tag, text, kind);
        self.mark_dirty();
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Render coalescing, as in the platform event loop: returns whether a
    /// re-render is due and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
