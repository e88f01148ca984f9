use std::fmt;

/// Pipeline stage reported by the analysis service, plus the client-local
/// `Cancelled` label. Phases advance through the listed order; `Completed`
/// and `Failed` are terminal and may be reached from any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Queued,
    Extracting,
    Chunking,
    Analyzing,
    Consolidating,
    Deduplicating,
    Summarizing,
    Completed,
    Failed,
    Cancelled,
}

impl Phase {
    /// Parse a wire phase name. Unknown names yield `None`; the caller keeps
    /// the previously observed phase in that case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" => Some(Phase::Queued),
            "extracting" => Some(Phase::Extracting),
            "chunking" => Some(Phase::Chunking),
            "analyzing" => Some(Phase::Analyzing),
            "consolidating" => Some(Phase::Consolidating),
            "deduplicating" => Some(Phase::Deduplicating),
            "summarizing" => Some(Phase::Summarizing),
            "completed" => Some(Phase::Completed),
            "failed" => Some(Phase::Failed),
            "cancelled" => Some(Phase::Cancelled),
            _ => None,
        }
    }

    /// Terminal phases stop the poll loop.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed | Phase::Cancelled)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Queued => "queued",
            Phase::Extracting => "extracting",
            Phase::Chunking => "chunking",
            Phase::Analyzing => "analyzing",
            Phase::Consolidating => "consolidating",
            Phase::Deduplicating => "deduplicating",
            Phase::Summarizing => "summarizing",
            Phase::Completed => "completed",
            Phase::Failed => "failed",
            Phase::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// One full status poll response. Each snapshot replaces the previous one
/// wholesale; only the activity log compares against prior values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    /// Parsed phase; `None` when the service sent an unrecognized name.
    pub phase: Option<Phase>,
    pub progress_pct: u8,
    pub progress_msg: String,
    pub detail_msg: String,
}

/// Consecutive status-poll transport failures tolerated before the client
/// gives up on the job and stops polling.
pub const MAX_CONSECUTIVE_POLL_FAILURES: u32 = 5;

/// The single current analysis job. Created by a successful submission,
/// mutated only by poll snapshots, forgotten on delete or resubmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub file_name: String,
    pub phase: Phase,
    pub progress_pct: u8,
    pub progress_msg: String,
    pub detail_msg: String,
    /// Transport failures since the last successful poll.
    pub consecutive_poll_failures: u32,
    /// Set when polling was abandoned after repeated transport failures.
    /// The job is still non-terminal server-side, but the client has
    /// disengaged and re-enabled submissions.
    pub polling_abandoned: bool,
    // Last values that produced an activity-log line.
    pub last_logged_phase: Option<Phase>,
    pub last_logged_progress: String,
    pub last_logged_detail: String,
}

impl Job {
    pub fn new(id: String, file_name: String) -> Self {
        Self {
            id,
            file_name,
            phase: Phase::Queued,
            progress_pct: 0,
            progress_msg: String::new(),
            detail_msg: String::new(),
            consecutive_poll_failures: 0,
            polling_abandoned: false,
            last_logged_phase: None,
            last_logged_progress: String::new(),
            last_logged_detail: String::new(),
        }
    }

    /// A job holds the submission lock while it is still running and the
    /// client has not disengaged from it.
    pub fn holds_submission_lock(&self) -> bool {
        !self.phase.is_terminal() && !self.polling_abandoned
    }
}

#[cfg(test)]
mod tests {
    use super::{Job, Phase};

    #[test]
    fn parse_accepts_wire_names_case_insensitively() {
        assert_eq!(Phase::parse("QUEUED"), Some(Phase::Queued));
        assert_eq!(Phase::parse(" analyzing "), Some(Phase::Analyzing));
        assert_eq!(Phase::parse("reticulating"), None);
        assert_eq!(Phase::parse(""), None);
    }

    #[test]
    fn terminal_phases() {
        assert!(Phase::Completed.is_terminal());
        assert!(Phase::Failed.is_terminal());
        assert!(Phase::Cancelled.is_terminal());
        assert!(!Phase::Summarizing.is_terminal());
    }

    #[test]
    fn new_job_holds_the_lock_until_terminal() {
        let mut job = Job::new("J1".into(), "sop.pdf".into());
        assert!(job.holds_submission_lock());
        job.phase = Phase::Failed;
        assert!(!job.holds_submission_lock());
    }
}
