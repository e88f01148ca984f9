use crate::entry::Entry;
use crate::table::Tab;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Upload the selected file (the platform layer holds its path).
    SubmitJob { file_name: String, prompt: Option<String> },
    StartPolling { job_id: String },
    /// Stop the poll task. Idempotent; stopping an inactive task is a no-op.
    StopPolling,
    FetchResult { job_id: String },
    /// Replace both server-side sequences with the given label-keyed records.
    SaveResult {
        job_id: String,
        detailed: Vec<Entry>,
        summary: Vec<Entry>,
    },
    /// Best-effort server-side cancellation; local state has already moved on.
    CancelJob { job_id: String },
    DeleteJob { job_id: String },
    CheckHealth,
    /// Ask the user to confirm a destructive action; answered by
    /// `Msg::ConfirmResolved`.
    RequestConfirm { prompt: String },
    /// Write the currently filtered rows of the active sequence to disk.
    Export {
        format: ExportFormat,
        source_name: String,
        tab: Tab,
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}
