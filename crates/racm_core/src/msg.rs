use crate::effect::ExportFormat;
use crate::job::StatusSnapshot;
use crate::state::ResultSet;
use crate::table::{PageSize, Tab};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    // ── User intents ────────────────────────────────────────────────
    /// A candidate upload was chosen (path stays in the platform layer).
    FileSelected { name: String, size: u64 },
    /// Free-text analysis instructions edited.
    PromptChanged(String),
    /// Submit the selected file for analysis.
    SubmitClicked,
    /// Probe the service health endpoint.
    HealthClicked,
    /// Stop the running analysis and delete its server-side state.
    CancelClicked,
    /// Forget the finished job and its results, locally and server-side.
    DeleteClicked,
    /// Switch between the detailed and summary sequences.
    TabClicked(Tab),
    FilterChanged { field: usize, text: String },
    SortClicked { field: usize },
    PageChanged(usize),
    PageSizeChanged(PageSize),
    /// Stage a cell edit. `entry` addresses the unfiltered active sequence.
    CellEdited { entry: usize, field: usize, value: String },
    /// Persist staged edits to the service.
    SaveClicked,
    /// Drop staged edits and re-render from canonical entries.
    DiscardClicked,
    ClearLogClicked,
    ExportClicked(ExportFormat),
    /// Answer to a pending confirmation request.
    ConfirmResolved { accepted: bool },

    // ── Client completions ──────────────────────────────────────────
    SubmitFinished(Result<String, String>),
    /// One status poll snapshot for the current job.
    StatusArrived(StatusSnapshot),
    /// A status poll failed at the transport level; polling continues.
    PollFailed { message: String },
    ResultLoaded(Result<ResultSet, String>),
    SaveFinished(Result<(), String>),
    CancelFinished(Result<(), String>),
    DeleteFinished(Result<(), String>),
    HealthChecked(Result<(), String>),
    ExportFinished(Result<String, String>),

    /// Fallback for placeholder wiring.
    NoOp,
}
