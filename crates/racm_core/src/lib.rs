//! RACM review core: pure state machine and view-model helpers.
mod activity;
mod effect;
mod entry;
mod job;
mod msg;
mod overlay;
mod schema;
mod state;
mod table;
mod update;
mod view_model;

pub use activity::{format_bytes, ActivityLog, LogKind, LogLine};
pub use effect::{Effect, ExportFormat};
pub use entry::Entry;
pub use job::{Job, Phase, StatusSnapshot, MAX_CONSECUTIVE_POLL_FAILURES};
pub use msg::Msg;
pub use overlay::EditOverlay;
pub use schema::{
    normalize_key, severity_rank, EXTRACTION_CONFIDENCE_FIELD, FIELD_COUNT, RACM_FIELDS,
    RISK_RATING_FIELD, SOURCE_QUOTE_FIELD,
};
pub use state::{is_accepted_file, AppState, ResultSet, SelectedFile, ACCEPTED_EXTENSIONS};
pub use table::{PageSize, SortDir, Tab, TableState, DEFAULT_PAGE_SIZE};
pub use update::update;
pub use view_model::{AppViewModel, JobView, RowView, TableView};
