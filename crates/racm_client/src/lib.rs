//! RACM review client engine: service API, poll task, and export surfaces.
mod api;
mod export;
mod filename;
mod handle;
mod markdown;
mod poller;
mod types;

pub use api::{ApiSettings, HttpJobApi, JobApi};
pub use export::{csv_document, json_document, write_export, ExportError};
pub use filename::export_file_name;
pub use handle::{ClientConfig, ClientHandle};
pub use markdown::render_narrative;
pub use poller::{spawn_poller, PollHandle, DEFAULT_POLL_INTERVAL};
pub use types::{ApiError, ClientEvent, SubmitResponse, WireResult, WireStatus};
