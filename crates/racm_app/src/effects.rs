use std::path::PathBuf;

use client_logging::client_info;
use racm_client::{
    csv_document, export_file_name, json_document, write_export, ClientEvent, ClientHandle,
};
use racm_core::{Effect, ExportFormat, Msg, Phase, StatusSnapshot, Tab};

/// Executes core effects against the background client. Exports are the one
/// effect handled inline: they only touch the local filesystem.
pub struct EffectRunner {
    client: ClientHandle,
    source_path: PathBuf,
    export_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(client: ClientHandle, source_path: PathBuf, export_dir: PathBuf) -> Self {
        Self {
            client,
            source_path,
            export_dir,
        }
    }

    /// Run one effect. Returns a message when the effect completes
    /// synchronously; network effects report back via the event channel.
    /// `RequestConfirm` is handled by the interactive loop, never here.
    pub fn run(&self, effect: Effect) -> Option<Msg> {
        match effect {
            Effect::SubmitJob { file_name, prompt } => {
                client_info!("submitting {} for analysis", file_name);
                self.client
                    .submit(self.source_path.clone(), file_name, prompt);
                None
            }
            Effect::StartPolling { job_id } => {
                self.client.start_polling(job_id);
                None
            }
            Effect::StopPolling => {
                self.client.stop_polling();
                None
            }
            Effect::FetchResult { job_id } => {
                self.client.fetch_result(job_id);
                None
            }
            Effect::SaveResult {
                job_id,
                detailed,
                summary,
            } => {
                self.client.save(job_id, detailed, summary);
                None
            }
            Effect::CancelJob { job_id } => {
                self.client.cancel(job_id);
                None
            }
            Effect::DeleteJob { job_id } => {
                self.client.delete(job_id);
                None
            }
            Effect::CheckHealth => {
                self.client.check_health();
                None
            }
            Effect::RequestConfirm { .. } => None,
            Effect::Export {
                format,
                source_name,
                tab,
                header,
                rows,
            } => Some(self.export(format, &source_name, tab, &header, &rows)),
        }
    }

    pub fn try_event(&self) -> Option<ClientEvent> {
        self.client.try_recv()
    }

    fn export(
        &self,
        format: ExportFormat,
        source_name: &str,
        tab: Tab,
        header: &[String],
        rows: &[Vec<String>],
    ) -> Msg {
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let file_name = export_file_name(source_name, tab.label(), &date, format.extension());
        let content = match format {
            ExportFormat::Csv => csv_document(header, rows),
            ExportFormat::Json => json_document(header, rows),
        };
        match write_export(&self.export_dir, &file_name, &content) {
            Ok(path) => Msg::ExportFinished(Ok(path.display().to_string())),
            Err(err) => Msg::ExportFinished(Err(err.to_string())),
        }
    }
}

/// Translate a client completion into the core message vocabulary. Wire
/// phases parse here so the core only ever sees its own `Phase` type.
pub fn map_event(event: ClientEvent) -> Msg {
    match event {
        ClientEvent::SubmitFinished(result) => Msg::SubmitFinished(stringify(result)),
        ClientEvent::Status { result, .. } => match result {
            Ok(status) => Msg::StatusArrived(StatusSnapshot {
                phase: Phase::parse(&status.phase),
                progress_pct: status.progress_pct.clamp(0, 100) as u8,
                progress_msg: status.progress_msg,
                detail_msg: status.detail_msg,
            }),
            Err(err) => Msg::PollFailed {
                message: err.to_string(),
            },
        },
        ClientEvent::ResultFetched { result, .. } => Msg::ResultLoaded(stringify(result)),
        ClientEvent::SaveFinished(result) => Msg::SaveFinished(stringify(result)),
        ClientEvent::CancelFinished(result) => Msg::CancelFinished(stringify(result)),
        ClientEvent::DeleteFinished(result) => Msg::DeleteFinished(stringify(result)),
        ClientEvent::HealthChecked(result) => Msg::HealthChecked(stringify(result)),
    }
}

fn stringify<T>(result: Result<T, racm_client::ApiError>) -> Result<T, String> {
    result.map_err(|err| err.to_string())
}
