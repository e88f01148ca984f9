use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use client_logging::{client_info, client_warn};
use racm_core::Entry;

use crate::api::{ApiSettings, HttpJobApi, JobApi};
use crate::poller::{spawn_poller, PollHandle, DEFAULT_POLL_INTERVAL};
use crate::types::{ApiError, ClientEvent};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api: ApiSettings,
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

enum Command {
    StartPolling { job_id: String },
    StopPolling,
    Net(NetCommand),
}

/// One-shot network commands; each produces exactly one `ClientEvent`.
enum NetCommand {
    Submit {
        path: PathBuf,
        file_name: String,
        prompt: Option<String>,
    },
    FetchResult { job_id: String },
    Save {
        job_id: String,
        detailed: Vec<Entry>,
        summary: Vec<Entry>,
    },
    Cancel { job_id: String },
    Delete { job_id: String },
    CheckHealth,
}

/// Background network client: owns a tokio runtime on its own thread,
/// accepts commands, and reports completions over an event channel the
/// frontend drains from its loop.
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<Command>,
    event_rx: mpsc::Receiver<ClientEvent>,
}

impl ClientHandle {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let api: Arc<dyn JobApi> = Arc::new(HttpJobApi::new(config.api.clone())?);
        Ok(Self::with_api(api, config.poll_interval))
    }

    /// Test seam: run the command loop against any `JobApi`.
    pub fn with_api(api: Arc<dyn JobApi>, poll_interval: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (event_tx, event_rx) = mpsc::channel::<ClientEvent>();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            // Commands are processed in order; the poller is the only task
            // that outlives its command.
            let mut poller: Option<PollHandle> = None;

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    Command::StartPolling { job_id } => {
                        if let Some(old) = poller.take() {
                            old.cancel();
                        }
                        client_info!("start polling job {}", job_id);
                        poller = Some(spawn_poller(
                            runtime.handle(),
                            api.clone(),
                            job_id,
                            poll_interval,
                            event_tx.clone(),
                        ));
                    }
                    Command::StopPolling => {
                        if let Some(active) = poller.take() {
                            active.cancel();
                        }
                    }
                    Command::Net(net) => {
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let _ = event_tx.send(run_command(api.as_ref(), net).await);
                        });
                    }
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn submit(&self, path: PathBuf, file_name: impl Into<String>, prompt: Option<String>) {
        let _ = self.cmd_tx.send(Command::Net(NetCommand::Submit {
            path,
            file_name: file_name.into(),
            prompt,
        }));
    }

    pub fn start_polling(&self, job_id: impl Into<String>) {
        let _ = self.cmd_tx.send(Command::StartPolling {
            job_id: job_id.into(),
        });
    }

    pub fn stop_polling(&self) {
        let _ = self.cmd_tx.send(Command::StopPolling);
    }

    pub fn fetch_result(&self, job_id: impl Into<String>) {
        let _ = self.cmd_tx.send(Command::Net(NetCommand::FetchResult {
            job_id: job_id.into(),
        }));
    }

    pub fn save(&self, job_id: impl Into<String>, detailed: Vec<Entry>, summary: Vec<Entry>) {
        let _ = self.cmd_tx.send(Command::Net(NetCommand::Save {
            job_id: job_id.into(),
            detailed,
            summary,
        }));
    }

    pub fn cancel(&self, job_id: impl Into<String>) {
        let _ = self.cmd_tx.send(Command::Net(NetCommand::Cancel {
            job_id: job_id.into(),
        }));
    }

    pub fn delete(&self, job_id: impl Into<String>) {
        let _ = self.cmd_tx.send(Command::Net(NetCommand::Delete {
            job_id: job_id.into(),
        }));
    }

    pub fn check_health(&self) {
        let _ = self.cmd_tx.send(Command::Net(NetCommand::CheckHealth));
    }

    pub fn try_recv(&self) -> Option<ClientEvent> {
        self.event_rx.try_recv().ok()
    }
}

async fn run_command(api: &dyn JobApi, command: NetCommand) -> ClientEvent {
    match command {
        NetCommand::Submit {
            path,
            file_name,
            prompt,
        } => {
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    client_warn!("could not read {:?}: {}", path, err);
                    return ClientEvent::SubmitFinished(Err(ApiError::FileRead {
                        path: path.display().to_string(),
                        message: err.to_string(),
                    }));
                }
            };
            ClientEvent::SubmitFinished(api.submit(&file_name, bytes, prompt).await)
        }
        NetCommand::FetchResult { job_id } => {
            let result = api.result(&job_id).await;
            ClientEvent::ResultFetched { job_id, result }
        }
        NetCommand::Save {
            job_id,
            detailed,
            summary,
        } => ClientEvent::SaveFinished(api.update_result(&job_id, &detailed, &summary).await),
        NetCommand::Cancel { job_id } => ClientEvent::CancelFinished(api.delete(&job_id).await),
        NetCommand::Delete { job_id } => ClientEvent::DeleteFinished(api.delete(&job_id).await),
        NetCommand::CheckHealth => ClientEvent::HealthChecked(api.health().await),
    }
}
