use std::io::{BufRead, Write};
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use racm_client::{render_narrative, ApiSettings, ClientConfig, ClientEvent, ClientHandle};
use racm_core::{update, AppState, Effect, Msg, FIELD_COUNT, RACM_FIELDS};

use crate::commands::{self, Command};
use crate::effects::{map_event, EffectRunner};
use crate::logging::{self, LogDestination};
use crate::render;
use crate::{Args, LogArg};

pub fn run(args: Args) -> anyhow::Result<()> {
    logging::initialize(match args.log {
        LogArg::File => LogDestination::File,
        LogArg::Terminal => LogDestination::Terminal,
        LogArg::Both => LogDestination::Both,
    });

    let metadata = std::fs::metadata(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document")
        .to_string();

    let config = ClientConfig {
        api: ApiSettings {
            base_url: args.api_url.clone(),
            api_token: args.token.clone(),
            ..ApiSettings::default()
        },
        poll_interval: Duration::from_millis(args.poll_interval_ms),
    };
    let client = ClientHandle::new(config)
        .map_err(|err| anyhow::anyhow!("client setup failed: {err}"))?;
    let runner = EffectRunner::new(client, args.file.clone(), args.export_dir.clone());

    let mut app = App::new(runner);
    if args.check_health {
        app.dispatch(Msg::HealthClicked);
    }
    app.dispatch(Msg::FileSelected {
        name: file_name,
        size: metadata.len(),
    });
    if let Some(prompt) = args.prompt {
        app.dispatch(Msg::PromptChanged(prompt));
    }
    app.dispatch(Msg::SubmitClicked);
    app.flush();

    println!("Type 'help' for commands.");
    let stdin_rx = spawn_stdin_reader();

    loop {
        let mut worked = false;

        while let Some(event) = app.runner.try_event() {
            if matches!(
                event,
                ClientEvent::ResultFetched { .. } | ClientEvent::SaveFinished(Ok(()))
            ) {
                app.show_table = true;
            }
            app.dispatch(map_event(event));
            worked = true;
        }

        match stdin_rx.try_recv() {
            Ok(line) => {
                app.handle_line(&line);
                worked = true;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => app.quit = true,
        }

        app.flush();
        if app.quit {
            break;
        }
        if !worked {
            thread::sleep(Duration::from_millis(20));
        }
    }
    Ok(())
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

struct App {
    state: AppState,
    runner: EffectRunner,
    /// Log lines already printed; reset when the log shrinks (clear).
    printed_log: usize,
    last_notice: Option<String>,
    show_table: bool,
    quit: bool,
    /// Quit asked while unsaved edits exist; next line answers the prompt.
    quit_pending: bool,
}

impl App {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            printed_log: 0,
            last_notice: None,
            show_table: false,
            quit: false,
            quit_pending: false,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;

        for effect in effects {
            if let Effect::RequestConfirm { prompt } = &effect {
                print!("{prompt} [y/N] ");
                let _ = std::io::stdout().flush();
                continue;
            }
            if let Some(follow_up) = self.runner.run(effect) {
                self.dispatch(follow_up);
            }
        }
    }

    fn handle_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if self.quit_pending {
            self.quit_pending = false;
            self.quit = is_yes(line);
            return;
        }
        if self.state.awaiting_confirmation() {
            self.dispatch(Msg::ConfirmResolved {
                accepted: is_yes(line),
            });
            return;
        }

        match commands::parse(line) {
            Command::Dispatch(msg) => {
                if matches!(
                    msg,
                    Msg::TabClicked(_)
                        | Msg::FilterChanged { .. }
                        | Msg::SortClicked { .. }
                        | Msg::PageChanged(_)
                        | Msg::PageSizeChanged(_)
                        | Msg::CellEdited { .. }
                        | Msg::DiscardClicked
                ) {
                    self.show_table = true;
                }
                self.dispatch(msg);
            }
            Command::ShowRows => self.show_table = true,
            Command::ShowEntry(entry) => self.print_entry(entry),
            Command::ShowStatus => match self.state.view().job {
                Some(job) => println!("{}", render::status(&job)),
                None => println!("No job yet."),
            },
            Command::ShowSummary => match self.state.view().narrative {
                Some(narrative) => println!("{}", render_narrative(&narrative)),
                None => println!("No executive summary available."),
            },
            Command::ShowLog => {
                for line in self.state.log().lines() {
                    println!("{}", render::log_line(line));
                }
            }
            Command::Help => println!("{}", render::help()),
            Command::Quit => {
                let staged = self.state.overlay().len();
                if staged > 0 {
                    print!("Discard {staged} unsaved edit(s) and quit? [y/N] ");
                    let _ = std::io::stdout().flush();
                    self.quit_pending = true;
                } else {
                    self.quit = true;
                }
            }
            Command::Unknown(message) => println!("{message}"),
        }
    }

    fn print_entry(&self, entry: usize) {
        let entries = self.state.active_entries();
        if entry >= entries.len() {
            println!("No entry {entry} in the {} view.", self.state.table().tab.label());
            return;
        }
        for field in 0..FIELD_COUNT {
            println!(
                "{:>32}: {}",
                RACM_FIELDS[field],
                self.state.overlay().displayed(entries, entry, field)
            );
        }
    }

    fn flush(&mut self) {
        let lines = self.state.log().lines();
        if lines.len() < self.printed_log {
            self.printed_log = 0;
        }
        for line in &lines[self.printed_log..] {
            println!("{}", render::log_line(line));
        }
        self.printed_log = lines.len();

        if self.state.consume_dirty() {
            let notice = self.state.notice().map(str::to_string);
            if notice != self.last_notice {
                if let Some(text) = &notice {
                    println!("! {text}");
                }
                self.last_notice = notice;
            }
        }

        if self.show_table {
            if let Some(view) = self.state.table_view() {
                println!("{}", render::table(&view));
            }
            self.show_table = false;
        }
    }
}

fn is_yes(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
