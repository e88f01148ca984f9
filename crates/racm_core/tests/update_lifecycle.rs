use std::sync::Once;

use racm_core::{
    update, AppState, Effect, Entry, LogKind, Msg, Phase, ResultSet, StatusSnapshot,
    MAX_CONSECUTIVE_POLL_FAILURES,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn snapshot(phase: Option<Phase>, pct: u8, msg: &str, detail: &str) -> StatusSnapshot {
    StatusSnapshot {
        phase,
        progress_pct: pct,
        progress_msg: msg.to_string(),
        detail_msg: detail.to_string(),
    }
}

fn submitted_state() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::FileSelected {
            name: "sop.pdf".to_string(),
            size: 2048,
        },
    );
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert_eq!(
        effects,
        vec![Effect::SubmitJob {
            file_name: "sop.pdf".to_string(),
            prompt: None,
        }]
    );
    let (state, effects) = update(state, Msg::SubmitFinished(Ok("J1".to_string())));
    assert_eq!(
        effects,
        vec![Effect::StartPolling {
            job_id: "J1".to_string()
        }]
    );
    state
}

fn detailed_entry(risk_id: &str) -> Entry {
    let mut entry = Entry::new();
    entry.set_field(2, risk_id.to_string());
    entry
}

#[test]
fn submit_poll_complete_renders_three_rows() {
    init_logging();
    let state = submitted_state();
    let job = state.job().expect("job established");
    assert_eq!(job.id, "J1");
    assert_eq!(job.phase, Phase::Queued);
    assert!(state.submission_locked());

    let (state, effects) = update(
        state,
        Msg::StatusArrived(snapshot(Some(Phase::Queued), 0, "Waiting...", "")),
    );
    assert!(effects.is_empty());
    let (state, effects) = update(
        state,
        Msg::StatusArrived(snapshot(Some(Phase::Extracting), 20, "Extracting text", "")),
    );
    assert!(effects.is_empty());
    let (state, effects) = update(
        state,
        Msg::StatusArrived(snapshot(Some(Phase::Completed), 100, "Done", "")),
    );
    assert_eq!(
        effects,
        vec![
            Effect::StopPolling,
            Effect::FetchResult {
                job_id: "J1".to_string()
            }
        ]
    );
    assert!(!state.submission_locked());

    let (state, effects) = update(
        state,
        Msg::ResultLoaded(Ok(ResultSet {
            detailed: vec![
                detailed_entry("R-1"),
                detailed_entry("R-2"),
                detailed_entry("R-3"),
            ],
            summary: vec![detailed_entry("S-1")],
            narrative: None,
        })),
    );
    assert!(effects.is_empty());

    let table = state.table_view().expect("table after load");
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.entry_count, "Showing 1-3 of 3 entries");
    assert_eq!(table.source_total, 3);
}

#[test]
fn poll_ticks_log_each_change_exactly_once() {
    init_logging();
    let state = submitted_state();
    let base_lines = state.log().len();

    let (state, _) = update(
        state,
        Msg::StatusArrived(snapshot(Some(Phase::Queued), 0, "Waiting...", "")),
    );
    // Phase change + new progress message.
    assert_eq!(state.log().len(), base_lines + 2);

    // Identical snapshot: nothing new to log.
    let (state, _) = update(
        state,
        Msg::StatusArrived(snapshot(Some(Phase::Queued), 0, "Waiting...", "")),
    );
    assert_eq!(state.log().len(), base_lines + 2);

    // Same phase, new detail message: one more line.
    let (state, _) = update(
        state,
        Msg::StatusArrived(snapshot(Some(Phase::Queued), 5, "Waiting...", "Page 3 of 12")),
    );
    assert_eq!(state.log().len(), base_lines + 3);
    let last = state.log().lines().last().expect("detail line");
    assert_eq!(last.text, "Page 3 of 12");
    assert_eq!(last.kind, LogKind::Detail);
}

#[test]
fn failed_job_stops_polling_without_result_fetch() {
    init_logging();
    let state = submitted_state();
    let (state, effects) = update(
        state,
        Msg::StatusArrived(snapshot(Some(Phase::Failed), 40, "OCR timeout", "")),
    );
    assert_eq!(effects, vec![Effect::StopPolling]);
    assert_eq!(state.notice(), Some("Job failed: OCR timeout"));
    assert!(!state.submission_locked());
    assert!(state.result().is_none());
}

#[test]
fn unknown_phase_updates_progress_but_not_phase() {
    init_logging();
    let state = submitted_state();
    let (state, effects) = update(
        state,
        Msg::StatusArrived(snapshot(None, 55, "Reticulating", "")),
    );
    assert!(effects.is_empty());
    let job = state.job().expect("job");
    assert_eq!(job.phase, Phase::Queued);
    assert_eq!(job.progress_pct, 55);
    assert_eq!(job.progress_msg, "Reticulating");
}

#[test]
fn transient_poll_failures_keep_the_timer() {
    init_logging();
    let state = submitted_state();
    let (state, effects) = update(
        state,
        Msg::PollFailed {
            message: "connection reset".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert!(state.submission_locked());

    // A successful snapshot resets the failure streak.
    let (state, _) = update(
        state,
        Msg::StatusArrived(snapshot(Some(Phase::Extracting), 10, "", "")),
    );
    assert_eq!(state.job().expect("job").consecutive_poll_failures, 0);
}

#[test]
fn repeated_poll_failures_abandon_the_job() {
    init_logging();
    let mut state = submitted_state();
    let mut final_effects = Vec::new();
    for _ in 0..MAX_CONSECUTIVE_POLL_FAILURES {
        let (next, effects) = update(
            state,
            Msg::PollFailed {
                message: "connection refused".to_string(),
            },
        );
        state = next;
        final_effects = effects;
    }
    assert_eq!(final_effects, vec![Effect::StopPolling]);
    assert!(!state.submission_locked());
    assert!(state.notice().expect("fatal notice").contains("connection refused"));

    // Further failures after abandonment are ignored.
    let (state, effects) = update(
        state,
        Msg::PollFailed {
            message: "still down".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.job().expect("job").consecutive_poll_failures,
        MAX_CONSECUTIVE_POLL_FAILURES
    );
}

#[test]
fn cancel_requires_confirmation_and_stops_locally() {
    init_logging();
    let state = submitted_state();
    let (state, effects) = update(state, Msg::CancelClicked);
    assert!(matches!(effects[..], [Effect::RequestConfirm { .. }]));
    assert!(state.awaiting_confirmation());

    let (state, effects) = update(state, Msg::ConfirmResolved { accepted: true });
    assert_eq!(
        effects,
        vec![
            Effect::StopPolling,
            Effect::CancelJob {
                job_id: "J1".to_string()
            }
        ]
    );
    assert_eq!(state.job().expect("job").phase, Phase::Cancelled);
    assert!(!state.submission_locked());

    // A server error on the cancel call changes nothing locally.
    let before = state.clone();
    let (state, effects) = update(
        state,
        Msg::CancelFinished(Err("503 service unavailable".to_string())),
    );
    assert!(effects.is_empty());
    assert_eq!(state.job(), before.job());
}

#[test]
fn declined_cancel_keeps_polling() {
    init_logging();
    let state = submitted_state();
    let (state, _) = update(state, Msg::CancelClicked);
    let (state, effects) = update(state, Msg::ConfirmResolved { accepted: false });
    assert!(effects.is_empty());
    assert_eq!(state.job().expect("job").phase, Phase::Queued);
    assert!(state.submission_locked());
}

#[test]
fn late_snapshot_after_cancel_is_ignored() {
    init_logging();
    let state = submitted_state();
    let (state, _) = update(state, Msg::CancelClicked);
    let (state, _) = update(state, Msg::ConfirmResolved { accepted: true });

    let (state, effects) = update(
        state,
        Msg::StatusArrived(snapshot(Some(Phase::Analyzing), 60, "late", "")),
    );
    assert!(effects.is_empty());
    assert_eq!(state.job().expect("job").phase, Phase::Cancelled);
}

#[test]
fn delete_clears_job_results_and_edits_together() {
    init_logging();
    let state = submitted_state();
    let (state, _) = update(
        state,
        Msg::StatusArrived(snapshot(Some(Phase::Completed), 100, "Done", "")),
    );
    let (state, _) = update(
        state,
        Msg::ResultLoaded(Ok(ResultSet {
            detailed: vec![detailed_entry("R-1")],
            summary: Vec::new(),
            narrative: None,
        })),
    );
    let (state, _) = update(
        state,
        Msg::CellEdited {
            entry: 0,
            field: 2,
            value: "R-9".to_string(),
        },
    );
    assert_eq!(state.overlay().len(), 1);

    let (state, effects) = update(state, Msg::DeleteClicked);
    assert!(matches!(effects[..], [Effect::RequestConfirm { .. }]));
    let (state, effects) = update(state, Msg::ConfirmResolved { accepted: true });
    assert_eq!(
        effects,
        vec![Effect::DeleteJob {
            job_id: "J1".to_string()
        }]
    );

    // Failure leaves everything in place.
    let (state, _) = update(state, Msg::DeleteFinished(Err("500".to_string())));
    assert!(state.job().is_some());
    assert!(state.result().is_some());
    assert_eq!(state.overlay().len(), 1);

    // Success clears the lot atomically.
    let (state, _) = update(state, Msg::DeleteFinished(Ok(())));
    assert!(state.job().is_none());
    assert!(state.result().is_none());
    assert!(state.overlay().is_empty());
    assert!(state.table_view().is_none());
}

#[test]
fn delete_unavailable_while_running() {
    init_logging();
    let state = submitted_state();
    let (state, effects) = update(state, Msg::DeleteClicked);
    assert!(effects.is_empty());
    assert!(!state.awaiting_confirmation());
}

#[test]
fn failed_submission_creates_no_job() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::FileSelected {
            name: "sop.pdf".to_string(),
            size: 10,
        },
    );
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, effects) = update(
        state,
        Msg::SubmitFinished(Err("authentication failed (401): check the API token".to_string())),
    );
    assert!(effects.is_empty());
    assert!(state.job().is_none());
    assert!(!state.submission_locked());
    assert!(state.notice().expect("notice").contains("401"));
}

#[test]
fn unsupported_file_type_is_rejected_before_upload() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::FileSelected {
            name: "notes.docx".to_string(),
            size: 10,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.notice(), Some("Unsupported file type: .docx"));

    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
    assert!(state.notice().expect("notice").contains("Select a file"));
}

#[test]
fn submission_locked_while_job_runs() {
    init_logging();
    let state = submitted_state();
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
    assert_eq!(state.notice(), Some("A job is already in progress."));
}
