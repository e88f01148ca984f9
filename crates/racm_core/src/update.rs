use crate::activity::{format_bytes, LogKind};
use crate::effect::{Effect, ExportFormat};
use crate::job::{Job, Phase, StatusSnapshot, MAX_CONSECUTIVE_POLL_FAILURES};
use crate::msg::Msg;
use crate::schema;
use crate::state::{is_accepted_file, AppState, PendingAction, ResultSet, SelectedFile};
use crate::table::{self, Tab};

/// Pure update function: applies a message to state and returns any effects.
///
/// Destructive actions (tab switch over unsaved edits, resubmission, cancel,
/// delete) park a `PendingAction` and emit `Effect::RequestConfirm`; they only
/// run once `Msg::ConfirmResolved { accepted: true }` arrives.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected { name, size } => {
            if !is_accepted_file(&name) {
                let ext = name.rfind('.').map(|i| &name[i..]).unwrap_or("");
                state.set_notice(format!("Unsupported file type: {ext}"));
                return (state, Vec::new());
            }
            state.selected_file = Some(SelectedFile { name, size });
            state.mark_dirty();
            Vec::new()
        }
        Msg::PromptChanged(text) => {
            state.prompt = text;
            Vec::new()
        }
        Msg::SubmitClicked => {
            if state.submission_locked() {
                state.set_notice("A job is already in progress.");
                return (state, Vec::new());
            }
            if state.selected_file.is_none() {
                state.set_notice("Select a file to analyze first.");
                return (state, Vec::new());
            }
            if !state.overlay.is_empty() {
                let prompt = format!(
                    "Start a new analysis and discard {} unsaved edit(s)?",
                    state.overlay.len()
                );
                return request_confirm(state, PendingAction::Submit, prompt);
            }
            begin_submit(&mut state)
        }
        Msg::SubmitFinished(Ok(job_id)) => {
            state.submitting = false;
            let file = state.selected_file.clone().unwrap_or(SelectedFile {
                name: "document".to_string(),
                size: 0,
            });

            // A fresh job forgets everything about the previous one.
            state.result = None;
            state.overlay.clear();
            state.pending_save = None;
            state.table.tab = Tab::Detailed;
            state.table.reset_for_new_entries();
            state.log.clear();
            state.job = Some(Job::new(job_id.clone(), file.name.clone()));

            state.push_log("system", format!("Job submitted: {job_id}"), LogKind::Info);
            state.push_log(
                "system",
                format!("File: {} ({})", file.name, format_bytes(file.size)),
                LogKind::Info,
            );
            vec![Effect::StartPolling { job_id }]
        }
        Msg::SubmitFinished(Err(message)) => {
            // No job is created on a failed submission; nothing else changes.
            state.submitting = false;
            state.set_notice(message);
            Vec::new()
        }
        Msg::StatusArrived(snapshot) => apply_status(&mut state, snapshot),
        Msg::PollFailed { message } => {
            let Some(job) = state.job.as_mut() else {
                return (state, Vec::new());
            };
            if job.phase.is_terminal() || job.polling_abandoned {
                return (state, Vec::new());
            }
            job.consecutive_poll_failures += 1;
            let failures = job.consecutive_poll_failures;
            if failures >= MAX_CONSECUTIVE_POLL_FAILURES {
                job.polling_abandoned = true;
                state.push_log(
                    "error",
                    format!("Giving up after {failures} consecutive status poll failures"),
                    LogKind::Error,
                );
                state.set_notice(format!(
                    "Lost contact with the service ({failures} consecutive poll failures): {message}"
                ));
                vec![Effect::StopPolling]
            } else {
                state.set_notice(format!("Status poll failed: {message}"));
                Vec::new()
            }
        }
        Msg::ResultLoaded(Ok(result)) => {
            let detailed = result.detailed.len();
            let summary = result.summary.len();
            let has_narrative = result.narrative.is_some();

            state.overlay.clear();
            state.pending_save = None;
            state.table.tab = Tab::Detailed;
            state.table.reset_for_new_entries();
            state.result = Some(result);

            state.push_log(
                "result",
                format!("Loaded {detailed} detailed + {summary} summary entries"),
                LogKind::Complete,
            );
            if has_narrative {
                state.push_log("result", "Executive summary loaded", LogKind::Complete);
            }
            Vec::new()
        }
        Msg::ResultLoaded(Err(message)) => {
            state.set_notice(format!("Failed to fetch results: {message}"));
            Vec::new()
        }
        Msg::HealthClicked => {
            state.health = None;
            state.mark_dirty();
            vec![Effect::CheckHealth]
        }
        Msg::HealthChecked(result) => {
            match &result {
                Ok(()) => state.set_notice("Service is healthy."),
                Err(message) => state.set_notice(format!("Health check failed: {message}")),
            }
            state.health = Some(result);
            state.mark_dirty();
            Vec::new()
        }
        Msg::CancelClicked => {
            let cancellable = state
                .job
                .as_ref()
                .is_some_and(|job| !job.phase.is_terminal());
            if !cancellable {
                state.set_notice("No running job to cancel.");
                return (state, Vec::new());
            }
            return request_confirm(
                state,
                PendingAction::Cancel,
                "Cancel the running analysis and delete its server-side state?".to_string(),
            );
        }
        Msg::DeleteClicked => {
            let deletable = state
                .job
                .as_ref()
                .is_some_and(|job| job.phase.is_terminal())
                && state.result.is_some();
            if !deletable {
                state.set_notice("There is no finished job with loaded results to delete.");
                return (state, Vec::new());
            }
            if !state.overlay.is_empty() {
                let prompt = format!(
                    "Delete the job, its results and {} unsaved edit(s)?",
                    state.overlay.len()
                );
                return request_confirm(state, PendingAction::Delete, prompt);
            }
            return request_confirm(
                state,
                PendingAction::Delete,
                "Delete the job and all of its results?".to_string(),
            );
        }
        Msg::ConfirmResolved { accepted } => {
            let Some(action) = state.pending.take() else {
                return (state, Vec::new());
            };
            state.mark_dirty();
            if !accepted {
                return (state, Vec::new());
            }
            match action {
                PendingAction::SwitchTab(tab) => switch_tab(&mut state, tab),
                PendingAction::Submit => begin_submit(&mut state),
                PendingAction::Cancel => cancel_job(&mut state),
                PendingAction::Delete => delete_job(&state),
            }
        }
        Msg::TabClicked(tab) => {
            if state.result.is_none() || state.table.tab == tab {
                return (state, Vec::new());
            }
            if !state.overlay.is_empty() {
                let prompt = format!(
                    "Discard {} unsaved edit(s) and switch to the {} view?",
                    state.overlay.len(),
                    tab.label()
                );
                return request_confirm(state, PendingAction::SwitchTab(tab), prompt);
            }
            switch_tab(&mut state, tab)
        }
        Msg::FilterChanged { field, text } => {
            if field < schema::FIELD_COUNT {
                state.table.set_filter(field, text);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SortClicked { field } => {
            if field < schema::FIELD_COUNT {
                state.table.toggle_sort(field);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PageChanged(page) => {
            state.table.set_page(page);
            state.mark_dirty();
            Vec::new()
        }
        Msg::PageSizeChanged(size) => {
            state.table.set_page_size(size);
            state.mark_dirty();
            Vec::new()
        }
        Msg::CellEdited { entry, field, value } => {
            let in_range = field < schema::FIELD_COUNT && entry < state.active_entries().len();
            if !in_range {
                state.set_notice(format!("No entry {entry} / field {field} to edit."));
                return (state, Vec::new());
            }
            let canonical = state.active_entries()[entry].field(field).to_string();
            state.overlay.stage(entry, field, value, &canonical);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SaveClicked => {
            if state.overlay.is_empty() {
                state.set_notice("There are no pending edits to save.");
                return (state, Vec::new());
            }
            let (Some(job), Some(result)) = (&state.job, &state.result) else {
                return (state, Vec::new());
            };
            // Only the active sequence receives the staged edits; the other
            // is shipped unchanged.
            let (detailed, summary) = match state.table.tab {
                Tab::Detailed => (state.overlay.apply_to(&result.detailed), result.summary.clone()),
                Tab::Summary => (result.detailed.clone(), state.overlay.apply_to(&result.summary)),
            };
            state.pending_save = Some(ResultSet {
                detailed: detailed.clone(),
                summary: summary.clone(),
                narrative: result.narrative.clone(),
            });
            vec![Effect::SaveResult {
                job_id: job.id.clone(),
                detailed,
                summary,
            }]
        }
        Msg::SaveFinished(Ok(())) => {
            let staged = state.overlay.len();
            if let Some(saved) = state.pending_save.take() {
                state.result = Some(saved);
            }
            // Clear only after the server confirmed; a failure path must
            // leave the overlay for a retry.
            state.overlay.clear();
            state.push_log("system", format!("Saved {staged} edit(s)"), LogKind::Complete);
            state.set_notice(format!("Saved {staged} edit(s)."));
            Vec::new()
        }
        Msg::SaveFinished(Err(message)) => {
            state.pending_save = None;
            state.set_notice(format!("Save failed: {message}"));
            Vec::new()
        }
        Msg::CancelFinished(Ok(())) => {
            state.push_log("system", "Server acknowledged the cancellation", LogKind::Info);
            Vec::new()
        }
        Msg::CancelFinished(Err(message)) => {
            // Local polling already stopped; the user asked to disengage.
            state.push_log(
                "system",
                format!("Server-side cancel failed: {message}"),
                LogKind::Error,
            );
            Vec::new()
        }
        Msg::DeleteFinished(Ok(())) => {
            state.job = None;
            state.result = None;
            state.overlay.clear();
            state.pending_save = None;
            state.table.tab = Tab::Detailed;
            state.table.reset_for_new_entries();
            state.log.clear();
            state.set_notice("Job and results deleted.");
            Vec::new()
        }
        Msg::DeleteFinished(Err(message)) => {
            state.set_notice(format!("Delete failed: {message}"));
            Vec::new()
        }
        Msg::DiscardClicked => {
            if state.overlay.is_empty() {
                return (state, Vec::new());
            }
            let staged = state.overlay.len();
            state.overlay.clear();
            state.set_notice(format!("Discarded {staged} edit(s)."));
            Vec::new()
        }
        Msg::ClearLogClicked => {
            state.log.clear();
            state.mark_dirty();
            Vec::new()
        }
        Msg::ExportClicked(format) => export_effect(&state, format),
        Msg::ExportFinished(Ok(path)) => {
            state.push_log("system", format!("Exported {path}"), LogKind::Complete);
            Vec::new()
        }
        Msg::ExportFinished(Err(message)) => {
            state.set_notice(format!("Export failed: {message}"));
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn begin_submit(state: &mut AppState) -> Vec<Effect> {
    let Some(file) = &state.selected_file else {
        return Vec::new();
    };
    let file_name = file.name.clone();
    state.submitting = true;
    state.notice = None;
    state.mark_dirty();
    let prompt = state.prompt.trim();
    vec![Effect::SubmitJob {
        file_name,
        prompt: (!prompt.is_empty()).then(|| prompt.to_string()),
    }]
}

fn apply_status(state: &mut AppState, snapshot: StatusSnapshot) -> Vec<Effect> {
    // Collected while the job is mutably borrowed, pushed afterwards.
    let mut lines: Vec<(String, String, LogKind)> = Vec::new();
    let terminal = {
        let Some(job) = state.job.as_mut() else {
            return Vec::new();
        };
        // A snapshot that raced a cancel or an earlier terminal tick is stale.
        if job.phase.is_terminal() {
            return Vec::new();
        }
        job.consecutive_poll_failures = 0;
        if let Some(phase) = snapshot.phase {
            job.phase = phase;
        }
        job.progress_pct = snapshot.progress_pct;
        job.progress_msg = snapshot.progress_msg.clone();
        job.detail_msg = snapshot.detail_msg.clone();

        if let Some(phase) = snapshot.phase {
            if job.last_logged_phase != Some(phase) {
                lines.push((
                    phase.to_string(),
                    format!("Phase started: {phase}"),
                    LogKind::Info,
                ));
                job.last_logged_phase = Some(phase);
            }
        }
        if !snapshot.progress_msg.is_empty() && snapshot.progress_msg != job.last_logged_progress {
            lines.push((job.phase.to_string(), snapshot.progress_msg.clone(), LogKind::Info));
            job.last_logged_progress = snapshot.progress_msg;
        }
        if !snapshot.detail_msg.is_empty() && snapshot.detail_msg != job.last_logged_detail {
            lines.push((job.phase.to_string(), snapshot.detail_msg.clone(), LogKind::Detail));
            job.last_logged_detail = snapshot.detail_msg;
        }

        (job.phase, job.progress_msg.clone(), job.id.clone())
    };

    for (tag, text, kind) in lines {
        state.push_log(tag, text, kind);
    }
    state.mark_dirty();

    let (phase, progress_msg, job_id) = terminal;
    match phase {
        Phase::Completed => {
            state.push_log("done", "Job completed successfully!", LogKind::Complete);
            vec![Effect::StopPolling, Effect::FetchResult { job_id }]
        }
        Phase::Failed => {
            state.push_log("error", format!("Job failed: {progress_msg}"), LogKind::Error);
            state.set_notice(format!("Job failed: {progress_msg}"));
            vec![Effect::StopPolling]
        }
        _ => Vec::new(),
    }
}

fn switch_tab(state: &mut AppState, tab: Tab) -> Vec<Effect> {
    // Overlay first: edits are positions into the outgoing sequence and must
    // not survive into the incoming one.
    state.overlay.clear();
    state.table.tab = tab;
    state.table.reset_for_new_entries();
    state.mark_dirty();
    Vec::new()
}

fn cancel_job(state: &mut AppState) -> Vec<Effect> {
    let Some(job) = state.job.as_mut() else {
        return Vec::new();
    };
    if job.phase.is_terminal() {
        return Vec::new();
    }
    // The timer stop and the local transition are unconditional; the
    // server-side delete below is best-effort.
    job.phase = Phase::Cancelled;
    let job_id = job.id.clone();
    state.push_log("system", "Job cancelled by user", LogKind::Info);
    state.mark_dirty();
    vec![Effect::StopPolling, Effect::CancelJob { job_id }]
}

fn delete_job(state: &AppState) -> Vec<Effect> {
    match &state.job {
        Some(job) => vec![Effect::DeleteJob {
            job_id: job.id.clone(),
        }],
        None => Vec::new(),
    }
}

fn export_effect(state: &AppState, format: ExportFormat) -> Vec<Effect> {
    let entries = state.active_entries();
    if entries.is_empty() {
        return Vec::new();
    }
    let indices = table::sorted_indices(
        table::filtered_indices(entries, &state.overlay, &state.table),
        entries,
        &state.overlay,
        &state.table,
    );
    let header: Vec<String> = schema::RACM_FIELDS.iter().map(|s| s.to_string()).collect();
    let rows: Vec<Vec<String>> = indices
        .iter()
        .map(|&entry| {
            (0..schema::FIELD_COUNT)
                .map(|field| state.overlay.displayed(entries, entry, field).to_string())
                .collect()
        })
        .collect();
    let source_name = state
        .selected_file
        .as_ref()
        .map(|file| file.name.clone())
        .unwrap_or_else(|| "document".to_string());
    vec![Effect::Export {
        format,
        source_name,
        tab: state.table.tab,
        header,
        rows,
    }]
}

fn request_confirm(
    mut state: AppState,
    action: PendingAction,
    prompt: String,
) -> (AppState, Vec<Effect>) {
    // One gated action at a time; a second request is dropped until the
    // first prompt resolves.
    if state.pending.is_some() {
        return (state, Vec::new());
    }
    state.pending = Some(action);
    state.mark_dirty();
    (state, vec![Effect::RequestConfirm { prompt }])
}
