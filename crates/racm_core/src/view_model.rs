use crate::activity::{format_bytes, LogLine};
use crate::job::Phase;
use crate::schema;
use crate::state::AppState;
use crate::table::{self, PageSize, SortDir, Tab};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobView {
    pub id: String,
    pub file_name: String,
    pub phase: Phase,
    pub progress_pct: u8,
    pub progress_msg: String,
    pub detail_msg: String,
}

/// One visible table row. `source_index` addresses the unfiltered active
/// sequence and is what edit commands must use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub source_index: usize,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub tab: Tab,
    pub rows: Vec<RowView>,
    /// E.g. `Showing 1-3 of 3 entries`; counts refer to the filtered set.
    pub entry_count: String,
    /// Effective (clamped) page index.
    pub page: usize,
    pub page_count: usize,
    pub page_size: PageSize,
    pub sort: Option<(usize, SortDir)>,
    pub filtered_total: usize,
    pub source_total: usize,
    pub staged_edits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    /// Selected upload as shown in the file chip, e.g. `sop.pdf (1.2 MB)`.
    pub file_chip: Option<String>,
    pub job: Option<JobView>,
    pub submission_locked: bool,
    pub notice: Option<String>,
    /// `None` = never probed (or probe in flight), `Some(Ok)` = healthy.
    pub health: Option<Result<(), String>>,
    pub log: Vec<LogLine>,
    pub narrative: Option<String>,
    pub awaiting_confirmation: bool,
}

impl AppState {
    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            file_chip: self
                .selected_file
                .as_ref()
                .map(|file| format!("{} ({})", file.name, format_bytes(file.size))),
            job: self.job.as_ref().map(|job| JobView {
                id: job.id.clone(),
                file_name: job.file_name.clone(),
                phase: job.phase,
                progress_pct: job.progress_pct,
                progress_msg: job.progress_msg.clone(),
                detail_msg: job.detail_msg.clone(),
            }),
            submission_locked: self.submission_locked(),
            notice: self.notice.clone(),
            health: self.health.clone(),
            log: self.log.lines().to_vec(),
            narrative: self.result.as_ref().and_then(|r| r.narrative.clone()),
            awaiting_confirmation: self.awaiting_confirmation(),
        }
    }

    /// Materialize the filtered/sorted/paginated window of the active
    /// sequence. `None` until a result has loaded.
    pub fn table_view(&self) -> Option<TableView> {
        self.result.as_ref()?;
        let entries = self.active_entries();
        let indices = table::sorted_indices(
            table::filtered_indices(entries, &self.overlay, &self.table),
            entries,
            &self.overlay,
            &self.table,
        );

        let filtered_total = indices.len();
        let page_size = self.table.page_size();
        let page_count = table::page_count(filtered_total, page_size);
        let (start, end) = table::page_window(filtered_total, page_size, self.table.page());

        let rows = indices[start..end]
            .iter()
            .map(|&entry| RowView {
                source_index: entry,
                cells: (0..schema::FIELD_COUNT)
                    .map(|field| self.overlay.displayed(entries, entry, field).to_string())
                    .collect(),
            })
            .collect();

        let entry_count = if filtered_total == 0 {
            "Showing 0 of 0 entries".to_string()
        } else {
            format!("Showing {}-{} of {} entries", start + 1, end, filtered_total)
        };

        let page = match page_size {
            PageSize::All => 0,
            PageSize::Limited(size) => start / size.max(1),
        };

        Some(TableView {
            tab: self.table.tab,
            rows,
            entry_count,
            page,
            page_count,
            page_size,
            sort: self.table.sort(),
            filtered_total,
            source_total: entries.len(),
            staged_edits: self.overlay.len(),
        })
    }
}
