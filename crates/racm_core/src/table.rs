use crate::entry::Entry;
use crate::overlay::EditOverlay;
use crate::schema::{self, RISK_RATING_FIELD};

/// Which of the two result sequences the table is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Detailed,
    Summary,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Tab::Detailed => "detailed",
            Tab::Summary => "summary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

/// Rows per page. `All` collapses the table to a single unbounded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Limited(usize),
    All,
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Limited(DEFAULT_PAGE_SIZE)
    }
}

pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Per-view table configuration: column filters, sort, pagination.
/// Positions everywhere refer to the unfiltered active sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub tab: Tab,
    filters: Vec<String>,
    sort: Option<(usize, SortDir)>,
    page_size: PageSize,
    page: usize,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            tab: Tab::default(),
            filters: vec![String::new(); schema::FIELD_COUNT],
            sort: None,
            page_size: PageSize::default(),
            page: 0,
        }
    }
}

impl TableState {
    /// Reset everything except the page size, which is a user preference
    /// that survives reloads and tab switches.
    pub fn reset_for_new_entries(&mut self) {
        self.filters = vec![String::new(); schema::FIELD_COUNT];
        self.sort = None;
        self.page = 0;
    }

    /// Set a per-column filter. An empty string removes the constraint.
    /// Any filter change resets pagination to the first page.
    pub fn set_filter(&mut self, field: usize, text: String) {
        self.filters[field] = text;
        self.page = 0;
    }

    /// Clicking the sorted column toggles direction; clicking a new column
    /// sorts it ascending. Either way pagination resets to the first page.
    pub fn toggle_sort(&mut self, field: usize) {
        self.sort = match self.sort {
            Some((current, SortDir::Asc)) if current == field => Some((field, SortDir::Desc)),
            Some((current, SortDir::Desc)) if current == field => Some((field, SortDir::Asc)),
            _ => Some((field, SortDir::Asc)),
        };
        self.page = 0;
    }

    pub fn sort(&self) -> Option<(usize, SortDir)> {
        self.sort
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.page = 0;
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }
}

/// Indices of entries passing every column filter, in source order.
/// Matching is a case-insensitive substring test against the displayed value
/// (staged overlay value when present).
pub fn filtered_indices(
    entries: &[Entry],
    overlay: &EditOverlay,
    table: &TableState,
) -> Vec<usize> {
    (0..entries.len())
        .filter(|&entry| {
            table.filters.iter().enumerate().all(|(field, filter)| {
                if filter.is_empty() {
                    return true;
                }
                let value = overlay.displayed(entries, entry, field).to_lowercase();
                value.contains(&filter.to_lowercase())
            })
        })
        .collect()
}

/// Stable-sort filtered indices by the configured column. The Risk Rating
/// column orders by severity rank; every other column compares the displayed
/// string values lexicographically. Ties keep their relative order.
pub fn sorted_indices(
    mut indices: Vec<usize>,
    entries: &[Entry],
    overlay: &EditOverlay,
    table: &TableState,
) -> Vec<usize> {
    let Some((field, dir)) = table.sort else {
        return indices;
    };
    indices.sort_by(|&a, &b| {
        let ordering = if field == RISK_RATING_FIELD {
            let rank_a = schema::severity_rank(overlay.displayed(entries, a, field));
            let rank_b = schema::severity_rank(overlay.displayed(entries, b, field));
            rank_a.cmp(&rank_b)
        } else {
            overlay
                .displayed(entries, a, field)
                .cmp(overlay.displayed(entries, b, field))
        };
        match dir {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        }
    });
    indices
}

/// Total pages for a filtered/sorted set: at least one, even when empty.
pub fn page_count(total: usize, page_size: PageSize) -> usize {
    match page_size {
        PageSize::All => 1,
        PageSize::Limited(size) => {
            let size = size.max(1);
            (total.div_ceil(size)).max(1)
        }
    }
}

/// The half-open `[start, end)` window of the requested page, with the page
/// index clamped into the valid range.
pub fn page_window(total: usize, page_size: PageSize, page: usize) -> (usize, usize) {
    match page_size {
        PageSize::All => (0, total),
        PageSize::Limited(size) => {
            let size = size.max(1);
            let last = page_count(total, page_size) - 1;
            let page = page.min(last);
            let start = page * size;
            (start.min(total), (start + size).min(total))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{page_count, page_window, PageSize, SortDir, TableState};

    #[test]
    fn toggling_the_same_column_flips_direction() {
        let mut table = TableState::default();
        table.toggle_sort(3);
        assert_eq!(table.sort(), Some((3, SortDir::Asc)));
        table.toggle_sort(3);
        assert_eq!(table.sort(), Some((3, SortDir::Desc)));
        table.toggle_sort(5);
        assert_eq!(table.sort(), Some((5, SortDir::Asc)));
    }

    #[test]
    fn filter_and_sort_reset_the_page() {
        let mut table = TableState::default();
        table.set_page(4);
        table.set_filter(0, "x".into());
        assert_eq!(table.page(), 0);
        table.set_page(4);
        table.toggle_sort(0);
        assert_eq!(table.page(), 0);
    }

    #[test]
    fn page_count_is_never_zero() {
        assert_eq!(page_count(0, PageSize::Limited(25)), 1);
        assert_eq!(page_count(0, PageSize::All), 1);
        assert_eq!(page_count(26, PageSize::Limited(25)), 2);
        assert_eq!(page_count(50, PageSize::Limited(25)), 2);
    }

    #[test]
    fn page_window_clamps_out_of_range_requests() {
        // 7 rows, pages of 3: pages are [0,3), [3,6), [6,7).
        assert_eq!(page_window(7, PageSize::Limited(3), 0), (0, 3));
        assert_eq!(page_window(7, PageSize::Limited(3), 2), (6, 7));
        assert_eq!(page_window(7, PageSize::Limited(3), 99), (6, 7));
        assert_eq!(page_window(7, PageSize::All, 99), (0, 7));
    }
}
