use racm_core::{
    JobView, LogKind, LogLine, PageSize, SortDir, TableView, EXTRACTION_CONFIDENCE_FIELD,
    RACM_FIELDS, RISK_RATING_FIELD,
};

/// Columns shown in the compact table; `entry <n>` shows all 25.
const TABLE_COLUMNS: [(usize, &str, usize); 5] = [
    (0, "Process Area", 16),
    (2, "Risk ID", 10),
    (3, "Risk Description", 36),
    (RISK_RATING_FIELD, "Rating", 10),
    (EXTRACTION_CONFIDENCE_FIELD, "Confidence", 10),
];

pub fn log_line(line: &LogLine) -> String {
    let time = chrono::Local::now().format("%H:%M:%S");
    let marker = match line.kind {
        LogKind::Info => " ",
        LogKind::Detail => "·",
        LogKind::Complete => "✓",
        LogKind::Error => "!",
    };
    format!("[{time}] {marker} [{}] {}", line.tag.to_uppercase(), line.text)
}

pub fn status(job: &JobView) -> String {
    let mut line = format!(
        "{} {} [{}] {}%",
        job.id, job.file_name, job.phase, job.progress_pct
    );
    if !job.progress_msg.is_empty() {
        line.push_str(&format!(" - {}", job.progress_msg));
    }
    if !job.detail_msg.is_empty() {
        line.push_str(&format!(" ({})", job.detail_msg));
    }
    line
}

pub fn table(view: &TableView) -> String {
    let mut out = String::new();

    let sort_note = match view.sort {
        Some((field, SortDir::Asc)) => format!(", sorted by {} ↑", RACM_FIELDS[field]),
        Some((field, SortDir::Desc)) => format!(", sorted by {} ↓", RACM_FIELDS[field]),
        None => String::new(),
    };
    out.push_str(&format!("── {} view{} ──\n", view.tab.label(), sort_note));

    out.push_str(&format!("{:>5} ", "row"));
    for (_, title, width) in TABLE_COLUMNS {
        out.push_str(&format!("{} ", pad(title, width)));
    }
    out.push('\n');

    for row in &view.rows {
        out.push_str(&format!("{:>5} ", row.source_index));
        for (field, _, width) in TABLE_COLUMNS {
            out.push_str(&format!("{} ", pad(&row.cells[field], width)));
        }
        out.push('\n');
    }

    out.push_str(&view.entry_count);
    match view.page_size {
        PageSize::All => {}
        PageSize::Limited(_) => {
            out.push_str(&format!(" - page {}/{}", view.page + 1, view.page_count));
        }
    }
    if view.staged_edits > 0 {
        out.push_str(&format!(" - {} unsaved edit(s)", view.staged_edits));
    }
    out
}

pub fn help() -> &'static str {
    "Commands:\n\
     \x20 rows                       show the current table page\n\
     \x20 tab detailed|summary       switch sequence (asks before dropping edits)\n\
     \x20 filter <column> [text]     case-insensitive substring filter; no text clears\n\
     \x20 sort <column>              sort; repeat to flip direction\n\
     \x20 page <n> / pagesize <n|all>\n\
     \x20 edit <row> <column> <value...>   stage a cell edit\n\
     \x20 save / discard             persist or drop staged edits\n\
     \x20 export csv|json            write the filtered rows to disk\n\
     \x20 entry <row>                all 25 fields of one row\n\
     \x20 status / summary / log / clear-log\n\
     \x20 health / cancel / delete / quit\n\
     Columns are 0-based indexes or names like risk_rating."
}

/// Pad or clip to an exact display width.
fn pad(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        let mut padded = text.to_string();
        padded.extend(std::iter::repeat(' ').take(width - count));
        padded
    } else {
        let clipped: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{clipped}…")
    }
}

#[cfg(test)]
mod tests {
    use super::pad;

    #[test]
    fn pad_clips_long_values_with_ellipsis() {
        assert_eq!(pad("abc", 5), "abc  ");
        assert_eq!(pad("abcdef", 5), "abcd…");
        assert_eq!(pad("", 3), "   ");
    }
}
