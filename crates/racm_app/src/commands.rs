use racm_core::{normalize_key, ExportFormat, Msg, PageSize, Tab, FIELD_COUNT, RACM_FIELDS};

/// One parsed interactive command.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Feed a message straight into the state machine.
    Dispatch(Msg),
    ShowRows,
    ShowEntry(usize),
    ShowStatus,
    ShowSummary,
    ShowLog,
    Help,
    Quit,
    /// Anything unparseable, with the message to show the user.
    Unknown(String),
}

/// A column argument: a 0-based index, a field label, or its normalized key
/// (e.g. `20`, `risk_rating`).
pub fn resolve_field(token: &str) -> Option<usize> {
    if let Ok(index) = token.parse::<usize>() {
        return (index < FIELD_COUNT).then_some(index);
    }
    let key = normalize_key(token);
    RACM_FIELDS
        .iter()
        .position(|label| normalize_key(label) == key)
}

pub fn parse(line: &str) -> Command {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Command::Unknown("Empty command.".to_string());
    };
    let args: Vec<&str> = parts.collect();

    match head {
        "rows" | "table" => Command::ShowRows,
        "status" => Command::ShowStatus,
        "summary" => Command::ShowSummary,
        "log" => Command::ShowLog,
        "clear-log" => Command::Dispatch(Msg::ClearLogClicked),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "health" => Command::Dispatch(Msg::HealthClicked),
        "cancel" => Command::Dispatch(Msg::CancelClicked),
        "delete" => Command::Dispatch(Msg::DeleteClicked),
        "save" => Command::Dispatch(Msg::SaveClicked),
        "discard" => Command::Dispatch(Msg::DiscardClicked),
        "tab" => match args.first() {
            Some(&"detailed") => Command::Dispatch(Msg::TabClicked(Tab::Detailed)),
            Some(&"summary") => Command::Dispatch(Msg::TabClicked(Tab::Summary)),
            _ => Command::Unknown("Usage: tab detailed|summary".to_string()),
        },
        "filter" => match args.split_first() {
            Some((column, rest)) => match resolve_field(column) {
                Some(field) => Command::Dispatch(Msg::FilterChanged {
                    field,
                    text: rest.join(" "),
                }),
                None => Command::Unknown(format!("Unknown column: {column}")),
            },
            None => Command::Unknown("Usage: filter <column> [text]".to_string()),
        },
        "sort" => match args.first().and_then(|column| resolve_field(column)) {
            Some(field) => Command::Dispatch(Msg::SortClicked { field }),
            None => Command::Unknown("Usage: sort <column>".to_string()),
        },
        "page" => match args.first().and_then(|n| n.parse::<usize>().ok()) {
            Some(page) if page > 0 => Command::Dispatch(Msg::PageChanged(page - 1)),
            _ => Command::Unknown("Usage: page <number> (1-based)".to_string()),
        },
        "pagesize" => match args.first() {
            Some(&"all") => Command::Dispatch(Msg::PageSizeChanged(PageSize::All)),
            Some(n) => match n.parse::<usize>() {
                Ok(size) if size > 0 => {
                    Command::Dispatch(Msg::PageSizeChanged(PageSize::Limited(size)))
                }
                _ => Command::Unknown("Usage: pagesize <number>|all".to_string()),
            },
            None => Command::Unknown("Usage: pagesize <number>|all".to_string()),
        },
        "edit" => {
            let usage = "Usage: edit <row> <column> <value...>";
            let (Some(row), Some(column)) = (args.first(), args.get(1)) else {
                return Command::Unknown(usage.to_string());
            };
            let Ok(entry) = row.parse::<usize>() else {
                return Command::Unknown(usage.to_string());
            };
            let Some(field) = resolve_field(column) else {
                return Command::Unknown(format!("Unknown column: {column}"));
            };
            Command::Dispatch(Msg::CellEdited {
                entry,
                field,
                value: args[2..].join(" "),
            })
        }
        "export" => match args.first() {
            Some(&"csv") => Command::Dispatch(Msg::ExportClicked(ExportFormat::Csv)),
            Some(&"json") => Command::Dispatch(Msg::ExportClicked(ExportFormat::Json)),
            _ => Command::Unknown("Usage: export csv|json".to_string()),
        },
        "entry" => match args.first().and_then(|n| n.parse::<usize>().ok()) {
            Some(entry) => Command::ShowEntry(entry),
            None => Command::Unknown("Usage: entry <row>".to_string()),
        },
        other => Command::Unknown(format!("Unknown command: {other} (try 'help')")),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, resolve_field, Command};
    use racm_core::{Msg, PageSize, Tab, RISK_RATING_FIELD};

    #[test]
    fn columns_resolve_by_index_label_or_key() {
        assert_eq!(resolve_field("20"), Some(RISK_RATING_FIELD));
        assert_eq!(resolve_field("risk_rating"), Some(RISK_RATING_FIELD));
        assert_eq!(resolve_field("Risk_Rating"), Some(RISK_RATING_FIELD));
        assert_eq!(resolve_field("99"), None);
        assert_eq!(resolve_field("bogus"), None);
    }

    #[test]
    fn edit_joins_the_value_words() {
        let parsed = parse("edit 2 risk_rating Very High");
        assert_eq!(
            parsed,
            Command::Dispatch(Msg::CellEdited {
                entry: 2,
                field: RISK_RATING_FIELD,
                value: "Very High".to_string(),
            })
        );
    }

    #[test]
    fn filter_with_no_text_clears_the_column() {
        let parsed = parse("filter risk_rating");
        assert_eq!(
            parsed,
            Command::Dispatch(Msg::FilterChanged {
                field: RISK_RATING_FIELD,
                text: String::new(),
            })
        );
    }

    #[test]
    fn page_is_one_based_for_humans() {
        assert_eq!(parse("page 3"), Command::Dispatch(Msg::PageChanged(2)));
        assert!(matches!(parse("page 0"), Command::Unknown(_)));
        assert_eq!(
            parse("pagesize all"),
            Command::Dispatch(Msg::PageSizeChanged(PageSize::All))
        );
    }

    #[test]
    fn tab_requires_a_known_view() {
        assert_eq!(
            parse("tab summary"),
            Command::Dispatch(Msg::TabClicked(Tab::Summary))
        );
        assert!(matches!(parse("tab sideways"), Command::Unknown(_)));
    }
}
