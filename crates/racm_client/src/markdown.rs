/// Minimal renderer for the executive-summary narrative, which the service
/// emits as a small markdown subset: `#`/`##`/`###` headings, `**bold**`
/// runs, and `- ` list items. Anything else passes through as plain text.
///
/// The output is terminal markup: headings become underlined lines, list
/// items become bullets, bold markers are stripped.
pub fn render_narrative(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.trim_end();
        if let Some(rest) = line.strip_prefix("### ") {
            out.push(heading(rest, '-'));
        } else if let Some(rest) = line.strip_prefix("## ") {
            out.push(heading(rest, '-'));
        } else if let Some(rest) = line.strip_prefix("# ") {
            out.push(heading(rest, '='));
        } else if let Some(rest) = line.strip_prefix("- ") {
            out.push(format!("  • {}", strip_bold(rest)));
        } else {
            out.push(strip_bold(line));
        }
    }
    out.join("\n")
}

fn heading(text: &str, underline: char) -> String {
    let text = strip_bold(text);
    let rule: String = std::iter::repeat(underline).take(text.chars().count()).collect();
    format!("{text}\n{rule}")
}

/// Remove paired `**` markers, leaving unmatched markers alone.
fn strip_bold(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    loop {
        let Some(open) = rest.find("**") else {
            out.push_str(rest);
            return out;
        };
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            out.push_str(rest);
            return out;
        };
        out.push_str(&rest[..open]);
        out.push_str(&after_open[..close]);
        rest = &after_open[close + 2..];
    }
}

#[cfg(test)]
mod tests {
    use super::{render_narrative, strip_bold};

    #[test]
    fn headings_are_underlined() {
        let rendered = render_narrative("# Summary\nBody text");
        assert_eq!(rendered, "Summary\n=======\nBody text");
    }

    #[test]
    fn list_items_become_bullets() {
        let rendered = render_narrative("- first\n- second");
        assert_eq!(rendered, "  • first\n  • second");
    }

    #[test]
    fn bold_markers_are_stripped_in_pairs() {
        assert_eq!(strip_bold("a **b** c"), "a b c");
        assert_eq!(strip_bold("**x** and **y**"), "x and y");
        assert_eq!(strip_bold("dangling ** marker"), "dangling ** marker");
    }

    #[test]
    fn subheadings_use_light_rules() {
        let rendered = render_narrative("## Key Risks");
        assert_eq!(rendered, "Key Risks\n---------");
    }
}
