/// The fixed RACM column schema. Order is load-bearing: field indices used by
/// filters, sorting and the edit overlay all refer to positions in this list.
pub const RACM_FIELDS: [&str; 25] = [
    "Process Area",
    "Sub-Process",
    "Risk ID",
    "Risk Description",
    "Risk Category",
    "Risk Type",
    "Control ID",
    "Control Activity",
    "Control Objective",
    "Control Type",
    "Control Nature",
    "Control Frequency",
    "Control Owner",
    "Control description as per SOP",
    "Testing Attributes",
    "Evidence/Source",
    "Assertion Mapped",
    "Compliance Reference",
    "Risk Likelihood",
    "Risk Impact",
    "Risk Rating",
    "Mitigation Effectiveness",
    "Gaps/Weaknesses Identified",
    "Source Quote",
    "Extraction Confidence",
];

pub const FIELD_COUNT: usize = RACM_FIELDS.len();

/// Columns with special handling in the table.
pub const RISK_RATING_FIELD: usize = 20;
pub const SOURCE_QUOTE_FIELD: usize = 23;
pub const EXTRACTION_CONFIDENCE_FIELD: usize = 24;

/// Human label for a field index. Panics on out-of-range indices; callers
/// validate indices at the message boundary.
pub fn label(field: usize) -> &'static str {
    RACM_FIELDS[field]
}

/// Normalized form of a field index, e.g. `control_description_as_per_sop`.
pub fn normalized_key(field: usize) -> String {
    normalize_key(RACM_FIELDS[field])
}

/// Lowercase a label and collapse every run of non-alphanumeric characters
/// into a single underscore, trimming leading/trailing underscores.
pub fn normalize_key(input: &str) -> String {
    let mut key = String::with_capacity(input.len());
    let mut pending_sep = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !key.is_empty() {
                key.push('_');
            }
            pending_sep = false;
            key.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    key
}

/// Rank used when sorting the Risk Rating column. Higher is more severe;
/// unrecognized ratings sort below `low`.
pub fn severity_rank(value: &str) -> u8 {
    let v = value.trim();
    if v.eq_ignore_ascii_case("critical") {
        4
    } else if v.eq_ignore_ascii_case("high") {
        3
    } else if v.eq_ignore_ascii_case("medium") {
        2
    } else if v.eq_ignore_ascii_case("low") {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_key, normalized_key, severity_rank, RISK_RATING_FIELD};

    #[test]
    fn keys_collapse_non_alphanumeric_runs() {
        assert_eq!(normalize_key("Sub-Process"), "sub_process");
        assert_eq!(normalize_key("Evidence/Source"), "evidence_source");
        assert_eq!(
            normalize_key("Gaps/Weaknesses Identified"),
            "gaps_weaknesses_identified"
        );
        assert_eq!(
            normalize_key("Control description as per SOP"),
            "control_description_as_per_sop"
        );
    }

    #[test]
    fn keys_trim_edge_separators() {
        assert_eq!(normalize_key("  Risk ID  "), "risk_id");
        assert_eq!(normalize_key("---x---"), "x");
    }

    #[test]
    fn risk_rating_index_matches_schema() {
        assert_eq!(super::label(RISK_RATING_FIELD), "Risk Rating");
    }

    #[test]
    fn severity_order_is_total() {
        assert!(severity_rank("Critical") > severity_rank("HIGH"));
        assert!(severity_rank("high") > severity_rank("Medium"));
        assert!(severity_rank("medium") > severity_rank("low"));
        assert!(severity_rank("low") > severity_rank("unknown"));
        assert_eq!(severity_rank(""), 0);
    }

    #[test]
    fn normalized_key_matches_label_form() {
        assert_eq!(normalized_key(RISK_RATING_FIELD), "risk_rating");
    }
}
