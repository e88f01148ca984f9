/// Deterministic export filename:
/// `RACM_{sanitized_source_stem}_{tab}_{date}.{ext}`.
///
/// The stem drops the source file's extension; runs of characters outside
/// `[A-Za-z0-9_-]` collapse to a single underscore. The date string comes
/// from the caller so exports stay reproducible in tests.
pub fn export_file_name(source_name: &str, tab: &str, date: &str, extension: &str) -> String {
    let stem = sanitize_stem(source_name);
    format!("RACM_{stem}_{tab}_{date}.{extension}")
}

fn sanitize_stem(source_name: &str) -> String {
    let stem = match source_name.rfind('.') {
        Some(idx) if idx > 0 => &source_name[..idx],
        _ => source_name,
    };
    let mut cleaned = String::with_capacity(stem.len());
    let mut pending_sep = false;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            if pending_sep && !cleaned.is_empty() {
                cleaned.push('_');
            }
            pending_sep = false;
            cleaned.push(c);
        } else {
            pending_sep = true;
        }
    }
    if cleaned.is_empty() {
        cleaned = "document".to_string();
    }
    cleaned
}
