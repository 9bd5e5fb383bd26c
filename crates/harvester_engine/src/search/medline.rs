use harvester_core::Record;

const CONTINUATION: &str = "      ";

/// Parses MEDLINE-format text (`TAG - value` lines, blank-line separated) into records.
///
/// Tags are up to four characters, space padded. Lines starting with six
/// spaces continue the previous value. Repeated tags accumulate.
pub fn parse_medline(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut current = Record::new();
    let mut last_tag: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            flush(&mut records, &mut current);
            last_tag = None;
            continue;
        }

        if let Some(rest) = line.strip_prefix(CONTINUATION) {
            if let Some(tag) = last_tag.as_deref() {
                current.extend_last(tag, rest.trim());
            }
            continue;
        }

        if let Some((tag, value)) = split_tag(line) {
            current.push(tag, value);
            last_tag = Some(tag.to_string());
        }
    }
    flush(&mut records, &mut current);
    records
}

fn split_tag(line: &str) -> Option<(&str, &str)> {
    if line.get(4..6) != Some("- ") && line.get(4..5) != Some("-") {
        return None;
    }
    let tag = line.get(..4)?.trim_end();
    if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let value = line.get(5..).unwrap_or_default().trim();
    Some((tag, value))
}

fn flush(records: &mut Vec<Record>, current: &mut Record) {
    if !current.is_empty() {
        records.push(std::mem::take(current));
    }
}
