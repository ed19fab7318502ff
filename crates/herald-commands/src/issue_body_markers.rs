//! Helpers for values stored between HTML comment markers in an issue body,
//! e.g. `<!--reviewer-1-->@arfon<!--end-reviewer-1-->`.

pub fn value_start_marker(name: &str) -> String {
    format!("<!--{name}-->")
}

pub fn value_end_marker(name: &str) -> String {
    format!("<!--end-{name}-->")
}

/// Trimmed text between the first `start` marker and the following `end`
/// marker. `None` when either marker is missing.
pub fn read_between_markers(body: &str, start: &str, end: &str) -> Option<String> {
    let (content_start, content_end) = marker_region(body, start, end)?;
    Some(body[content_start..content_end].trim().to_string())
}

pub fn read_issue_value(body: &str, name: &str) -> Option<String> {
    read_between_markers(body, &value_start_marker(name), &value_end_marker(name))
}

/// Replaces the text between the markers, keeping both markers.
///
/// Returns `None` and leaves the body untouched when either marker is missing
/// or the end marker does not follow the start marker.
pub fn replace_between_markers(
    body: &str,
    start: &str,
    end: &str,
    new_content: &str,
) -> Option<String> {
    let (content_start, content_end) = marker_region(body, start, end)?;
    let mut updated = String::with_capacity(body.len() + new_content.len());
    updated.push_str(&body[..content_start]);
    updated.push_str(new_content.trim());
    updated.push_str(&body[content_end..]);
    Some(updated)
}

fn marker_region(body: &str, start: &str, end: &str) -> Option<(usize, usize)> {
    if start.is_empty() || end.is_empty() {
        return None;
    }
    let content_start = body.find(start)? + start.len();
    let content_end = content_start + body[content_start..].find(end)?;
    Some((content_start, content_end))
}
