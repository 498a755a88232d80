use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static BOLD_NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*\d+\.").expect("row start pattern is valid"));

static DASH_NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"- \d+\.").expect("dash row pattern is valid"));

/// Marker opening the teacher column (matched case-insensitively).
pub const TEACHER_MARKER: &str = "hoạt động của cô";
/// Marker opening the child column (matched case-insensitively).
pub const CHILD_MARKER: &str = "hoạt động của trẻ";

/// One numbered sub-activity split into teacher and child actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRow {
    pub title: String,
    pub teacher_actions: Vec<String>,
    pub child_actions: Vec<String>,
}

#[derive(Clone, Copy)]
enum Column {
    Teacher,
    Child,
}

fn is_row_start(trimmed: &str) -> bool {
    BOLD_NUMBERED.is_match(trimmed)
        || (trimmed.starts_with("- ") && DASH_NUMBERED.is_match(trimmed))
}

/// Split section III text into activity rows.
///
/// Line-local classification with two pieces of state: the open row and
/// the current column. Content lines keep their indentation; lines before
/// a marker or outside a row are dropped. Text without any marker line
/// yields no rows.
pub fn parse_columns(text: &str) -> Vec<ActivityRow> {
    let mut rows = Vec::new();
    let mut current: Option<ActivityRow> = None;
    let mut column: Option<Column> = None;
    let mut saw_marker = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_row_start(trimmed) {
            rows.extend(current.take());
            current = Some(ActivityRow {
                title: trimmed.to_string(),
                ..ActivityRow::default()
            });
            column = None;
            continue;
        }

        let lowered = trimmed.to_lowercase();
        if lowered.contains(TEACHER_MARKER) {
            column = Some(Column::Teacher);
            saw_marker = true;
        } else if lowered.contains(CHILD_MARKER) {
            column = Some(Column::Child);
            saw_marker = true;
        } else if let (Some(row), Some(col)) = (current.as_mut(), column) {
            let content = line.trim_end().to_string();
            match col {
                Column::Teacher => row.teacher_actions.push(content),
                Column::Child => row.child_actions.push(content),
            }
        }
    }
    rows.extend(current);

    if !saw_marker {
        return Vec::new();
    }
    rows
}
