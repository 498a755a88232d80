//! Text-to-table formatter for generated lesson text.
//!
//! Generated text follows an informal convention: Roman-numbered section
//! headings, numbered activity headers, and "Hoạt động của cô" /
//! "Hoạt động của trẻ" labeled runs inside section III. This module
//! classifies that text once ([`structure`]) and renders the result
//! independently for export ([`render_html`]) or the terminal
//! ([`render_text`]). Nothing here can fail: unexpected input degrades to
//! flat paragraphs.

mod classify;
mod columns;
mod html;
mod inline;
mod text;

pub use classify::{Block, classify_lines};
pub use columns::{ActivityRow, CHILD_MARKER, TEACHER_MARKER, parse_columns};
pub use html::{render_blocks_html, render_html};
pub use inline::{bold_to_html, escape_html, strip_bold};
pub use text::render_text;

use giaoan_store::models::{ActivityTab, PlanFormat};

/// Headers that open the procedural section of a plan.
pub const SECTION_HEADERS: [&str; 2] = ["**III. TỔ CHỨC HOẠT ĐỘNG**", "**III. CÁCH TIẾN HÀNH**"];

/// Rendering of the part after the section header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activities {
    Table(Vec<ActivityRow>),
    Flow(Vec<Block>),
}

/// Classified text, ready for any renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattedContent {
    Flat(Vec<Block>),
    Sectioned {
        preamble: Vec<Block>,
        header: &'static str,
        activities: Activities,
    },
}

/// Layout of one plan section. Only the learning activity honours the
/// requested format; the others always flow.
pub fn section_format(tab: ActivityTab, format: PlanFormat) -> PlanFormat {
    match tab {
        ActivityTab::Learning => format,
        ActivityTab::Outdoor | ActivityTab::Corner => PlanFormat::NoColumns,
    }
}

/// Classify `text` for display in `format`.
pub fn structure(text: &str, format: PlanFormat) -> FormattedContent {
    if format == PlanFormat::NoColumns {
        return FormattedContent::Flat(classify_lines(text));
    }

    let Some((at, header)) = SECTION_HEADERS
        .iter()
        .filter_map(|h| text.find(h).map(|i| (i, *h)))
        .min_by_key(|(i, _)| *i)
    else {
        return FormattedContent::Flat(classify_lines(text));
    };

    let preamble = &text[..at];
    let body = &text[at + header.len()..];

    let rows = if body.trim().is_empty() {
        Vec::new()
    } else {
        parse_columns(body)
    };
    let activities = if rows.is_empty() {
        tracing::debug!("no activity columns recognised, rendering section III as flowing text");
        Activities::Flow(classify_lines(body))
    } else {
        Activities::Table(rows)
    };

    FormattedContent::Sectioned {
        preamble: classify_lines(preamble),
        header,
        activities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_COLUMN: &str = "**I. MỤC TIÊU**
Trẻ biết đếm đến 5.

**III. TỔ CHỨC HOẠT ĐỘNG**

**1. Gây hứng thú**
**Hoạt động của cô:**
- Cô hát cùng trẻ.
**Hoạt động của trẻ:**
- Trẻ hát theo cô.
**2. Bé cùng đếm**
**Hoạt động của cô:**
- Cô đưa ra 5 quả táo.
**Hoạt động của trẻ:**
- Trẻ đếm.
";

    #[test]
    fn no_columns_is_always_flat() {
        let content = structure(TWO_COLUMN, PlanFormat::NoColumns);
        assert_eq!(content, FormattedContent::Flat(classify_lines(TWO_COLUMN)));
    }

    #[test]
    fn with_columns_splits_at_header_into_table() {
        match structure(TWO_COLUMN, PlanFormat::WithColumns) {
            FormattedContent::Sectioned {
                preamble,
                header,
                activities: Activities::Table(rows),
            } => {
                assert_eq!(header, "**III. TỔ CHỨC HOẠT ĐỘNG**");
                assert_eq!(preamble[0], Block::Paragraph("**I. MỤC TIÊU**".to_string()));
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[1].title, "**2. Bé cùng đếm**");
            }
            other => panic!("expected a table, got {other:?}"),
        }
    }

    #[test]
    fn missing_header_is_flat() {
        let text = "**1. Gây hứng thú**\n**Hoạt động của cô:**\n- Cô hát.";
        assert!(matches!(
            structure(text, PlanFormat::WithColumns),
            FormattedContent::Flat(_)
        ));
    }

    #[test]
    fn header_without_markers_falls_back_to_flow() {
        let text = "**III. CÁCH TIẾN HÀNH**\n**Hoạt động 1: Dạo chơi**\nCô dẫn trẻ ra sân.";
        match structure(text, PlanFormat::WithColumns) {
            FormattedContent::Sectioned {
                header,
                activities: Activities::Flow(blocks),
                ..
            } => {
                assert_eq!(header, "**III. CÁCH TIẾN HÀNH**");
                assert!(blocks.contains(&Block::Paragraph("Cô dẫn trẻ ra sân.".to_string())));
            }
            other => panic!("expected flow fallback, got {other:?}"),
        }
    }

    #[test]
    fn earliest_header_wins() {
        let text = "**III. CÁCH TIẾN HÀNH**\nA\n**III. TỔ CHỨC HOẠT ĐỘNG**\nB";
        match structure(text, PlanFormat::WithColumns) {
            FormattedContent::Sectioned {
                header,
                activities: Activities::Flow(blocks),
                ..
            } => {
                assert_eq!(header, "**III. CÁCH TIẾN HÀNH**");
                // Content after a second header is kept, not dropped.
                assert!(blocks.contains(&Block::Paragraph("B".to_string())));
            }
            other => panic!("unexpected structure {other:?}"),
        }
    }

    #[test]
    fn only_learning_section_uses_columns() {
        assert_eq!(
            section_format(ActivityTab::Learning, PlanFormat::WithColumns),
            PlanFormat::WithColumns
        );
        assert_eq!(
            section_format(ActivityTab::Outdoor, PlanFormat::WithColumns),
            PlanFormat::NoColumns
        );
        assert_eq!(
            section_format(ActivityTab::Corner, PlanFormat::WithColumns),
            PlanFormat::NoColumns
        );
    }
}
