use super::classify::{Block, classify_lines};
use super::columns::ActivityRow;
use super::inline::strip_bold;
use super::{Activities, FormattedContent};

fn push_blocks(out: &mut String, blocks: &[Block], indent: &str) {
    for block in blocks {
        if *block == Block::Blank {
            out.push('\n');
            continue;
        }
        out.push_str(indent);
        match block {
            Block::Blank => {}
            Block::Heading(t) => out.push_str(&strip_bold(t).to_uppercase()),
            Block::NumberedHeading(t) | Block::Paragraph(t) => out.push_str(&strip_bold(t)),
            Block::Bullet(t) => {
                out.push_str("  - ");
                out.push_str(&strip_bold(t));
            }
            Block::Indented(t) => {
                out.push_str("    ");
                out.push_str(&strip_bold(t));
            }
        }
        out.push('\n');
    }
}

fn push_rows(out: &mut String, rows: &[ActivityRow]) {
    for row in rows {
        out.push('\n');
        out.push_str(&strip_bold(&row.title));
        out.push('\n');
        for (label, lines) in [
            ("Hoạt động của cô", &row.teacher_actions),
            ("Hoạt động của trẻ", &row.child_actions),
        ] {
            out.push_str("  [");
            out.push_str(label);
            out.push_str("]\n");
            push_blocks(out, &classify_lines(&lines.join("\n")), "    ");
        }
    }
}

/// Render formatted content for a terminal: markup stripped, tables as
/// labeled column runs under each activity title.
pub fn render_text(content: &FormattedContent) -> String {
    let mut out = String::new();
    match content {
        FormattedContent::Flat(blocks) => push_blocks(&mut out, blocks, ""),
        FormattedContent::Sectioned {
            preamble,
            header,
            activities,
        } => {
            push_blocks(&mut out, preamble, "");
            out.push_str(&strip_bold(header));
            out.push('\n');
            match activities {
                Activities::Table(rows) => push_rows(&mut out, rows),
                Activities::Flow(blocks) => push_blocks(&mut out, blocks, ""),
            }
        }
    }
    out
}
