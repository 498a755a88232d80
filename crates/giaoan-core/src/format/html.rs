use std::fmt::Write;

use super::classify::{Block, classify_lines};
use super::columns::ActivityRow;
use super::inline::bold_to_html;
use super::{Activities, FormattedContent};

const P_STYLE: &str = "margin-bottom: 0.5em; font-size: 14pt; line-height: 1.5;";
const CELL_STYLE: &str = "border: 1px solid #ccc; padding: 8px;";

/// Render classified lines as styled paragraphs for the exported document.
pub fn render_blocks_html(blocks: &[Block]) -> String {
    let mut html = String::new();
    for block in blocks {
        let _ = match block {
            Block::Blank => write!(html, "<br>"),
            Block::Heading(t) | Block::NumberedHeading(t) => write!(
                html,
                "<p style=\"{P_STYLE}\"><strong>{}</strong></p>",
                bold_to_html(t)
            ),
            Block::Bullet(t) => write!(
                html,
                "<p style=\"{P_STYLE} padding-left: 20px; text-indent: -20px;\">- {}</p>",
                bold_to_html(t)
            ),
            Block::Indented(t) => write!(
                html,
                "<p style=\"{P_STYLE} padding-left: 20px;\">{}</p>",
                bold_to_html(t)
            ),
            Block::Paragraph(t) => {
                write!(html, "<p style=\"{P_STYLE}\">{}</p>", bold_to_html(t))
            }
        };
    }
    html
}

fn render_lines_html(lines: &[String]) -> String {
    render_blocks_html(&classify_lines(&lines.join("\n")))
}

fn render_table_html(rows: &[ActivityRow]) -> String {
    let mut html = String::from(
        "<table style=\"width:100%; border-collapse: collapse; border: 1px solid #ccc;\">\
         <thead><tr style=\"background-color: #f2f2f2;\">\
         <th style=\"width:50%; border: 1px solid #ccc; padding: 8px; text-align: left;\">Hoạt động của cô</th>\
         <th style=\"width:50%; border: 1px solid #ccc; padding: 8px; text-align: left;\">Hoạt động của trẻ</th>\
         </tr></thead><tbody>",
    );
    for row in rows {
        if !row.title.is_empty() {
            let _ = write!(
                html,
                "<tr style=\"background-color: #f9f9f9;\"><td colspan=\"2\" style=\"{CELL_STYLE}\">{}</td></tr>",
                render_blocks_html(&classify_lines(&row.title))
            );
        }
        let _ = write!(
            html,
            "<tr><td style=\"{CELL_STYLE} vertical-align: top;\">{}</td>\
             <td style=\"{CELL_STYLE} vertical-align: top;\">{}</td></tr>",
            render_lines_html(&row.teacher_actions),
            render_lines_html(&row.child_actions)
        );
    }
    html.push_str("</tbody></table>");
    html
}

/// Render formatted content as document HTML.
pub fn render_html(content: &FormattedContent) -> String {
    match content {
        FormattedContent::Flat(blocks) => render_blocks_html(blocks),
        FormattedContent::Sectioned {
            preamble,
            header,
            activities,
        } => {
            let mut html = render_blocks_html(preamble);
            html.push_str(&render_blocks_html(&classify_lines(header)));
            match activities {
                Activities::Table(rows) => html.push_str(&render_table_html(rows)),
                Activities::Flow(blocks) => html.push_str(&render_blocks_html(blocks)),
            }
            html
        }
    }
}
