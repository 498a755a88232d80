//! Word-compatible document export.
//!
//! The document is plain HTML served as `application/msword` with a UTF-8
//! byte-order mark, which word processors open directly.

use std::sync::LazyLock;

use regex::Regex;

use giaoan_store::models::{ActivityTab, LessonPlanParts, PlanFormat};

use crate::format::{render_html, section_format, structure};

pub const DOCUMENT_MIME: &str = "application/msword";
pub const DEFAULT_FILE_NAME: &str = "GiaoAn_TongHop.doc";

const BOM: &str = "\u{feff}";

static SUBJECT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Đề tài(?:\*\*)?\s*:\s*(.*)").expect("subject pattern is valid"));
static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\?%*:|"<>]"#).expect("unsafe chars pattern is valid"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// A rendered document ready to be written or served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub html: String,
}

impl Document {
    /// Render `parts` and derive the file name.
    pub fn build(parts: &LessonPlanParts, format: PlanFormat) -> Self {
        Self {
            file_name: document_file_name(parts),
            html: render_document(parts, format),
        }
    }

    /// Bytes to write: BOM followed by the HTML.
    pub fn bytes(&self) -> Vec<u8> {
        document_bytes(&self.html)
    }
}

/// Render the full document for a plan.
///
/// Only the learning activity honours `format`; the outdoor and corner
/// sections are always rendered without columns.
pub fn render_document(parts: &LessonPlanParts, format: PlanFormat) -> String {
    let section =
        |tab: ActivityTab| render_html(&structure(parts.part(tab), section_format(tab, format)));
    let learning = section(ActivityTab::Learning);
    let outdoor = section(ActivityTab::Outdoor);
    let corner = section(ActivityTab::Corner);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>Giáo án</title>
<style>
  body {{ font-family: 'Times New Roman', serif; }}
  table {{ width: 100%; border-collapse: collapse; }}
  th, td {{ border: 1px solid black; padding: 8px; text-align: left; vertical-align: top; }}
  th {{ background-color: #f2f2f2; }}
  p {{ margin: 0 0 0.5em 0; line-height: 1.5; font-size: 14pt; }}
  h1, h2, h3 {{ page-break-after: avoid; }}
  .page-break {{ page-break-before: always; }}
</style>
</head>
<body>
<h1 style="text-align: center;">KẾ HOẠCH TỔ CHỨC HOẠT ĐỘNG</h1>
<br/>
<h2><strong>I. HOẠT ĐỘNG HỌC</strong></h2>
{learning}
<h2 class="page-break"><strong>II. HOẠT ĐỘNG NGOÀI TRỜI</strong></h2>
{outdoor}
<h2 class="page-break"><strong>III. HOẠT ĐỘNG GÓC</strong></h2>
{corner}
</body>
</html>
"#
    )
}

/// Prefix `html` with a UTF-8 byte-order mark.
pub fn document_bytes(html: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(BOM.len() + html.len());
    bytes.extend_from_slice(BOM.as_bytes());
    bytes.extend_from_slice(html.as_bytes());
    bytes
}

/// File name derived from the "Đề tài:" line of the learning activity.
pub fn document_file_name(parts: &LessonPlanParts) -> String {
    let subject = SUBJECT_LINE
        .captures(&parts.learning_activity)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().replace("**", "").trim().to_string())
        .filter(|s| !s.is_empty());

    match subject {
        Some(subject) => {
            let safe = UNSAFE_CHARS.replace_all(&subject, "-");
            let safe = WHITESPACE.replace_all(&safe, "_");
            format!("GiaoAn_{safe}.doc")
        }
        None => DEFAULT_FILE_NAME.to_string(),
    }
}
