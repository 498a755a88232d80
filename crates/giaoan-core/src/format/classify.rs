use std::sync::LazyLock;

use regex::Regex;

static ROMAN_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(I{1,3}|IV|V|VI|VII|VIII|IX|X)\.").expect("roman heading pattern is valid")
});

static NUMBERED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\*\*)?\d+\.").expect("numbered heading pattern is valid"));

/// One classified line of generated text.
///
/// Payloads are the trimmed line with inline markup intact; bullets drop
/// their leading dash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Blank,
    Heading(String),
    NumberedHeading(String),
    Bullet(String),
    /// Body line under a numbered heading.
    Indented(String),
    Paragraph(String),
}

impl Block {
    pub fn text(&self) -> &str {
        match self {
            Self::Blank => "",
            Self::Heading(t)
            | Self::NumberedHeading(t)
            | Self::Bullet(t)
            | Self::Indented(t)
            | Self::Paragraph(t) => t,
        }
    }
}

/// Classify each line of `text` for flat rendering.
///
/// A numbered heading opens a list; following plain lines are indented
/// until a Roman heading or a bullet closes it.
pub fn classify_lines(text: &str) -> Vec<Block> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut in_numbered_list = false;
    text.split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                Block::Blank
            } else if ROMAN_HEADING.is_match(trimmed) {
                in_numbered_list = false;
                Block::Heading(trimmed.to_string())
            } else if NUMBERED_HEADING.is_match(trimmed) {
                in_numbered_list = true;
                Block::NumberedHeading(trimmed.to_string())
            } else if let Some(rest) = trimmed.strip_prefix('-') {
                in_numbered_list = false;
                Block::Bullet(rest.trim().to_string())
            } else if in_numbered_list {
                Block::Indented(trimmed.to_string())
            } else {
                Block::Paragraph(trimmed.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn classifies_each_kind() {
        let text = "I. MỤC TIÊU\n\n**1. Kiến thức:**\nTrẻ biết đếm.\n  Trẻ biết so sánh.  \n- Đồ dùng của cô\nKết thúc.";
        assert_eq!(
            classify_lines(text),
            vec![
                Block::Heading(p("I. MỤC TIÊU")),
                Block::Blank,
                Block::NumberedHeading(p("**1. Kiến thức:**")),
                Block::Indented(p("Trẻ biết đếm.")),
                Block::Indented(p("Trẻ biết so sánh.")),
                Block::Bullet(p("Đồ dùng của cô")),
                Block::Paragraph(p("Kết thúc.")),
            ]
        );
    }

    #[test]
    fn roman_heading_closes_numbered_list() {
        let blocks = classify_lines("2. Kỹ năng\nQuan sát.\nIV. ĐÁNH GIÁ\nGhi chép.");
        assert_eq!(blocks[1], Block::Indented(p("Quan sát.")));
        assert_eq!(blocks[2], Block::Heading(p("IV. ĐÁNH GIÁ")));
        assert_eq!(blocks[3], Block::Paragraph(p("Ghi chép.")));
    }

    #[test]
    fn bold_roman_heading_is_a_paragraph() {
        // The Roman pattern is anchored at the first character.
        assert_eq!(
            classify_lines("**II. CHUẨN BỊ**"),
            vec![Block::Paragraph(p("**II. CHUẨN BỊ**"))]
        );
    }

    #[test]
    fn roman_numerals_beyond_three() {
        for heading in ["VIII. A", "IX. B", "X. C", "VI. D"] {
            assert!(matches!(classify_lines(heading)[0], Block::Heading(_)), "{heading}");
        }
        assert!(matches!(classify_lines("XI. E")[0], Block::Paragraph(_)));
    }

    #[test]
    fn empty_text_has_no_blocks() {
        assert!(classify_lines("").is_empty());
        assert_eq!(classify_lines("\r\n"), vec![Block::Blank, Block::Blank]);
    }
}
