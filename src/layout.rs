//! Line layout for the manual renderer.
//!
//! Turns Markdown source into pages of positioned text runs without touching
//! any PDF library, so the geometry can be tested on its own. There is no
//! word-wrap and no paragraph model: one non-blank source line becomes one
//! draw operation, truncated to [`PageLayout::max_chars`].
//!
//! Coordinates are PDF points with the origin at the bottom-left corner.

use crate::error::Doc2PdfError;
use serde::{Deserialize, Serialize};

/// How a source line is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Starts with `#`. Bold, larger; leading `#`s removed.
    Heading,
    /// Starts with `- ` or `• `. Indented by two spaces.
    Bullet,
    /// Anything else, drawn as-is.
    Body,
}

/// The two faces the renderer uses (Helvetica and Helvetica-Bold).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFace {
    Regular,
    Bold,
}

/// One text run at an absolute position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawOp {
    pub x: f32,
    pub y: f32,
    pub face: FontFace,
    pub size: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaidOutPage {
    pub ops: Vec<DrawOp>,
}

/// Page geometry and font sizes. `Default` is US Letter with one-inch
/// margins, 11 pt body text and 80-character lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    /// Distance from the top edge to the title and to the first line of
    /// every continuation page.
    pub top_margin: f32,
    /// Distance from the top edge to the first body line on page one.
    pub first_line_offset: f32,
    /// A line is never started below this height; a new page begins instead.
    pub bottom_margin: f32,
    /// x of every body line.
    pub left_margin: f32,
    /// x of the title.
    pub title_indent: f32,
    pub line_height: f32,
    pub max_chars: usize,
    pub title_size: f32,
    pub heading_size: f32,
    pub body_size: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        const INCH: f32 = 72.0;
        Self {
            width: 8.5 * INCH,
            height: 11.0 * INCH,
            top_margin: INCH,
            first_line_offset: 1.5 * INCH,
            bottom_margin: INCH,
            left_margin: 0.5 * INCH,
            title_indent: INCH,
            line_height: 0.2 * INCH,
            max_chars: 80,
            title_size: 16.0,
            heading_size: 14.0,
            body_size: 11.0,
        }
    }
}

impl PageLayout {
    /// y of the first line on a continuation page.
    pub fn top(&self) -> f32 {
        self.height - self.top_margin
    }

    pub fn validate(&self) -> Result<(), Doc2PdfError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("line height", self.line_height),
            ("title size", self.title_size),
            ("heading size", self.heading_size),
            ("body size", self.body_size),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(Doc2PdfError::InvalidConfig(format!(
                "Page layout {name} must be positive"
            )));
        }
        if self.max_chars == 0 {
            return Err(Doc2PdfError::InvalidConfig(
                "Page layout max_chars must be ≥ 1".into(),
            ));
        }
        if self.top() < self.bottom_margin || self.height - self.first_line_offset < self.bottom_margin {
            return Err(Doc2PdfError::InvalidConfig(
                "Page layout margins leave no room for text".into(),
            ));
        }
        Ok(())
    }
}

/// Classify a raw source line and produce the text to draw (before
/// truncation).
///
/// Only the raw line start is inspected: an indented `#` is body text.
pub fn classify(line: &str) -> (LineKind, String) {
    if line.starts_with('#') {
        let text = line.trim_start_matches('#').trim().to_string();
        (LineKind::Heading, text)
    } else if line.starts_with("- ") || line.starts_with("• ") {
        (LineKind::Bullet, format!("  {line}"))
    } else {
        (LineKind::Body, line.to_string())
    }
}

/// Cut `text` to at most `max` characters. Never wraps.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Lay out `source` under a bold `title`.
///
/// Blank lines are skipped. Before each line, if the cursor has dropped below
/// the bottom margin a new page is started at the top margin; after drawing,
/// the cursor moves down one line height. Always returns at least one page.
pub fn layout_document(title: &str, source: &str, layout: &PageLayout) -> Vec<LaidOutPage> {
    let mut pages = vec![LaidOutPage::default()];
    pages[0].ops.push(DrawOp {
        x: layout.title_indent,
        y: layout.top(),
        face: FontFace::Bold,
        size: layout.title_size,
        text: title.to_string(),
    });

    // The cursor is derived from a line index rather than by repeated
    // subtraction so rounding does not drift across long pages.
    let mut page_start = layout.height - layout.first_line_offset;
    let mut row: u32 = 0;

    for raw in source.lines() {
        if raw.trim().is_empty() {
            continue;
        }
        let (kind, text) = classify(raw);

        if page_start - row as f32 * layout.line_height < layout.bottom_margin {
            pages.push(LaidOutPage::default());
            page_start = layout.top();
            row = 0;
        }

        let (face, size) = match kind {
            LineKind::Heading => (FontFace::Bold, layout.heading_size),
            LineKind::Bullet | LineKind::Body => (FontFace::Regular, layout.body_size),
        };

        if let Some(page) = pages.last_mut() {
            page.ops.push(DrawOp {
                x: layout.left_margin,
                y: page_start - row as f32 * layout.line_height,
                face,
                size,
                text: truncate(&text, layout.max_chars),
            });
        }
        row += 1;
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Whole-number geometry so y positions compare exactly.
    fn small() -> PageLayout {
        PageLayout {
            width: 200.0,
            height: 100.0,
            top_margin: 10.0,
            first_line_offset: 20.0,
            bottom_margin: 20.0,
            left_margin: 5.0,
            title_indent: 10.0,
            line_height: 10.0,
            max_chars: 12,
            title_size: 16.0,
            heading_size: 14.0,
            body_size: 11.0,
        }
    }

    fn body_ops(pages: &[LaidOutPage]) -> Vec<&DrawOp> {
        pages.iter().flat_map(|p| &p.ops).skip(1).collect()
    }

    #[test]
    fn heading_strips_hashes_and_whitespace() {
        assert_eq!(
            classify("###   Emergency Flow  "),
            (LineKind::Heading, "Emergency Flow".to_string())
        );
        assert_eq!(classify("#"), (LineKind::Heading, String::new()));
    }

    #[test]
    fn heading_keeps_inner_hashes() {
        assert_eq!(classify("## C# bindings").1, "C# bindings");
    }

    #[test]
    fn bullets_are_indented() {
        assert_eq!(classify("- item"), (LineKind::Bullet, "  - item".to_string()));
        assert_eq!(classify("• item"), (LineKind::Bullet, "  • item".to_string()));
        assert_eq!(classify("-item").0, LineKind::Body);
    }

    #[test]
    fn indented_hash_is_body() {
        assert_eq!(classify("  # not a heading").0, LineKind::Body);
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate("ééééé", 3), "ééé");
        assert_eq!(truncate("short", 80), "short");
        assert_eq!(truncate("exactly", 7), "exactly");
    }

    #[test]
    fn title_is_bold_at_top_margin() {
        let pages = layout_document("Overview", "", &small());
        assert_eq!(pages.len(), 1);
        assert_eq!(
            pages[0].ops,
            vec![DrawOp {
                x: 10.0,
                y: 90.0,
                face: FontFace::Bold,
                size: 16.0,
                text: "Overview".into(),
            }]
        );
    }

    #[test]
    fn one_op_per_non_blank_line_in_order() {
        let src = "# Intro\n\nfirst\n   \n- point\nlast\n";
        let pages = layout_document("T", src, &small());
        let texts: Vec<_> = body_ops(&pages).iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["Intro", "first", "  - point", "last"]);

        let ops = body_ops(&pages);
        assert_eq!((ops[0].face, ops[0].size), (FontFace::Bold, 14.0));
        assert_eq!((ops[1].face, ops[1].size), (FontFace::Regular, 11.0));
        assert_eq!((ops[2].face, ops[2].size), (FontFace::Regular, 11.0));
        assert_eq!(ops.iter().map(|o| o.y).collect::<Vec<_>>(), vec![80.0, 70.0, 60.0, 50.0]);
    }

    #[test]
    fn long_lines_are_truncated_not_wrapped() {
        let pages = layout_document("T", "abcdefghijklmnopqrstuvwxyz\n- bullet text here", &small());
        let ops = body_ops(&pages);
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].text, "abcdefghijkl");
        // The two-space indent counts toward the limit.
        assert_eq!(ops[1].text, "  - bullet t");
    }

    #[test]
    fn overflow_starts_new_page_at_top_margin() {
        // Page one holds y = 80..=20 (7 lines); later pages y = 90..=20 (8 lines).
        let src: String = (1..=20).map(|i| format!("line {i}\n")).collect();
        let pages = layout_document("T", &src, &small());

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].ops.len(), 1 + 7);
        assert_eq!(pages[1].ops.len(), 8);
        assert_eq!(pages[2].ops.len(), 5);

        assert_eq!(pages[0].ops.last().unwrap().y, 20.0);
        assert_eq!(pages[1].ops[0].y, 90.0);
        assert_eq!(pages[1].ops[0].text, "line 8");
        assert_eq!(pages[2].ops[0].text, "line 16");
    }

    #[test]
    fn default_layout_is_letter_with_inch_margins() {
        let l = PageLayout::default();
        assert_eq!((l.width, l.height), (612.0, 792.0));
        assert_eq!(l.top(), 720.0);
        assert_eq!(l.height - l.first_line_offset, 684.0);
        assert_eq!(l.max_chars, 80);
        l.validate().unwrap();

        let src: String = (0..43).map(|i| format!("l{i}\n")).collect();
        assert_eq!(layout_document("T", &src, &l).len(), 1);
        let src: String = (0..44).map(|i| format!("l{i}\n")).collect();
        assert_eq!(layout_document("T", &src, &l).len(), 2);
    }

    #[test]
    fn impossible_margins_are_rejected() {
        let layout = PageLayout {
            bottom_margin: 95.0,
            ..small()
        };
        assert!(layout.validate().is_err());
        assert!(PageLayout { max_chars: 0, ..small() }.validate().is_err());
    }
}
