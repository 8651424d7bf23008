//! PDF feedback report
//!
//! Renders a list of feedback records into a US-letter PDF using the
//! standard Helvetica fonts, so no font files are embedded. Each record
//! starts on a new page; text that does not fit continues on the next one.
//!
//! Layout and encoding are separate steps: [`layout_pages`] is pure and
//! decides which line lands on which page and where, and
//! [`render_feedback_report`] turns that into PDF objects with `lopdf`.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::models::feedback::FeedbackDetails;

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 72;

/// Rendered when an optional field is empty
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Heading,
    Body,
    Italic,
}

impl TextStyle {
    fn font(self) -> &'static str {
        match self {
            TextStyle::Title | TextStyle::Heading => "F2",
            TextStyle::Body => "F1",
            TextStyle::Italic => "F3",
        }
    }

    fn size(self) -> i64 {
        match self {
            TextStyle::Title => 18,
            TextStyle::Heading => 14,
            TextStyle::Body | TextStyle::Italic => 11,
        }
    }

    fn leading(self) -> i64 {
        self.size() + self.size() / 3 + 1
    }

    /// Characters per line, assuming an average glyph width of half an em
    fn max_chars(self) -> usize {
        ((PAGE_WIDTH - 2 * MARGIN) * 2 / self.size()) as usize
    }
}

#[derive(Debug, Clone)]
enum Block {
    Text(TextStyle, String),
    Space(i64),
}

/// A line positioned on a page; `y` is the baseline from the bottom edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine {
    pub style: TextStyle,
    pub text: String,
    pub y: i64,
}

fn or_na(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => NOT_AVAILABLE,
    }
}

fn record_blocks(feedback: &FeedbackDetails) -> Vec<Block> {
    let mut blocks = vec![
        Block::Text(
            TextStyle::Title,
            format!("Feedback Report for: {}", feedback.employee.full_name),
        ),
        Block::Space(12),
        Block::Text(
            TextStyle::Body,
            format!("Date: {}", feedback.created_at.format("%Y-%m-%d")),
        ),
        Block::Text(
            TextStyle::Body,
            format!("Manager: {}", feedback.manager.full_name),
        ),
        Block::Text(
            TextStyle::Body,
            format!(
                "Sentiment: {}",
                feedback.sentiment.map(|s| s.title()).unwrap_or(NOT_AVAILABLE)
            ),
        ),
        Block::Text(
            TextStyle::Body,
            format!(
                "Acknowledged: {}",
                if feedback.acknowledged { "Yes" } else { "No" }
            ),
        ),
    ];

    if !feedback.tags.is_empty() {
        let names: Vec<&str> = feedback.tags.iter().map(|t| t.name.as_str()).collect();
        blocks.push(Block::Text(
            TextStyle::Body,
            format!("Tags: {}", names.join(", ")),
        ));
    }

    blocks.extend([
        Block::Space(24),
        Block::Text(TextStyle::Heading, "Strengths".to_string()),
        Block::Text(
            TextStyle::Body,
            or_na(feedback.strengths.as_deref()).to_string(),
        ),
        Block::Space(12),
        Block::Text(TextStyle::Heading, "Areas for Improvement".to_string()),
        Block::Text(
            TextStyle::Body,
            or_na(feedback.areas_for_improvement.as_deref()).to_string(),
        ),
    ]);

    if !feedback.comments.is_empty() {
        blocks.push(Block::Space(24));
        blocks.push(Block::Text(TextStyle::Heading, "Comments".to_string()));
        for comment in &feedback.comments {
            blocks.push(Block::Text(
                TextStyle::Italic,
                format!(
                    "{} on {}:",
                    comment.user.full_name,
                    comment.created_at.format("%Y-%m-%d")
                ),
            ));
            blocks.push(Block::Text(TextStyle::Body, comment.content.clone()));
            blocks.push(Block::Space(6));
        }
    }

    blocks
}

/// WinAnsiEncoding code for `c`, if the standard fonts can show it
///
/// Latin-1 maps onto itself; 0x80..=0x9F hold typographic extras.
fn win_ansi(c: char) -> Option<u8> {
    let code = match c {
        ' '..='~' | '\u{a0}'..='\u{ff}' => return u8::try_from(u32::from(c)).ok(),
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => return None,
    };
    Some(code)
}

/// Replaces characters the standard fonts cannot show
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' => ' ',
            c if win_ansi(c).is_some() => c,
            _ => '?',
        })
        .collect()
}

/// Encodes a sanitized line for a `Tj` operand
fn encode(text: &str) -> Vec<u8> {
    text.chars().map(|c| win_ansi(c).unwrap_or(b'?')).collect()
}

/// Greedy word wrap; words longer than a line are split
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current.is_empty() {
                word.len()
            } else {
                current.chars().count() + 1 + word.len()
            };
            if needed > max_chars {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.extend(word);
        }

        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Splits the report into pages of positioned lines
pub fn layout_pages(feedback: &[FeedbackDetails]) -> Vec<Vec<PlacedLine>> {
    let top = PAGE_HEIGHT - MARGIN;
    let mut pages: Vec<Vec<PlacedLine>> = Vec::new();

    for record in feedback {
        let mut page: Vec<PlacedLine> = Vec::new();
        let mut cursor = top;

        for block in record_blocks(record) {
            match block {
                Block::Space(points) => {
                    cursor -= points;
                }
                Block::Text(style, text) => {
                    for line in wrap(&sanitize(&text), style.max_chars()) {
                        cursor -= style.leading();
                        if cursor < MARGIN {
                            pages.push(std::mem::take(&mut page));
                            cursor = top - style.leading();
                        }
                        page.push(PlacedLine {
                            style,
                            text: line,
                            y: cursor,
                        });
                    }
                }
            }
        }

        pages.push(page);
    }

    pages
}

fn page_content(lines: &[PlacedLine]) -> Content {
    let mut operations = Vec::with_capacity(lines.len() * 5);

    for line in lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![line.style.font().into(), line.style.size().into()],
        ));
        operations.push(Operation::new("Td", vec![MARGIN.into(), line.y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode(&line.text))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    Content { operations }
}

fn font(doc: &mut Document, base: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Renders feedback records into PDF bytes
///
/// An empty slice yields a single blank page.
pub fn render_feedback_report(feedback: &[FeedbackDetails]) -> Result<Vec<u8>, ReportError> {
    let mut pages = layout_pages(feedback);
    if pages.is_empty() {
        pages.push(Vec::new());
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = font(&mut doc, "Helvetica");
    let bold = font(&mut doc, "Helvetica-Bold");
    let italic = font(&mut doc, "Helvetica-Oblique");
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
            "F3" => italic,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for lines in &pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(lines).encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::comment::CommentDetails;
    use crate::models::feedback::Sentiment;
    use crate::models::tag::Tag;
    use crate::models::user::{Role, UserIdentity};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn person(name: &str, role: Role) -> UserIdentity {
        UserIdentity {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", name.to_lowercase()),
            full_name: name.to_string(),
            role,
            team_id: None,
        }
    }

    fn sample(strengths: Option<String>) -> FeedbackDetails {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap();
        let manager = person("Maria", Role::Manager);
        FeedbackDetails {
            id: Uuid::new_v4(),
            employee: person("Ed", Role::Employee),
            manager: manager.clone(),
            strengths,
            areas_for_improvement: None,
            sentiment: Some(Sentiment::Positive),
            acknowledged: false,
            created_at,
            updated_at: created_at,
            tags: vec![Tag {
                id: Uuid::new_v4(),
                name: "Teamwork".to_string(),
            }],
            comments: vec![CommentDetails {
                id: Uuid::new_v4(),
                content: "Thanks!".to_string(),
                created_at,
                user: manager,
            }],
        }
    }

    fn texts(page: &[PlacedLine]) -> Vec<&str> {
        page.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("aaa bbb ccc", 7), vec!["aaa bbb", "ccc"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 10), vec![""]);
        assert_eq!(wrap("one\ntwo", 10), vec!["one", "two"]);
    }

    #[test]
    fn test_record_fields() {
        let pages = layout_pages(&[sample(Some("Clear writing".to_string()))]);
        assert_eq!(pages.len(), 1);

        let lines = texts(&pages[0]);
        assert_eq!(lines[0], "Feedback Report for: Ed");
        assert!(lines.contains(&"Date: 2024-03-05"));
        assert!(lines.contains(&"Manager: Maria"));
        assert!(lines.contains(&"Sentiment: Positive"));
        assert!(lines.contains(&"Tags: Teamwork"));
        assert!(lines.contains(&"Clear writing"));
        assert!(lines.contains(&"Maria on 2024-03-05:"));
    }

    #[test]
    fn test_missing_text_renders_na() {
        let mut record = sample(None);
        record.sentiment = None;
        let pages = layout_pages(&[record]);
        let lines = texts(&pages[0]);

        assert!(lines.contains(&"Sentiment: N/A"));
        assert_eq!(lines.iter().filter(|l| **l == "N/A").count(), 2);
    }

    #[test]
    fn test_each_record_starts_a_page() {
        let pages = layout_pages(&[sample(None), sample(None), sample(None)]);
        assert_eq!(pages.len(), 3);
    }

    #[test]
    fn test_long_text_continues_on_next_page() {
        let long = "word ".repeat(6000);
        let pages = layout_pages(&[sample(Some(long))]);

        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page.iter().all(|l| l.y >= MARGIN && l.y <= PAGE_HEIGHT - MARGIN));
        }
    }

    #[test]
    fn test_unmappable_replaced() {
        assert_eq!(sanitize("Zoë\tok 日本"), "Zoë ok ??");
    }

    #[test]
    fn test_accents_survive_layout() {
        let mut record = sample(Some("Très bien — naïve café".to_string()));
        record.employee.full_name = "José Müller".to_string();
        record.manager.full_name = "Zoë".to_string();

        let pages = layout_pages(&[record]);
        let lines = texts(&pages[0]);

        assert!(lines.contains(&"Feedback Report for: José Müller"));
        assert!(lines.contains(&"Manager: Zoë"));
        assert!(lines.contains(&"Très bien — naïve café"));
    }

    #[test]
    fn test_win_ansi_bytes() {
        assert_eq!(encode("é"), vec![0xe9]);
        assert_eq!(encode("— ’ “ €"), vec![0x97, b' ', 0x92, b' ', 0x93, b' ', 0x80]);
        assert_eq!(encode("A?"), b"A?".to_vec());
    }

    #[test]
    fn test_render_is_loadable() {
        let pdf = render_feedback_report(&[sample(None), sample(Some("x".repeat(20)))]).unwrap();
        assert!(pdf.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }
}
