// PDF rendering for note export
use printpdf::*;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

const PAGE_WIDTH: Mm = Mm(210.0); // A4
const PAGE_HEIGHT: Mm = Mm(297.0);
const LEFT_MARGIN: Mm = Mm(20.0);
const TOP_MARGIN: Mm = Mm(277.0);
const BOTTOM_MARGIN: Mm = Mm(20.0);
const LINE_HEIGHT: Mm = Mm(5.5);
const MAX_LINE_CHARS: usize = 90;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF rendering failed: {0}")]
    Render(String),
}

impl From<printpdf::Error> for PdfError {
    fn from(e: printpdf::Error) -> Self {
        PdfError::Render(e.to_string())
    }
}

/// Everything that goes onto the exported page
#[derive(Debug, Clone)]
pub struct NoteDocument {
    pub title: String,
    pub folder_name: Option<String>,
    /// Human readable creation date
    pub created: String,
    /// Rich-text (HTML) note body
    pub content_html: String,
}

/// Turns a note into PDF bytes
pub trait PdfRenderer: Send + Sync {
    fn render(&self, document: &NoteDocument) -> Result<Vec<u8>, PdfError>;
}

/// Renders with printpdf's builtin Helvetica fonts
#[derive(Debug, Clone, Default)]
pub struct PrintPdfRenderer;

impl PdfRenderer for PrintPdfRenderer {
    fn render(&self, document: &NoteDocument) -> Result<Vec<u8>, PdfError> {
        let (doc, page1, layer1) = PdfDocument::new(&document.title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");

        let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let font_regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;

        let mut layer = doc.get_page(page1).get_layer(layer1);
        let mut current_y = TOP_MARGIN;

        for line in wrap_text(&document.title, 60) {
            layer.use_text(line, 18.0, LEFT_MARGIN, current_y, &font_bold);
            current_y -= Mm(8.0);
        }

        let meta = match &document.folder_name {
            Some(folder) => format!("Folder: {} | Created: {}", folder, document.created),
            None => format!("Created: {}", document.created),
        };
        current_y -= Mm(2.0);
        layer.use_text(meta, 10.0, LEFT_MARGIN, current_y, &font_regular);
        current_y -= Mm(12.0);

        for paragraph in html_to_text(&document.content_html).split('\n') {
            let lines = wrap_text(paragraph, MAX_LINE_CHARS);
            if lines.is_empty() {
                current_y -= LINE_HEIGHT;
                continue;
            }
            for line in lines {
                if current_y < BOTTOM_MARGIN {
                    let (page, page_layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
                    layer = doc.get_page(page).get_layer(page_layer);
                    current_y = TOP_MARGIN;
                }
                layer.use_text(line, 11.0, LEFT_MARGIN, current_y, &font_regular);
                current_y -= LINE_HEIGHT;
            }
        }

        Ok(doc.save_to_bytes()?)
    }
}

/// Greedy word wrap; words longer than the limit get a line of their own.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        let current_len = current_line.chars().count();
        if current_len > 0 && current_len + word.chars().count() + 1 > max_chars {
            lines.push(std::mem::take(&mut current_line));
        }

        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

struct HtmlPatterns {
    line_break: Regex,
    block_end: Regex,
    list_item: Regex,
    any_tag: Regex,
    blank_runs: Regex,
}

fn html_patterns() -> &'static HtmlPatterns {
    static PATTERNS: OnceLock<HtmlPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| HtmlPatterns {
        line_break: Regex::new(r"(?i)<br\s*/?>").expect("valid regex"),
        block_end: Regex::new(r"(?i)</(p|div|h[1-6]|li|tr|blockquote|pre|ul|ol|table)>")
            .expect("valid regex"),
        list_item: Regex::new(r"(?i)<li[^>]*>").expect("valid regex"),
        any_tag: Regex::new(r"<[^>]*>").expect("valid regex"),
        blank_runs: Regex::new(r"\n{3,}").expect("valid regex"),
    })
}

/// Flattens editor HTML into plain text with paragraph breaks.
pub fn html_to_text(html: &str) -> String {
    let patterns = html_patterns();

    let text = patterns.line_break.replace_all(html, "\n");
    let text = patterns.block_end.replace_all(&text, "\n");
    let text = patterns.list_item.replace_all(&text, "- ");
    let text = patterns.any_tag.replace_all(&text, "");

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    let trimmed: Vec<&str> = decoded.lines().map(str::trim).collect();
    patterns
        .blank_runs
        .replace_all(&trimmed.join("\n"), "\n\n")
        .trim()
        .to_string()
}
