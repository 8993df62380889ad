//! State structs tracking context during event processing.

use std::collections::HashMap;

use pulldown_cmark::Alignment;

use crate::hooks::{Attributes, NodeKind};

/// State for tracking code block rendering.
pub(crate) struct CodeBlockState {
    /// Whether we're inside a code block.
    active: bool,
    /// Fenced or indented.
    kind: NodeKind,
    /// Language of current code block (e.g., "rust", "python").
    language: Option<String>,
    /// Buffer for code block content.
    buffer: String,
}

impl Default for CodeBlockState {
    fn default() -> Self {
        Self {
            active: false,
            kind: NodeKind::IndentedCodeBlock,
            language: None,
            buffer: String::new(),
        }
    }
}

impl CodeBlockState {
    /// Start a new code block.
    pub fn start(&mut self, kind: NodeKind, language: Option<String>) {
        self.active = true;
        self.kind = kind;
        self.language = language;
        self.buffer.clear();
    }

    /// End the current code block and return (kind, language, content).
    pub fn end(&mut self) -> (NodeKind, Option<String>, String) {
        self.active = false;
        (
            self.kind,
            self.language.take(),
            std::mem::take(&mut self.buffer),
        )
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Append text to the code block buffer.
    pub fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn push_newline(&mut self) {
        self.buffer.push('\n');
    }
}

/// State for tracking table rendering.
#[derive(Default)]
pub(crate) struct TableState {
    /// Whether we're inside the table header row.
    in_head: bool,
    /// Column alignments for current table.
    alignments: Vec<Alignment>,
    /// Current column index in table row.
    cell_index: usize,
}

impl TableState {
    /// Start a new table with column alignments.
    pub fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub fn end_head(&mut self) {
        self.in_head = false;
    }

    pub fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    pub fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Default attributes for the current cell (its alignment style).
    pub fn current_cell_attributes(&self) -> Attributes {
        let align = match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => "left",
            Some(Alignment::Center) => "center",
            Some(Alignment::Right) => "right",
            Some(Alignment::None) | None => return Attributes::new(),
        };
        Attributes::new().with("style", format!("text-align:{align}"))
    }
}

/// State for tracking image alt text capture.
#[derive(Default)]
pub(crate) struct ImageState {
    /// Nesting depth; images may appear inside image alt text.
    depth: usize,
    /// Buffer for alt text.
    alt_text: String,
}

impl ImageState {
    /// Start capturing image alt text.
    pub fn start(&mut self) {
        if self.depth == 0 {
            self.alt_text.clear();
        }
        self.depth += 1;
    }

    /// End image capture. Returns the alt text once the outermost image ends.
    pub fn end(&mut self) -> Option<String> {
        self.depth = self.depth.saturating_sub(1);
        (self.depth == 0).then(|| std::mem::take(&mut self.alt_text))
    }

    pub fn is_active(&self) -> bool {
        self.depth > 0
    }

    pub fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// A heading collected between its start and end events.
pub(crate) struct CompletedHeading {
    pub level: u8,
    pub attributes: Attributes,
    pub html: String,
}

/// State for tracking the heading being rendered.
#[derive(Default)]
pub(crate) struct HeadingState {
    /// Current heading level (None if not in a heading).
    current_level: Option<u8>,
    /// Attributes written in the source (`{#id .class}`).
    explicit: Attributes,
    /// Plain text of the heading, used for the slug.
    text: String,
    /// Rendered inline HTML of the heading.
    html: String,
    /// Counter for generating unique heading IDs.
    id_counts: HashMap<String, usize>,
}

impl HeadingState {
    /// Start tracking a heading.
    pub fn start(&mut self, level: u8, explicit: Attributes) {
        self.current_level = Some(level);
        self.explicit = explicit;
        self.text.clear();
        self.html.clear();
    }

    pub fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    /// Complete the heading.
    ///
    /// With `generate_id`, a heading without an explicit `id` gets a unique
    /// slug of its text. Text that slugs to nothing gets no `id`.
    pub fn complete(&mut self, generate_id: bool) -> Option<CompletedHeading> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);
        let explicit = std::mem::take(&mut self.explicit);

        let mut attributes = Attributes::new();
        match explicit.get("id") {
            Some(id) => attributes.set("id", id),
            None if generate_id => {
                if let Some(id) = self.generate_id(&text) {
                    attributes.set("id", id);
                }
            }
            None => {}
        }
        for (name, value) in explicit.iter().filter(|(name, _)| *name != "id") {
            attributes.add_value(name, value);
        }

        Some(CompletedHeading {
            level,
            attributes,
            html: html.trim().to_owned(),
        })
    }

    /// Generate a unique ID for a heading.
    fn generate_id(&mut self, text: &str) -> Option<String> {
        let base_id = slugify(text);
        if base_id.is_empty() {
            return None;
        }
        let count = self.id_counts.entry(base_id.clone()).or_default();
        let id = match *count {
            0 => base_id,
            n => format!("{base_id}-{n}"),
        };
        *count += 1;
        Some(id)
    }

    pub fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }
}

/// Convert text to URL-safe slug.
///
/// Converts to lowercase, replaces whitespace/dashes/underscores with single dashes,
/// and removes other non-alphanumeric characters.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("  Spaces  "), "spaces");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("snake_case"), "snake-case");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }

    #[test]
    fn test_code_block_state() {
        let mut state = CodeBlockState::default();
        assert!(!state.is_active());

        state.start(NodeKind::FencedCodeBlock, Some("rust".to_owned()));
        assert!(state.is_active());

        state.push_str("fn main() {}");
        let (kind, lang, content) = state.end();
        assert_eq!(kind, NodeKind::FencedCodeBlock);
        assert_eq!(lang, Some("rust".to_owned()));
        assert_eq!(content, "fn main() {}");
        assert!(!state.is_active());
    }

    #[test]
    fn test_table_cell_alignment() {
        let mut state = TableState::default();
        state.start(vec![Alignment::Left, Alignment::None]);
        state.start_head();
        assert!(state.is_in_head());
        assert_eq!(
            state.current_cell_attributes().get("style"),
            Some("text-align:left")
        );

        state.next_cell();
        assert!(state.current_cell_attributes().is_empty());
    }

    #[test]
    fn test_nested_image_alt_text() {
        let mut state = ImageState::default();
        state.start();
        state.push_str("outer ");
        state.start();
        state.push_str("inner");
        assert_eq!(state.end(), None);
        assert!(state.is_active());
        assert_eq!(state.end(), Some("outer inner".to_owned()));
        assert!(!state.is_active());
    }

    #[test]
    fn test_heading_ids_deduplicated() {
        let mut state = HeadingState::default();
        for _ in 0..2 {
            state.start(2, Attributes::new());
            state.push_text("FAQ");
            state.push_html("FAQ");
            state.complete(true);
        }
        state.start(2, Attributes::new());
        state.push_text("FAQ");
        let heading = state.complete(true).unwrap();
        assert_eq!(heading.attributes.get("id"), Some("faq-2"));
    }

    #[test]
    fn test_heading_without_slug_has_no_id() {
        let mut state = HeadingState::default();
        for _ in 0..2 {
            state.start(1, Attributes::new());
            state.push_text("日本語");
            let heading = state.complete(true).unwrap();
            assert!(heading.attributes.is_empty());
        }
        state.start(1, Attributes::new());
        state.push_text("?!");
        assert_eq!(state.complete(true).unwrap().attributes.get("id"), None);
    }

    #[test]
    fn test_heading_explicit_id_wins() {
        let mut state = HeadingState::default();
        state.start(1, Attributes::new().with("id", "custom").with("class", "x"));
        state.push_text("Title");
        let heading = state.complete(true).unwrap();
        assert_eq!(heading.attributes.get("id"), Some("custom"));
        assert_eq!(heading.attributes.get("class"), Some("x"));
    }

    #[test]
    fn test_heading_without_ids() {
        let mut state = HeadingState::default();
        state.start(1, Attributes::new());
        state.push_html(" Title ");
        let heading = state.complete(false).unwrap();
        assert!(heading.attributes.is_empty());
        assert_eq!(heading.html, "Title");
        assert_eq!(heading.level, 1);
    }
}
