//! Event-driven HTML renderer.

use std::collections::HashMap;
use std::sync::Arc;

use pulldown_cmark::{BlockQuoteKind, CodeBlockKind, Event, LinkType, Parser, Tag, TagEnd};

use crate::hooks::{AttributeOverrideHook, Attributes, LinkRewriteHook, NodeKind};
use crate::options::MarkdownOptions;
use crate::state::{CodeBlockState, HeadingState, ImageState, TableState, escape_html};
use crate::util::{fence_language, heading_level_to_num};

/// Markdown to HTML renderer.
///
/// Consumes `pulldown-cmark` events and writes compact HTML5. Every element
/// open tag passes its attributes through the [`AttributeOverrideHook`], and
/// every link destination passes through the [`LinkRewriteHook`].
///
/// Link `href` and image `src`/`alt` are structural and always emitted; the
/// attribute hook governs everything else on the element.
///
/// A renderer holds per-document state (heading ids, footnote numbers) that
/// is reset at the start of each [`render`](Self::render) call.
pub struct MarkdownRenderer {
    output: String,
    /// Stack of nested list types (true = ordered, false = unordered).
    list_stack: Vec<bool>,
    /// Code block rendering state.
    code: CodeBlockState,
    /// Table rendering state.
    table: TableState,
    /// Image alt text capture state.
    image: ImageState,
    /// Heading rendering state.
    heading: HeadingState,
    /// Pending image data (src, title) waiting for alt text.
    pending_image: Option<(String, String)>,
    /// Footnote label to display number, in order of first appearance.
    footnotes: HashMap<String, usize>,
    options: MarkdownOptions,
    link_hook: Option<Arc<dyn LinkRewriteHook>>,
    attribute_hook: Option<Arc<dyn AttributeOverrideHook>>,
}

impl MarkdownRenderer {
    /// Create a renderer with default options and no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            list_stack: Vec::new(),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::default(),
            pending_image: None,
            footnotes: HashMap::new(),
            options: MarkdownOptions::default(),
            link_hook: None,
            attribute_hook: None,
        }
    }

    /// Set the Markdown extensions used by [`render_markdown`](Self::render_markdown).
    #[must_use]
    pub fn with_options(mut self, options: MarkdownOptions) -> Self {
        self.options = options;
        self
    }

    /// Rewrite link destinations through `hook`.
    #[must_use]
    pub fn with_link_hook(mut self, hook: Arc<dyn LinkRewriteHook>) -> Self {
        self.link_hook = Some(hook);
        self
    }

    /// Resolve element attributes through `hook`.
    #[must_use]
    pub fn with_attribute_hook(mut self, hook: Arc<dyn AttributeOverrideHook>) -> Self {
        self.attribute_hook = Some(hook);
        self
    }

    /// Parse `markdown` with the configured options and render it.
    pub fn render_markdown(&mut self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options.parser);
        self.render(parser)
    }

    /// Render markdown events and return the HTML.
    pub fn render<'a, I>(&mut self, events: I) -> String
    where
        I: Iterator<Item = Event<'a>>,
    {
        self.reset();
        for event in events {
            self.process_event(event);
        }
        std::mem::take(&mut self.output)
    }

    fn reset(&mut self) {
        self.output.clear();
        self.list_stack.clear();
        self.code = CodeBlockState::default();
        self.table = TableState::default();
        self.image = ImageState::default();
        self.heading = HeadingState::default();
        self.pending_image = None;
        self.footnotes.clear();
    }

    /// Attributes to emit for a node, after the override hook.
    fn resolve(&self, kind: NodeKind, defaults: Attributes) -> Attributes {
        match &self.attribute_hook {
            Some(hook) => hook.attributes(kind, defaults),
            None => defaults,
        }
    }

    /// Build an open tag such as `<p class="x">`.
    fn open_tag(&self, tag: &str, kind: NodeKind, defaults: Attributes) -> String {
        self.open_tag_with(tag, "", kind, defaults)
    }

    /// Build an open tag with structural attributes written before the hooked ones.
    fn open_tag_with(
        &self,
        tag: &str,
        structural: &str,
        kind: NodeKind,
        defaults: Attributes,
    ) -> String {
        let mut html = String::with_capacity(tag.len() + structural.len() + 2);
        html.push('<');
        html.push_str(tag);
        html.push_str(structural);
        self.resolve(kind, defaults).write_to(&mut html);
        html.push('>');
        html
    }

    fn push_block_open(&mut self, tag: &str, kind: NodeKind, defaults: Attributes) {
        let html = self.open_tag(tag, kind, defaults);
        self.output.push_str(&html);
    }

    fn push_inline_open(&mut self, tag: &str, kind: NodeKind) {
        let html = self.open_tag(tag, kind, Attributes::new());
        self.push_inline(&html);
    }

    /// Push content to output or heading buffer based on context.
    ///
    /// Markup nested inside image alt text is dropped.
    fn push_inline(&mut self, content: &str) {
        if self.image.is_active() {
            return;
        }
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) => self.output.push_str(&html),
            Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => {
                let html = self.open_tag("br", NodeKind::HardLineBreak, Attributes::new());
                self.push_inline(&html);
            }
            Event::Rule => {
                self.push_block_open("hr", NodeKind::ThematicBreak, Attributes::new());
            }
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::FootnoteReference(label) => self.footnote_reference(&label),
            Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Math extension is never enabled
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.push_block_open("p", NodeKind::Paragraph, Attributes::new());
            }
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                // Opening tag is written in end_tag once the text is known.
                let mut explicit = Attributes::new();
                if let Some(id) = id {
                    explicit.set("id", id.as_ref());
                }
                for class in classes {
                    explicit.add_value("class", class.as_ref());
                }
                for (name, value) in attrs {
                    explicit.add_value(name.as_ref(), value.as_deref().unwrap_or_default());
                }
                self.heading.start(heading_level_to_num(level), explicit);
            }
            Tag::BlockQuote(kind) => {
                let defaults = match kind {
                    Some(kind) => {
                        Attributes::new().with("class", format!("markdown-alert {}", alert_class(kind)))
                    }
                    None => Attributes::new(),
                };
                self.push_block_open("blockquote", NodeKind::BlockQuote, defaults);
            }
            Tag::CodeBlock(kind) => match kind {
                CodeBlockKind::Fenced(info) => {
                    self.code.start(NodeKind::FencedCodeBlock, fence_language(&info));
                }
                CodeBlockKind::Indented => self.code.start(NodeKind::IndentedCodeBlock, None),
            },
            Tag::List(start) => {
                self.list_stack.push(start.is_some());
                match start {
                    Some(n) => {
                        let defaults = if n == 1 {
                            Attributes::new()
                        } else {
                            Attributes::new().with("start", n.to_string())
                        };
                        self.push_block_open("ol", NodeKind::OrderedList, defaults);
                    }
                    None => self.push_block_open("ul", NodeKind::BulletList, Attributes::new()),
                }
            }
            Tag::Item => {
                let kind = if self.list_stack.last().copied().unwrap_or(false) {
                    NodeKind::OrderedListItem
                } else {
                    NodeKind::BulletListItem
                };
                self.push_block_open("li", kind, Attributes::new());
            }
            Tag::FootnoteDefinition(label) => {
                let number = self.footnote_number(&label);
                let defaults = Attributes::new()
                    .with("class", "footnote-definition")
                    .with("id", label.as_ref());
                self.push_block_open("div", NodeKind::FootnoteDefinition, defaults);
                self.output.push_str(&format!(
                    r#"<sup class="footnote-definition-label">{number}</sup>"#
                ));
            }
            Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => {
                self.push_block_open("dl", NodeKind::DefinitionList, Attributes::new());
            }
            Tag::DefinitionListTitle => {
                self.push_block_open("dt", NodeKind::DefinitionTerm, Attributes::new());
            }
            Tag::DefinitionListDefinition => {
                self.push_block_open("dd", NodeKind::DefinitionItem, Attributes::new());
            }
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.push_block_open("table", NodeKind::TableBlock, Attributes::new());
            }
            Tag::TableHead => {
                self.table.start_head();
                self.push_block_open("thead", NodeKind::TableHead, Attributes::new());
                self.push_block_open("tr", NodeKind::TableRow, Attributes::new());
            }
            Tag::TableRow => {
                self.table.start_row();
                self.push_block_open("tr", NodeKind::TableRow, Attributes::new());
            }
            Tag::TableCell => {
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                let defaults = self.table.current_cell_attributes();
                self.push_block_open(tag, NodeKind::TableCell, defaults);
            }
            Tag::Emphasis => self.push_inline_open("em", NodeKind::Emphasis),
            Tag::Strong => self.push_inline_open("strong", NodeKind::StrongEmphasis),
            Tag::Strikethrough => self.push_inline_open("s", NodeKind::Strikethrough),
            Tag::Superscript => self.push_inline_open("sup", NodeKind::Superscript),
            Tag::Subscript => self.push_inline_open("sub", NodeKind::Subscript),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let href = if link_type == LinkType::Email {
                    format!("mailto:{dest_url}")
                } else if let Some(hook) = &self.link_hook {
                    hook.rewrite(&dest_url).into_owned()
                } else {
                    dest_url.to_string()
                };
                let defaults = if title.is_empty() {
                    Attributes::new()
                } else {
                    Attributes::new().with("title", title.as_ref())
                };
                let structural = format!(r#" href="{}""#, escape_html(&href));
                let html = self.open_tag_with("a", &structural, NodeKind::Link, defaults);
                self.push_inline(&html);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text is collected until the matching end tag.
                if !self.image.is_active() {
                    self.pending_image = Some((dest_url.to_string(), title.to_string()));
                }
                self.image.start();
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some(heading) = self.heading.complete(self.options.anchor_links) {
                    let level = heading.level;
                    let tag = format!("h{level}");
                    let open = self.open_tag(&tag, NodeKind::Heading, heading.attributes);
                    self.output.push_str(&open);
                    self.output.push_str(&heading.html);
                    self.output.push_str(&format!("</h{level}>"));
                }
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                let (kind, lang, content) = self.code.end();
                let open = self.open_tag("pre", kind, Attributes::new());
                self.output.push_str(&open);
                match lang {
                    Some(lang) => self.output.push_str(&format!(
                        r#"<code class="language-{}">"#,
                        escape_html(&lang)
                    )),
                    None => self.output.push_str("<code>"),
                }
                self.output.push_str(&escape_html(&content));
                self.output.push_str("</code></pre>");
            }
            TagEnd::List(ordered) => {
                self.list_stack.pop();
                self.output.push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition => self.output.push_str("</div>"),
            TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead>");
                self.table.end_head();
                self.push_block_open("tbody", NodeKind::TableBody, Attributes::new());
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => {
                let Some(alt) = self.image.end() else {
                    return;
                };
                if let Some((src, title)) = self.pending_image.take() {
                    let defaults = if title.is_empty() {
                        Attributes::new()
                    } else {
                        Attributes::new().with("title", title)
                    };
                    let structural = format!(
                        r#" src="{}" alt="{}""#,
                        escape_html(&src),
                        escape_html(&alt)
                    );
                    let html = self.open_tag_with("img", &structural, NodeKind::Image, defaults);
                    self.push_inline(&html);
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        // Priority: code > image > heading > normal text
        if self.code.is_active() {
            self.code.push_str(text);
            return;
        }

        if self.image.is_active() {
            self.image.push_str(text);
            return;
        }

        if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
            return;
        }

        self.output.push_str(&escape_html(text));
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        let mut html = self.open_tag("code", NodeKind::Code, Attributes::new());
        html.push_str(&escape_html(code));
        html.push_str("</code>");
        self.push_inline(&html);
    }

    fn soft_break(&mut self) {
        if self.code.is_active() {
            self.code.push_newline();
        } else if self.image.is_active() {
            self.image.push_str(" ");
        } else if self.heading.is_active() {
            self.heading.push_text(" ");
            self.heading.push_html("\n");
        } else {
            self.output.push('\n');
        }
    }

    fn task_list_marker(&mut self, checked: bool) {
        let mut defaults = Attributes::new().with("type", "checkbox");
        if checked {
            defaults.add_value("checked", "");
        }
        defaults.add_value("disabled", "");
        let html = self.open_tag("input", NodeKind::TaskListItemMarker, defaults);
        self.output.push_str(&html);
    }

    fn footnote_reference(&mut self, label: &str) {
        let number = self.footnote_number(label);
        let defaults = Attributes::new().with("class", "footnote-reference");
        let mut html = self.open_tag("sup", NodeKind::FootnoteReference, defaults);
        html.push_str(&format!(
            r##"<a href="#{}">{number}</a></sup>"##,
            escape_html(label)
        ));
        self.push_inline(&html);
    }

    /// Display number of a footnote, assigned on first appearance.
    fn footnote_number(&mut self, label: &str) -> usize {
        let next = self.footnotes.len() + 1;
        *self.footnotes.entry(label.to_owned()).or_insert(next)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn alert_class(kind: BlockQuoteKind) -> &'static str {
    match kind {
        BlockQuoteKind::Note => "markdown-alert-note",
        BlockQuoteKind::Tip => "markdown-alert-tip",
        BlockQuoteKind::Important => "markdown-alert-important",
        BlockQuoteKind::Warning => "markdown-alert-warning",
        BlockQuoteKind::Caution => "markdown-alert-caution",
    }
}
