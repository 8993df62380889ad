//! Rendering hooks and the attribute model they operate on.
//!
//! The renderer calls [`LinkRewriteHook`] once per link destination and
//! [`AttributeOverrideHook`] once per emitted element. Both are shared by all
//! documents of a run, so implementations must be `Send + Sync`.

use std::borrow::Cow;
use std::fmt;

use crate::state::escape_html;

/// Kind of document node an HTML element is emitted for.
///
/// The names returned by [`NodeKind::name`] are the keys used in attribute
/// override entries (`TableBlock|class=table`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Paragraph,
    Heading,
    BlockQuote,
    FencedCodeBlock,
    IndentedCodeBlock,
    BulletList,
    OrderedList,
    BulletListItem,
    OrderedListItem,
    TableBlock,
    TableHead,
    TableBody,
    TableRow,
    TableCell,
    Emphasis,
    StrongEmphasis,
    Strikethrough,
    Superscript,
    Subscript,
    Link,
    Image,
    Code,
    ThematicBreak,
    HardLineBreak,
    DefinitionList,
    DefinitionTerm,
    DefinitionItem,
    FootnoteReference,
    FootnoteDefinition,
    TaskListItemMarker,
}

impl NodeKind {
    /// Every node kind the renderer emits.
    pub const ALL: [NodeKind; 30] = [
        Self::Paragraph,
        Self::Heading,
        Self::BlockQuote,
        Self::FencedCodeBlock,
        Self::IndentedCodeBlock,
        Self::BulletList,
        Self::OrderedList,
        Self::BulletListItem,
        Self::OrderedListItem,
        Self::TableBlock,
        Self::TableHead,
        Self::TableBody,
        Self::TableRow,
        Self::TableCell,
        Self::Emphasis,
        Self::StrongEmphasis,
        Self::Strikethrough,
        Self::Superscript,
        Self::Subscript,
        Self::Link,
        Self::Image,
        Self::Code,
        Self::ThematicBreak,
        Self::HardLineBreak,
        Self::DefinitionList,
        Self::DefinitionTerm,
        Self::DefinitionItem,
        Self::FootnoteReference,
        Self::FootnoteDefinition,
        Self::TaskListItemMarker,
    ];

    /// Configuration name of this node kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Paragraph => "Paragraph",
            Self::Heading => "Heading",
            Self::BlockQuote => "BlockQuote",
            Self::FencedCodeBlock => "FencedCodeBlock",
            Self::IndentedCodeBlock => "IndentedCodeBlock",
            Self::BulletList => "BulletList",
            Self::OrderedList => "OrderedList",
            Self::BulletListItem => "BulletListItem",
            Self::OrderedListItem => "OrderedListItem",
            Self::TableBlock => "TableBlock",
            Self::TableHead => "TableHead",
            Self::TableBody => "TableBody",
            Self::TableRow => "TableRow",
            Self::TableCell => "TableCell",
            Self::Emphasis => "Emphasis",
            Self::StrongEmphasis => "StrongEmphasis",
            Self::Strikethrough => "Strikethrough",
            Self::Superscript => "Superscript",
            Self::Subscript => "Subscript",
            Self::Link => "Link",
            Self::Image => "Image",
            Self::Code => "Code",
            Self::ThematicBreak => "ThematicBreak",
            Self::HardLineBreak => "HardLineBreak",
            Self::DefinitionList => "DefinitionList",
            Self::DefinitionTerm => "DefinitionTerm",
            Self::DefinitionItem => "DefinitionItem",
            Self::FootnoteReference => "FootnoteReference",
            Self::FootnoteDefinition => "FootnoteDefinition",
            Self::TaskListItemMarker => "TaskListItemMarker",
        }
    }

    /// Look up a node kind by its configuration name (exact match).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attributes whose presence alone carries the meaning.
const BOOLEAN_ATTRIBUTES: &[&str] = &["checked", "disabled"];

/// Ordered, multi-valued HTML attribute set.
///
/// Adding a value for a name that is already present merges the values:
/// `style` declarations are joined with `;`, everything else with a space.
/// Repeated `class` names are kept once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Create an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_value`](Self::add_value).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_value(name, value);
        self
    }

    /// Add a value, merging with an existing attribute of the same name.
    pub fn add_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        let Some((_, existing)) = self.entries.iter_mut().find(|(n, _)| *n == name) else {
            self.entries.push((name, value));
            return;
        };

        if value.is_empty() {
            return;
        }
        if existing.is_empty() {
            *existing = value;
            return;
        }
        match name.as_str() {
            "style" => {
                if !existing.ends_with(';') {
                    existing.push(';');
                }
                existing.push_str(&value);
            }
            "class" => {
                for class in value.split_whitespace() {
                    if !existing.split_whitespace().any(|c| c == class) {
                        existing.push(' ');
                        existing.push_str(class);
                    }
                }
            }
            _ => {
                existing.push(' ');
                existing.push_str(&value);
            }
        }
    }

    /// Set an attribute, replacing any existing value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Value of an attribute, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Number of distinct attribute names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Write the attributes as ` name="value"` pairs.
    ///
    /// Boolean attributes with an empty value are written bare (` disabled`).
    pub fn write_to(&self, out: &mut String) {
        for (name, value) in &self.entries {
            out.push(' ');
            out.push_str(name);
            if value.is_empty() && BOOLEAN_ATTRIBUTES.contains(&name.as_str()) {
                continue;
            }
            out.push_str("=\"");
            out.push_str(&escape_html(value));
            out.push('"');
        }
    }
}

/// Hook invoked for every link destination before it is emitted.
pub trait LinkRewriteHook: Send + Sync {
    /// Return the URL to emit for `url`.
    fn rewrite<'a>(&self, url: &'a str) -> Cow<'a, str>;
}

/// Hook invoked for every emitted element.
pub trait AttributeOverrideHook: Send + Sync {
    /// Return the attributes to emit for a node of `kind`.
    ///
    /// `defaults` holds what the renderer would emit without the hook.
    fn attributes(&self, kind: NodeKind, defaults: Attributes) -> Attributes;
}
