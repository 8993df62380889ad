//! Markdown extension selection.
//!
//! Extensions are configured by name. Each name maps to parser options and
//! renderer flags through [`Extension::from_name`].

use std::str::FromStr;

use pulldown_cmark::Options;

/// Error raised for an unrecognized extension name.
#[derive(Debug, thiserror::Error)]
#[error("unknown markdown extension `{0}`")]
pub struct OptionsError(pub String);

/// A named Markdown extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extension {
    /// Plain CommonMark.
    None,
    Tables,
    Strikethrough,
    TaskListItems,
    Footnotes,
    /// Smart quotes, dashes and ellipses.
    Smarts,
    Definitions,
    WikiLinks,
    Superscript,
    Subscript,
    /// `# Title {#id .class}` heading attributes.
    HeadingAttributes,
    /// GitHub blockquote alerts (`> [!NOTE]`).
    Gfm,
    /// Generated `id` attributes on headings.
    AnchorLinks,
    /// Every extension above.
    All,
}

impl Extension {
    /// Look up an extension by name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = match name.trim().to_ascii_uppercase().as_str() {
            "NONE" => Self::None,
            "TABLES" => Self::Tables,
            "STRIKETHROUGH" => Self::Strikethrough,
            "TASKLISTITEMS" => Self::TaskListItems,
            "FOOTNOTES" => Self::Footnotes,
            "SMARTS" => Self::Smarts,
            "DEFINITIONS" => Self::Definitions,
            "WIKILINKS" => Self::WikiLinks,
            "SUPERSCRIPT" => Self::Superscript,
            "SUBSCRIPT" => Self::Subscript,
            "HEADING_ATTRIBUTES" => Self::HeadingAttributes,
            "GFM" => Self::Gfm,
            "ANCHORLINKS" => Self::AnchorLinks,
            "ALL" => Self::All,
            _ => return None,
        };
        Some(ext)
    }

    /// Parser options enabled by this extension.
    #[must_use]
    pub fn parser_options(self) -> Options {
        match self {
            Self::None | Self::AnchorLinks => Options::empty(),
            Self::Tables => Options::ENABLE_TABLES,
            Self::Strikethrough => Options::ENABLE_STRIKETHROUGH,
            Self::TaskListItems => Options::ENABLE_TASKLISTS,
            Self::Footnotes => Options::ENABLE_FOOTNOTES,
            Self::Smarts => Options::ENABLE_SMART_PUNCTUATION,
            Self::Definitions => Options::ENABLE_DEFINITION_LIST,
            Self::WikiLinks => Options::ENABLE_WIKILINKS,
            Self::Superscript => Options::ENABLE_SUPERSCRIPT,
            Self::Subscript => Options::ENABLE_SUBSCRIPT,
            Self::HeadingAttributes => Options::ENABLE_HEADING_ATTRIBUTES,
            Self::Gfm => Options::ENABLE_GFM,
            Self::All => {
                Options::ENABLE_TABLES
                    | Options::ENABLE_STRIKETHROUGH
                    | Options::ENABLE_TASKLISTS
                    | Options::ENABLE_FOOTNOTES
                    | Options::ENABLE_SMART_PUNCTUATION
                    | Options::ENABLE_DEFINITION_LIST
                    | Options::ENABLE_WIKILINKS
                    | Options::ENABLE_SUPERSCRIPT
                    | Options::ENABLE_SUBSCRIPT
                    | Options::ENABLE_HEADING_ATTRIBUTES
                    | Options::ENABLE_GFM
            }
        }
    }

    /// Whether this extension turns on generated heading ids.
    #[must_use]
    pub fn anchor_links(self) -> bool {
        matches!(self, Self::AnchorLinks | Self::All)
    }
}

impl FromStr for Extension {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| OptionsError(s.trim().to_owned()))
    }
}

/// Parser options plus renderer flags for one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Options passed to the `pulldown-cmark` parser.
    pub parser: Options,
    /// Emit slugified `id` attributes on headings.
    pub anchor_links: bool,
}

impl Default for MarkdownOptions {
    /// Tables only.
    fn default() -> Self {
        Self::empty().with_extension(Extension::Tables)
    }
}

impl MarkdownOptions {
    /// Plain CommonMark with no extensions.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            parser: Options::empty(),
            anchor_links: false,
        }
    }

    /// Build options from extension names. Empty names are skipped.
    pub fn from_names<I, S>(names: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::empty();
        for name in names {
            let name = name.as_ref();
            if name.trim().is_empty() {
                continue;
            }
            let ext: Extension = name.parse()?;
            tracing::debug!(extension = ?ext, "Markdown extension");
            options = options.with_extension(ext);
        }
        Ok(options)
    }

    /// Enable an extension.
    #[must_use]
    pub fn with_extension(mut self, ext: Extension) -> Self {
        self.parser |= ext.parser_options();
        self.anchor_links |= ext.anchor_links();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_tables() {
        let options = MarkdownOptions::default();
        assert_eq!(options.parser, Options::ENABLE_TABLES);
        assert!(!options.anchor_links);
    }

    #[test]
    fn test_from_names_combines() {
        let options = MarkdownOptions::from_names(["TABLES", " strikethrough ", "ANCHORLINKS"])
            .unwrap();
        assert!(options.parser.contains(Options::ENABLE_TABLES));
        assert!(options.parser.contains(Options::ENABLE_STRIKETHROUGH));
        assert!(!options.parser.contains(Options::ENABLE_FOOTNOTES));
        assert!(options.anchor_links);
    }

    #[test]
    fn test_from_names_none_is_plain() {
        let options = MarkdownOptions::from_names(["NONE"]).unwrap();
        assert_eq!(options, MarkdownOptions::empty());
    }

    #[test]
    fn test_from_names_skips_empty() {
        let options = MarkdownOptions::from_names(["", "  "]).unwrap();
        assert_eq!(options, MarkdownOptions::empty());
    }

    #[test]
    fn test_from_names_unknown_is_error() {
        let err = MarkdownOptions::from_names(["TABLES", "HARDWRAPS"]).unwrap_err();
        assert_eq!(err.0, "HARDWRAPS");
        assert_eq!(err.to_string(), "unknown markdown extension `HARDWRAPS`");
    }

    #[test]
    fn test_all_enables_everything() {
        let options = MarkdownOptions::from_names(["ALL"]).unwrap();
        assert!(options.anchor_links);
        for ext in [
            Extension::Tables,
            Extension::Footnotes,
            Extension::WikiLinks,
            Extension::Gfm,
            Extension::HeadingAttributes,
        ] {
            assert!(options.parser.contains(ext.parser_options()));
        }
    }
}
