//! Relative link rewriting from source documents to generated pages.

use std::borrow::Cow;

use crate::hooks::LinkRewriteHook;

/// Rewrites links to source documents so they target the generated pages.
///
/// - `guide.md` → `guide.html`
/// - `../guide.markdown#setup` → `../guide.html#setup`
/// - `https://example.com/guide.md` → unchanged
///
/// Input extensions are tried in configured order; the first one that matches
/// wins.
#[derive(Clone, Debug)]
pub struct LinkRewriter {
    input_extensions: Vec<String>,
    output_extension: String,
}

impl LinkRewriter {
    /// Create a rewriter from a comma-separated extension list.
    ///
    /// Items are trimmed and empty items are dropped, so `"md, markdown"`
    /// yields `["md", "markdown"]`.
    #[must_use]
    pub fn new(input_extensions: &str, output_extension: impl Into<String>) -> Self {
        Self::with_extensions(split_extensions(input_extensions), output_extension)
    }

    /// Create a rewriter from an already split extension list.
    #[must_use]
    pub fn with_extensions<I, S>(input_extensions: I, output_extension: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input_extensions: input_extensions.into_iter().map(Into::into).collect(),
            output_extension: output_extension.into(),
        }
    }

    /// Configured input extensions, in match order.
    #[must_use]
    pub fn input_extensions(&self) -> &[String] {
        &self.input_extensions
    }

    /// Rewrite a single URL.
    #[must_use]
    pub fn rewrite_url<'a>(&self, url: &'a str) -> Cow<'a, str> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Cow::Borrowed(url);
        }

        let output_suffix = format!(".{}", self.output_extension);
        for ext in &self.input_extensions {
            let suffix = format!(".{ext}");
            if let Some(stem) = url.strip_suffix(&suffix) {
                return Cow::Owned(format!("{stem}{output_suffix}"));
            }
            let anchored = format!("{suffix}#");
            if url.contains(&anchored) {
                return Cow::Owned(url.replace(&anchored, &format!("{output_suffix}#")));
            }
        }

        Cow::Borrowed(url)
    }
}

impl LinkRewriteHook for LinkRewriter {
    fn rewrite<'a>(&self, url: &'a str) -> Cow<'a, str> {
        self.rewrite_url(url)
    }
}

/// Split a comma-separated extension list, trimming items and dropping empties.
#[must_use]
pub(crate) fn split_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|ext| !ext.is_empty())
        .map(str::to_owned)
        .collect()
}
