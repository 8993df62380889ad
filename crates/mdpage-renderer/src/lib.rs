//! Markdown to HTML renderer with pluggable rendering hooks.
//!
//! This crate provides [`MarkdownRenderer`], which consumes `pulldown-cmark`
//! events and writes HTML5. Two narrow hooks customize the output:
//!
//! - [`LinkRewriteHook`]: retargets link destinations before they are emitted.
//!   [`LinkRewriter`] rewrites links to other source documents so they point at
//!   the generated pages (`guide.md` → `guide.html`).
//! - [`AttributeOverrideHook`]: replaces the attributes emitted for a node kind.
//!   [`AttributeInjector`] serves overrides from an [`AttributeOverrideMap`]
//!   parsed from `NodeKind|name=value|...` entries.
//!
//! Markdown extensions are selected by name through [`MarkdownOptions`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mdpage_renderer::{
//!     AttributeInjector, AttributeOverrideMap, LinkRewriter, MarkdownOptions, MarkdownRenderer,
//! };
//!
//! let overrides = AttributeOverrideMap::parse(["Heading|class=hero"]).unwrap();
//! let html = MarkdownRenderer::new()
//!     .with_options(MarkdownOptions::from_names(["TABLES"]).unwrap())
//!     .with_link_hook(Arc::new(LinkRewriter::new("md", "html")))
//!     .with_attribute_hook(Arc::new(AttributeInjector::new(Arc::new(overrides))))
//!     .render_markdown("# Intro\n\nSee [guide](guide.md).");
//!
//! assert_eq!(
//!     html,
//!     r#"<h1 class="hero">Intro</h1><p>See <a href="guide.html">guide</a>.</p>"#
//! );
//! ```

mod attributes;
mod hooks;
mod link;
mod options;
mod renderer;
mod state;
mod util;

pub use attributes::{AttributeInjector, AttributeOverrideMap, OverrideParseError};
pub use hooks::{AttributeOverrideHook, Attributes, LinkRewriteHook, NodeKind};
pub use link::LinkRewriter;
pub use options::{Extension, MarkdownOptions, OptionsError};
pub use renderer::MarkdownRenderer;
pub use state::{escape_html, slugify};
