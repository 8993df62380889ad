//! Batch Markdown to HTML page generation.
//!
//! This crate turns a directory of Markdown documents into a directory of
//! HTML pages:
//!
//! - [`discover`] finds the source documents and builds a [`DocumentRecord`]
//!   for each one (output path, title, folder depth, variables).
//! - Each document body is rendered with `mdpage-renderer` and wrapped by a
//!   [`TemplateComposer`] in the shared header and footer.
//! - [`GlobDirectoryCopier`] copies asset directories selected by glob
//!   patterns.
//!
//! [`SiteGenerator`] runs the whole pipeline from a [`GeneratorConfig`].
//!
//! # Example
//!
//! ```no_run
//! use mdpage_generator::{GeneratorConfig, SiteGenerator};
//!
//! let config = GeneratorConfig {
//!     input_dir: "docs".into(),
//!     output_dir: "site".into(),
//!     recursive: true,
//!     header_file: Some("templates/header.html".into()),
//!     footer_file: Some("templates/footer.html".into()),
//!     transform_relative_links: true,
//!     ..GeneratorConfig::default()
//! };
//! let report = SiteGenerator::new(config)?.generate()?;
//! for page in &report.documents {
//!     println!("{}", page.display());
//! }
//! # Ok::<(), mdpage_generator::GenerateError>(())
//! ```

mod copy;
mod discover;
mod encoding;
mod error;
mod generator;
mod path;
mod substitute;
mod template;
mod title;

pub use copy::{GlobCopyAction, GlobDirectoryCopier};
pub use discover::{DiscoverySettings, DocumentRecord, discover};
pub use encoding::TextEncoding;
pub use error::GenerateError;
pub use generator::{GenerateReport, GeneratorConfig, SiteGenerator};
pub use path::{PathMapper, folder_depth, replace_extension, site_base_prefix};
pub use substitute::{
    Substitutions, VariableSubstitutor, extract_declarations, is_declaration_line, strip_declarations,
    substitute,
};
pub use template::{SITE_BASE_TOKEN, TITLE_TOKEN, TemplateComposer};
pub use title::extract_title;
