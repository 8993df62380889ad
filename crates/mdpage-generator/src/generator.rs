//! Page generation pipeline.
//!
//! [`SiteGenerator`] validates and precompiles a [`GeneratorConfig`], then
//! [`generate`](SiteGenerator::generate) runs the stages:
//!
//! 1. discover source documents
//! 2. render each document and wrap it in the header/footer templates
//! 3. copy asset directories

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mdpage_config::Config;
use mdpage_renderer::{
    AttributeInjector, AttributeOverrideHook, AttributeOverrideMap, LinkRewriteHook, LinkRewriter,
    MarkdownOptions, MarkdownRenderer,
};
use rayon::prelude::*;

use crate::copy::GlobDirectoryCopier;
use crate::discover::{DiscoverySettings, DocumentRecord, discover};
use crate::encoding::TextEncoding;
use crate::error::GenerateError;
use crate::path::PathMapper;
use crate::substitute::VariableSubstitutor;
use crate::template::TemplateComposer;

/// Settings for one generation run.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Source extensions without dots, in match order.
    pub input_extensions: Vec<String>,
    /// Output extension without a dot.
    pub output_extension: String,
    /// Mirror the input tree instead of writing every page to the output root.
    pub recursive: bool,
    pub header_file: Option<PathBuf>,
    pub footer_file: Option<PathBuf>,
    pub fail_if_files_are_missing: bool,
    /// Enable `{key=value}` declarations and `${key}` substitution.
    pub apply_filtering: bool,
    pub default_title: Option<String>,
    pub always_use_default_title: bool,
    pub transform_relative_links: bool,
    /// Markdown extension names, such as `TABLES`.
    pub markdown_extensions: Vec<String>,
    /// Attribute override entries, `NodeKind|name=value|...`.
    pub attributes: Vec<String>,
    /// Comma-separated directory glob patterns.
    pub copy_directories: Option<String>,
    pub input_encoding: String,
    pub output_encoding: String,
    /// Render documents on the rayon thread pool.
    pub parallel: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("markdown"),
            output_dir: PathBuf::from("html"),
            input_extensions: vec!["md".to_owned()],
            output_extension: "html".to_owned(),
            recursive: false,
            header_file: None,
            footer_file: None,
            fail_if_files_are_missing: true,
            apply_filtering: false,
            default_title: None,
            always_use_default_title: false,
            transform_relative_links: false,
            markdown_extensions: vec!["TABLES".to_owned()],
            attributes: Vec::new(),
            copy_directories: None,
            input_encoding: TextEncoding::Utf8.name().to_owned(),
            output_encoding: TextEncoding::Utf8.name().to_owned(),
            parallel: false,
        }
    }
}

impl GeneratorConfig {
    /// Convert a loaded and validated configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            input_dir: config.input.dir.clone(),
            output_dir: config.output.dir.clone(),
            input_extensions: config.input.extension_list(),
            output_extension: config.output.extension.clone(),
            recursive: config.input.recursive,
            header_file: config.template.header_file.clone(),
            footer_file: config.template.footer_file.clone(),
            fail_if_files_are_missing: config.template.fail_if_files_are_missing,
            apply_filtering: config.processing.apply_filtering,
            default_title: config.title.default.clone(),
            always_use_default_title: config.title.always_use_default,
            transform_relative_links: config.processing.transform_relative_links,
            markdown_extensions: config.processing.extensions.clone(),
            attributes: config.processing.attributes.clone(),
            copy_directories: config.processing.copy_directories.clone(),
            input_encoding: config.input.encoding.clone(),
            output_encoding: config.output.encoding.clone(),
            parallel: config.processing.parallel,
        }
    }
}

/// Outcome of a generation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Written pages, in source order.
    pub documents: Vec<PathBuf>,
    /// Number of asset files copied.
    pub copied_files: usize,
}

/// Generates HTML pages from a tree of Markdown documents.
pub struct SiteGenerator {
    mapper: PathMapper,
    discovery: DiscoverySettings,
    options: MarkdownOptions,
    link_hook: Option<Arc<dyn LinkRewriteHook>>,
    attribute_hook: Option<Arc<dyn AttributeOverrideHook>>,
    copier: Option<GlobDirectoryCopier>,
    header_file: Option<PathBuf>,
    footer_file: Option<PathBuf>,
    fail_if_files_are_missing: bool,
    output_encoding: TextEncoding,
    parallel: bool,
}

impl SiteGenerator {
    /// Validate and precompile a configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a malformed attribute override, an
    /// unknown Markdown extension, an invalid copy pattern or an unsupported
    /// encoding. No file is read or written.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerateError> {
        let input_encoding: TextEncoding = config.input_encoding.parse()?;
        let output_encoding: TextEncoding = config.output_encoding.parse()?;
        let options = MarkdownOptions::from_names(&config.markdown_extensions)?;

        let overrides = AttributeOverrideMap::parse(&config.attributes)?;
        let attribute_hook: Option<Arc<dyn AttributeOverrideHook>> = if overrides.is_empty() {
            None
        } else {
            Some(Arc::new(AttributeInjector::new(Arc::new(overrides))))
        };

        let link_hook: Option<Arc<dyn LinkRewriteHook>> = if config.transform_relative_links {
            Some(Arc::new(LinkRewriter::with_extensions(
                config.input_extensions.iter().cloned(),
                config.output_extension.clone(),
            )))
        } else {
            None
        };

        let copier = config
            .copy_directories
            .as_deref()
            .map(|patterns| GlobDirectoryCopier::new(&config.input_dir, &config.output_dir, patterns))
            .transpose()?
            .filter(|copier| !copier.is_empty());

        let mapper = PathMapper::new(
            config.input_dir,
            config.output_dir,
            config.output_extension,
            config.recursive,
        );
        let discovery = DiscoverySettings {
            extensions: config.input_extensions,
            default_title: config.default_title,
            always_use_default_title: config.always_use_default_title,
            encoding: input_encoding,
            substitutor: VariableSubstitutor::new(config.apply_filtering),
        };

        Ok(Self {
            mapper,
            discovery,
            options,
            link_hook,
            attribute_hook,
            copier,
            header_file: config.header_file,
            footer_file: config.footer_file,
            fail_if_files_are_missing: config.fail_if_files_are_missing,
            output_encoding,
            parallel: config.parallel,
        })
    }

    /// Run the full pipeline.
    ///
    /// A missing input directory is not an error: nothing is generated and
    /// nothing is copied.
    ///
    /// # Errors
    ///
    /// Stops at the first failing document or copy. Pages written before
    /// the failure stay on disk.
    pub fn generate(&self) -> Result<GenerateReport, GenerateError> {
        let input_root = self.mapper.input_root();
        if !input_root.is_dir() {
            tracing::info!(path = %input_root.display(), "Input directory does not exist, nothing to generate");
            return Ok(GenerateReport::default());
        }

        tracing::info!(
            input = %input_root.display(),
            output = %self.mapper.output_root().display(),
            recursive = self.mapper.is_recursive(),
            "Generating pages"
        );

        let records = last_write_wins(discover(&self.mapper, &self.discovery)?);
        tracing::info!(count = records.len(), "Discovered documents");

        let documents = if records.is_empty() {
            Vec::new()
        } else {
            let composer = TemplateComposer::load(
                self.header_file.as_deref(),
                self.footer_file.as_deref(),
                self.fail_if_files_are_missing,
                self.discovery.encoding,
                self.discovery.substitutor,
            )?;
            self.render_all(&records, &composer)?
        };

        let copied_files = match &self.copier {
            Some(copier) => copier.copy()?,
            None => 0,
        };

        tracing::info!(
            documents = documents.len(),
            copied_files,
            "Generation complete"
        );
        Ok(GenerateReport {
            documents,
            copied_files,
        })
    }

    fn render_all(
        &self,
        records: &[DocumentRecord],
        composer: &TemplateComposer,
    ) -> Result<Vec<PathBuf>, GenerateError> {
        if self.parallel {
            records
                .par_iter()
                .map(|record| self.render_document(record, composer))
                .collect()
        } else {
            records
                .iter()
                .map(|record| self.render_document(record, composer))
                .collect()
        }
    }

    fn render_document(
        &self,
        record: &DocumentRecord,
        composer: &TemplateComposer,
    ) -> Result<PathBuf, GenerateError> {
        let text = self.discovery.encoding.read_file(&record.source_path)?;
        let markdown = self.discovery.substitutor.apply(&text, &record.substitutions);

        let body = self.renderer().render_markdown(&markdown);
        let page = composer.compose(
            &body,
            record.title.as_deref(),
            record.folder_depth,
            &record.substitutions,
        );

        write_page(&record.output_path, &self.output_encoding.encode(&page))?;
        tracing::debug!(
            source = %record.source_path.display(),
            output = %record.output_path.display(),
            "Generated page"
        );
        Ok(record.output_path.clone())
    }

    fn renderer(&self) -> MarkdownRenderer {
        let mut renderer = MarkdownRenderer::new().with_options(self.options);
        if let Some(hook) = &self.link_hook {
            renderer = renderer.with_link_hook(Arc::clone(hook));
        }
        if let Some(hook) = &self.attribute_hook {
            renderer = renderer.with_attribute_hook(Arc::clone(hook));
        }
        renderer
    }
}

/// Drop records whose output path is claimed again by a later record.
///
/// Only flat runs can produce such collisions.
fn last_write_wins(records: Vec<DocumentRecord>) -> Vec<DocumentRecord> {
    let mut last: HashMap<&Path, usize> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        if let Some(previous) = last.insert(&record.output_path, index) {
            tracing::warn!(
                output = %record.output_path.display(),
                replaced = %records[previous].source_path.display(),
                by = %record.source_path.display(),
                "Several documents map to the same output file, the last one wins"
            );
        }
    }
    let keep: Vec<usize> = {
        let mut keep: Vec<usize> = last.into_values().collect();
        keep.sort_unstable();
        keep
    };

    let mut records: Vec<Option<DocumentRecord>> = records.into_iter().map(Some).collect();
    keep.into_iter()
        .filter_map(|index| records[index].take())
        .collect()
}

fn write_page(path: &Path, bytes: &[u8]) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| GenerateError::write(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| GenerateError::write(path, e))
}
