//! `mdpage generate` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdpage_config::{CliSettings, Config};
use mdpage_generator::{GeneratorConfig, SiteGenerator};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Path to configuration file (default: auto-discover mdpage.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// HTML output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Comma-separated source extensions, e.g. "md,markdown".
    #[arg(long)]
    input_extensions: Option<String>,

    /// Extension of generated pages, without the dot.
    #[arg(long)]
    output_extension: Option<String>,

    /// Process subdirectories and mirror them in the output.
    #[arg(short, long)]
    recursive: bool,

    /// Header template file.
    #[arg(long = "header")]
    header_file: Option<PathBuf>,

    /// Footer template file.
    #[arg(long = "footer")]
    footer_file: Option<PathBuf>,

    /// Use empty templates instead of failing when a template file is missing.
    #[arg(long)]
    allow_missing_templates: bool,

    /// Enable `{key=value}` declarations and `${key}` substitution.
    #[arg(long)]
    filter: bool,

    /// Title for pages without a heading.
    #[arg(long)]
    default_title: Option<String>,

    /// Use the default title for every page.
    #[arg(long)]
    always_use_default_title: bool,

    /// Rewrite links to source documents so they target the generated pages.
    #[arg(long)]
    transform_links: bool,

    /// Comma-separated glob patterns of directories to copy, e.g. "images,**/assets".
    #[arg(long)]
    copy_directories: Option<String>,

    /// Markdown extensions to enable (repeatable or comma-separated).
    #[arg(short, long, value_delimiter = ',')]
    extensions: Vec<String>,

    /// Attribute override, e.g. "TableBlock|class=table" (repeatable).
    #[arg(short, long = "attribute")]
    attributes: Vec<String>,

    /// Encoding of source and template files.
    #[arg(long)]
    input_encoding: Option<String>,

    /// Encoding of generated pages.
    #[arg(long)]
    output_encoding: Option<String>,

    /// Render documents in parallel.
    #[arg(long)]
    parallel: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug output.
    #[arg(long)]
    pub debug: bool,
}

impl GenerateArgs {
    /// Execute the generate command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or generation fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = self.cli_settings();
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::debug!(path = %path.display(), "Loaded configuration");
        }

        output.info(&format!("Input: {}", config.input.dir.display()));
        output.info(&format!("Output: {}", config.output.dir.display()));

        let generator = SiteGenerator::new(GeneratorConfig::from_config(&config))?;
        let report = generator.generate()?;

        if report.documents.is_empty() {
            output.warning("No documents found");
        }
        output.success(&format!(
            "Generated {} page(s), copied {} file(s)",
            report.documents.len(),
            report.copied_files
        ));
        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            input_extensions: self.input_extensions.clone(),
            output_extension: self.output_extension.clone(),
            recursive: self.recursive.then_some(true),
            header_file: self.header_file.clone(),
            footer_file: self.footer_file.clone(),
            fail_if_files_are_missing: self.allow_missing_templates.then_some(false),
            apply_filtering: self.filter.then_some(true),
            default_title: self.default_title.clone(),
            always_use_default_title: self.always_use_default_title.then_some(true),
            transform_relative_links: self.transform_links.then_some(true),
            copy_directories: self.copy_directories.clone(),
            extensions: non_empty(&self.extensions),
            attributes: non_empty(&self.attributes),
            input_encoding: self.input_encoding.clone(),
            output_encoding: self.output_encoding.clone(),
            parallel: self.parallel.then_some(true),
        }
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}
