//! Configuration management for mdpage.
//!
//! Parses `mdpage.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `input.dir`
//! - `output.dir`
//! - `template.header_file`
//! - `template.footer_file`
//! - `title.default`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
/// Relative paths are taken as given (relative to the working directory).
#[derive(Debug, Default)]
pub struct CliSettings {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    /// Comma-separated input extensions.
    pub input_extensions: Option<String>,
    pub output_extension: Option<String>,
    pub recursive: Option<bool>,
    pub header_file: Option<PathBuf>,
    pub footer_file: Option<PathBuf>,
    pub fail_if_files_are_missing: Option<bool>,
    pub apply_filtering: Option<bool>,
    pub default_title: Option<String>,
    pub always_use_default_title: Option<bool>,
    pub transform_relative_links: Option<bool>,
    /// Comma-separated glob patterns.
    pub copy_directories: Option<String>,
    /// Markdown extension names.
    pub extensions: Option<Vec<String>>,
    /// Attribute override entries.
    pub attributes: Option<Vec<String>>,
    pub input_encoding: Option<String>,
    pub output_encoding: Option<String>,
    pub parallel: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdpage.toml";

/// Application configuration.
///
/// `Default` yields unresolved relative paths; [`Config::load`] resolves them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source documents.
    pub input: InputConfig,
    /// Generated pages.
    pub output: OutputConfig,
    /// Header and footer templates.
    pub template: TemplateConfig,
    /// Page title selection.
    pub title: TitleConfig,
    /// Rendering and post-processing switches.
    pub processing: ProcessingConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Input configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Root directory of the Markdown sources.
    pub dir: PathBuf,
    /// Comma-separated list of source extensions, without dots.
    pub extensions: String,
    /// Descend into subdirectories and mirror them in the output.
    pub recursive: bool,
    /// Text encoding of the sources.
    pub encoding: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("markdown"),
            extensions: "md".to_owned(),
            recursive: false,
            encoding: "UTF-8".to_owned(),
        }
    }
}

impl InputConfig {
    /// Input extensions, trimmed, with empty items dropped.
    #[must_use]
    pub fn extension_list(&self) -> Vec<String> {
        self.extensions
            .split(',')
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

/// Output configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory of the generated pages.
    pub dir: PathBuf,
    /// Extension of generated pages, without a dot.
    pub extension: String,
    /// Text encoding of the generated pages.
    pub encoding: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("html"),
            extension: "html".to_owned(),
            encoding: "UTF-8".to_owned(),
        }
    }
}

/// Header/footer template configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub header_file: Option<PathBuf>,
    pub footer_file: Option<PathBuf>,
    /// Abort when a configured template file does not exist.
    pub fail_if_files_are_missing: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            header_file: None,
            footer_file: None,
            fail_if_files_are_missing: true,
        }
    }
}

/// Title configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    /// Title used when a document has no heading.
    pub default: Option<String>,
    /// Use `default` for every document, ignoring headings.
    pub always_use_default: bool,
}

/// Processing configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Enable `{key=value}` declarations and `${key}` substitution.
    pub apply_filtering: bool,
    /// Rewrite links to source documents so they target generated pages.
    pub transform_relative_links: bool,
    /// Markdown extension names.
    pub extensions: Vec<String>,
    /// Attribute overrides (`NodeKind|name=value|...`).
    pub attributes: Vec<String>,
    /// Comma-separated glob patterns of directories to copy.
    pub copy_directories: Option<String>,
    /// Render documents in parallel.
    pub parallel: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            apply_filtering: false,
            transform_relative_links: false,
            extensions: vec!["TABLES".to_owned()],
            attributes: Vec::new(),
            copy_directories: None,
            parallel: false,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`input.dir`").
        field: String,
        /// Error message (e.g., "${`DOCS_ROOT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdpage.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The merged
    /// configuration is validated last.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(dir) = &settings.input_dir {
            self.input.dir.clone_from(dir);
        }
        if let Some(dir) = &settings.output_dir {
            self.output.dir.clone_from(dir);
        }
        if let Some(extensions) = &settings.input_extensions {
            self.input.extensions.clone_from(extensions);
        }
        if let Some(extension) = &settings.output_extension {
            self.output.extension.clone_from(extension);
        }
        if let Some(recursive) = settings.recursive {
            self.input.recursive = recursive;
        }
        if let Some(header) = &settings.header_file {
            self.template.header_file = Some(header.clone());
        }
        if let Some(footer) = &settings.footer_file {
            self.template.footer_file = Some(footer.clone());
        }
        if let Some(fail) = settings.fail_if_files_are_missing {
            self.template.fail_if_files_are_missing = fail;
        }
        if let Some(filtering) = settings.apply_filtering {
            self.processing.apply_filtering = filtering;
        }
        if let Some(title) = &settings.default_title {
            self.title.default = Some(title.clone());
        }
        if let Some(always) = settings.always_use_default_title {
            self.title.always_use_default = always;
        }
        if let Some(transform) = settings.transform_relative_links {
            self.processing.transform_relative_links = transform;
        }
        if let Some(patterns) = &settings.copy_directories {
            self.processing.copy_directories = Some(patterns.clone());
        }
        if let Some(extensions) = &settings.extensions {
            self.processing.extensions.clone_from(extensions);
        }
        if let Some(attributes) = &settings.attributes {
            self.processing.attributes.clone_from(attributes);
        }
        if let Some(encoding) = &settings.input_encoding {
            self.input.encoding.clone_from(encoding);
        }
        if let Some(encoding) = &settings.output_encoding {
            self.output.encoding.clone_from(encoding);
        }
        if let Some(parallel) = settings.parallel {
            self.processing.parallel = parallel;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let mut config = Self::default();
        config.resolve_paths(base);
        config
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically at the end of [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_extensions()?;
        self.validate_dirs()?;
        require_non_empty(&self.input.encoding, "input.encoding")?;
        require_non_empty(&self.output.encoding, "output.encoding")?;
        Ok(())
    }

    fn validate_extensions(&self) -> Result<(), ConfigError> {
        if self.input.extension_list().is_empty() {
            return Err(ConfigError::Validation(
                "input.extensions must list at least one extension".to_owned(),
            ));
        }

        require_non_empty(&self.output.extension, "output.extension")?;
        if self.output.extension.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "output.extension must not start with a dot (got `{}`)",
                self.output.extension
            )));
        }

        Ok(())
    }

    fn validate_dirs(&self) -> Result<(), ConfigError> {
        if self.input.dir == self.output.dir {
            return Err(ConfigError::Validation(format!(
                "input.dir and output.dir must differ (both are {})",
                self.input.dir.display()
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.input.dir = expand::expand_env_path(&self.input.dir, "input.dir")?;
        self.output.dir = expand::expand_env_path(&self.output.dir, "output.dir")?;

        if let Some(ref header) = self.template.header_file {
            self.template.header_file =
                Some(expand::expand_env_path(header, "template.header_file")?);
        }
        if let Some(ref footer) = self.template.footer_file {
            self.template.footer_file =
                Some(expand::expand_env_path(footer, "template.footer_file")?);
        }
        if let Some(ref title) = self.title.default {
            self.title.default = Some(expand::expand_env(title, "title.default")?);
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.input.dir = config_dir.join(&self.input.dir);
        self.output.dir = config_dir.join(&self.output.dir);
        self.template.header_file = self.template.header_file.take().map(|p| config_dir.join(p));
        self.template.footer_file = self.template.footer_file.take().map(|p| config_dir.join(p));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.input.dir, PathBuf::from("/test/markdown"));
        assert_eq!(config.output.dir, PathBuf::from("/test/html"));
        assert_eq!(config.input.extensions, "md");
        assert_eq!(config.output.extension, "html");
        assert_eq!(config.input.encoding, "UTF-8");
        assert!(!config.input.recursive);
        assert!(config.template.fail_if_files_are_missing);
        assert!(config.template.header_file.is_none());
        assert_eq!(config.processing.extensions, vec!["TABLES".to_owned()]);
        assert!(config.processing.attributes.is_empty());
        assert!(!config.processing.apply_filtering);
        assert!(!config.processing.parallel);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.input.dir, PathBuf::from("markdown"));
        assert_eq!(config.output.extension, "html");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[input]
dir = "src/main/markdown"
extensions = "md, markdown"
recursive = true
encoding = "ISO-8859-1"

[output]
dir = "target/html"
extension = "htm"
encoding = "ISO-8859-15"

[template]
header_file = "header.html"
footer_file = "footer.html"
fail_if_files_are_missing = false

[title]
default = "Documentation"
always_use_default = true

[processing]
apply_filtering = true
transform_relative_links = true
extensions = ["TABLES", "ANCHORLINKS"]
attributes = ["TableBlock|class=table table-striped", "BlockQuote|class=red"]
copy_directories = "images,**/assets"
parallel = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.input.dir, PathBuf::from("src/main/markdown"));
        assert_eq!(
            config.input.extension_list(),
            vec!["md".to_owned(), "markdown".to_owned()]
        );
        assert!(config.input.recursive);
        assert_eq!(config.input.encoding, "ISO-8859-1");
        assert_eq!(config.output.extension, "htm");
        assert_eq!(config.output.encoding, "ISO-8859-15");
        assert_eq!(
            config.template.header_file,
            Some(PathBuf::from("header.html"))
        );
        assert!(!config.template.fail_if_files_are_missing);
        assert_eq!(config.title.default.as_deref(), Some("Documentation"));
        assert!(config.title.always_use_default);
        assert!(config.processing.apply_filtering);
        assert!(config.processing.transform_relative_links);
        assert_eq!(config.processing.attributes.len(), 2);
        assert_eq!(
            config.processing.copy_directories.as_deref(),
            Some("images,**/assets")
        );
        assert!(config.processing.parallel);
    }

    #[test]
    fn test_parse_unknown_field_ignored() {
        let toml = r#"
[input]
dir = "docs"
unused = 1
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.input.dir, PathBuf::from("docs"));
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[input]
dir = "docs"

[output]
dir = "/var/www"

[template]
header_file = "templates/header.html"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.input.dir, PathBuf::from("/project/docs"));
        assert_eq!(config.output.dir, PathBuf::from("/var/www"));
        assert_eq!(
            config.template.header_file,
            Some(PathBuf::from("/project/templates/header.html"))
        );
        assert!(config.template.footer_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[input]
dir = "md"
recursive = true

[template]
header_file = "header.html"
"#,
        )
        .unwrap();

        let config = Config::load(Some(path.as_path()), None).unwrap();
        assert_eq!(config.input.dir, dir.path().join("md"));
        assert_eq!(config.output.dir, dir.path().join("html"));
        assert_eq!(
            config.template.header_file,
            Some(dir.path().join("header.html"))
        );
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/mdpage.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[input\ndir = ").unwrap();

        let err = Config::load(Some(path.as_path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_validates_after_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            output_extension: Some(".html".to_owned()),
            ..Default::default()
        };
        let err = Config::load(Some(path.as_path()), Some(&settings)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("output.extension"));
    }

    #[test]
    fn test_apply_cli_settings_paths() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            input_dir: Some(PathBuf::from("/custom/md")),
            header_file: Some(PathBuf::from("/custom/header.html")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.input.dir, PathBuf::from("/custom/md"));
        assert_eq!(
            config.template.header_file,
            Some(PathBuf::from("/custom/header.html"))
        );
        assert_eq!(config.output.dir, PathBuf::from("/test/html")); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_lists_replace() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            extensions: Some(vec!["STRIKETHROUGH".to_owned()]),
            attributes: Some(vec!["Heading|class=hero".to_owned()]),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.processing.extensions,
            vec!["STRIKETHROUGH".to_owned()]
        );
        assert_eq!(
            config.processing.attributes,
            vec!["Heading|class=hero".to_owned()]
        );
    }

    #[test]
    fn test_apply_cli_settings_flags() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            recursive: Some(true),
            fail_if_files_are_missing: Some(false),
            apply_filtering: Some(true),
            always_use_default_title: Some(true),
            transform_relative_links: Some(true),
            parallel: Some(true),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert!(config.input.recursive);
        assert!(!config.template.fail_if_files_are_missing);
        assert!(config.processing.apply_filtering);
        assert!(config.title.always_use_default);
        assert!(config.processing.transform_relative_links);
        assert!(config.processing.parallel);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.input.dir, PathBuf::from("/test/markdown"));
        assert_eq!(config.input.extensions, "md");
        assert!(config.title.default.is_none());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDPAGE_CONFIG_TEST_TITLE", "Handbook");
            std::env::set_var("MDPAGE_CONFIG_TEST_OUT", "/srv/www");
        }
        let toml = r#"
[output]
dir = "${MDPAGE_CONFIG_TEST_OUT}/docs"

[title]
default = "${MDPAGE_CONFIG_TEST_TITLE}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.output.dir, PathBuf::from("/srv/www/docs"));
        assert_eq!(config.title.default.as_deref(), Some("Handbook"));
        unsafe {
            std::env::remove_var("MDPAGE_CONFIG_TEST_TITLE");
            std::env::remove_var("MDPAGE_CONFIG_TEST_OUT");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDPAGE_CONFIG_TEST_MISSING");
        }
        let toml = r#"
[template]
header_file = "${MDPAGE_CONFIG_TEST_MISSING}/header.html"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("template.header_file"));
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_input_extensions() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.input.extensions = " , ".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("input.extensions"));
    }

    #[test]
    fn test_validate_output_extension_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.output.extension = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.extension cannot be empty"));
    }

    #[test]
    fn test_validate_same_input_and_output_dir() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.output.dir = PathBuf::from("/test/markdown");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("must differ"));
    }
}
