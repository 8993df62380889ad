//! Header/footer composition around rendered page bodies.

use std::path::Path;

use crate::encoding::TextEncoding;
use crate::error::GenerateError;
use crate::path::site_base_prefix;
use crate::substitute::{Substitutions, VariableSubstitutor};

/// Token replaced (first occurrence, header only) with the page title.
pub const TITLE_TOKEN: &str = "titleToken";

/// Token replaced (every occurrence) with the relative prefix to the site root.
pub const SITE_BASE_TOKEN: &str = "##SITE_BASE##";

/// Wraps rendered bodies in the shared header and footer.
#[derive(Clone, Debug, Default)]
pub struct TemplateComposer {
    header: String,
    footer: String,
    substitutor: VariableSubstitutor,
}

impl TemplateComposer {
    /// Create a composer from already loaded template text.
    pub fn new(
        header: impl Into<String>,
        footer: impl Into<String>,
        substitutor: VariableSubstitutor,
    ) -> Self {
        Self {
            header: header.into(),
            footer: footer.into(),
            substitutor,
        }
    }

    /// Load the configured header and footer files.
    ///
    /// A file that does not exist is an error when `fail_if_missing` is set.
    /// Otherwise a warning is logged and both header and footer are empty.
    pub fn load(
        header_file: Option<&Path>,
        footer_file: Option<&Path>,
        fail_if_missing: bool,
        encoding: TextEncoding,
        substitutor: VariableSubstitutor,
    ) -> Result<Self, GenerateError> {
        let missing = [header_file, footer_file]
            .into_iter()
            .flatten()
            .find(|path| !path.exists());

        if let Some(path) = missing {
            if fail_if_missing {
                return Err(GenerateError::MissingTemplate {
                    path: path.to_path_buf(),
                });
            }
            tracing::warn!(path = %path.display(), "Header and/or footer file is missing, using empty templates");
            return Ok(Self::new("", "", substitutor));
        }

        let read = |path: Option<&Path>| -> Result<String, GenerateError> {
            path.map_or_else(|| Ok(String::new()), |path| encoding.read_file(path))
        };
        let header = read(header_file)?;
        let footer = read(footer_file)?;
        tracing::debug!(
            header_bytes = header.len(),
            footer_bytes = footer.len(),
            "Loaded templates"
        );

        Ok(Self::new(header, footer, substitutor))
    }

    /// Compose a full page: header, body, footer.
    ///
    /// The header receives the title; both header and footer receive
    /// variable substitution and the site-base prefix for `folder_depth`.
    pub fn compose(
        &self,
        body: &str,
        title: Option<&str>,
        folder_depth: usize,
        vars: &Substitutions,
    ) -> String {
        let prefix = site_base_prefix(folder_depth);

        let header = self.header.replacen(TITLE_TOKEN, title.unwrap_or_default(), 1);
        let header = self.substitutor.apply(&header, vars);
        let header = header.replace(SITE_BASE_TOKEN, &prefix);

        let footer = self.substitutor.apply(&self.footer, vars);
        let footer = footer.replace(SITE_BASE_TOKEN, &prefix);

        let mut page = String::with_capacity(header.len() + body.len() + footer.len());
        page.push_str(&header);
        page.push_str(body);
        page.push_str(&footer);
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_vars() -> Substitutions {
        Substitutions::new()
    }

    #[test]
    fn test_compose_concatenates() {
        let composer = TemplateComposer::new("<header>", "<footer>", VariableSubstitutor::new(false));
        assert_eq!(
            composer.compose("<p>body</p>", None, 0, &no_vars()),
            "<header><p>body</p><footer>"
        );
    }

    #[test]
    fn test_title_first_occurrence_header_only() {
        let composer = TemplateComposer::new(
            "<title>titleToken</title><h1>titleToken</h1>",
            "<p>titleToken</p>",
            VariableSubstitutor::new(false),
        );
        assert_eq!(
            composer.compose("", Some("Guide"), 0, &no_vars()),
            "<title>Guide</title><h1>titleToken</h1><p>titleToken</p>"
        );
    }

    #[test]
    fn test_missing_title_becomes_empty() {
        let composer = TemplateComposer::new("<title>titleToken</title>", "", VariableSubstitutor::new(false));
        assert_eq!(
            composer.compose("", None, 0, &no_vars()),
            "<title></title>"
        );
    }

    #[test]
    fn test_site_base_everywhere() {
        let composer = TemplateComposer::new(
            r###"<link href="##SITE_BASE##/a.css"><script src="##SITE_BASE##/b.js">"###,
            r###"<a href="##SITE_BASE##/index.html">"###,
            VariableSubstitutor::new(false),
        );
        assert_eq!(
            composer.compose("", None, 2, &no_vars()),
            concat!(
                r#"<link href="./../../a.css"><script src="./../../b.js">"#,
                r#"<a href="./../../index.html">"#
            )
        );
    }

    #[test]
    fn test_variables_in_header_and_footer() {
        let vars: Substitutions = [("year".to_owned(), "2024".to_owned())].into_iter().collect();
        let composer = TemplateComposer::new(
            "{lang=en}\n<html>${year}",
            "(c) ${year} ${unknown}",
            VariableSubstitutor::new(true),
        );
        assert_eq!(
            composer.compose("|", None, 0, &vars),
            "<html>2024|(c) 2024 ${unknown}"
        );
    }

    #[test]
    fn test_load_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let header = dir.path().join("header.html");
        let footer = dir.path().join("footer.html");
        std::fs::write(&header, "<h>titleToken</h>").unwrap();
        std::fs::write(&footer, "<f>").unwrap();

        let composer = TemplateComposer::load(
            Some(&header),
            Some(&footer),
            true,
            TextEncoding::Utf8,
            VariableSubstitutor::new(false),
        )
        .unwrap();
        assert_eq!(
            composer.compose("b", Some("T"), 0, &no_vars()),
            "<h>T</h>b<f>"
        );
    }

    #[test]
    fn test_load_missing_is_fatal_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("header.html");

        let err = TemplateComposer::load(
            Some(&missing),
            None,
            true,
            TextEncoding::Utf8,
            VariableSubstitutor::new(false),
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::MissingTemplate { ref path } if *path == missing));
    }

    #[test]
    fn test_load_missing_tolerated_empties_both() {
        let dir = tempfile::tempdir().unwrap();
        let header = dir.path().join("header.html");
        std::fs::write(&header, "<h>").unwrap();
        let missing_footer = dir.path().join("footer.html");

        let composer = TemplateComposer::load(
            Some(&header),
            Some(&missing_footer),
            false,
            TextEncoding::Utf8,
            VariableSubstitutor::new(false),
        )
        .unwrap();
        assert_eq!(composer.compose("body", None, 0, &no_vars()), "body");
    }

    #[test]
    fn test_load_without_templates() {
        let composer = TemplateComposer::load(
            None,
            None,
            true,
            TextEncoding::Utf8,
            VariableSubstitutor::new(false),
        )
        .unwrap();
        assert_eq!(composer.compose("body", Some("T"), 3, &no_vars()), "body");
    }
}
