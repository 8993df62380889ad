//! Source document discovery.
//!
//! Discovery walks the input tree once and builds a [`DocumentRecord`] for
//! every source file. Records are complete before any page is rendered.

use std::fs;
use std::path::{Path, PathBuf};

use crate::encoding::TextEncoding;
use crate::error::GenerateError;
use crate::path::PathMapper;
use crate::substitute::{Substitutions, VariableSubstitutor};
use crate::title::extract_title;

/// A discovered source document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentRecord {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    /// Page title, if the document has a heading or a default is configured.
    pub title: Option<String>,
    /// Directories between the input root and the document's parent.
    pub folder_depth: usize,
    /// Declared variables. Empty unless filtering is enabled.
    pub substitutions: Substitutions,
}

/// Settings for [`discover`] beyond the path mapping.
#[derive(Clone, Debug, Default)]
pub struct DiscoverySettings {
    /// Input extensions without dots, in match order.
    pub extensions: Vec<String>,
    pub default_title: Option<String>,
    /// Use `default_title` for every page instead of the first heading.
    pub always_use_default_title: bool,
    pub encoding: TextEncoding,
    pub substitutor: VariableSubstitutor,
}

/// Discover and describe every source document under the mapper's input root.
///
/// Each file is read once to extract its title and variable declarations.
/// Records are sorted by source path.
pub fn discover(
    mapper: &PathMapper,
    settings: &DiscoverySettings,
) -> Result<Vec<DocumentRecord>, GenerateError> {
    let sources = find_sources(
        mapper.input_root(),
        &settings.extensions,
        mapper.is_recursive(),
    );

    let mut records = Vec::with_capacity(sources.len());
    for (source_path, extension) in sources {
        let text = settings.encoding.read_file(&source_path)?;

        let title = if settings.always_use_default_title {
            settings.default_title.clone()
        } else {
            extract_title(text.lines(), settings.default_title.as_deref())
        };

        let record = DocumentRecord {
            output_path: mapper.output_path(&source_path, &extension),
            folder_depth: mapper.folder_depth(&source_path),
            substitutions: settings.substitutor.declarations(&text),
            title,
            source_path,
        };
        tracing::debug!(
            source = %record.source_path.display(),
            output = %record.output_path.display(),
            title = record.title.as_deref().unwrap_or_default(),
            depth = record.folder_depth,
            "Discovered document"
        );
        records.push(record);
    }

    Ok(records)
}

/// Find source files under `root` whose names end in `.<ext>` for one of
/// `extensions`, paired with the extension that matched.
///
/// Hidden entries (names starting with `.`) are skipped and logged at debug
/// level. Matching is
/// case-sensitive. Unreadable directories are skipped. Results are sorted.
pub(crate) fn find_sources(
    root: &Path,
    extensions: &[String],
    recursive: bool,
) -> Vec<(PathBuf, String)> {
    let mut sources = Vec::new();
    if root.is_dir() {
        scan_directory(root, extensions, recursive, &mut sources);
    }
    sources.sort();
    sources
}

fn scan_directory(
    dir: &Path,
    extensions: &[String],
    recursive: bool,
    sources: &mut Vec<(PathBuf, String)>,
) {
    let Ok(entries) = fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "Failed to read directory, skipping");
        return;
    };

    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') {
            tracing::debug!(path = %entry.path().display(), "Skipping hidden entry");
            continue;
        }

        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if recursive {
                scan_directory(&entry.path(), extensions, recursive, sources);
            }
        } else if file_type.is_file()
            && let Some(ext) = matched_extension(&name, extensions)
        {
            sources.push((entry.path(), ext.to_owned()));
        }
    }
}

fn matched_extension<'a>(name: &str, extensions: &'a [String]) -> Option<&'a str> {
    extensions
        .iter()
        .map(String::as_str)
        .find(|ext| {
            name.strip_suffix(ext)
                .is_some_and(|stem| stem.len() > 1 && stem.ends_with('.'))
        })
}
