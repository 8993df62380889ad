//! Asset directory copying driven by glob patterns.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::GenerateError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One matched directory and where its files go.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct GlobCopyAction {
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
}

/// Copies the files of input directories matching glob patterns into the
/// output tree, keeping their location relative to the input root.
///
/// Patterns are relative to the input root: `images`, `folder*`,
/// `**/assets`. Only files directly inside a matched directory are copied.
#[derive(Debug)]
pub struct GlobDirectoryCopier {
    input_root: PathBuf,
    output_root: PathBuf,
    patterns: Vec<(String, Pattern)>,
}

impl GlobDirectoryCopier {
    /// Compile a comma-separated pattern list.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidPattern`] for a pattern with invalid
    /// glob syntax.
    pub fn new(
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        patterns: &str,
    ) -> Result<Self, GenerateError> {
        let input_root = input_root.into();
        let escaped_root = Pattern::escape(&input_root.to_string_lossy());
        let escaped_root = escaped_root.trim_end_matches('/');

        let patterns = patterns
            .split(',')
            .map(str::trim)
            .filter(|pattern| !pattern.is_empty())
            .map(|pattern| {
                Pattern::new(&format!("{escaped_root}/{pattern}"))
                    .map(|compiled| (pattern.to_owned(), compiled))
                    .map_err(|source| GenerateError::InvalidPattern {
                        pattern: pattern.to_owned(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            input_root,
            output_root: output_root.into(),
            patterns,
        })
    }

    /// Whether no patterns are configured.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Resolve the patterns against the current input tree.
    ///
    /// Actions are deduplicated across patterns and sorted by source
    /// directory.
    pub fn actions(&self) -> Vec<GlobCopyAction> {
        if self.patterns.is_empty() {
            return Vec::new();
        }

        let mut dirs = Vec::new();
        collect_directories(&self.input_root, &mut dirs);

        let mut matched = BTreeSet::new();
        for (raw, pattern) in &self.patterns {
            let before = matched.len();
            let mut hits = 0usize;
            for dir in &dirs {
                if pattern.matches_path_with(dir, MATCH_OPTIONS) {
                    hits += 1;
                    matched.insert(dir.clone());
                }
            }
            if hits == 0 {
                tracing::debug!(pattern = %raw, "Copy pattern matched no directories");
            } else {
                tracing::debug!(
                    pattern = %raw,
                    matches = hits,
                    added = matched.len() - before,
                    "Copy pattern matched"
                );
            }
        }

        matched
            .into_iter()
            .filter_map(|source_dir| {
                let rel = source_dir.strip_prefix(&self.input_root).ok()?;
                let destination_dir = self.output_root.join(rel);
                Some(GlobCopyAction {
                    source_dir,
                    destination_dir,
                })
            })
            .collect()
    }

    /// Run every copy action. Returns the number of files copied.
    ///
    /// Source files that vanish before they are copied are logged and
    /// skipped. Other I/O failures abort the copy.
    pub fn copy(&self) -> Result<usize, GenerateError> {
        let mut copied = 0;
        for action in self.actions() {
            copied += copy_directory_files(&action)?;
        }
        Ok(copied)
    }
}

/// All directories below `dir`, depth first.
fn collect_directories(dir: &Path, dirs: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.filter_map(Result::ok) {
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            let path = entry.path();
            dirs.push(path.clone());
            collect_directories(&path, dirs);
        }
    }
}

fn copy_directory_files(action: &GlobCopyAction) -> Result<usize, GenerateError> {
    let entries =
        fs::read_dir(&action.source_dir).map_err(|e| GenerateError::read(&action.source_dir, e))?;

    // A directory without files is not mirrored.
    let mut created = false;
    let mut copied = 0;
    for entry in entries.filter_map(Result::ok) {
        if !entry.file_type().is_ok_and(|t| t.is_file()) {
            continue;
        }
        if !created {
            fs::create_dir_all(&action.destination_dir)
                .map_err(|e| GenerateError::write(&action.destination_dir, e))?;
            created = true;
        }
        let from = entry.path();
        let to = action.destination_dir.join(entry.file_name());
        match fs::copy(&from, &to) {
            Ok(_) => {
                tracing::debug!(from = %from.display(), to = %to.display(), "Copied file");
                copied += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound && !from.exists() => {
                tracing::error!(path = %from.display(), "Source file disappeared, skipping");
            }
            Err(source) => return Err(GenerateError::Copy { from, to, source }),
        }
    }

    tracing::info!(
        from = %action.source_dir.display(),
        to = %action.destination_dir.display(),
        files = copied,
        "Copied directory"
    );
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    fn setup() -> (TempDir, TempDir) {
        let input = TempDir::new().unwrap();
        touch(input.path(), "folder1/a.txt");
        touch(input.path(), "folder2/b.txt");
        touch(input.path(), "folder3/c.txt");
        touch(input.path(), "folder3/sub/d.txt");
        touch(input.path(), "images/logo.png");
        touch(input.path(), "docs/images/diagram.png");
        touch(input.path(), "docs/images/deep/nested.png");
        (input, TempDir::new().unwrap())
    }

    #[test]
    fn test_named_folders_missing_ignored() {
        let (input, output) = setup();
        let copier =
            GlobDirectoryCopier::new(input.path(), output.path(), "folder1, folder3,folder4")
                .unwrap();

        assert_eq!(copier.copy().unwrap(), 2);
        assert!(output.path().join("folder1/a.txt").is_file());
        assert!(output.path().join("folder3/c.txt").is_file());
        assert!(!output.path().join("folder3/sub").exists());
        assert!(!output.path().join("folder2").exists());
        assert!(!output.path().join("folder4").exists());
    }

    #[test]
    fn test_wildcard_single_segment() {
        let (input, output) = setup();
        let copier = GlobDirectoryCopier::new(input.path(), output.path(), "folder*").unwrap();

        let sources: Vec<_> = copier
            .actions()
            .into_iter()
            .map(|a| a.source_dir.strip_prefix(input.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            sources,
            vec![
                PathBuf::from("folder1"),
                PathBuf::from("folder2"),
                PathBuf::from("folder3")
            ]
        );
        assert_eq!(copier.copy().unwrap(), 3);
    }

    #[test]
    fn test_recursive_wildcard_is_not_recursive_copy() {
        let (input, output) = setup();
        let copier = GlobDirectoryCopier::new(input.path(), output.path(), "**/images").unwrap();

        assert_eq!(copier.copy().unwrap(), 2);
        assert!(output.path().join("images/logo.png").is_file());
        assert!(output.path().join("docs/images/diagram.png").is_file());
        assert!(!output.path().join("docs/images/deep").exists());
    }

    #[test]
    fn test_overlapping_patterns_deduplicated() {
        let (input, output) = setup();
        let copier =
            GlobDirectoryCopier::new(input.path(), output.path(), "folder1,folder*,folder1")
                .unwrap();

        assert_eq!(copier.actions().len(), 3);
    }

    #[test]
    fn test_destination_mirrors_relative_path() {
        let (input, output) = setup();
        let copier = GlobDirectoryCopier::new(input.path(), output.path(), "docs/images").unwrap();

        assert_eq!(
            copier.actions(),
            vec![GlobCopyAction {
                source_dir: input.path().join("docs/images"),
                destination_dir: output.path().join("docs/images"),
            }]
        );
    }

    #[test]
    fn test_directory_without_files_not_created() {
        let (input, output) = setup();
        touch(input.path(), "assets/css/site.css");

        let copier = GlobDirectoryCopier::new(input.path(), output.path(), "assets").unwrap();
        assert_eq!(copier.actions().len(), 1);
        assert_eq!(copier.copy().unwrap(), 0);
        assert!(!output.path().join("assets").exists());
    }

    #[test]
    fn test_existing_files_overwritten() {
        let (input, output) = setup();
        touch(output.path(), "folder1/a.txt");
        fs::write(output.path().join("folder1/a.txt"), "stale").unwrap();

        let copier = GlobDirectoryCopier::new(input.path(), output.path(), "folder1").unwrap();
        copier.copy().unwrap();

        assert_eq!(
            fs::read_to_string(output.path().join("folder1/a.txt")).unwrap(),
            "folder1/a.txt"
        );
    }

    #[test]
    fn test_empty_pattern_list() {
        let (input, output) = setup();
        let copier = GlobDirectoryCopier::new(input.path(), output.path(), " , ").unwrap();
        assert!(copier.is_empty());
        assert_eq!(copier.copy().unwrap(), 0);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = GlobDirectoryCopier::new("/in", "/out", "images,[unclosed").unwrap_err();
        assert!(matches!(err, GenerateError::InvalidPattern { ref pattern, .. } if pattern == "[unclosed"));
    }

    #[test]
    fn test_root_with_glob_metacharacters() {
        let parent = TempDir::new().unwrap();
        let input = parent.path().join("site[1]");
        touch(&input, "images/a.png");
        let output = parent.path().join("out");

        let copier = GlobDirectoryCopier::new(&input, &output, "images").unwrap();
        assert_eq!(copier.copy().unwrap(), 1);
        assert!(output.join("images/a.png").is_file());
    }
}
