//! Output locations and site-relative prefixes.

use std::path::{Component, Path, PathBuf};

/// Maps source documents to their output locations.
#[derive(Clone, Debug)]
pub struct PathMapper {
    input_root: PathBuf,
    output_root: PathBuf,
    output_extension: String,
    recursive: bool,
}

impl PathMapper {
    /// Create a mapper. `output_extension` is given without a dot.
    pub fn new(
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        output_extension: impl Into<String>,
        recursive: bool,
    ) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            output_extension: output_extension.into(),
            recursive,
        }
    }

    pub fn input_root(&self) -> &Path {
        &self.input_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Output path of `file`, whose name ends in `.<input_extension>`.
    ///
    /// In recursive mode the file's directory relative to the input root is
    /// kept under the output root. Otherwise the page lands directly in the
    /// output root.
    pub fn output_path(&self, file: &Path, input_extension: &str) -> PathBuf {
        let name = file
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let page_name = replace_extension(&name, input_extension, &self.output_extension);

        let dir = if self.recursive {
            file.parent()
                .and_then(|parent| parent.strip_prefix(&self.input_root).ok())
                .map_or_else(|| self.output_root.clone(), |rel| self.output_root.join(rel))
        } else {
            self.output_root.clone()
        };
        dir.join(page_name)
    }

    /// Number of directories between the input root and `file`'s parent.
    pub fn folder_depth(&self, file: &Path) -> usize {
        folder_depth(&self.input_root, file)
    }
}

/// Number of directories between `input_root` and `file`'s parent directory.
///
/// A file directly inside the root has depth 0. Files outside the root also
/// yield 0.
pub fn folder_depth(input_root: &Path, file: &Path) -> usize {
    file.parent()
        .and_then(|parent| parent.strip_prefix(input_root).ok())
        .map_or(0, |rel| {
            rel.components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .count()
        })
}

/// Replace a trailing `.<input_ext>` of `name` with `.<output_ext>`.
///
/// Only an exact suffix is replaced; a name without it is returned unchanged.
///
/// ```
/// use mdpage_generator::replace_extension;
///
/// assert_eq!(replace_extension("md-notes.md", "md", "html"), "md-notes.html");
/// assert_eq!(replace_extension("notes.mdx", "md", "html"), "notes.mdx");
/// ```
pub fn replace_extension(name: &str, input_ext: &str, output_ext: &str) -> String {
    let suffix = format!(".{input_ext}");
    match name.strip_suffix(&suffix) {
        Some(stem) => format!("{stem}.{output_ext}"),
        None => name.to_owned(),
    }
}

/// Relative prefix from a page at `depth` back to the site root.
///
/// `.` for depth 0, then one `/..` per level: `./..`, `./../..`.
pub fn site_base_prefix(depth: usize) -> String {
    let mut prefix = String::with_capacity(1 + depth * 3);
    prefix.push('.');
    for _ in 0..depth {
        prefix.push_str("/..");
    }
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_base_prefix() {
        assert_eq!(site_base_prefix(0), ".");
        assert_eq!(site_base_prefix(1), "./..");
        assert_eq!(site_base_prefix(2), "./../..");
    }

    #[test]
    fn test_folder_depth() {
        let root = Path::new("/site/markdown");
        assert_eq!(folder_depth(root, Path::new("/site/markdown/a.md")), 0);
        assert_eq!(folder_depth(root, Path::new("/site/markdown/x/a.md")), 1);
        assert_eq!(folder_depth(root, Path::new("/site/markdown/x/y/a.md")), 2);
    }

    #[test]
    fn test_folder_depth_trailing_separator_on_root() {
        let root = Path::new("/site/markdown/");
        assert_eq!(folder_depth(root, Path::new("/site/markdown/x/a.md")), 1);
    }

    #[test]
    fn test_folder_depth_outside_root() {
        assert_eq!(
            folder_depth(Path::new("/site/markdown"), Path::new("/other/a.md")),
            0
        );
    }

    #[test]
    fn test_replace_extension_exact_suffix() {
        assert_eq!(replace_extension("guide.md", "md", "html"), "guide.html");
        assert_eq!(replace_extension("md-notes.md", "md", "html"), "md-notes.html");
        assert_eq!(replace_extension("a.md.bak", "md", "html"), "a.md.bak");
        assert_eq!(
            replace_extension("page.markdown", "markdown", "htm"),
            "page.htm"
        );
    }

    #[test]
    fn test_output_path_flat() {
        let mapper = PathMapper::new("/in", "/out", "html", false);
        assert_eq!(
            mapper.output_path(Path::new("/in/sub/deep/page.md"), "md"),
            PathBuf::from("/out/page.html")
        );
    }

    #[test]
    fn test_output_path_recursive() {
        let mapper = PathMapper::new("/in", "/out", "html", true);
        assert_eq!(
            mapper.output_path(Path::new("/in/sub/deep/page.md"), "md"),
            PathBuf::from("/out/sub/deep/page.html")
        );
        assert_eq!(
            mapper.output_path(Path::new("/in/index.md"), "md"),
            PathBuf::from("/out/index.html")
        );
    }

    #[test]
    fn test_output_path_directory_named_like_extension() {
        let mapper = PathMapper::new("/in", "/out", "html", true);
        assert_eq!(
            mapper.output_path(Path::new("/in/md/md-notes.md"), "md"),
            PathBuf::from("/out/md/md-notes.html")
        );
    }

    #[test]
    fn test_mapper_folder_depth() {
        let mapper = PathMapper::new("/in", "/out", "html", true);
        assert_eq!(mapper.folder_depth(Path::new("/in/a/b/page.md")), 2);
    }
}
