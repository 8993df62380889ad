//! Page title extraction from raw Markdown lines.

/// Return the text of the first heading in `lines`, or `fallback`.
///
/// Lines are trimmed before inspection.
///
/// - A line starting with `#` is an ATX heading; every `#` is removed and the
///   trimmed remainder is returned.
/// - A line made only of `=` or only of `-`, exactly as long as the previous
///   line, underlines that previous line as a Setext heading.
///
/// Underlines of any other length are ordinary text.
///
/// # Examples
///
/// ```
/// use mdpage_generator::extract_title;
///
/// assert_eq!(extract_title(["", "## Setup ##"], None), Some("Setup".to_owned()));
/// assert_eq!(extract_title(["Intro", "====="], None), Some("Intro".to_owned()));
/// assert_eq!(extract_title(["Intro", "==="], Some("Docs")), Some("Docs".to_owned()));
/// ```
pub fn extract_title<'a, I>(lines: I, fallback: Option<&str>) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut previous = "";
    for line in lines {
        let line = line.trim();
        if line.starts_with('#') {
            return Some(line.replace('#', "").trim().to_owned());
        }
        if is_underline_of(line, previous) {
            return Some(previous.to_owned());
        }
        previous = line;
    }
    fallback.map(str::to_owned)
}

fn is_underline_of(line: &str, previous: &str) -> bool {
    let Some(marker) = line.chars().next() else {
        return false;
    };
    (marker == '=' || marker == '-')
        && line.chars().all(|c| c == marker)
        && line.chars().count() == previous.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_of(text: &str) -> Option<String> {
        extract_title(text.lines(), None)
    }

    #[test]
    fn test_atx_heading() {
        assert_eq!(title_of("# Hello\n\nBody"), Some("Hello".to_owned()));
    }

    #[test]
    fn test_atx_heading_any_level_strips_all_hashes() {
        assert_eq!(title_of("### C# Notes ###"), Some("C Notes".to_owned()));
    }

    #[test]
    fn test_atx_heading_indented() {
        assert_eq!(title_of("text\n   ## Indented"), Some("Indented".to_owned()));
    }

    #[test]
    fn test_setext_equals() {
        assert_eq!(title_of("Hello\n=====\n\nBody"), Some("Hello".to_owned()));
    }

    #[test]
    fn test_setext_dashes() {
        assert_eq!(title_of("Hello\n-----"), Some("Hello".to_owned()));
    }

    #[test]
    fn test_setext_mismatched_length_is_text() {
        assert_eq!(title_of("Hello\n===\n\nWorld\n-----"), Some("World".to_owned()));
        assert_eq!(title_of("Hello\n======"), None);
    }

    #[test]
    fn test_setext_mixed_markers_is_text() {
        assert_eq!(title_of("Hello\n==-=="), None);
    }

    #[test]
    fn test_setext_length_in_chars() {
        assert_eq!(title_of("Grüße\n====="), Some("Grüße".to_owned()));
    }

    #[test]
    fn test_first_heading_wins() {
        assert_eq!(
            title_of("First\n=====\n# Second"),
            Some("First".to_owned())
        );
        assert_eq!(title_of("# First\nSecond\n======"), Some("First".to_owned()));
    }

    #[test]
    fn test_blank_lines_never_underlined() {
        assert_eq!(title_of("\n\nplain text"), None);
    }

    #[test]
    fn test_fallback() {
        assert_eq!(
            extract_title(["no heading here"], Some("Default")),
            Some("Default".to_owned())
        );
        assert_eq!(extract_title(Vec::<&str>::new(), None), None);
    }
}
