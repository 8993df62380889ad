//! Variable declarations and `${key}` substitution.
//!
//! A document declares variables on lines of their own:
//!
//! ```text
//! {version=1.4.2}
//! ```
//!
//! and uses them anywhere in the document, header or footer as `${version}`.
//! Declaration lines never reach the output.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// A whole declaration line: `{key=value}`.
static DECLARATION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{([^=]*)=(.*)\}$").expect("invalid declaration regex"));

/// Declaration lines in multi-line text, with their line terminator.
static DECLARATION_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\{[^=\r\n]*=[^\r\n]*\}(?:\r?\n|\z)").expect("invalid declaration regex")
});

/// A `${key}` token.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(.+?)\}").expect("invalid token regex"));

/// Variable mapping of one document.
pub type Substitutions = HashMap<String, String>;

/// Whether `line` is a declaration line.
pub fn is_declaration_line(line: &str) -> bool {
    DECLARATION_LINE.is_match(line)
}

/// Collect the declarations of `text`. Later declarations of a key win.
pub fn extract_declarations(text: &str) -> Substitutions {
    let mut vars = Substitutions::new();
    for line in text.lines() {
        if let Some(caps) = DECLARATION_LINE.captures(line) {
            let key = caps[1].to_owned();
            let value = caps[2].to_owned();
            tracing::debug!(%key, %value, "Variable declaration");
            vars.insert(key, value);
        }
    }
    vars
}

/// Remove declaration lines, including their line terminators.
pub fn strip_declarations(text: &str) -> String {
    DECLARATION_LINES.replace_all(text, "").into_owned()
}

/// Replace each `${key}` whose key is in `vars` with its value.
///
/// Values are inserted literally. Tokens with unknown keys are kept as-is.
pub fn substitute(text: &str, vars: &Substitutions) -> String {
    TOKEN
        .replace_all(text, |caps: &Captures<'_>| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_owned(),
        })
        .into_owned()
}

/// Declaration extraction and substitution, switched by the filtering flag.
///
/// When disabled, every operation leaves text unchanged and no declarations
/// are collected.
#[derive(Clone, Copy, Debug, Default)]
pub struct VariableSubstitutor {
    enabled: bool,
}

impl VariableSubstitutor {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Declarations of a document, or an empty mapping when disabled.
    pub fn declarations(self, text: &str) -> Substitutions {
        if self.enabled {
            extract_declarations(text)
        } else {
            Substitutions::new()
        }
    }

    /// Strip declaration lines and substitute tokens.
    pub fn apply(self, text: &str, vars: &Substitutions) -> String {
        if !self.enabled {
            return text.to_owned();
        }
        substitute(&strip_declarations(text), vars)
    }
}
