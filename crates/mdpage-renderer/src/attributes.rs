//! Per-node attribute overrides.
//!
//! Overrides are configured as `NodeKind|name=value|name=value|...` entries.
//! An override replaces the attribute set the renderer would otherwise emit
//! for that node kind; it is not merged with it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::hooks::{AttributeOverrideHook, Attributes, NodeKind};

/// Error raised for a syntactically malformed override entry.
#[derive(Debug, thiserror::Error)]
pub enum OverrideParseError {
    /// The entry has no node-kind segment.
    #[error("attribute override `{entry}` has an empty node kind")]
    EmptyNodeKind {
        /// The offending entry.
        entry: String,
    },
    /// A segment has an empty attribute name.
    #[error("attribute override `{entry}` has an empty attribute name")]
    EmptyAttributeName {
        /// The offending entry.
        entry: String,
    },
}

/// Map from node-kind name to the attributes that replace its defaults.
#[derive(Clone, Debug, Default)]
pub struct AttributeOverrideMap {
    overrides: HashMap<String, Attributes>,
}

impl AttributeOverrideMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse override entries.
    ///
    /// A bare `name` segment stands for `name=name` and blank segments (such
    /// as one after a trailing `|`) are ignored. Values wrapped in
    /// matching double or single quotes are unquoted. A later entry for the
    /// same node kind replaces an earlier one. Node kinds the renderer never
    /// emits are kept but logged.
    pub fn parse<I, S>(entries: I) -> Result<Self, OverrideParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::new();
        for entry in entries {
            let entry = entry.as_ref();
            let (kind, attributes) = parse_entry(entry)?;
            if NodeKind::from_name(&kind).is_none() {
                tracing::warn!(node_kind = %kind, "Attribute override for unknown node kind");
            }
            tracing::debug!(node_kind = %kind, attributes = attributes.len(), "Attribute override");
            map.overrides.insert(kind, attributes);
        }
        Ok(map)
    }

    /// Override for a node kind, if configured.
    #[must_use]
    pub fn get(&self, kind: NodeKind) -> Option<&Attributes> {
        self.overrides.get(kind.name())
    }

    /// Override configured under an arbitrary node-kind name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Attributes> {
        self.overrides.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

fn parse_entry(entry: &str) -> Result<(String, Attributes), OverrideParseError> {
    let mut segments = entry.split('|');
    let kind = segments.next().unwrap_or_default().trim();
    if kind.is_empty() {
        return Err(OverrideParseError::EmptyNodeKind {
            entry: entry.to_owned(),
        });
    }

    let mut attributes = Attributes::new();
    for segment in segments.filter(|segment| !segment.trim().is_empty()) {
        let (name, value) = match segment.split_once('=') {
            Some((name, value)) => (name, unquote(value)),
            None => (segment, segment),
        };
        if name.is_empty() {
            return Err(OverrideParseError::EmptyAttributeName {
                entry: entry.to_owned(),
            });
        }
        attributes.add_value(name, value);
    }

    Ok((kind.to_owned(), attributes))
}

/// Strip one pair of matching surrounding quotes.
fn unquote(value: &str) -> &str {
    ['"', '\'']
        .into_iter()
        .find_map(|quote| {
            value
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        })
        .unwrap_or(value)
}

/// [`AttributeOverrideHook`] backed by a shared [`AttributeOverrideMap`].
#[derive(Clone, Debug)]
pub struct AttributeInjector {
    overrides: Arc<AttributeOverrideMap>,
}

impl AttributeInjector {
    #[must_use]
    pub fn new(overrides: Arc<AttributeOverrideMap>) -> Self {
        Self { overrides }
    }
}

impl AttributeOverrideHook for AttributeInjector {
    fn attributes(&self, kind: NodeKind, defaults: Attributes) -> Attributes {
        match self.overrides.get(kind) {
            Some(attributes) => attributes.clone(),
            None => defaults,
        }
    }
}
