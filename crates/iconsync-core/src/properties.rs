//! # Icon Variant Properties
//!
//! Figma names each variant component after its property assignments, e.g.
//! `"Size=24, Color=Red"`. [`parse_icon_name`] turns that string into an
//! ordered [`IconProperties`] map.
//!
//! ## Grammar
//!
//! Each step consumes one pair from the front of the input:
//!
//! ```text
//! [","] [whitespace] key "=" value rest
//! ```
//!
//! - `key` is everything up to the first `=`. It may contain `,` and spaces
//!   and is not trimmed on the right. Leading whitespace is skipped, but the
//!   key always keeps at least one character.
//! - `value` is everything up to the next `,` (or the end) and must be
//!   non-empty. It may contain `=`.
//! - `rest` only extends to the end of the current line.
//!
//! Parsing stops at the first step that does not match; pairs collected so
//! far are kept. There is no escaping: a literal `,` inside a value ends the
//! value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping from variant property name to value.
///
/// Inserting an existing key replaces its value but keeps the key's
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconProperties(IndexMap<String, String>);

impl IconProperties {
    /// Create an empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property, returning the previous value for `key` if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a property value by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over property names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over property values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IconProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Self::new();
        for (k, v) in iter {
            properties.insert(k, v);
        }
        properties
    }
}

impl IntoIterator for IconProperties {
    type Item = (String, String);
    type IntoIter = indexmap::map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Parse a component name of the form `"k1=v1, k2=v2"` into ordered
/// properties.
///
/// Returns an empty map for empty or unparseable input. See the module
/// documentation for the exact grammar and its limitations.
pub fn parse_icon_name(raw: &str) -> IconProperties {
    let mut properties = IconProperties::new();
    let mut rest = raw;
    while let Some((key, value, tail)) = next_pair(rest) {
        properties.insert(key, value);
        rest = tail;
    }
    properties
}

/// Match one `key=value` pair at the front of `input`.
///
/// Returns the key, the value, and the unconsumed remainder.
fn next_pair(input: &str) -> Option<(&str, &str, &str)> {
    let eq = input.find('=')?;
    let key = key_from_head(&input[..eq])?;

    let after = &input[eq + 1..];
    let value_end = after.find(',').unwrap_or(after.len());
    if value_end == 0 {
        return None;
    }
    let value = &after[..value_end];

    let tail = &after[value_end..];
    let tail = match tail.find(is_line_terminator) {
        Some(end) => &tail[..end],
        None => tail,
    };

    Some((key, value, tail))
}

/// Strip the optional separator and leading whitespace from the text before
/// `=`, leaving at least one character for the key.
fn key_from_head(head: &str) -> Option<&str> {
    if head.is_empty() {
        return None;
    }

    let unprefixed = match head.strip_prefix(',') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => head,
    };

    let trimmed = unprefixed.trim_start_matches(is_name_whitespace);
    if !trimmed.is_empty() {
        return Some(trimmed);
    }

    // Whitespace-only head: the key is its last character.
    let (last, _) = unprefixed.char_indices().last()?;
    Some(&unprefixed[last..])
}

/// Whitespace as design-tool names use it: Unicode spaces, line breaks and
/// the byte order mark, but not NEL (U+0085).
pub(crate) fn is_name_whitespace(c: char) -> bool {
    c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}')
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}
