//! # Icon Records and File Naming
//!
//! [`ComponentMetadata`] is an icon variant resolved from the design file's
//! component tables. [`IconRecord`] adds the rendered SVG and is the unit the
//! fetcher hands to callers. Records are transient: persisting them is the
//! caller's job.

use serde::{Deserialize, Serialize};

use crate::properties::{is_name_whitespace, IconProperties};

/// Extension used for every icon file written to disk.
pub const ICON_FILE_EXTENSION: &str = "svg";

/// A single icon variant resolved against its owning component set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    /// Figma node identifier of the component, e.g. `"12:34"`.
    pub id: String,
    /// Human-readable icon name, taken from the owning component set.
    pub name: String,
    /// Variant properties parsed from the component's own name.
    pub properties: IconProperties,
}

/// A fully resolved icon: name, variant properties, and SVG markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconRecord {
    /// Human-readable icon name.
    pub name: String,
    /// Variant properties in source order.
    pub properties: IconProperties,
    /// Raw SVG markup, exactly as served by the render endpoint.
    pub svg: String,
}

impl IconRecord {
    /// Build a record from resolved metadata and downloaded SVG markup.
    pub fn from_metadata(metadata: ComponentMetadata, svg: String) -> Self {
        Self {
            name: metadata.name,
            properties: metadata.properties,
            svg,
        }
    }

    /// File name this icon is stored under. See [`icon_file_name`].
    pub fn file_name(&self) -> String {
        icon_file_name(&self.name, &self.properties)
    }
}

/// Derive the on-disk file name for an icon.
///
/// Every whitespace character in `name` becomes `_`; the result is joined
/// with `-` to the property values in insertion order, suffixed with `.svg`,
/// and lowercased as a whole.
///
/// ```
/// use iconsync_core::{icon_file_name, parse_icon_name};
///
/// let props = parse_icon_name("Size=24, Color=Red");
/// assert_eq!(icon_file_name("Arrow Right", &props), "arrow_right-24-red.svg");
/// ```
pub fn icon_file_name(name: &str, properties: &IconProperties) -> String {
    let stem: String = name
        .chars()
        .map(|c| if is_name_whitespace(c) { '_' } else { c })
        .collect();

    let mut joined = stem;
    for value in properties.values() {
        joined.push('-');
        joined.push_str(value);
    }

    format!("{joined}.{ICON_FILE_EXTENSION}").to_lowercase()
}
