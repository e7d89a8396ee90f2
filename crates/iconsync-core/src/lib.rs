#![deny(missing_docs)]

//! # iconsync-core — Foundational Types for iconsync
//!
//! This crate defines the pure data model shared by the Figma client and the
//! CLI. It performs no I/O: only `serde` and `indexmap` from the external
//! ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Property order is data.** [`IconProperties`] preserves the order in
//!    which variant properties appear in a component name, because that order
//!    determines the output file name.
//!
//! 2. **One naming rule.** [`icon_file_name`] is the sole implementation of
//!    the icon-to-file-name mapping. The reconciler uses it both to compute the
//!    expected file set and to write files, so the two can never diverge.

pub mod icon;
pub mod properties;

// Re-export primary types at crate root for ergonomic imports.
pub use icon::{icon_file_name, ComponentMetadata, IconRecord, ICON_FILE_EXTENSION};
pub use properties::{parse_icon_name, IconProperties};
