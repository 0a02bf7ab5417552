//! # Artlens Core
//!
//! Shared data model for the design-bundle viewer: color normalization,
//! the parsed scene-graph element tree, artboard documents, and the
//! content-item records produced by extraction and consumed by rendering.

pub mod color;
pub mod element;
pub mod artboard;
pub mod content;

pub use color::{apply_opacity, parse_color, Rgba};
pub use element::{Element, ElementKind, Shape};
pub use artboard::Artboard;
pub use content::{ArtboardRecord, ArtboardSource, ContentItem};
