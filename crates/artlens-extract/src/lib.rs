//! # Artlens Extract
//!
//! Turns a zip-packaged design bundle into an ordered list of renderable
//! content items. Unpacks the archive into an owned working directory,
//! classifies the extracted tree (artwork / resources / graphics),
//! enumerates artboard documents from standalone JSON files and the
//! manifest, and collects orphan image assets.

pub mod structure;
pub mod collect;
pub mod extract;

pub use extract::{ContentExtractor, ExtractError};
pub use structure::{ManifestArtboard, ProjectStructure};
