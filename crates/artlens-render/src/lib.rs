//! # Artlens Render
//!
//! CPU rasterizer for artboard scene graphs. Walks a parsed element tree
//! and draws onto an RGBA canvas: filled/stroked shapes, polylines,
//! baseline text, and alpha-composited embedded images.
//!
//! This is an inspection renderer, not a vector-accurate one: shapes are
//! drawn with hard edges and overwrite semantics, text is laid out line by
//! line without shaping, and rotation is ignored.

pub mod canvas;
pub mod font;
pub mod assets;
pub mod raster;
pub mod loader;

pub use loader::{load_content, RenderError};
pub use raster::ArtboardRenderer;
