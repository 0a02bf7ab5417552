//! Entry point for the viewer layer: turn a selected content item into a
//! displayable raster image.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use serde_json::Value;
use thiserror::Error;

use artlens_core::ContentItem;

use crate::raster::ArtboardRenderer;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to read artboard document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid artboard document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a content item as a raster image.
///
/// Artboard records are rendered through [`ArtboardRenderer`] against the
/// record's source directory (or an explicit override). A path item is
/// rendered as an artboard when it points at a JSON document, otherwise
/// decoded directly; a root image that fails to decode is a hard error,
/// unlike assets embedded in a scene.
pub fn load_content(
    item: &ContentItem,
    base_directory: Option<&Path>,
) -> Result<RgbaImage, RenderError> {
    match item {
        ContentItem::Artboard(record) => {
            let base = base_directory
                .map(Path::to_path_buf)
                .unwrap_or_else(|| parent_of(Path::new(&record.source_path)));
            let renderer = ArtboardRenderer::new(base);
            Ok(renderer.render_artboard(&record.data, None, None))
        }
        ContentItem::Image(path) => {
            if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
                render_artboard_file(path, base_directory)
            } else {
                let decoded = image::open(path).map_err(|source| RenderError::Image {
                    path: path.clone(),
                    source,
                })?;
                Ok(decoded.to_rgba8())
            }
        }
    }
}

fn render_artboard_file(
    path: &Path,
    base_directory: Option<&Path>,
) -> Result<RgbaImage, RenderError> {
    let raw = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data: Value = serde_json::from_str(&raw).map_err(|source| RenderError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let base = base_directory
        .map(Path::to_path_buf)
        .unwrap_or_else(|| parent_of(path));
    let renderer = ArtboardRenderer::new(base);
    Ok(renderer.render_artboard(&data, None, None))
}

fn parent_of(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
