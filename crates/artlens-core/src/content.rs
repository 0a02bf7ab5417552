use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One selectable unit in a loaded project's content list: either a plain
/// image asset on disk or an artboard record carrying its raw scene data.
///
/// Serializes as either a bare path string or a record object, matching the
/// shape a UI host receives over IPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentItem {
    Artboard(ArtboardRecord),
    Image(PathBuf),
}

/// Where an artboard record was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtboardSource {
    #[serde(rename = "artboard_json")]
    Json,
    #[serde(rename = "artboard_manifest")]
    Manifest,
}

/// An artboard discovered during extraction, with enough metadata for a
/// sidebar listing and the raw scene data for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtboardRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub source: ArtboardSource,
    /// Filesystem path for `Json` records; structural manifest path
    /// (e.g. `.artboards[2]`) for `Manifest` records.
    #[serde(rename = "path")]
    pub source_path: String,
    pub data: Value,
    pub name: String,
    pub width: f64,
    pub height: f64,
}

impl ArtboardRecord {
    pub fn new(
        source: ArtboardSource,
        source_path: String,
        data: Value,
        name: String,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            source_path,
            data,
            name,
            width,
            height,
        }
    }
}

/// Resolve the display name of an artboard loaded from a standalone JSON
/// file: `name`, `id`, `title`, `label` in order, falling back to the
/// source file stem.
pub fn artboard_display_name(data: &Value, source_path: &Path) -> String {
    for key in ["name", "id", "title", "label"] {
        match data.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    source_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Width/height of an artboard document (`width|w`, `height|h`), defaulting
/// to 0 when absent.
pub fn artboard_dimensions(data: &Value) -> (f64, f64) {
    let dim = |keys: [&str; 2]| {
        keys.iter()
            .find_map(|k| data.get(k))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    };
    (dim(["width", "w"]), dim(["height", "h"]))
}
