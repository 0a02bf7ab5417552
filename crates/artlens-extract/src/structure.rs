//! Structure discovery over an extracted bundle: manifest parsing,
//! directory classification, and enumeration of candidate artboard
//! documents.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use artlens_core::content::artboard_dimensions;

/// Recursion bound for walks over untrusted JSON trees. Deep enough for any
/// real manifest, shallow enough to keep pathological input off the stack.
pub(crate) const MAX_TREE_DEPTH: usize = 64;

/// Keys visited first when searching a manifest for embedded artboards.
const PRIORITY_KEYS: &[&str] = &["children", "elements", "artboards", "items", "content"];

/// The discovered layout of one extracted bundle. Built once per archive
/// load and discarded on the next.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectStructure {
    /// Parsed `manifest.json` from the archive root, when present and valid.
    pub manifest: Option<Value>,
    /// Artboard-like objects embedded in the manifest.
    pub manifest_artboards: Vec<ManifestArtboard>,
    /// Candidate artboard JSON documents on disk.
    pub artboard_jsons: Vec<PathBuf>,
    pub artwork_path: Option<PathBuf>,
    pub resources_path: Option<PathBuf>,
    pub graphics_path: Option<PathBuf>,
}

/// An artboard record found inside the manifest document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestArtboard {
    /// Structural path within the manifest, e.g. `.artboards[2]`.
    pub json_path: String,
    pub data: Value,
    pub name: String,
    pub width: f64,
    pub height: f64,
}

/// Inspect an extracted bundle directory.
pub fn parse_structure(root: &Path) -> ProjectStructure {
    let mut structure = ProjectStructure::default();

    let manifest_path = root.join("manifest.json");
    if manifest_path.exists() {
        match fs::read_to_string(&manifest_path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str::<Value>(&raw).map_err(|e| e.to_string()))
        {
            Ok(manifest) => {
                search_manifest(&manifest, "", 0, &mut structure.manifest_artboards);
                log::info!(
                    "manifest parsed, {} embedded artboard(s)",
                    structure.manifest_artboards.len()
                );
                structure.manifest = Some(manifest);
            }
            Err(err) => log::warn!("ignoring unreadable manifest.json: {err}"),
        }
    }

    classify_directories(root, &mut structure);

    if structure.artwork_path.is_none() {
        structure.artwork_path = fallback_artwork_path(root);
    }

    structure.artboard_jsons = find_artboard_jsons(root, &structure);
    log::info!(
        "structure: {} candidate artboard document(s)",
        structure.artboard_jsons.len()
    );

    structure
}

/// Case-insensitive check for the artboard naming convention.
pub(crate) fn mentions_board(s: &str) -> bool {
    let lower = s.to_lowercase();
    lower.contains("artboard") || lower.contains("board")
}

/// Full-tree search for objects whose `type` mentions an artboard. Priority
/// keys are visited first; every other key is still descended into.
fn search_manifest(value: &Value, path: &str, depth: usize, out: &mut Vec<ManifestArtboard>) {
    if depth > MAX_TREE_DEPTH {
        return;
    }
    match value {
        Value::Object(obj) => {
            let type_field = obj.get("type").and_then(Value::as_str).unwrap_or("");
            if mentions_board(type_field) {
                let (width, height) = artboard_dimensions(value);
                out.push(ManifestArtboard {
                    json_path: path.to_string(),
                    data: value.clone(),
                    name: manifest_name(obj),
                    width,
                    height,
                });
            }

            for key in PRIORITY_KEYS {
                if let Some(child) = obj.get(*key) {
                    search_manifest(child, &format!("{path}.{key}"), depth + 1, out);
                }
            }
            for (key, child) in obj {
                if PRIORITY_KEYS.contains(&key.as_str()) {
                    continue;
                }
                search_manifest(child, &format!("{path}.{key}"), depth + 1, out);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                search_manifest(item, &format!("{path}[{i}]"), depth + 1, out);
            }
        }
        _ => {}
    }
}

fn manifest_name(obj: &serde_json::Map<String, Value>) -> String {
    for key in ["name", "id"] {
        match obj.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    "Unknown".to_string()
}

/// Classify top-level subdirectories by name substring. Entries are visited
/// in sorted name order and the first match per category wins.
fn classify_directories(root: &Path, structure: &mut ProjectStructure) {
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    for dir in dirs {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name.contains("artwork") || name.contains("artboards") {
            if structure.artwork_path.is_none() {
                structure.artwork_path = Some(dir);
            }
        } else if name.contains("resources") {
            if structure.resources_path.is_none() {
                structure.resources_path = Some(dir);
            }
        } else if name.contains("graphics") {
            if structure.graphics_path.is_none() {
                structure.graphics_path = Some(dir);
            }
        }
    }
}

/// When no artwork directory was classified, the directory containing the
/// first artboard-named JSON file anywhere in the tree stands in for it.
fn fallback_artwork_path(root: &Path) -> Option<PathBuf> {
    let mut files = Vec::new();
    walk_files(root, &mut files);
    files
        .iter()
        .find(|f| {
            has_extension(f, "json")
                && f.file_name()
                    .map(|n| mentions_board(&n.to_string_lossy()))
                    .unwrap_or(false)
        })
        .and_then(|f| f.parent().map(Path::to_path_buf))
}

fn find_artboard_jsons(root: &Path, structure: &ProjectStructure) -> Vec<PathBuf> {
    let mut search_paths: Vec<PathBuf> = Vec::new();
    if let Some(p) = &structure.artwork_path {
        search_paths.push(p.clone());
    }
    if let Some(p) = &structure.graphics_path {
        search_paths.push(p.clone());
    }
    if search_paths.is_empty() {
        search_paths.push(root.to_path_buf());
    }

    let mut candidates = Vec::new();
    for search_path in &search_paths {
        let mut files = Vec::new();
        walk_files(search_path, &mut files);
        for file in files {
            if has_extension(&file, "json") && is_artboard_json(&file) {
                candidates.push(file);
            }
        }
    }
    candidates
}

/// A JSON file qualifies as an artboard document when its top-level object
/// has an artboard-like `type`, carries both dimensions and a child list,
/// or is named after an artboard. Unreadable or malformed files never
/// qualify.
fn is_artboard_json(path: &Path) -> bool {
    let Ok(raw) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(data) = serde_json::from_str::<Value>(&raw) else {
        log::debug!("excluding malformed JSON candidate {}", path.display());
        return false;
    };
    let Some(obj) = data.as_object() else {
        return false;
    };

    if let Some(type_field) = obj.get("type").and_then(Value::as_str) {
        if mentions_board(type_field) {
            return true;
        }
    }

    let has_dimensions = (obj.contains_key("width") || obj.contains_key("w"))
        && (obj.contains_key("height") || obj.contains_key("h"));
    let has_children = obj.contains_key("children")
        || obj.contains_key("elements")
        || obj.contains_key("content");
    if has_dimensions && has_children {
        return true;
    }

    path.file_name()
        .map(|n| mentions_board(&n.to_string_lossy()))
        .unwrap_or(false)
}

/// Depth-first file walk in deterministic order: each directory's files
/// sorted by name, then its subdirectories sorted by name.
pub(crate) fn walk_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();

    for path in &paths {
        if path.is_file() {
            out.push(path.clone());
        }
    }
    for path in &paths {
        if path.is_dir() {
            walk_files(path, out);
        }
    }
}

pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_manifest_artboards_found_anywhere() {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("manifest.json"),
            r#"{
                "meta": {"type": "application/vnd.test"},
                "artboards": [
                    {"type": "artboard", "name": "Home", "width": 375, "height": 812}
                ],
                "extras": {"nested": {"type": "Board", "id": 9}}
            }"#,
        )
        .unwrap();

        let structure = parse_structure(dir.path());
        assert!(structure.manifest.is_some());
        assert_eq!(structure.manifest_artboards.len(), 2);
        let home = &structure.manifest_artboards[0];
        assert_eq!(home.name, "Home");
        assert_eq!(home.json_path, ".artboards[0]");
        assert_eq!((home.width, home.height), (375.0, 812.0));
        assert_eq!(structure.manifest_artboards[1].name, "9");
    }

    #[test]
    fn test_malformed_manifest_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("manifest.json"), b"{not json").unwrap();
        let structure = parse_structure(dir.path());
        assert!(structure.manifest.is_none());
        assert!(structure.manifest_artboards.is_empty());
    }

    #[test]
    fn test_directory_classification_first_match_wins() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["artwork", "artwork-extra", "Resources", "graphics", "misc"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        let structure = parse_structure(dir.path());
        assert_eq!(structure.artwork_path, Some(dir.path().join("artwork")));
        assert_eq!(structure.resources_path, Some(dir.path().join("Resources")));
        assert_eq!(structure.graphics_path, Some(dir.path().join("graphics")));
    }

    #[test]
    fn test_fallback_artwork_path_from_named_json() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deep/inner");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("artboard-1.json"), b"{}").unwrap();

        let structure = parse_structure(dir.path());
        assert_eq!(structure.artwork_path, Some(nested));
    }

    #[test]
    fn test_candidate_qualification_rules() {
        init_logging();
        let dir = tempfile::tempdir().unwrap();

        // (a) top-level type mentions a board.
        fs::write(dir.path().join("a.json"), r#"{"type": "artboard"}"#).unwrap();
        // (b) dimensions plus a child list.
        fs::write(
            dir.path().join("b.json"),
            r#"{"w": 100, "height": 50, "children": []}"#,
        )
        .unwrap();
        // (c) filename mentions a board.
        fs::write(dir.path().join("board-c.json"), r#"{"x": 1}"#).unwrap();
        // Disqualified: no rule applies.
        fs::write(dir.path().join("settings.json"), r#"{"theme": "dark"}"#).unwrap();
        // Disqualified: malformed, despite the filename.
        fs::write(dir.path().join("board-bad.json"), b"{oops").unwrap();
        // Disqualified: not an object.
        fs::write(dir.path().join("board-list.json"), b"[1, 2]").unwrap();

        let structure = parse_structure(dir.path());
        let names: Vec<_> = structure
            .artboard_jsons
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json", "board-c.json"]);
    }

    #[test]
    fn test_depth_bound_stops_recursion() {
        // A manifest nested past the bound must not overflow the stack.
        let mut value = serde_json::json!({"type": "artboard"});
        for _ in 0..200 {
            value = serde_json::json!({"wrap": value});
        }
        let mut out = Vec::new();
        search_manifest(&value, "", 0, &mut out);
        assert!(out.is_empty());
    }
}
