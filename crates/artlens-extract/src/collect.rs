//! The collection pass: turn a discovered structure into the ordered
//! content list. JSON-file artboards come first, then manifest-embedded
//! artboards, then orphan image assets sorted by path.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde_json::Value;

use artlens_core::content::{artboard_dimensions, artboard_display_name};
use artlens_core::{ArtboardRecord, ArtboardSource, ContentItem};

use crate::structure::{has_extension, walk_files, ProjectStructure, MAX_TREE_DEPTH};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "svg"];

/// Build the content list for one extracted bundle.
pub fn collect_content(root: &Path, structure: &ProjectStructure) -> Vec<ContentItem> {
    let mut items: Vec<ContentItem> = Vec::new();

    // JSON-file artboards always precede manifest entries.
    for json_path in &structure.artboard_jsons {
        let data = match fs::read_to_string(json_path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str::<Value>(&raw).map_err(|e| e.to_string()))
        {
            Ok(data) => data,
            Err(err) => {
                log::debug!("skipping artboard {}: {err}", json_path.display());
                continue;
            }
        };
        let (width, height) = artboard_dimensions(&data);
        let name = artboard_display_name(&data, json_path);
        items.push(ContentItem::Artboard(ArtboardRecord::new(
            ArtboardSource::Json,
            json_path.to_string_lossy().into_owned(),
            data,
            name,
            width,
            height,
        )));
    }

    for embedded in &structure.manifest_artboards {
        items.push(ContentItem::Artboard(ArtboardRecord::new(
            ArtboardSource::Manifest,
            embedded.json_path.clone(),
            embedded.data.clone(),
            embedded.name.clone(),
            embedded.width,
            embedded.height,
        )));
    }

    let mut images: BTreeSet<PathBuf> = BTreeSet::new();
    if let Some(path) = &structure.artwork_path {
        find_images_in(path, &mut images);
    }
    if let Some(path) = &structure.resources_path {
        find_images_in(path, &mut images);
    }
    find_images_in(root, &mut images);
    find_referenced_images(root, &mut images);

    // An image that an artboard already references is that artboard's
    // dependency, not a standalone content item.
    let orphans: Vec<PathBuf> = images
        .into_iter()
        .filter(|image| !image_referenced(&items, image))
        .collect();
    log::info!(
        "collected {} artboard(s) and {} standalone image(s)",
        items.len(),
        orphans.len()
    );
    items.extend(orphans.into_iter().map(ContentItem::Image));

    items
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|e| {
            let lower = e.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

fn find_images_in(dir: &Path, out: &mut BTreeSet<PathBuf>) {
    let mut files = Vec::new();
    walk_files(dir, &mut files);
    for file in files {
        if is_image_path(&file) {
            out.insert(normalize(&file));
        }
    }
}

/// Scan every JSON document in the tree for string values that name an
/// existing image file, either by a recognized extension or by looking
/// like a relative path.
fn find_referenced_images(root: &Path, out: &mut BTreeSet<PathBuf>) {
    let mut files = Vec::new();
    walk_files(root, &mut files);
    for file in files {
        if !has_extension(&file, "json") {
            continue;
        }
        let Ok(raw) = fs::read_to_string(&file) else {
            continue;
        };
        let Ok(data) = serde_json::from_str::<Value>(&raw) else {
            continue;
        };
        for_each_string(&data, 0, &mut |s| {
            let lower = s.to_lowercase();
            let looks_like_image = IMAGE_EXTENSIONS
                .iter()
                .any(|ext| lower.ends_with(&format!(".{ext}")));
            let looks_like_path = s.contains('/') || s.contains('\\');
            if !looks_like_image && !looks_like_path {
                return;
            }
            let candidate = root.join(s);
            if candidate.is_file() {
                out.insert(normalize(&candidate));
            }
        });
    }
}

fn image_referenced(items: &[ContentItem], image: &Path) -> bool {
    let file_name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let full_path = image.to_string_lossy();

    items.iter().any(|item| match item {
        ContentItem::Artboard(record) => {
            any_string(&record.data, 0, &|s| {
                s.contains(file_name.as_str()) || s.contains(full_path.as_ref())
            })
        }
        ContentItem::Image(_) => false,
    })
}

/// Visit every string value in a JSON tree, depth-bounded.
fn for_each_string(value: &Value, depth: usize, visit: &mut dyn FnMut(&str)) {
    if depth > MAX_TREE_DEPTH {
        return;
    }
    match value {
        Value::String(s) => visit(s),
        Value::Array(items) => {
            for item in items {
                for_each_string(item, depth + 1, visit);
            }
        }
        Value::Object(obj) => {
            for child in obj.values() {
                for_each_string(child, depth + 1, visit);
            }
        }
        _ => {}
    }
}

fn any_string(value: &Value, depth: usize, pred: &dyn Fn(&str) -> bool) -> bool {
    if depth > MAX_TREE_DEPTH {
        return false;
    }
    match value {
        Value::String(s) => pred(s),
        Value::Array(items) => items.iter().any(|item| any_string(item, depth + 1, pred)),
        Value::Object(obj) => obj.values().any(|child| any_string(child, depth + 1, pred)),
        _ => false,
    }
}

/// Lexical normalization, the `normpath` analog: drops `.` and resolves
/// `..` without consulting the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
