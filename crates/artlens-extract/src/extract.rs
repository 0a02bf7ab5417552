//! Bundle extraction: unpack a zip archive into an owned working directory
//! and produce the ordered content list.

use std::fs::File;
use std::path::Path;

use tempfile::TempDir;
use thiserror::Error;
use zip::ZipArchive;

use artlens_core::ContentItem;

use crate::collect;
use crate::structure;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("not a valid design bundle: {0}")]
    InvalidArchive(#[from] zip::result::ZipError),

    #[error("no visual content found in bundle")]
    NoVisualContent,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Owns the transient working directory a bundle is unpacked into.
///
/// Exactly one working directory exists per extractor; a new extraction
/// replaces the previous one. The directory is deleted on [`cleanup`],
/// before the next extraction, and when the extractor is dropped. Error
/// paths are covered too: an extraction that fails never installs its
/// directory.
///
/// [`cleanup`]: ContentExtractor::cleanup
#[derive(Debug, Default)]
pub struct ContentExtractor {
    working_dir: Option<TempDir>,
}

impl ContentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unpack a bundle and collect its renderable content.
    ///
    /// Fails on an invalid zip signature and when the bundle yields no
    /// content at all; the content list is produced whole or not at all.
    pub fn extract_content(&mut self, archive_path: &Path) -> Result<Vec<ContentItem>, ExtractError> {
        self.cleanup();

        let staging = tempfile::Builder::new().prefix("artlens_").tempdir()?;

        let file = File::open(archive_path)?;
        let mut archive = ZipArchive::new(file)?;
        archive.extract(staging.path())?;
        log::info!(
            "extracted {} entries from {} to {}",
            archive.len(),
            archive_path.display(),
            staging.path().display()
        );

        let project = structure::parse_structure(staging.path());
        let items = collect::collect_content(staging.path(), &project);
        if items.is_empty() {
            return Err(ExtractError::NoVisualContent);
        }

        self.working_dir = Some(staging);
        Ok(items)
    }

    /// The current working directory, when a bundle is loaded.
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_ref().map(TempDir::path)
    }

    /// Release the working directory. Deletion failures are logged and
    /// otherwise ignored.
    pub fn cleanup(&mut self) {
        if let Some(dir) = self.working_dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(err) = dir.close() {
                log::warn!("failed to remove working directory {}: {err}", path.display());
            }
        }
    }
}
