//! File discovery for finding images in directories.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::DiscoveryConfig;

/// Discovers image files in directories.
pub struct FileDiscovery {
    config: DiscoveryConfig,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Discover all supported image files at a path.
    ///
    /// A file is returned as-is (content is validated later, so the extension
    /// is not checked). A directory yields its supported files, sorted by
    /// path; subdirectories are walked only when `recursive` is set.
    pub fn discover(&self, path: &Path) -> Vec<PathBuf> {
        if path.is_file() {
            return vec![path.to_path_buf()];
        }

        let max_depth = if self.config.recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!("Skipping unreadable entry: {err}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.is_supported(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        files.sort();
        files
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
