//! Expands upload inputs (files, directories, URLs) into concrete upload items.

use crate::error::{RemoError, Result};
use mime_guess::Mime;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;
use walkdir::WalkDir;

/// Annotation file types accepted alongside images when a task is set.
const ANNOTATION_EXTENSIONS: &[&str] = &["json", "csv", "xml"];

/// Decides whether a file can take part in an annotation-task upload.
pub type TaskFilter = Arc<dyn Fn(&Path, Option<&Mime>) -> bool + Send + Sync>;

/// A concrete uploadable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedFile {
    /// Local file with its size at resolution time
    Local { path: PathBuf, size: u64 },
    /// Remote file ingested by the server; counts as zero bytes when batching
    Remote { url: Url },
}

impl ResolvedFile {
    /// Byte size used for batching.
    pub fn size(&self) -> u64 {
        match self {
            ResolvedFile::Local { size, .. } => *size,
            ResolvedFile::Remote { .. } => 0,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ResolvedFile::Remote { .. })
    }

    /// File name as sent to the server.
    pub fn name(&self) -> String {
        match self {
            ResolvedFile::Local { path, .. } => path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("file")
                .to_string(),
            ResolvedFile::Remote { url } => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|name| !name.is_empty())
                .unwrap_or("file")
                .to_string(),
        }
    }
}

impl fmt::Display for ResolvedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedFile::Local { path, .. } => write!(f, "{}", path.display()),
            ResolvedFile::Remote { url } => write!(f, "{url}"),
        }
    }
}

/// Guess the MIME type of a file from its name.
pub fn mime_type_for_file(path: &Path) -> Option<Mime> {
    mime_guess::from_path(path).first()
}

/// Default task filter: images plus annotation files.
pub fn is_task_compatible(path: &Path, mime: Option<&Mime>) -> bool {
    if mime.is_some_and(|m| m.type_().as_str() == "image") {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ANNOTATION_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Turns heterogeneous inputs into a flat, deduplicated file list.
#[derive(Clone)]
pub struct FileResolver {
    /// Walk directories fully, or only their direct children
    recursive: bool,
    follow_links: bool,
    /// Log and skip missing paths instead of failing
    skip_missing: bool,
    /// Apply `filter` to every resolved entry
    annotation_task: bool,
    filter: TaskFilter,
}

impl Default for FileResolver {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_links: false,
            skip_missing: false,
            annotation_task: false,
            filter: Arc::new(is_task_compatible),
        }
    }
}

impl fmt::Debug for FileResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileResolver")
            .field("recursive", &self.recursive)
            .field("follow_links", &self.follow_links)
            .field("skip_missing", &self.skip_missing)
            .field("annotation_task", &self.annotation_task)
            .finish_non_exhaustive()
    }
}

impl FileResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    #[must_use]
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    #[must_use]
    pub fn skip_missing(mut self, skip: bool) -> Self {
        self.skip_missing = skip;
        self
    }

    /// Enable annotation-task filtering.
    #[must_use]
    pub fn annotation_task(mut self, active: bool) -> Self {
        self.annotation_task = active;
        self
    }

    /// Replace the task compatibility predicate.
    #[must_use]
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Path, Option<&Mime>) -> bool + Send + Sync + 'static,
    {
        self.filter = Arc::new(filter);
        self
    }

    /// Resolve inputs in order, keeping the first occurrence of each file.
    pub fn resolve<S: AsRef<str>>(&self, inputs: &[S]) -> Result<Vec<ResolvedFile>> {
        let mut resolved = Vec::new();
        let mut seen_paths = HashSet::new();
        let mut seen_urls = HashSet::new();

        for input in inputs {
            let input = input.as_ref().trim();

            if let Some(url) = parse_remote(input) {
                if !self.accepts(Path::new(url.path())) {
                    debug!(url = %url, "Skipping URL incompatible with annotation task");
                    continue;
                }
                if seen_urls.insert(url.as_str().to_string()) {
                    resolved.push(ResolvedFile::Remote { url });
                }
                continue;
            }

            let path = Path::new(input);
            if !path.exists() {
                if self.skip_missing {
                    warn!(path = %path.display(), "Skipping missing upload path");
                    continue;
                }
                return Err(RemoError::FileNotFound(path.display().to_string()));
            }

            for file in self.expand(path) {
                if !self.accepts(&file) {
                    debug!(path = %file.display(), "Skipping file incompatible with annotation task");
                    continue;
                }
                let canonical = std::fs::canonicalize(&file).unwrap_or_else(|_| file.clone());
                if !seen_paths.insert(canonical) {
                    continue;
                }
                let size = std::fs::metadata(&file)?.len();
                resolved.push(ResolvedFile::Local { path: file, size });
            }
        }

        debug!(inputs = inputs.len(), files = resolved.len(), "Resolved upload inputs");
        Ok(resolved)
    }

    fn accepts(&self, path: &Path) -> bool {
        !self.annotation_task || (self.filter)(path, mime_type_for_file(path).as_ref())
    }

    /// A file yields itself; a directory yields its files in name order.
    fn expand(&self, path: &Path) -> Vec<PathBuf> {
        if !path.is_dir() {
            return vec![path.to_path_buf()];
        }

        let mut walker = WalkDir::new(path)
            .follow_links(self.follow_links)
            .sort_by_file_name();
        if !self.recursive {
            walker = walker.max_depth(1);
        }

        walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Failed to read directory entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .collect()
    }
}

fn parse_remote(input: &str) -> Option<Url> {
    Url::parse(input)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}
