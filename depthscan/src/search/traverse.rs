//! Deepest-first directory traversal.
//!
//! Directories are walked with an explicit work stack, so depth is limited by
//! memory rather than the call stack, and a directory that cannot be listed
//! only costs one loop iteration.
use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use crate::errors::{SearchError, SearchResult};
use crate::filters::FileFilter;
use crate::fs::FileSystem;
use crate::metrics::ScanMetrics;
use crate::progress::{emit, ProgressEvent, ProgressSink};

/// A file that passed the name filters and is waiting to be scanned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File name without directory
    pub name: String,
    /// Depth of the containing directory; files directly in the root are 0
    pub depth: usize,
    /// Size reported while listing
    pub size_bytes: u64,
}

/// Walks a tree and collects the files accepted by a [`FileFilter`]
pub struct Traverser<'a> {
    fs: &'a dyn FileSystem,
    filter: &'a FileFilter,
    metrics: &'a ScanMetrics,
    progress: Option<&'a dyn ProgressSink>,
}

impl<'a> Traverser<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        filter: &'a FileFilter,
        metrics: &'a ScanMetrics,
        progress: Option<&'a dyn ProgressSink>,
    ) -> Self {
        Self {
            fs,
            filter,
            metrics,
            progress,
        }
    }

    /// Collects candidates under `root`, deepest first and alphabetical
    /// within a depth. Only an unusable root is an error.
    pub fn discover(&self, root: &Path) -> SearchResult<Vec<CandidateFile>> {
        if !self.fs.is_dir(root) {
            return Err(SearchError::invalid_root(root));
        }

        let mut stack: Vec<(PathBuf, usize)> = vec![(root.to_path_buf(), 0)];
        let mut candidates = Vec::new();

        while let Some((dir, depth)) = stack.pop() {
            self.metrics.record_directory();
            emit(
                self.progress,
                ProgressEvent::DirectoryEntered { path: &dir, depth },
            );
            trace!("Entering {} at depth {}", dir.display(), depth);

            // a node whose subdirectories cannot be listed is skipped whole
            let subdirs = match self.fs.list_dirs(&dir) {
                Ok(subdirs) => subdirs,
                Err(e) => {
                    self.recover(SearchError::enumeration_failure(&dir, e))?;
                    continue;
                }
            };
            stack.extend(subdirs.into_iter().map(|sub| (sub, depth + 1)));

            let files = match self.fs.list_files(&dir) {
                Ok(files) => files,
                Err(e) => {
                    self.recover(SearchError::enumeration_failure(&dir, e))?;
                    continue;
                }
            };
            for file in files {
                if !self.filter.should_include_file(&file.name, &file.path) {
                    continue;
                }
                candidates.push(CandidateFile {
                    path: file.path,
                    name: file.name,
                    depth,
                    size_bytes: file.size_bytes,
                });
            }
        }

        candidates.sort_by(deepest_first);
        self.metrics.record_discovered(candidates.len() as u64);
        debug!(
            "Discovered {} candidate files under {}",
            candidates.len(),
            root.display()
        );
        Ok(candidates)
    }

    /// Logs and reports a recoverable failure; anything else is handed back.
    fn recover(&self, err: SearchError) -> SearchResult<()> {
        if !err.is_recoverable() {
            return Err(err);
        }
        self.metrics.record_enumeration_failure();
        warn!("{}", err);
        if let SearchError::EnumerationFailure { path, .. } = &err {
            let message = err.to_string();
            emit(
                self.progress,
                ProgressEvent::Warning {
                    path,
                    message: &message,
                },
            );
        }
        Ok(())
    }
}

/// Depth descending, then name (case-insensitive, then exact), then path.
fn deepest_first(a: &CandidateFile, b: &CandidateFile) -> Ordering {
    b.depth
        .cmp(&a.depth)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.path.cmp(&b.path))
}
