use std::path::Path;
use tracing::{debug, info};

use super::pattern::WildcardPattern;
use super::processor::ContentScanner;
use super::traverse::{CandidateFile, Traverser};
use crate::config::{SearchConfig, SearchOptions};
use crate::errors::{SearchError, SearchResult};
use crate::filters::FileFilter;
use crate::fs::{FileSystem, OsFileSystem};
use crate::metrics::ScanMetrics;
use crate::progress::ProgressSink;
use crate::results::{group_by_file, FileReport, MatchHit};

/// Runs discovery and content searches against a [`FileSystem`], optionally
/// reporting progress to a [`ProgressSink`].
pub struct Searcher<'a> {
    fs: &'a dyn FileSystem,
    progress: Option<&'a dyn ProgressSink>,
    metrics: ScanMetrics,
}

impl Default for Searcher<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Searcher<'static> {
    /// A searcher over the real filesystem with no progress sink
    pub fn new() -> Self {
        Searcher {
            fs: &OsFileSystem,
            progress: None,
            metrics: ScanMetrics::new(),
        }
    }
}

impl<'a> Searcher<'a> {
    /// Uses `fs` instead of the operating system
    pub fn with_file_system<'b>(self, fs: &'b dyn FileSystem) -> Searcher<'b>
    where
        'a: 'b,
    {
        Searcher {
            fs,
            progress: self.progress,
            metrics: self.metrics,
        }
    }

    /// Sends progress and warning events to `sink`
    pub fn with_progress<'b>(self, sink: &'b dyn ProgressSink) -> Searcher<'b>
    where
        'a: 'b,
    {
        Searcher {
            fs: self.fs,
            progress: Some(sink),
            metrics: self.metrics,
        }
    }

    /// Counters from the most recent operation
    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    /// Lists the files under `root` whose names match `include` and whose
    /// paths match none of `exclude`, deepest directories first.
    pub fn discover(
        &self,
        root: &Path,
        include: &[String],
        exclude: &[String],
    ) -> SearchResult<Vec<CandidateFile>> {
        self.metrics.reset();
        let filter = FileFilter::new(include, exclude)?;
        Traverser::new(self.fs, &filter, &self.metrics, self.progress).discover(root)
    }

    /// Every line under `root` matching `text_pattern`, grouped by file in
    /// discovery order and ascending by line within a file.
    pub fn search(
        &self,
        root: &Path,
        include: &[String],
        exclude: &[String],
        text_pattern: &str,
        options: &SearchOptions,
    ) -> SearchResult<Vec<MatchHit>> {
        info!(
            "Starting search for '{}' under {}",
            text_pattern,
            root.display()
        );
        self.metrics.reset();

        let text_pattern = text_pattern.trim();
        if text_pattern.is_empty() {
            return Err(SearchError::empty_pattern("text pattern"));
        }
        let filter = FileFilter::new(include, exclude)?;
        let matcher = WildcardPattern::new(text_pattern)?;

        let candidates =
            Traverser::new(self.fs, &filter, &self.metrics, self.progress).discover(root)?;
        debug!("Scanning {} candidate files", candidates.len());

        let scanner = ContentScanner::new(
            self.fs,
            &matcher,
            options,
            &self.metrics,
            self.progress,
        );
        let mut hits = Vec::new();
        for candidate in &candidates {
            hits.extend(scanner.scan(candidate)?);
        }

        self.metrics.log_stats();
        info!(
            "Search complete. Found {} matching lines in {} candidate files",
            hits.len(),
            candidates.len()
        );
        Ok(hits)
    }

    /// [`Searcher::search`] folded into one report per file
    pub fn search_grouped_by_file(
        &self,
        root: &Path,
        include: &[String],
        exclude: &[String],
        text_pattern: &str,
        options: &SearchOptions,
    ) -> SearchResult<Vec<FileReport>> {
        let hits = self.search(root, include, exclude, text_pattern, options)?;
        Ok(group_by_file(hits))
    }

    /// Runs the request described by `config`
    pub fn search_config(&self, config: &SearchConfig) -> SearchResult<Vec<FileReport>> {
        config.validate()?;
        self.search_grouped_by_file(
            &config.root_path,
            &config.include_patterns,
            &config.exclude_patterns,
            &config.text_pattern,
            &config.options,
        )
    }
}

/// Lists candidate files using the real filesystem. See [`Searcher::discover`].
pub fn discover(
    root: &Path,
    include: &[String],
    exclude: &[String],
) -> SearchResult<Vec<CandidateFile>> {
    Searcher::new().discover(root, include, exclude)
}

/// Searches using the real filesystem. See [`Searcher::search`].
pub fn search(
    root: &Path,
    include: &[String],
    exclude: &[String],
    text_pattern: &str,
    options: &SearchOptions,
) -> SearchResult<Vec<MatchHit>> {
    Searcher::new().search(root, include, exclude, text_pattern, options)
}

/// Searches using the real filesystem and groups the hits per file.
/// See [`Searcher::search_grouped_by_file`].
pub fn search_grouped_by_file(
    root: &Path,
    include: &[String],
    exclude: &[String],
    text_pattern: &str,
    options: &SearchOptions,
) -> SearchResult<Vec<FileReport>> {
    Searcher::new().search_grouped_by_file(root, include, exclude, text_pattern, options)
}
