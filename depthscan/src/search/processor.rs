use encoding_rs::{Encoding, UTF_16LE, UTF_8};
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, trace, warn};

use super::encoding::{
    default_encoding, detect_bom, detect_newline, read_head, read_newline_sample, DecodedLines,
};
use super::pattern::WildcardPattern;
use super::snippet::build_snippet;
use super::traverse::CandidateFile;
use crate::config::SearchOptions;
use crate::errors::{SearchError, SearchResult};
use crate::fs::FileSystem;
use crate::metrics::ScanMetrics;
use crate::progress::{emit, ProgressEvent, ProgressSink};
use crate::results::{MatchHit, NewlineStyle};

/// Encodings retried, in order, when a file without a byte-order mark
/// produced nothing under the default encoding.
fn fallback_encodings() -> [&'static Encoding; 2] {
    [UTF_8, UTF_16LE]
}

/// Outcome of one line-by-line pass over a file
struct Pass {
    encoding: &'static Encoding,
    /// Whether a byte-order mark chose `encoding`
    bom_confirmed: bool,
    /// (line number, snippet)
    hits: Vec<(usize, String)>,
}

/// Scans candidate files line by line against a wildcard pattern
pub struct ContentScanner<'a> {
    fs: &'a dyn FileSystem,
    pattern: &'a WildcardPattern,
    options: &'a SearchOptions,
    metrics: &'a ScanMetrics,
    progress: Option<&'a dyn ProgressSink>,
}

impl<'a> ContentScanner<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        pattern: &'a WildcardPattern,
        options: &'a SearchOptions,
        metrics: &'a ScanMetrics,
        progress: Option<&'a dyn ProgressSink>,
    ) -> Self {
        Self {
            fs,
            pattern,
            options,
            metrics,
            progress,
        }
    }

    /// Returns the matching lines of `candidate` in line order. Oversized
    /// files are skipped; a file that cannot be read yields a warning and no
    /// hits, even if some lines matched before the failure. Only errors the
    /// search cannot continue past are returned.
    pub fn scan(&self, candidate: &CandidateFile) -> SearchResult<Vec<MatchHit>> {
        if candidate.size_bytes > self.options.max_file_size_bytes {
            trace!(
                "Skipping {} ({} bytes over the {} byte limit)",
                candidate.path.display(),
                candidate.size_bytes - self.options.max_file_size_bytes,
                self.options.max_file_size_bytes
            );
            self.metrics.record_oversize_skip(candidate.size_bytes);
            return Ok(Vec::new());
        }

        match self.scan_file(&candidate.path) {
            Ok(hits) => {
                self.metrics.record_scan(hits.len() as u64);
                emit(
                    self.progress,
                    ProgressEvent::FileScanned {
                        path: &candidate.path,
                        hits: hits.len(),
                    },
                );
                Ok(hits)
            }
            Err(err) if err.is_recoverable() => {
                self.metrics.record_read_failure();
                warn!("{}", err);
                let message = err.to_string();
                emit(
                    self.progress,
                    ProgressEvent::Warning {
                        path: &candidate.path,
                        message: &message,
                    },
                );
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    fn scan_file(&self, path: &Path) -> SearchResult<Vec<MatchHit>> {
        let mut pass = self.run_pass(path, None)?;

        if pass.hits.is_empty() && !pass.bom_confirmed && self.options.allow_encoding_fallback {
            for encoding in fallback_encodings() {
                debug!("Retrying {} as {}", path.display(), encoding.name());
                let retry = self.run_pass(path, Some(encoding))?;
                if !retry.hits.is_empty() {
                    pass = retry;
                    break;
                }
            }
            self.metrics.record_fallback(!pass.hits.is_empty());
        }

        if pass.hits.is_empty() {
            return Ok(Vec::new());
        }

        let newline = self.detect_newline(path, pass.encoding)?;
        let encoding = pass.encoding.name().to_string();
        debug!(
            "{} matching lines in {} ({}, {})",
            pass.hits.len(),
            path.display(),
            encoding,
            newline
        );

        Ok(pass
            .hits
            .into_iter()
            .map(|(line_number, snippet)| MatchHit {
                path: path.to_path_buf(),
                line_number,
                snippet,
                encoding: encoding.clone(),
                newline,
            })
            .collect())
    }

    /// One full pass over `path`. With `forced` unset the encoding comes from
    /// the byte-order mark, or the default encoding when there is none.
    fn run_pass(&self, path: &Path, forced: Option<&'static Encoding>) -> SearchResult<Pass> {
        let mut reader = self
            .fs
            .open(path)
            .map_err(|e| SearchError::read_failure(path, e))?;

        let (encoding, bom_confirmed, head) = match forced {
            Some(encoding) => (encoding, false, Vec::new()),
            None => {
                let head = read_head(&mut reader).map_err(|e| SearchError::read_failure(path, e))?;
                match detect_bom(&head) {
                    Some((encoding, len)) => (encoding, true, head[len..].to_vec()),
                    None => (default_encoding(), false, head),
                }
            }
        };

        let mut hits = Vec::new();
        for (index, line) in DecodedLines::new(Cursor::new(head).chain(reader), encoding).enumerate() {
            let line = line.map_err(|e| SearchError::read_failure(path, e))?;
            if !self.pattern.is_match(&line) {
                continue;
            }
            let (start, len) = self.pattern.find(&line).unwrap_or((0, 0));
            trace!("Match at {}:{}", path.display(), index + 1);
            hits.push((
                index + 1,
                build_snippet(&line, start, len, self.options.max_snippet_chars),
            ));
        }

        Ok(Pass {
            encoding,
            bom_confirmed,
            hits,
        })
    }

    fn detect_newline(&self, path: &Path, encoding: &'static Encoding) -> SearchResult<NewlineStyle> {
        let reader = self
            .fs
            .open(path)
            .map_err(|e| SearchError::read_failure(path, e))?;
        let sample = read_newline_sample(reader, encoding)
            .map_err(|e| SearchError::read_failure(path, e))?;
        Ok(detect_newline(&sample, encoding))
    }
}
