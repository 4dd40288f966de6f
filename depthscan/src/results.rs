//! Search result types and per-file aggregation.
//!
//! A search produces a flat, ordered list of [`MatchHit`]s: grouped by file
//! in traversal order, ascending by line inside a file. [`group_by_file`]
//! folds that list into one [`FileReport`] per file for display.
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Line terminator convention detected for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NewlineStyle {
    Crlf,
    Lf,
    Cr,
    Mixed,
    Unknown,
}

impl NewlineStyle {
    /// Classifies terminator counts. `cr` and `lf` exclude the ones that
    /// were part of a `\r\n` pair.
    pub fn classify(crlf: usize, cr: usize, lf: usize) -> Self {
        match (crlf > 0, cr > 0, lf > 0) {
            (false, false, false) => Self::Unknown,
            (true, false, false) => Self::Crlf,
            (false, true, false) => Self::Cr,
            (false, false, true) => Self::Lf,
            _ => Self::Mixed,
        }
    }
}

impl fmt::Display for NewlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Crlf => "CRLF",
            Self::Lf => "LF",
            Self::Cr => "CR",
            Self::Mixed => "Mixed",
            Self::Unknown => "Unknown",
        })
    }
}

/// One matching line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchHit {
    /// The file the line came from
    pub path: PathBuf,
    /// 1-based line number
    pub line_number: usize,
    /// Bounded excerpt of the line around the match
    pub snippet: String,
    /// Name of the encoding that decoded the line, e.g. `UTF-8`
    pub encoding: String,
    /// Newline convention of the whole file
    pub newline: NewlineStyle,
}

/// A matching line inside a [`FileReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineHit {
    pub line_number: usize,
    pub snippet: String,
}

/// All matching lines of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub file_name: String,
    pub encoding: String,
    pub newline: NewlineStyle,
    /// Strictly increasing by line number
    pub lines: Vec<LineHit>,
}

impl FileReport {
    fn from_first(hit: &MatchHit) -> Self {
        Self {
            path: hit.path.clone(),
            file_name: hit
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            encoding: hit.encoding.clone(),
            newline: hit.newline,
            lines: Vec::new(),
        }
    }
}

/// Groups hits by path, keeping the order in which files first appear.
/// Encoding and newline style come from a file's first hit; the scanner
/// guarantees they agree across all of its hits.
pub fn group_by_file(hits: Vec<MatchHit>) -> Vec<FileReport> {
    let mut reports: Vec<FileReport> = Vec::new();
    let mut index: HashMap<PathBuf, usize> = HashMap::new();

    for hit in hits {
        let slot = match index.get(&hit.path) {
            Some(&slot) => slot,
            None => {
                reports.push(FileReport::from_first(&hit));
                index.insert(hit.path.clone(), reports.len() - 1);
                reports.len() - 1
            }
        };
        reports[slot].lines.push(LineHit {
            line_number: hit.line_number,
            snippet: hit.snippet,
        });
    }

    for report in &mut reports {
        report.lines.sort_by_key(|line| line.line_number);
    }
    reports
}

/// Total number of matching lines across `reports`
pub fn total_matches(reports: &[FileReport]) -> usize {
    reports.iter().map(|r| r.lines.len()).sum()
}
