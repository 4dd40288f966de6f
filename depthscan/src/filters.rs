//! File-name filtering applied during traversal.
//!
//! Include patterns are tested against the bare file name, exclude patterns
//! against the full path, both in the wildcard dialect from
//! [`crate::search::pattern`]. A file is kept when some include pattern
//! matches and no exclude pattern does.
use std::path::Path;

use crate::errors::{SearchError, SearchResult};
use crate::search::pattern::WildcardPattern;

/// Trims every entry and drops the blank ones.
pub fn normalize_patterns(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compiled include/exclude filters
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: Vec<WildcardPattern>,
    exclude: Vec<WildcardPattern>,
}

impl FileFilter {
    /// Builds a filter. An include list with nothing left after
    /// normalisation is an error; an empty exclude list just excludes nothing.
    pub fn new(include: &[String], exclude: &[String]) -> SearchResult<Self> {
        let include = normalize_patterns(include);
        if include.is_empty() {
            return Err(SearchError::empty_pattern("include patterns"));
        }
        Ok(Self {
            include: WildcardPattern::compile_all(&include)?,
            exclude: WildcardPattern::compile_all(&normalize_patterns(exclude))?,
        })
    }

    /// Whether `name` matches an include pattern
    pub fn is_included(&self, name: &str) -> bool {
        self.include.iter().any(|p| p.is_match(name))
    }

    /// Whether `path` matches an exclude pattern
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let path_str = path.to_string_lossy();
        self.exclude.iter().any(|p| p.is_match(&path_str))
    }

    /// Determines if a file should become a search candidate
    pub fn should_include_file(&self, name: &str, path: &Path) -> bool {
        self.is_included(name) && !self.is_excluded(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_patterns() {
        let normalized = normalize_patterns(&strings(&[" *.rs ", "", "   ", "*.toml"]));
        assert_eq!(normalized, strings(&["*.rs", "*.toml"]));
    }

    #[test]
    fn test_empty_include_is_rejected() {
        let err = FileFilter::new(&strings(&["", "  "]), &[]).unwrap_err();
        assert!(matches!(err, SearchError::EmptyPattern(_)));

        let err = FileFilter::new(&[], &[]).unwrap_err();
        assert!(matches!(err, SearchError::EmptyPattern(_)));
    }

    #[test]
    fn test_include_matches_name_only() {
        let filter = FileFilter::new(&strings(&["*.rs", "Cargo.*"]), &[]).unwrap();
        assert!(filter.should_include_file("main.rs", Path::new("src/main.rs")));
        assert!(filter.should_include_file("cargo.toml", Path::new("cargo.toml")));
        assert!(!filter.should_include_file("main.py", Path::new("src/main.rs.d/main.py")));
    }

    #[test]
    fn test_exclude_matches_full_path() {
        let filter = FileFilter::new(&strings(&["*"]), &strings(&["*/target/*", "*.tmp"])).unwrap();

        assert!(!filter.should_include_file("main.rs", Path::new("/p/target/debug/main.rs")));
        assert!(!filter.should_include_file("x.tmp", Path::new("/p/x.tmp")));
        assert!(filter.should_include_file("main.rs", Path::new("/p/src/main.rs")));
        assert!(filter.should_include_file("target.rs", Path::new("/p/target.rs")));
    }

    #[test]
    fn test_exclude_is_case_insensitive() {
        let filter = FileFilter::new(&strings(&["*"]), &strings(&["*/BUILD/*"])).unwrap();
        assert!(filter.is_excluded(Path::new("/p/build/out.txt")));
    }
}
