//! The search pipeline.
//!
//! A search runs in four stages:
//!
//! 1. **Compile**: the text pattern is turned into a [`WildcardPattern`]
//! 2. **Discover**: [`traverse`] walks the tree with an explicit stack and
//!    orders candidate files deepest directory first
//! 3. **Scan**: [`processor`] decodes each file (BOM, default encoding, then
//!    an optional UTF-8 / UTF-16LE retry) and tests every line
//! 4. **Aggregate**: hits are kept in discovery order, or folded per file
//!
//! Failures below the root never abort a search. Unreadable directories and
//! files turn into warnings and the walk carries on.
pub mod encoding;
pub mod engine;
pub mod pattern;
pub mod processor;
pub mod snippet;
pub mod traverse;

pub use engine::{discover, search, search_grouped_by_file, Searcher};
pub use pattern::WildcardPattern;
pub use processor::ContentScanner;
pub use traverse::{CandidateFile, Traverser};
