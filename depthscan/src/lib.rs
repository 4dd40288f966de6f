pub mod config;
pub mod errors;
pub mod filters;
pub mod fs;
pub mod metrics;
pub mod progress;
pub mod results;
pub mod search;

pub use config::{ConfigOverrides, SearchConfig, SearchOptions};
pub use errors::{SearchError, SearchResult};
pub use fs::{FileSystem, OsFileSystem};
pub use metrics::{ScanMetrics, ScanStats};
pub use progress::{ProgressEvent, ProgressSink};
pub use results::{group_by_file, FileReport, LineHit, MatchHit, NewlineStyle};
pub use search::{
    discover, search, search_grouped_by_file, CandidateFile, Searcher, WildcardPattern,
};
