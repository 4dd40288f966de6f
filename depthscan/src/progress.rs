//! Observational progress and warning events.
//!
//! A sink only watches: nothing it does can change what a search returns.
use std::path::Path;

/// Something worth telling the caller about while a search runs.
#[derive(Debug, Clone, Copy)]
pub enum ProgressEvent<'a> {
    /// The traverser popped a directory off its work stack.
    DirectoryEntered { path: &'a Path, depth: usize },
    /// A candidate file finished scanning with `hits` matching lines.
    FileScanned { path: &'a Path, hits: usize },
    /// A directory or file was skipped after a recoverable failure.
    Warning { path: &'a Path, message: &'a str },
}

/// Receives [`ProgressEvent`]s.
pub trait ProgressSink {
    fn on_event(&self, event: &ProgressEvent<'_>);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent<'_>),
{
    fn on_event(&self, event: &ProgressEvent<'_>) {
        self(event)
    }
}

/// Forwards to the sink when there is one.
pub(crate) fn emit(sink: Option<&dyn ProgressSink>, event: ProgressEvent<'_>) {
    if let Some(sink) = sink {
        sink.on_event(&event);
    }
}
