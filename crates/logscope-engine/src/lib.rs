//! Query and filter engine for logscope
//!
//! This crate resolves the active stream, re-queries records when the stream
//! or time window changes, filters rows by tag selection and serves the
//! free-text record lookup.

mod config;
mod directory;
mod error;
mod explorer;
mod hooks;
mod lookup;
mod matcher;
mod orchestrator;
mod view;
mod window;

pub use config::ExplorerConfig;
pub use directory::StreamDirectory;
pub use error::{DirectoryError, StartupError};
pub use explorer::{Change, DetailOrigin, DetailState, Explorer};
pub use hooks::{
    Collaborators, DetailView, ErrorReporter, SessionGuard, SessionSignal, TracingHooks,
};
pub use lookup::RecordLookupIndex;
pub use matcher::{matches_tags, CompactQuery};
pub use orchestrator::{Completion, QueryOrchestrator, QueryOutcome};
pub use view::FilteredView;
pub use window::TimeWindow;

// Re-export types used in our public API
pub use logscope_source::{FetchError, QueryError, RecordSource, StreamSource};
pub use logscope_types::{
    DisplayTimezone, LogRecord, QueryKey, SessionToken, Stream, TagSelection, TimeRange,
    TimeRangePreset,
};
