//! Stream and record sources for logscope
//!
//! This crate defines the contracts the engine consumes to list streams and
//! query records, plus a fixture-backed implementation of both.

mod error;
mod fixture;
mod source;

pub use error::{FetchError, QueryError, SourceError};
pub use fixture::{FixtureSource, WireRecord};
pub use source::{RecordSource, StreamSource};

// Re-export types that are used in our public API
pub use logscope_types::{LogRecord, QueryKey, SessionToken, Stream};
