use std::future::Future;

use logscope_types::{LogRecord, QueryKey, Stream};

use crate::error::{FetchError, QueryError};

/// Lists the streams an operator can explore
pub trait StreamSource: Send + Sync {
    /// Fetch every known stream, in whatever order the source keeps them
    fn fetch_streams(&self) -> impl Future<Output = Result<Vec<Stream>, FetchError>> + Send;
}

/// Runs record queries for a (stream, window) pair
///
/// Implementations are shared with spawned query tasks, hence the `'static`
/// bound. Bounds are available pre-formatted through
/// [`TimeRange::start_param`](logscope_types::TimeRange::start_param) for
/// transports that need ISO-8601 text.
pub trait RecordSource: Send + Sync + 'static {
    fn fetch_records(
        &self,
        key: &QueryKey,
    ) -> impl Future<Output = Result<Vec<LogRecord>, QueryError>> + Send;
}
