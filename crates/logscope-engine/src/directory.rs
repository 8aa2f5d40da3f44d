use logscope_source::{FetchError, StreamSource};
use logscope_types::Stream;

use crate::error::DirectoryError;
use crate::hooks::{SessionGuard, SessionSignal};
use crate::matcher::CompactQuery;

/// Known streams, the active one, and the name filter used while choosing
#[derive(Debug, Default)]
pub struct StreamDirectory {
    /// All streams, sorted by name
    streams: Vec<Stream>,

    /// Currently selected stream
    active: Option<Stream>,

    /// Name filter
    query: CompactQuery,

    /// Streams matching `query`, in sorted order
    filtered: Vec<Stream>,
}

impl StreamDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the stream list and make the first stream active.
    ///
    /// An authentication failure signals the session guard before the error
    /// is returned.
    pub async fn load<S, G>(&mut self, source: &S, guard: &G) -> Result<Option<&Stream>, FetchError>
    where
        S: StreamSource,
        G: SessionGuard + ?Sized,
    {
        match source.fetch_streams().await {
            Ok(streams) => Ok(self.set_streams(streams)),
            Err(err) => {
                if err.is_auth() {
                    guard.session_invalid(&SessionSignal::Rejected(err.clone()));
                }
                tracing::warn!(error = %err, "failed to load streams");
                Err(err)
            }
        }
    }

    /// Replace the stream list; returns the new active stream
    pub fn set_streams(&mut self, mut streams: Vec<Stream>) -> Option<&Stream> {
        streams.sort();
        streams.dedup();
        self.active = streams.first().cloned();
        self.streams = streams;
        self.refilter();

        tracing::debug!(
            count = self.streams.len(),
            active = ?self.active.as_ref().map(|s| s.name.as_str()),
            "stream directory loaded"
        );
        self.active.as_ref()
    }

    /// Make `name` the active stream.
    ///
    /// Returns whether the active stream changed.
    pub fn select(&mut self, name: &str) -> Result<bool, DirectoryError> {
        let stream = self
            .streams
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| DirectoryError::UnknownStream(name.to_string()))?;

        if self.active.as_ref() == Some(stream) {
            return Ok(false);
        }
        self.active = Some(stream.clone());
        tracing::debug!(stream = name, "active stream changed");
        Ok(true)
    }

    /// Update the name filter
    pub fn set_query(&mut self, text: &str) {
        self.query = CompactQuery::new(text);
        self.refilter();
    }

    pub fn query(&self) -> &str {
        self.query.text()
    }

    fn refilter(&mut self) {
        self.filtered = self
            .streams
            .iter()
            .filter(|s| self.query.matches(&s.name))
            .cloned()
            .collect();
    }

    /// Streams matching the current filter
    pub fn filtered(&self) -> &[Stream] {
        &self.filtered
    }

    /// A filter is set and nothing matches it
    pub fn nothing_found(&self) -> bool {
        !self.query.is_empty() && self.filtered.is_empty()
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn active(&self) -> Option<&Stream> {
        self.active.as_ref()
    }
}
