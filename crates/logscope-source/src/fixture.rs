//! Fixture-backed source
//!
//! Serves streams and records from a JSON document so the explorer can run
//! without a remote query service. The document shape is:
//!
//! ```json
//! {
//!   "session_token": "optional-secret",
//!   "streams": [
//!     { "name": "app-a", "records": [
//!       { "time": "2024-01-15T10:30:00Z", "log": "started", "labels": "env:prod,svc:a" }
//!     ] }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use logscope_types::{LogRecord, QueryKey, SessionToken, Stream};

use crate::error::{FetchError, QueryError, SourceError, STATUS_UNAUTHORIZED};
use crate::source::{RecordSource, StreamSource};

/// A record as stored by the query service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRecord {
    pub time: DateTime<Utc>,
    #[serde(rename = "log")]
    pub body: String,
    /// Comma-joined tags
    #[serde(default)]
    pub labels: Option<String>,
}

impl From<WireRecord> for LogRecord {
    fn from(wire: WireRecord) -> Self {
        LogRecord::from_labels(wire.time, wire.body, wire.labels.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct FixtureDocument {
    #[serde(default)]
    session_token: Option<String>,
    #[serde(default)]
    streams: Vec<FixtureStream>,
}

#[derive(Debug, Deserialize)]
struct FixtureStream {
    name: String,
    #[serde(default)]
    records: Vec<WireRecord>,
}

/// In-process stand-in for the remote stream and record services
#[derive(Debug, Default)]
pub struct FixtureSource {
    /// Token a caller must present; `None` accepts any caller
    required_token: Option<String>,

    /// Token presented by this client
    session: Option<SessionToken>,

    /// Streams in document order, with their records
    streams: Vec<(Stream, Vec<LogRecord>)>,

    /// Artificial delay applied to every request
    latency: Option<Duration>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a fixture document from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), streams = source.streams.len(), "loaded fixture");
        Ok(source)
    }

    pub fn from_json(content: &str) -> Result<Self, SourceError> {
        let document: FixtureDocument = serde_json::from_str(content)?;
        let streams = document
            .streams
            .into_iter()
            .map(|s| {
                let records = s.records.into_iter().map(LogRecord::from).collect();
                (Stream::new(s.name), records)
            })
            .collect();

        Ok(Self {
            required_token: document.session_token,
            session: None,
            streams,
            latency: None,
        })
    }

    /// Add a stream with its records
    pub fn with_stream(mut self, name: impl Into<String>, records: Vec<LogRecord>) -> Self {
        self.streams.push((Stream::new(name), records));
        self
    }

    /// Require callers to present this token
    pub fn require_token(mut self, token: impl Into<String>) -> Self {
        self.required_token = Some(token.into());
        self
    }

    /// Token this client presents on every request
    pub fn with_session(mut self, session: Option<SessionToken>) -> Self {
        self.session = session;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = (!latency.is_zero()).then_some(latency);
        self
    }

    fn authorized(&self) -> bool {
        match &self.required_token {
            None => true,
            Some(required) => self
                .session
                .as_ref()
                .is_some_and(|token| token.as_str() == required),
        }
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl StreamSource for FixtureSource {
    async fn fetch_streams(&self) -> Result<Vec<Stream>, FetchError> {
        self.delay().await;
        if !self.authorized() {
            return Err(FetchError::from_status(
                STATUS_UNAUTHORIZED,
                "session token rejected",
            ));
        }
        Ok(self.streams.iter().map(|(stream, _)| stream.clone()).collect())
    }
}

impl RecordSource for FixtureSource {
    async fn fetch_records(&self, key: &QueryKey) -> Result<Vec<LogRecord>, QueryError> {
        self.delay().await;
        if !self.authorized() {
            return Err(QueryError::new(&key.stream, "session token rejected"));
        }

        let (_, records) = self
            .streams
            .iter()
            .find(|(stream, _)| stream.name == key.stream)
            .ok_or_else(|| QueryError::new(&key.stream, "stream not found"))?;

        let matched: Vec<LogRecord> = records
            .iter()
            .filter(|r| key.range.contains(r.time))
            .cloned()
            .collect();

        tracing::debug!(
            stream = %key.stream,
            start = %key.range.start_param(),
            end = %key.range.end_param(),
            matched = matched.len(),
            "served fixture query"
        );
        Ok(matched)
    }
}
