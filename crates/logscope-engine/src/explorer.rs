//! The explorer ties the components together.
//!
//! Every mutation produces a [`Change`] which is routed only to the components
//! that depend on it:
//!
//! - active stream, time window → query orchestrator
//! - fetched records → filtered view and record lookup
//! - tag selection → filtered view
//! - display timezone → nothing (formatting only)

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use logscope_source::{RecordSource, StreamSource};
use logscope_types::{
    DisplayTimezone, LogRecord, QueryKey, SessionToken, TagSelection, TimeRange,
};

use crate::config::ExplorerConfig;
use crate::directory::StreamDirectory;
use crate::error::{DirectoryError, StartupError};
use crate::hooks::{Collaborators, SessionSignal};
use crate::lookup::RecordLookupIndex;
use crate::orchestrator::{Completion, QueryOrchestrator, QueryOutcome};
use crate::view::FilteredView;
use crate::window::TimeWindow;

/// A state change that dependent components must observe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    ActiveStream,
    TimeWindow,
    DisplayTimezone,
    Records,
    TagSelection,
}

/// Where an open detail came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetailOrigin {
    /// A displayed row
    Row,
    /// A lookup candidate
    Lookup,
}

/// The record currently shown in the detail view, if any
#[derive(Clone, Debug, Default)]
pub struct DetailState {
    open: Option<(LogRecord, DetailOrigin)>,
}

impl DetailState {
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn record(&self) -> Option<&LogRecord> {
        self.open.as_ref().map(|(record, _)| record)
    }

    pub fn origin(&self) -> Option<DetailOrigin> {
        self.open.as_ref().map(|(_, origin)| *origin)
    }
}

/// Log exploration session over one record source
pub struct Explorer<R> {
    directory: StreamDirectory,
    window: TimeWindow,
    orchestrator: QueryOrchestrator<R>,
    view: FilteredView,
    lookup: RecordLookupIndex,
    selection: TagSelection,
    detail: DetailState,
    hooks: Collaborators,
    /// Last surfaced failure, cleared by the next applied query
    last_error: Option<String>,
}

impl<R: RecordSource> Explorer<R> {
    /// Load streams and issue the first query for the default stream.
    ///
    /// A missing or rejected session is returned as an error after the
    /// session guard has been signalled. Any other stream-list failure is
    /// reported and leaves the explorer running with no streams.
    pub async fn start<S: StreamSource>(
        streams: &S,
        records: Arc<R>,
        session: Option<SessionToken>,
        config: ExplorerConfig,
        hooks: Collaborators,
    ) -> Result<Self, StartupError> {
        if session.is_none() {
            hooks.session.session_invalid(&SessionSignal::MissingToken);
            return Err(StartupError::MissingSession);
        }

        let now = config.anchor.unwrap_or_else(Utc::now);
        let mut window = TimeWindow::new(config.initial_window, now);
        window.set_display_timezone(config.display_timezone);

        let mut explorer = Self {
            directory: StreamDirectory::new(),
            window,
            orchestrator: QueryOrchestrator::new(records),
            view: FilteredView::new(),
            lookup: RecordLookupIndex::new(),
            selection: TagSelection::new(),
            detail: DetailState::default(),
            hooks,
            last_error: None,
        };

        let guard = Arc::clone(&explorer.hooks.session);
        let loaded = explorer
            .directory
            .load(streams, guard.as_ref())
            .await
            .map(|active| active.is_some());
        match loaded {
            Ok(true) => explorer.propagate(Change::ActiveStream),
            Ok(false) => tracing::info!("no streams available"),
            Err(err) if err.is_auth() => return Err(StartupError::SessionRejected(err)),
            Err(err) => {
                explorer.hooks.errors.streams_unavailable(&err);
                explorer.last_error = Some(err.to_string());
            }
        }

        Ok(explorer)
    }

    fn propagate(&mut self, change: Change) {
        tracing::trace!(?change, "propagating change");
        match change {
            Change::ActiveStream | Change::TimeWindow => self.requery(),
            Change::DisplayTimezone => {}
            Change::Records => {
                let records = self.orchestrator.records();
                self.view.set_records(Arc::clone(&records));
                self.lookup.set_records(records);
            }
            Change::TagSelection => self.view.set_selection(self.selection.clone()),
        }
    }

    /// Start a new query cycle for the active stream and current window
    fn requery(&mut self) {
        let Some(stream) = self.directory.active() else {
            tracing::debug!("no active stream, skipping query");
            return;
        };
        let key = QueryKey::new(stream.name.clone(), self.window.range());
        self.begin_cycle();
        self.orchestrator.trigger(key);
    }

    /// Tags and lookup belong to the previous result set
    fn begin_cycle(&mut self) {
        self.selection.clear();
        self.propagate(Change::TagSelection);
        self.lookup.clear_query();
        if self.detail.origin() == Some(DetailOrigin::Lookup) {
            self.close_detail();
        }
    }

    // ------------------------------------------------------------------
    // Stream selection
    // ------------------------------------------------------------------

    pub fn select_stream(&mut self, name: &str) -> Result<(), DirectoryError> {
        if self.directory.select(name)? {
            self.propagate(Change::ActiveStream);
        }
        Ok(())
    }

    pub fn set_stream_query(&mut self, text: &str) {
        self.directory.set_query(text);
    }

    // ------------------------------------------------------------------
    // Time window
    // ------------------------------------------------------------------

    pub fn set_range(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        if self.window.set_range(start, end) {
            self.propagate(Change::TimeWindow);
        }
    }

    /// Window covering the `span` before now
    pub fn set_last(&mut self, span: TimeDelta) {
        let range = TimeRange::last(span, Utc::now());
        self.set_range(range.start, range.end);
    }

    pub fn cycle_preset(&mut self, forward: bool) {
        if self.window.cycle_preset(forward, Utc::now()) {
            self.propagate(Change::TimeWindow);
        }
    }

    pub fn set_display_timezone(&mut self, timezone: DisplayTimezone) {
        self.window.set_display_timezone(timezone);
        self.propagate(Change::DisplayTimezone);
    }

    // ------------------------------------------------------------------
    // Tag selection
    // ------------------------------------------------------------------

    /// Add or drop a tag; returns whether it is selected afterwards
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        let selected = self.selection.toggle(tag);
        self.propagate(Change::TagSelection);
        selected
    }

    /// Select a tag unless it already is; returns whether it was added
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.selection.contains(tag) {
            return false;
        }
        self.toggle_tag(tag)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let removed = self.selection.remove(tag);
        if removed {
            self.propagate(Change::TagSelection);
        }
        removed
    }

    pub fn clear_tags(&mut self) {
        self.selection.clear();
        self.propagate(Change::TagSelection);
    }

    // ------------------------------------------------------------------
    // Lookup and detail
    // ------------------------------------------------------------------

    pub fn set_lookup_query(&mut self, text: &str) {
        self.lookup.set_query(text);
    }

    /// Open the detail view for a lookup candidate
    pub fn open_candidate(&mut self, index: usize) -> Option<&LogRecord> {
        let record = self.lookup.candidate(index)?.clone();
        self.open_detail(record, DetailOrigin::Lookup)
    }

    /// Open the detail view for a displayed row
    pub fn open_row(&mut self, index: usize) -> Option<&LogRecord> {
        let record = self.view.row(index)?.clone();
        self.open_detail(record, DetailOrigin::Row)
    }

    fn open_detail(&mut self, record: LogRecord, origin: DetailOrigin) -> Option<&LogRecord> {
        self.hooks.detail.open(&record);
        self.detail.open = Some((record, origin));
        self.detail.record()
    }

    pub fn close_detail(&mut self) {
        if self.detail.open.take().is_some() {
            self.hooks.detail.close();
        }
    }

    // ------------------------------------------------------------------
    // Query lifecycle
    // ------------------------------------------------------------------

    /// Retry the current query; returns false if none was ever issued
    pub fn refresh(&mut self) -> bool {
        if self.orchestrator.current().is_none() {
            return false;
        }
        self.begin_cycle();
        self.orchestrator.refresh().is_some()
    }

    /// Wait for the next finished fetch
    pub async fn next_outcome(&mut self) -> Option<QueryOutcome> {
        self.orchestrator.next_outcome().await
    }

    pub fn handle_outcome(&mut self, outcome: QueryOutcome) -> Completion {
        let completion = self.orchestrator.complete(outcome);
        match &completion {
            Completion::Applied { .. } => {
                self.last_error = None;
                self.propagate(Change::Records);
            }
            Completion::Failed(err) => {
                self.hooks.errors.query_failed(err);
                self.last_error = Some(err.to_string());
            }
            Completion::Discarded { .. } => {}
        }
        completion
    }

    /// Process outcomes until the most recent query has completed
    pub async fn settle(&mut self) {
        while self.orchestrator.is_loading() {
            match self.orchestrator.next_outcome().await {
                Some(outcome) => {
                    self.handle_outcome(outcome);
                }
                None => break,
            }
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn directory(&self) -> &StreamDirectory {
        &self.directory
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn view(&self) -> &FilteredView {
        &self.view
    }

    pub fn lookup(&self) -> &RecordLookupIndex {
        &self.lookup
    }

    pub fn selection(&self) -> &TagSelection {
        &self.selection
    }

    pub fn detail(&self) -> &DetailState {
        &self.detail
    }

    pub fn is_loading(&self) -> bool {
        self.orchestrator.is_loading()
    }

    pub fn generation(&self) -> u64 {
        self.orchestrator.generation()
    }

    pub fn current_query(&self) -> Option<&QueryKey> {
        self.orchestrator.current()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
