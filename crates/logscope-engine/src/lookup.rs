use std::sync::Arc;

use logscope_types::LogRecord;

use crate::matcher::CompactQuery;

/// Free-text lookup over record bodies.
///
/// Produces candidates for opening a single record; it never narrows the
/// rows of the [`FilteredView`](crate::FilteredView).
#[derive(Clone, Debug)]
pub struct RecordLookupIndex {
    records: Arc<[LogRecord]>,
    query: CompactQuery,
    /// Indices into `records` whose body matches `query`
    candidates: Vec<usize>,
}

impl Default for RecordLookupIndex {
    fn default() -> Self {
        Self {
            records: Arc::from(Vec::new()),
            query: CompactQuery::default(),
            candidates: Vec::new(),
        }
    }
}

impl RecordLookupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_records(&mut self, records: Arc<[LogRecord]>) {
        self.records = records;
        self.recompute();
    }

    pub fn set_query(&mut self, text: &str) {
        self.query = CompactQuery::new(text);
        self.recompute();
    }

    pub fn clear_query(&mut self) {
        self.set_query("");
    }

    pub fn query(&self) -> &str {
        self.query.text()
    }

    fn recompute(&mut self) {
        self.candidates = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| self.query.matches(&r.body))
            .map(|(i, _)| i)
            .collect();
    }

    pub fn candidates(&self) -> impl Iterator<Item = &LogRecord> {
        self.candidates.iter().map(|&i| &self.records[i])
    }

    pub fn candidate(&self, index: usize) -> Option<&LogRecord> {
        self.candidates.get(index).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// A query is set and no record body matches it
    pub fn nothing_found(&self) -> bool {
        !self.query.is_empty() && self.candidates.is_empty()
    }
}
