use std::sync::Arc;

use logscope_types::{LogRecord, TagSelection};

use crate::matcher::matches_tags;

/// Rows shown to the operator: fetched records narrowed by tag selection
#[derive(Clone, Debug)]
pub struct FilteredView {
    /// Snapshot of the accepted record set
    records: Arc<[LogRecord]>,

    selection: TagSelection,

    /// Indices into `records` that pass the selection
    rows: Vec<usize>,
}

impl Default for FilteredView {
    fn default() -> Self {
        Self {
            records: Arc::from(Vec::new()),
            selection: TagSelection::default(),
            rows: Vec::new(),
        }
    }
}

impl FilteredView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_records(&mut self, records: Arc<[LogRecord]>) {
        self.records = records;
        self.recompute();
    }

    pub fn set_selection(&mut self, selection: TagSelection) {
        self.selection = selection;
        self.recompute();
    }

    fn recompute(&mut self) {
        let selection = self.selection.as_slice();
        self.rows = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| matches_tags(&r.tags, selection))
            .map(|(i, _)| i)
            .collect();
    }

    /// Displayed rows, in fetch order
    pub fn rows(&self) -> impl Iterator<Item = &LogRecord> {
        self.rows.iter().map(|&i| &self.records[i])
    }

    pub fn row(&self, index: usize) -> Option<&LogRecord> {
        self.rows.get(index).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Size of the unfiltered record set
    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn selection(&self) -> &TagSelection {
        &self.selection
    }

    /// Tags offered for selection: those of the first fetched record
    pub fn tag_universe(&self) -> &[String] {
        self.records.first().map(|r| r.tags.as_slice()).unwrap_or_default()
    }
}
