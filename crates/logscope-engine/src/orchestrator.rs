use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use logscope_source::{QueryError, RecordSource};
use logscope_types::{LogRecord, QueryKey};

/// Result of a finished fetch, tagged with the trigger it answers
#[derive(Debug)]
pub struct QueryOutcome {
    generation: u64,
    key: QueryKey,
    result: Result<Vec<LogRecord>, QueryError>,
}

impl QueryOutcome {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

/// What happened when an outcome was handed back to the orchestrator
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// The record set was replaced
    Applied { key: QueryKey, count: usize },
    /// The current query failed; the previous record set is kept
    Failed(QueryError),
    /// A newer query was triggered since this one; result dropped
    Discarded { generation: u64 },
}

/// Issues record queries and keeps only the latest one's result
pub struct QueryOrchestrator<R> {
    source: Arc<R>,

    /// Generation of the most recent trigger
    generation: u64,

    /// Key of the most recent trigger
    current: Option<QueryKey>,

    /// Whether the most recent trigger is still unanswered
    loading: bool,

    /// Accepted record set
    records: Arc<[LogRecord]>,

    /// Cancels the in-flight fetch when superseded
    cancel: CancellationToken,

    /// Spawned fetch tasks
    tasks: Vec<JoinHandle<()>>,

    outcome_tx: mpsc::UnboundedSender<QueryOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<QueryOutcome>,
}

impl<R: RecordSource> QueryOrchestrator<R> {
    pub fn new(source: Arc<R>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            source,
            generation: 0,
            current: None,
            loading: false,
            records: Arc::from(Vec::new()),
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
            outcome_tx,
            outcome_rx,
        }
    }

    /// Start a query for `key`, superseding any query still in flight.
    ///
    /// Returns the generation assigned to this trigger.
    pub fn trigger(&mut self, key: QueryKey) -> u64 {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.tasks.retain(|t| !t.is_finished());

        self.generation += 1;
        self.current = Some(key.clone());
        self.loading = true;

        let generation = self.generation;
        tracing::debug!(generation, %key, "query triggered");

        let task = self.spawn_fetch(generation, key);
        self.tasks.push(task);
        generation
    }

    /// Re-run the current query under a fresh generation
    pub fn refresh(&mut self) -> Option<u64> {
        let key = self.current.clone()?;
        Some(self.trigger(key))
    }

    fn spawn_fetch(&self, generation: u64, key: QueryKey) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let cancel = self.cancel.clone();
        let outcome_tx = self.outcome_tx.clone();

        tokio::spawn(async move {
            let request = key.clone();
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::debug!(generation, "query superseded before completion");
                }

                result = source.fetch_records(&request) => {
                    // Receiver lives as long as the orchestrator
                    let _ = outcome_tx.send(QueryOutcome { generation, key, result });
                }
            }
        })
    }

    /// Wait for the next finished fetch
    pub async fn next_outcome(&mut self) -> Option<QueryOutcome> {
        self.outcome_rx.recv().await
    }

    /// Apply an outcome if it answers the most recent trigger
    pub fn complete(&mut self, outcome: QueryOutcome) -> Completion {
        if outcome.generation != self.generation {
            tracing::debug!(
                generation = outcome.generation,
                current = self.generation,
                "discarding stale query result"
            );
            return Completion::Discarded {
                generation: outcome.generation,
            };
        }

        self.loading = false;
        match outcome.result {
            Ok(records) => {
                let count = records.len();
                self.records = Arc::from(records);
                tracing::info!(key = %outcome.key, count, "query applied");
                Completion::Applied {
                    key: outcome.key,
                    count,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "query failed, keeping previous records");
                Completion::Failed(err)
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current(&self) -> Option<&QueryKey> {
        self.current.as_ref()
    }

    /// Snapshot of the accepted record set
    pub fn records(&self) -> Arc<[LogRecord]> {
        Arc::clone(&self.records)
    }
}

impl<R> Drop for QueryOrchestrator<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}
