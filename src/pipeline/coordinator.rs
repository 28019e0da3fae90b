use std::mem;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{Stream, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::IngestConfig;
use super::error::PipelineError;
use super::worker::run_worker;
use crate::domain::{Batch, MetricsBook, TradeRecord};
use crate::io::IoError;
use crate::sink::QuotationSink;

/// Figures reported by a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub records: usize,
    pub batches: usize,
    pub instruments: usize,
    pub elapsed: Duration,
}

/// Accumulates parsed records into fixed-size chunks for dispatch
struct Batcher {
    capacity: usize,
    open: Batch,
}

impl Batcher {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            open: Vec::with_capacity(capacity),
        }
    }

    /// Append one record; returns a full batch when the chunk closes
    fn push(&mut self, trade: TradeRecord) -> Option<Batch> {
        self.open.push(trade);
        if self.open.len() == self.capacity {
            Some(mem::replace(
                &mut self.open,
                Vec::with_capacity(self.capacity),
            ))
        } else {
            None
        }
    }

    /// Close the batcher, yielding the final short batch if any
    fn into_remainder(self) -> Option<Batch> {
        if self.open.is_empty() {
            None
        } else {
            Some(self.open)
        }
    }
}

/// Ingestion pipeline: one producer folding and batching trades, a fixed
/// pool of workers writing batches to the sink
///
/// The producer owns the metrics book exclusively; the bounded work
/// channel is the only shared structure. A run-scoped cancellation token
/// unblocks every send and receive on first failure.
pub struct IngestPipeline<S>
where
    S: QuotationSink + 'static,
{
    sink: Arc<S>,
    config: IngestConfig,
}

impl<S> IngestPipeline<S>
where
    S: QuotationSink + 'static,
{
    pub fn new(sink: Arc<S>, config: IngestConfig) -> Self {
        Self { sink, config }
    }

    /// Run one ingestion over a trade stream
    pub async fn ingest<St>(&self, stream: St) -> Result<IngestSummary, PipelineError>
    where
        St: Stream<Item = Result<TradeRecord, IoError>> + Unpin + Send,
    {
        self.ingest_with_cancellation(stream, CancellationToken::new())
            .await
    }

    /// Run one ingestion, observing the caller's cancellation token
    ///
    /// The run derives a child token so that worker-triggered cancellation
    /// never leaks back into the caller's token.
    pub async fn ingest_with_cancellation<St>(
        &self,
        mut stream: St,
        caller: CancellationToken,
    ) -> Result<IngestSummary, PipelineError>
    where
        St: Stream<Item = Result<TradeRecord, IoError>> + Unpin + Send,
    {
        let start = Instant::now();
        let cancel = caller.child_token();

        let (tx, rx) = mpsc::channel::<Batch>(self.config.workers());
        let receiver = Arc::new(Mutex::new(rx));

        let handles: Vec<_> = (0..self.config.workers())
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    Arc::clone(&self.sink),
                    Arc::clone(&receiver),
                    cancel.clone(),
                ))
            })
            .collect();

        // STREAMING then DRAINING: read, parse, fold, batch, dispatch
        let mut book = MetricsBook::new();
        let produced = self.produce(&mut stream, &tx, &cancel, &mut book).await;
        if produced.is_err() {
            cancel.cancel();
        }

        // Closing the channel tells idle workers there is no more work
        drop(tx);

        // Every worker reports an outcome; the first specific error wins,
        // and a bare cancellation is kept only as a fallback cause
        let mut first_error: Option<PipelineError> = None;
        for handle in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_err) => Err(PipelineError::Join(join_err)),
            };
            if let Err(e) = outcome {
                let keep = match &first_error {
                    None => true,
                    Some(kept) => e.is_specific() && !kept.is_specific(),
                };
                if keep {
                    first_error = Some(e);
                }
            }
        }

        let (records, batches) = match produced {
            Ok(counts) => counts,
            Err(e) if e.is_specific() => return Err(e),
            // A bare cancellation: a worker error, if any, is the cause
            Err(e) => return Err(first_error.unwrap_or(e)),
        };
        if let Some(e) = first_error {
            return Err(e);
        }

        // A cancellation landing after the workers drained cleanly still
        // fails the run; a cancelled run must never flush
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        // FLUSHING: all batches acknowledged, hand over the aggregate map
        let instruments = book.len();
        if instruments > 0 {
            self.sink.insert_metrics(&book.into_inner()).await?;
        } else {
            debug!("no instruments seen, skipping metrics flush");
        }

        let elapsed = start.elapsed();
        info!(records, batches, instruments, ?elapsed, "ingestion run complete");

        Ok(IngestSummary {
            records,
            batches,
            instruments,
            elapsed,
        })
    }

    /// Producer loop: returns (records, batches) on clean exhaustion
    async fn produce<St>(
        &self,
        stream: &mut St,
        tx: &mpsc::Sender<Batch>,
        cancel: &CancellationToken,
        book: &mut MetricsBook,
    ) -> Result<(usize, usize), PipelineError>
    where
        St: Stream<Item = Result<TradeRecord, IoError>> + Unpin + Send,
    {
        let mut batcher = Batcher::new(self.config.batch_size());
        let mut records = 0usize;
        let mut batches = 0usize;

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(PipelineError::Cancelled),
                next = stream.next() => next,
            };

            let Some(item) = next else { break };
            let trade = item.inspect_err(|e| warn!(error = %e, "record rejected"))?;

            book.fold(&trade);
            records += 1;

            if let Some(full) = batcher.push(trade) {
                Self::dispatch(tx, full, cancel).await?;
                batches += 1;
            }
        }

        if let Some(remainder) = batcher.into_remainder() {
            Self::dispatch(tx, remainder, cancel).await?;
            batches += 1;
        }

        Ok((records, batches))
    }

    /// Send one batch, racing the run's cancellation signal
    ///
    /// The bounded channel is the backpressure point: the send suspends
    /// while all workers are busy and the buffer is full, and must never
    /// block forever once some worker has already failed.
    async fn dispatch(
        tx: &mpsc::Sender<Batch>,
        batch: Batch,
        cancel: &CancellationToken,
    ) -> Result<(), PipelineError> {
        debug!(trades = batch.len(), "dispatching batch");
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(PipelineError::Cancelled),
            sent = tx.send(batch) => sent.map_err(|_| PipelineError::Cancelled),
        }
    }
}
