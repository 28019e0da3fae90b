use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::PipelineError;
use crate::domain::Batch;
use crate::sink::QuotationSink;

/// Work channel receiver shared by the whole pool
///
/// tokio's mpsc receiver is single-consumer, so the pool serializes
/// receives through a Mutex; the sink calls themselves run unlocked and
/// therefore overlap across workers.
pub(crate) type SharedReceiver = Arc<Mutex<mpsc::Receiver<Batch>>>;

/// Long-lived consumer loop for one pool worker
///
/// Terminates with success only when the channel is closed and drained.
/// Cancellation observed while waiting for work is reported as
/// `Cancelled` so the coordinator never mistakes dropped batches for a
/// clean drain. A sink failure cancels the run token and terminates
/// immediately without draining further batches.
pub(crate) async fn run_worker<S>(
    id: usize,
    sink: Arc<S>,
    receiver: SharedReceiver,
    cancel: CancellationToken,
) -> Result<(), PipelineError>
where
    S: QuotationSink + 'static,
{
    loop {
        let next = {
            let mut rx = receiver.lock().await;
            tokio::select! {
                batch = rx.recv() => batch,
                () = cancel.cancelled() => {
                    debug!(worker = id, "cancelled while waiting for work");
                    return Err(PipelineError::Cancelled);
                }
            }
        };

        let Some(batch) = next else {
            debug!(worker = id, "work channel drained");
            return Ok(());
        };

        debug!(worker = id, trades = batch.len(), "inserting batch");
        if let Err(e) = sink.insert_trades(&batch).await {
            warn!(worker = id, error = %e, "batch insert failed, cancelling run");
            cancel.cancel();
            return Err(PipelineError::Sink(e));
        }
    }
}
