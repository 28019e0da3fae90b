use csv_async::AsyncSerializer;
use tokio::io::AsyncWrite;
use tokio_util::compat::TokioAsyncWriteCompatExt;

use super::error::IoError;
use crate::domain::InstrumentMetrics;

/// Write a metrics snapshot in CSV form, sorted by ticker
///
/// Rows go through the serde serializer, which emits a header row from
/// the field names ahead of the first record. Sorting keeps the output
/// deterministic regardless of map iteration order. The writer is
/// flushed before returning.
pub async fn write_metrics_snapshot<'a, W, I>(metrics: I, writer: W) -> Result<(), IoError>
where
    W: AsyncWrite + Unpin + Send,
    I: IntoIterator<Item = &'a InstrumentMetrics>,
{
    let mut rows: Vec<&InstrumentMetrics> = metrics.into_iter().collect();
    rows.sort_by(|a, b| a.ticker.cmp(&b.ticker));

    let mut serializer = AsyncSerializer::from_writer(writer.compat_write());
    for row in rows {
        serializer.serialize(row).await?;
    }
    serializer.flush().await?;
    Ok(())
}
