use std::sync::Arc;

use quotemetrics::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    run_until_shutdown(run_ingestion).await
}

/// Parse and validate command-line arguments
fn parse_args() -> Result<String, AppError> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        return Err(AppError::InvalidArguments(
            "Usage: quotemetrics <trades.csv>".to_string(),
        ));
    }
    Ok(args[1].clone())
}

/// Main application logic - ingests the trade file and writes a metrics
/// snapshot to stdout
async fn run_ingestion(
    cancel: CancellationToken,
    mut writer: tokio::io::BufWriter<tokio::io::Stdout>,
) -> Result<(), AppError> {
    let input_file = parse_args()?;
    let config = IngestConfig::from_env_or(1000, 4)?;

    let sink = Arc::new(MemorySink::new());
    let stream = CsvTradeStream::from_file(&input_file).await?;

    let pipeline = IngestPipeline::new(Arc::clone(&sink), config);
    let summary = pipeline.ingest_with_cancellation(stream, cancel).await?;

    info!(
        records = summary.records,
        batches = summary.batches,
        instruments = summary.instruments,
        elapsed = ?summary.elapsed,
        "ingestion finished"
    );

    // Snapshot handles flushing
    let rows = sink.snapshot_rows();
    write_metrics_snapshot(rows.iter(), &mut writer).await?;

    Ok(())
}
