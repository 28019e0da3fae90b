use std::future::Future;
use std::pin::pin;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::error::AppError;

/// Drive the application future, turning the first Unix signal into run
/// cancellation
///
/// The run receives a token that is cancelled on SIGTERM, SIGINT or
/// SIGHUP, so an in-flight ingestion winds down through the pipeline's
/// cancellation path and the worker pool is joined before the process
/// dies with the conventional 128+signo code. A clean run exits 0; a
/// failed run prints the error and exits 1.
///
/// The run also gets a buffered stdout writer and is responsible for
/// flushing what it writes. This function never returns.
pub async fn run_until_shutdown<F, Fut>(main_fn: F) -> !
where
    F: FnOnce(CancellationToken, tokio::io::BufWriter<tokio::io::Stdout>) -> Fut,
    Fut: Future<Output = Result<(), AppError>>,
{
    let cancel = CancellationToken::new();
    let writer = tokio::io::BufWriter::new(tokio::io::stdout());
    let mut run = pin!(main_fn(cancel.clone(), writer));

    let exit_code = tokio::select! {
        result = &mut run => match result {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: {e}");
                1
            }
        },
        code = shutdown_signal() => {
            cancel.cancel();
            // Let the run unwind before the process exits
            let _ = run.await;
            code
        }
    };

    std::process::exit(exit_code)
}

/// Resolve once the first shutdown signal arrives, yielding the exit code
async fn shutdown_signal() -> i32 {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("SIGINT handler");
        let mut sighup = signal(SignalKind::hangup()).expect("SIGHUP handler");

        let received = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
            _ = sighup.recv() => "SIGHUP",
        };
        warn!(signal = received, "shutdown requested, cancelling run");
        signal_exit_code(received)
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("ctrl-c handler");
        warn!("shutdown requested, cancelling run");
        130
    }
}

/// Conventional 128+signo exit codes
fn signal_exit_code(name: &str) -> i32 {
    match name {
        "SIGHUP" => 129,
        "SIGINT" => 130,
        "SIGTERM" => 143,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_the_128_plus_signo_convention() {
        assert_eq!(signal_exit_code("SIGHUP"), 129);
        assert_eq!(signal_exit_code("SIGINT"), 130);
        assert_eq!(signal_exit_code("SIGTERM"), 143);
    }

    #[test]
    fn unknown_signal_maps_to_generic_failure() {
        assert_eq!(signal_exit_code("SIGUSR1"), 1);
    }
}
