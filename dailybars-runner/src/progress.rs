//! Progress callbacks for a pull run.

use crate::summary::{AssetOutcome, OutcomeStatus, RunSummary};
use dailybars_core::data::WriteOutcome;
use tracing::{error, info, warn};

/// Progress callback for multi-asset pulls.
///
/// Called from worker threads, so implementations must be `Sync`.
pub trait PullProgress: Send + Sync {
    /// Called when a worker starts on an asset.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when an asset finishes, whatever the outcome.
    fn on_complete(&self, outcome: &AssetOutcome, index: usize, total: usize);

    /// Called once after every asset has an outcome.
    fn on_batch_complete(&self, summary: &RunSummary);
}

/// Reports progress through `tracing`.
pub struct LogProgress;

impl PullProgress for LogProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        tracing::debug!("[{}/{}] pulling {symbol}", index + 1, total);
    }

    fn on_complete(&self, outcome: &AssetOutcome, index: usize, total: usize) {
        let symbol = &outcome.symbol;
        let n = index + 1;
        match outcome.status {
            OutcomeStatus::Succeeded => {
                let Some(merge) = &outcome.merge else { return };
                match merge.outcome {
                    WriteOutcome::Unchanged => {
                        info!("[{n}/{total}] {symbol}: up to date ({} rows)", merge.total)
                    }
                    WriteOutcome::Created | WriteOutcome::Updated => info!(
                        "[{n}/{total}] {symbol}: +{} new, {} replaced, {} rows",
                        merge.added, merge.replaced, merge.total
                    ),
                }
            }
            OutcomeStatus::Skipped => warn!(
                "[{n}/{total}] {symbol}: skipped: {}",
                outcome.message.as_deref().unwrap_or("no reason given")
            ),
            OutcomeStatus::Failed => error!(
                "[{n}/{total}] {symbol}: failed: {}",
                outcome.message.as_deref().unwrap_or("no reason given")
            ),
            OutcomeStatus::Cancelled => warn!("[{n}/{total}] {symbol}: cancelled"),
        }
    }

    fn on_batch_complete(&self, summary: &RunSummary) {
        info!(
            mode = summary.mode.as_str(),
            "pull complete: {} succeeded ({} changed), {} skipped, {} failed, {} cancelled of {}",
            summary.succeeded,
            summary.changed,
            summary.skipped,
            summary.failed,
            summary.cancelled,
            summary.total
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::ErrorKind;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn skip_and_failure_reasons_are_logged() {
        let out = logged(|| {
            let skipped = AssetOutcome::skipped("ETH", None, ErrorKind::Auth, "HTTP 401 for ETH");
            let failed = AssetOutcome::failed("SOL", None, ErrorKind::Storage, "disk full");
            LogProgress.on_complete(&skipped, 0, 3);
            LogProgress.on_complete(&failed, 1, 3);
            LogProgress.on_complete(&AssetOutcome::cancelled("BTC"), 2, 3);
        });

        assert!(out.contains("WARN"));
        assert!(out.contains("[1/3] ETH: skipped: HTTP 401 for ETH"));
        assert!(out.contains("ERROR"));
        assert!(out.contains("[2/3] SOL: failed: disk full"));
        assert!(out.contains("[3/3] BTC: cancelled"));
    }
}
