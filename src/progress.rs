//! Progress-callback trait for fallback-chain events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to be told
//! which strategy is running and how each one ended. The `doc2pdf` binary
//! uses this to print its status lines; library callers can forward the
//! events anywhere.
//!
//! # Example
//!
//! ```rust
//! use doc2pdf::{AttemptFailure, ConversionConfig, ConversionProgressCallback, Strategy};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Recorder {
//!     failed: Mutex<Vec<Strategy>>,
//! }
//!
//! impl ConversionProgressCallback for Recorder {
//!     fn on_strategy_failure(&self, strategy: Strategy, _failure: &AttemptFailure) {
//!         self.failed.lock().unwrap().push(strategy);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Recorder::default()) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! # drop(config);
//! ```

use crate::error::AttemptFailure;
use crate::strategy::Strategy;
use std::path::Path;
use std::sync::Arc;

/// Called by the fallback chain as it tries each strategy.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive strictly in order; the engine download
/// callbacks run on a blocking worker thread.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, with the strategies that will be tried in order.
    fn on_conversion_start(&self, strategies: &[Strategy]) {
        let _ = strategies;
    }

    fn on_strategy_start(&self, strategy: Strategy) {
        let _ = strategy;
    }

    /// The locator found a browser; the browser strategy is about to run it.
    fn on_browser_located(&self, browser: &Path) {
        let _ = browser;
    }

    /// The PDF engine could not be bound and a one-off install begins.
    fn on_engine_install_start(&self) {}

    /// Download progress of the engine install, in bytes.
    fn on_engine_download_progress(&self, downloaded: u64, total: Option<u64>) {
        let _ = (downloaded, total);
    }

    /// The engine install step finished, successfully or not.
    fn on_engine_install_complete(&self, success: bool) {
        let _ = success;
    }

    fn on_strategy_success(&self, strategy: Strategy, output: &Path) {
        let _ = (strategy, output);
    }

    /// A strategy failed; the chain continues with the next one, if any.
    fn on_strategy_failure(&self, strategy: Strategy, failure: &AttemptFailure) {
        let _ = (strategy, failure);
    }

    /// Called once at the end with the strategy that produced the PDF, or
    /// `None` when all failed.
    fn on_conversion_complete(&self, succeeded: Option<Strategy>) {
        let _ = succeeded;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Log(Mutex<Vec<String>>);

    impl ConversionProgressCallback for Log {
        fn on_strategy_start(&self, strategy: Strategy) {
            self.0.lock().unwrap().push(format!("start {strategy}"));
        }

        fn on_strategy_failure(&self, strategy: Strategy, failure: &AttemptFailure) {
            self.0
                .lock()
                .unwrap()
                .push(format!("fail {strategy}: {}", failure.short()));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(&Strategy::ORDER);
        cb.on_strategy_start(Strategy::Browser);
        cb.on_browser_located(Path::new("/usr/bin/chromium"));
        cb.on_engine_install_start();
        cb.on_engine_download_progress(10, Some(100));
        cb.on_engine_install_complete(false);
        cb.on_strategy_success(Strategy::Manual, Path::new("out.pdf"));
        cb.on_conversion_complete(Some(Strategy::Manual));
    }

    #[test]
    fn overridden_methods_receive_events() {
        let log = Arc::new(Log::default());
        let cb: ProgressCallback = log.clone();
        cb.on_strategy_start(Strategy::DocTool);
        cb.on_strategy_failure(
            Strategy::DocTool,
            &AttemptFailure::NotFound {
                tool: "pandoc".into(),
            },
        );
        cb.on_conversion_complete(None);

        assert_eq!(
            *log.0.lock().unwrap(),
            vec!["start doc-tool", "fail doc-tool: pandoc not found"]
        );
    }
}
