//! The fallback driver.
//!
//! Strategies run one after another in [`Strategy::ORDER`] (minus any the
//! configuration skips). Each returns a tagged result; the first success ends
//! the run. Nothing runs concurrently and nothing is retried beyond the chain
//! itself.

use crate::config::ConversionConfig;
use crate::error::Doc2PdfError;
use crate::output::{AttemptOutcome, AttemptRecord, ConversionReport};
use crate::progress::ConversionProgressCallback;
use crate::strategy::Strategy;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert the configured document to PDF, falling back through the
/// strategies until one succeeds.
///
/// # Errors
/// [`Doc2PdfError::AllStrategiesFailed`] when no strategy produced the
/// output; the error carries every attempt in order.
pub async fn convert(config: &ConversionConfig) -> Result<ConversionReport, Doc2PdfError> {
    let total_start = Instant::now();
    let strategies = config.strategies();
    let cb = config.progress_callback.as_deref();
    info!(
        "Converting to {} via {:?}",
        config.output_path.display(),
        strategies
    );
    debug!("{:?}", config);

    notify(cb, |c| c.on_conversion_start(&strategies));

    let mut attempts = Vec::with_capacity(strategies.len());

    for strategy in strategies {
        notify(cb, |c| c.on_strategy_start(strategy));
        info!("Trying {} strategy", strategy);

        let started = Instant::now();
        let result = strategy.attempt(config).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(()) => {
                info!("{} strategy succeeded in {}ms", strategy, duration_ms);
                notify(cb, |c| c.on_strategy_success(strategy, &config.output_path));
                attempts.push(AttemptRecord {
                    strategy,
                    outcome: AttemptOutcome::Succeeded,
                    duration_ms,
                });

                let output_bytes = tokio::fs::metadata(&config.output_path)
                    .await
                    .ok()
                    .map(|m| m.len());

                notify(cb, |c| c.on_conversion_complete(Some(strategy)));
                return Ok(ConversionReport {
                    output: config.output_path.clone(),
                    strategy,
                    attempts,
                    output_bytes,
                    total_duration_ms: total_start.elapsed().as_millis() as u64,
                });
            }
            Err(failure) => {
                warn!("{} strategy failed: {}", strategy, failure);
                notify(cb, |c| c.on_strategy_failure(strategy, &failure));
                attempts.push(AttemptRecord {
                    strategy,
                    outcome: AttemptOutcome::Failed(failure),
                    duration_ms,
                });
            }
        }
    }

    notify(cb, |c| c.on_conversion_complete(None));
    Err(Doc2PdfError::AllStrategiesFailed { attempts })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(config: &ConversionConfig) -> Result<ConversionReport, Doc2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Doc2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(config))
}

fn notify(
    cb: Option<&dyn ConversionProgressCallback>,
    event: impl FnOnce(&dyn ConversionProgressCallback),
) {
    if let Some(cb) = cb {
        event(cb);
    }
}
