//! Error types for the doc2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Doc2PdfError`]: **Fatal**. The conversion as a whole did not produce a
//!   PDF (bad configuration, or every strategy failed). Returned as
//!   `Err(Doc2PdfError)` from the top-level `convert*` functions.
//!
//! * [`AttemptFailure`]: **Non-fatal**. One strategy failed (tool missing,
//!   tool exited non-zero, timed out, drawing library unavailable). Recorded
//!   in [`crate::output::AttemptRecord`] and the chain moves on to the next
//!   strategy.

use crate::output::AttemptRecord;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the doc2pdf library.
#[derive(Debug, Error)]
pub enum Doc2PdfError {
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No strategy produced the output PDF.
    #[error("No conversion strategy succeeded ({}).\nPlease try manual conversion.", summarise(.attempts))]
    AllStrategiesFailed { attempts: Vec<AttemptRecord> },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn summarise(attempts: &[AttemptRecord]) -> String {
    if attempts.is_empty() {
        return "no strategy was attempted".to_string();
    }
    attempts
        .iter()
        .map(|a| match a.outcome.failure() {
            Some(f) => format!("{}: {}", a.strategy, f.short()),
            None => format!("{}: ok", a.strategy),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exited with code {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

/// Why a single strategy attempt did not produce the PDF.
///
/// Every variant is recoverable: the fallback chain records it and tries the
/// next strategy.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptFailure {
    /// The external tool could not be located or resolved.
    #[error("{tool} not found")]
    NotFound { tool: String },

    /// The input file this strategy reads does not exist.
    #[error("source file '{path}' does not exist")]
    SourceMissing { path: PathBuf },

    /// The tool ran but exited unsuccessfully.
    #[error("{tool} {}: {stderr}", exit_label(.status))]
    ToolFailed {
        tool: String,
        /// Exit code, or `None` when the process was terminated by a signal.
        status: Option<i32>,
        stderr: String,
    },

    /// The tool did not finish within the configured timeout and was killed.
    #[error("{tool} timed out after {secs}s")]
    TimedOut { tool: String, secs: u64 },

    /// Spawning or waiting on the process failed for a reason other than
    /// the command being absent.
    #[error("failed to run {tool}: {detail}")]
    Spawn { tool: String, detail: String },

    /// The PDF drawing library could not be loaded, even after setup.
    #[error("PDF engine unavailable: {detail}")]
    LibraryUnavailable { detail: String },

    /// The drawing library was loaded but rendering failed.
    #[error("rendering failed: {detail}")]
    RenderFailed { detail: String },

    /// The rendered PDF could not be written to disk.
    #[error("failed to write '{path}': {detail}")]
    OutputWriteFailed { path: PathBuf, detail: String },
}

impl AttemptFailure {
    /// One-line form used in summaries; drops multi-line stderr.
    pub fn short(&self) -> String {
        match self {
            AttemptFailure::ToolFailed { tool, status, .. } => {
                format!("{tool} {}", exit_label(status))
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{AttemptOutcome, AttemptRecord};
    use crate::Strategy;

    #[test]
    fn tool_failed_display_includes_stderr() {
        let e = AttemptFailure::ToolFailed {
            tool: "pandoc".into(),
            status: Some(43),
            stderr: "pdflatex not found".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("pandoc"), "got: {msg}");
        assert!(msg.contains("pdflatex not found"), "got: {msg}");
        assert_eq!(e.short(), "pandoc exited with code 43");
    }

    #[test]
    fn timed_out_display() {
        let e = AttemptFailure::TimedOut {
            tool: "chromium".into(),
            secs: 30,
        };
        assert_eq!(e.to_string(), "chromium timed out after 30s");
    }

    #[test]
    fn all_failed_lists_every_attempt() {
        let attempts = vec![
            AttemptRecord {
                strategy: Strategy::Browser,
                outcome: AttemptOutcome::Failed(AttemptFailure::NotFound {
                    tool: "browser".into(),
                }),
                duration_ms: 1,
            },
            AttemptRecord {
                strategy: Strategy::DocTool,
                outcome: AttemptOutcome::Failed(AttemptFailure::NotFound {
                    tool: "pandoc".into(),
                }),
                duration_ms: 2,
            },
        ];
        let msg = Doc2PdfError::AllStrategiesFailed { attempts }.to_string();
        assert!(msg.contains("browser: browser not found"), "got: {msg}");
        assert!(msg.contains("doc-tool: pandoc not found"), "got: {msg}");
        assert!(msg.contains("manual conversion"), "got: {msg}");
    }

    #[test]
    fn failure_serialises_with_kind_tag() {
        let e = AttemptFailure::LibraryUnavailable {
            detail: "no libpdfium".into(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "library_unavailable");
        assert_eq!(json["detail"], "no libpdfium");
    }
}
