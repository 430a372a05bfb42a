//! Result types describing what a conversion run did.

use crate::error::AttemptFailure;
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of one strategy attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Succeeded,
    Failed(AttemptFailure),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Succeeded)
    }

    pub fn failure(&self) -> Option<&AttemptFailure> {
        match self {
            AttemptOutcome::Succeeded => None,
            AttemptOutcome::Failed(f) => Some(f),
        }
    }
}

/// One entry per strategy the chain actually tried, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub strategy: Strategy,
    pub outcome: AttemptOutcome,
    pub duration_ms: u64,
}

/// Returned by [`crate::convert`] when a strategy produced the PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Path of the PDF that was written.
    pub output: PathBuf,
    /// The strategy that succeeded.
    pub strategy: Strategy,
    /// Every attempt, failed ones first, the successful one last.
    pub attempts: Vec<AttemptRecord>,
    /// Size of the output file, if it could be read back.
    ///
    /// External tools are trusted on exit status alone, so this can be
    /// `None` (or zero) even on success.
    pub output_bytes: Option<u64>,
    pub total_duration_ms: u64,
}

impl ConversionReport {
    /// Strategies that failed before the successful one.
    pub fn fallbacks(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| !a.outcome.is_success())
            .count()
    }
}
