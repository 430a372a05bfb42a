//! # doc2pdf
//!
//! Turn an HTML or Markdown document into a PDF with whatever is available
//! on the machine.
//!
//! ## Fallback chain
//!
//! ```text
//!  1. browser   headless Chrome/Chromium prints the HTML page
//!        │ fail (not found, non-zero exit, timeout)
//!  2. doc-tool  pandoc converts the Markdown
//!        │ fail (not found, non-zero exit, timeout)
//!  3. manual    the Markdown is drawn line by line with PDFium
//! ```
//!
//! The first strategy that succeeds writes the output file; the others are
//! never started. External tools are trusted on their exit status. The manual
//! renderer is plain text only: one line per source line, truncated at 80
//! characters, bold headings, indented bullets.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2pdf::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .html("overview.html")
//!         .markdown("overview.md")
//!         .output("overview.pdf")
//!         .build()?;
//!     let report = convert(&config).await?;
//!     eprintln!("{} via {}", report.output.display(), report.strategy);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod locate;
pub mod output;
pub mod progress;
pub mod strategy;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_sync};
pub use error::{AttemptFailure, Doc2PdfError};
pub use layout::{LineKind, PageLayout};
pub use output::{AttemptOutcome, AttemptRecord, ConversionReport};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use strategy::Strategy;

/// Re-exported so callers can build [`ConversionConfig::engine`] without a
/// direct dependency.
pub use pdfium_setup::SetupOptions;
